use ultraviolet::{UVec2, Vec2};

use super::MoveDirection;

// Layout, in logical pixels.
const CELL: f32 = 56.;
const GAP: f32 = 4.;
const MARGIN_LEFT: f32 = 16.;
const MARGIN_BOTTOM: f32 = 32.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

/// On-screen arrow pad in the bottom-left corner: a 3x3 grid with the four
/// directions on the edges and nothing in the middle.
#[derive(Debug, Clone)]
pub struct VirtualJoystick {
    buttons: [(MoveDirection, Rect); 4],
}

impl VirtualJoystick {
    /// `scale` converts logical to physical pixels.
    pub fn new(surface_size: UVec2, scale: f32) -> Self {
        let cell = CELL * scale;
        let pitch = (CELL + GAP) * scale;
        let grid = (3. * CELL + 2. * GAP) * scale;

        let origin = Vec2::new(
            MARGIN_LEFT * scale,
            surface_size.y as f32 - MARGIN_BOTTOM * scale - grid,
        );
        let cell_at = |col: f32, row: f32| {
            let min = origin + Vec2::new(col * pitch, row * pitch);
            Rect {
                min,
                max: min + Vec2::broadcast(cell),
            }
        };

        Self {
            buttons: [
                (MoveDirection::Forward, cell_at(1., 0.)),
                (MoveDirection::Left, cell_at(0., 1.)),
                (MoveDirection::Right, cell_at(2., 1.)),
                (MoveDirection::Backward, cell_at(1., 2.)),
            ],
        }
    }

    pub fn hit(&self, point: Vec2) -> Option<MoveDirection> {
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(direction, _)| *direction)
    }

    /// For hosts drawing the pad themselves.
    pub fn buttons(&self) -> impl Iterator<Item = &(MoveDirection, Rect)> {
        self.buttons.iter()
    }
}
