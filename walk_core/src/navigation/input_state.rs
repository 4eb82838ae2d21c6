use bitflags::bitflags;

bitflags! {
    /// Which ways the viewer is being asked to walk this frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveFlags: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];

    pub fn flag(self) -> MoveFlags {
        match self {
            MoveDirection::Forward => MoveFlags::FORWARD,
            MoveDirection::Backward => MoveFlags::BACKWARD,
            MoveDirection::Left => MoveFlags::LEFT,
            MoveDirection::Right => MoveFlags::RIGHT,
        }
    }
}

/// Pending rotation in radians, already scaled by sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LookDelta {
    pub x: f32,
    pub y: f32,
}

impl LookDelta {
    pub fn is_zero(&self) -> bool {
        self.x == 0. && self.y == 0.
    }
}

/// The per-frame snapshot the navigation systems read.
///
/// Keyboard and on-screen joystick keep their own flags, so releasing a key
/// doesn't cancel a joystick button held for the same direction. Look
/// deltas accumulate between frames and are drained once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keyboard: MoveFlags,
    joystick: MoveFlags,
    look: LookDelta,
}

impl InputState {
    pub fn set_key_direction(&mut self, direction: MoveDirection, pressed: bool) {
        self.keyboard.set(direction.flag(), pressed);
    }

    pub fn set_joystick_direction(&mut self, direction: MoveDirection, pressed: bool) {
        self.joystick.set(direction.flag(), pressed);
    }

    pub fn clear_keyboard(&mut self) {
        self.keyboard = MoveFlags::empty();
    }

    pub fn clear_joystick(&mut self) {
        self.joystick = MoveFlags::empty();
    }

    /// Effective movement: a direction is active if any source holds it.
    pub fn moves(&self) -> MoveFlags {
        self.keyboard | self.joystick
    }

    pub fn add_look(&mut self, dx: f32, dy: f32) {
        self.look.x += dx;
        self.look.y += dy;
    }

    pub fn look(&self) -> LookDelta {
        self.look
    }

    /// Returns the accumulated delta and zeroes it.
    pub fn take_look(&mut self) -> LookDelta {
        std::mem::take(&mut self.look)
    }

    /// Drops everything, e.g. when the controller is torn down.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
