use ultraviolet::Vec3;

/// Axis-aligned box around every vertex of a scene, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: Vec3,
    pub max: Vec3,
}

impl Extent {
    /// Returns [None] for an empty iterator, or if any point is not finite.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;

        let mut extent = Extent {
            min: first,
            max: first,
        };
        for point in points {
            extent.include(point);
        }

        extent.is_finite().then_some(extent)
    }

    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min_by_component(point);
        self.max = self.max.max_by_component(point);
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min: self.min.min_by_component(other.min),
            max: self.max.max_by_component(other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    fn is_finite(&self) -> bool {
        [self.min, self.max]
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite())
    }
}

/// [Bounds] is the walkable footprint of a scene: a horizontal rectangle on
/// the XZ plane, plus the fixed height the viewpoint is pinned to.
///
/// Always satisfies `min_x < max_x` and `min_z < max_z`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub eye_height: f32,
}

impl Bounds {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32, eye_height: f32) -> Option<Self> {
        if !(min_x < max_x && min_z < max_z) {
            return None;
        }

        Some(Self {
            min_x,
            max_x,
            min_z,
            max_z,
            eye_height,
        })
    }

    /// Shrinks the horizontal footprint of `extent` by `margin` on every side,
    /// so the viewpoint stays off the exterior walls.
    ///
    /// Degenerate extents (flat on an axis, or thinner than twice the margin)
    /// give [None], and the camera is left unclamped.
    pub fn from_extent(extent: &Extent, margin: f32, eye_height: f32) -> Option<Self> {
        let bounds = Self::new(
            extent.min.x + margin,
            extent.max.x - margin,
            extent.min.z + margin,
            extent.max.z - margin,
            eye_height,
        );

        if bounds.is_none() {
            log::warn!(
                "Scene footprint {:?}..{:?} is degenerate with margin {}, movement is unclamped.",
                extent.min,
                extent.max,
                margin
            );
        }

        bounds
    }

    /// Horizontal center of the footprint, at eye height.
    pub fn center(&self) -> Vec3 {
        Vec3 {
            x: (self.min_x + self.max_x) * 0.5,
            y: self.eye_height,
            z: (self.min_z + self.max_z) * 0.5,
        }
    }

    pub fn has_point(&self, point: Vec3) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_z..=self.max_z).contains(&point.z)
    }

    /// Clamps the horizontal components only; `y` passes through.
    pub fn clamp(&self, point: Vec3) -> Vec3 {
        Vec3 {
            x: point.x.clamp(self.min_x, self.max_x),
            y: point.y,
            z: point.z.clamp(self.min_z, self.max_z),
        }
    }
}
