use std::f32::consts::FRAC_PI_2;

use ultraviolet::{Mat3, Vec3};

use super::{CameraState, InputState};

/// Pitch is clamped to exactly this, either way.
pub const PITCH_LIMIT: f32 = FRAC_PI_2;

pub const WORLD_FORWARD: Vec3 = Vec3 {
    x: 0.,
    y: 0.,
    z: -1.,
};
pub const WORLD_RIGHT: Vec3 = Vec3 {
    x: 1.,
    y: 0.,
    z: 0.,
};
pub const WORLD_UP: Vec3 = Vec3 {
    x: 0.,
    y: 1.,
    z: 0.,
};

/// Rotation of the viewpoint, `Ry(yaw) * Rx(pitch)`.
///
/// Yaw is applied last (outermost), so pitching never rolls the horizon, and
/// the horizontal part of [Orientation::forward] always points along the
/// heading of `yaw` alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pitch: f32,
    yaw: f32,
    basis: Mat3,
}

impl Orientation {
    pub fn from_pitch_yaw(pitch: f32, yaw: f32) -> Self {
        let (sp, cp) = pitch.sin_cos();
        let (sy, cy) = yaw.sin_cos();

        // Columns are the images of the world X, Y and Z axes.
        let basis = Mat3::new(
            Vec3::new(cy, 0., -sy),
            Vec3::new(sy * sp, cp, cy * sp),
            Vec3::new(sy * cp, -sp, cy * cp),
        );

        Self { pitch, yaw, basis }
    }

    pub fn level() -> Self {
        Self::from_pitch_yaw(0., 0.)
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// The rotation handed to the renderer.
    pub fn basis(&self) -> Mat3 {
        self.basis
    }

    pub fn apply(&self, v: Vec3) -> Vec3 {
        self.basis * v
    }

    pub fn forward(&self) -> Vec3 {
        self.apply(WORLD_FORWARD)
    }

    pub fn right(&self) -> Vec3 {
        self.apply(WORLD_RIGHT)
    }

    pub fn up(&self) -> Vec3 {
        self.apply(WORLD_UP)
    }

    /// Horizontal unit vector of the yaw alone, ignoring pitch.
    pub fn heading(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(-sy, 0., -cy)
    }

    /// Horizontal unit vector to the right of [Orientation::heading].
    pub fn heading_right(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0., -sy)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::level()
    }
}

pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Drains the look-delta accumulator into the camera's yaw and pitch.
///
/// A drag to the right turns right, a drag down looks down. With nothing
/// accumulated this is a no-op, so idle frames never drift.
///
/// Returns true if the orientation changed.
pub fn consume_look(camera: &mut CameraState, input: &mut InputState) -> bool {
    let delta = input.take_look();
    if delta.is_zero() {
        return false;
    }

    let yaw = camera.yaw() - delta.x;
    let pitch = clamp_pitch(camera.pitch() - delta.y);
    camera.set_orientation(yaw, pitch);

    true
}
