use ultraviolet::Vec3;
use walk_scene::Bounds;

use super::orientation::{clamp_pitch, Orientation};
use crate::helpers::Movable;

pub const DEFAULT_EYE_HEIGHT: f32 = 1.6;

/// Where the viewpoint is and which way it faces.
///
/// The orientation is always rebuilt from yaw and pitch, never accumulated
/// as a rotation, so repeated look input can't introduce roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    orientation: Orientation,
}

impl CameraState {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            orientation: Orientation::from_pitch_yaw(clamp_pitch(pitch), yaw),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.orientation.yaw()
    }

    pub fn pitch(&self) -> f32 {
        self.orientation.pitch()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.orientation = Orientation::from_pitch_yaw(clamp_pitch(pitch), yaw);
    }

    /// Moves back to the middle of the floor plan, facing -Z, level.
    ///
    /// Without bounds the horizontal position is left alone.
    pub fn reset_to(&mut self, bounds: Option<&Bounds>) {
        if let Some(bounds) = bounds {
            self.position = bounds.center();
        }
        self.orientation = Orientation::level();
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Vec3::new(0., DEFAULT_EYE_HEIGHT, 0.), 0., 0.)
    }
}

impl Movable for CameraState {
    fn pos(&self) -> Vec3 {
        self.position
    }

    fn yaw(&self) -> f32 {
        self.orientation.yaw()
    }

    fn pitch(&self) -> f32 {
        self.orientation.pitch()
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn pitch_is_clamped_on_construction() {
        let camera = CameraState::new(Vec3::zero(), 0., 3.);
        assert_eq!(camera.pitch(), FRAC_PI_2);
    }

    #[test]
    fn reset_goes_to_the_center() {
        let bounds = Bounds::new(2., 8., 1., 7., 1.6).unwrap();
        let mut camera = CameraState::new(Vec3::new(7.9, 1.6, 1.1), 1.2, -0.4);

        camera.reset_to(Some(&bounds));

        assert_eq!(camera.position, Vec3::new(5., 1.6, 4.));
        assert_eq!(camera.yaw(), 0.);
        assert_eq!(camera.pitch(), 0.);
    }

    #[test]
    fn reset_without_bounds_keeps_position() {
        let mut camera = CameraState::new(Vec3::new(7., 1.6, 3.), 1.2, -0.4);

        camera.reset_to(None);

        assert_eq!(camera.position, Vec3::new(7., 1.6, 3.));
        assert_eq!(camera.orientation(), Orientation::level());
    }
}
