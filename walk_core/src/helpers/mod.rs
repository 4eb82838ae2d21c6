mod camera;
mod stopwatch;

pub use camera::Camera;
pub use stopwatch::{FrameClock, Stopwatch};

use ultraviolet::Vec3;

use crate::navigation::Orientation;

/// Anything with a position and a yaw/pitch heading that a [Camera] can
/// look through.
pub trait Movable {
    fn pos(&self) -> Vec3;

    /// Radians, about the vertical axis.
    fn yaw(&self) -> f32;
    /// Radians, positive looks up.
    fn pitch(&self) -> f32;

    fn orientation(&self) -> Orientation {
        Orientation::from_pitch_yaw(self.pitch(), self.yaw())
    }

    fn look_at_vector(&self) -> Vec3 {
        self.orientation().forward()
    }

    fn up_vector(&self) -> Vec3 {
        self.orientation().up()
    }
}
