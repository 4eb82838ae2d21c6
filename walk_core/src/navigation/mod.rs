//! First-person walking: input gathering, look and motion integration.
//!
//! Everything in here is plain math on plain data, no GPU or window, so it
//! can be driven frame by frame from tests.

mod camera_state;
mod input_state;
mod input_unifier;
mod motion;
mod orientation;
mod virtual_joystick;

pub use camera_state::*;
pub use input_state::*;
pub use input_unifier::*;
pub use motion::*;
pub use orientation::*;
pub use virtual_joystick::*;
