pub mod cvars;
pub mod navigation;
pub mod renderer;
pub mod walkthrough;

pub(crate) mod helpers;

pub use helpers::{Camera, FrameClock, Movable, Stopwatch};
