use ultraviolet::UVec2;
use wgpu::{Device, Queue, TextureFormat};

mod window_runner;

pub use window_runner::*;

/// This is passed to the window to give it common information.
pub struct WindowContext<'a> {
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: &'a TextureFormat,
    pub size: UVec2,
}
