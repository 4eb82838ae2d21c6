pub mod gpu;
pub mod system;
pub mod window;
