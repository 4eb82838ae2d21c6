pub(crate) mod helpers;

mod data;
mod scene_window;

use ultraviolet::UVec2;
use walk_scene::SceneAsset;

pub use helpers::system;
pub use helpers::window::{WindowRunner, WindowRunnerError};
use scene_window::SceneWindow;

use crate::navigation::CameraState;

/// Everything the walkthrough controller needs from its GPU context.
///
/// [WindowRunner] is the real thing; anything else implementing this can
/// stand in for it, e.g. to drive the controller without a GPU.
pub trait FrameRenderer {
    /// Current output size in physical pixels.
    fn size(&self) -> UVec2;

    /// Resizes the output and the projection; the camera is left alone.
    fn resize(&mut self, size: UVec2) -> Result<(), WindowRunnerError>;

    /// Uploads a scene, replacing whatever was attached before.
    fn attach_scene(&mut self, scene: &SceneAsset) -> anyhow::Result<()>;

    /// Frees the GPU buffers of the attached scene, if any.
    fn release_scene(&mut self);

    /// Draws one frame through `camera`.
    fn render(&mut self, camera: &CameraState) -> Result<(), WindowRunnerError>;
}
