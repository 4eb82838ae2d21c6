use thiserror::Error;
use walk_scene::SceneError;

use crate::renderer::WindowRunnerError;

#[derive(Debug, Error)]
pub enum WalkError {
    /// The GPU context for the mount couldn't be created.
    #[error("could not create the renderer: {0}")]
    Fatal(#[source] WindowRunnerError),

    #[error("failed to load {asset}: {source}")]
    AssetLoad {
        asset: String,
        #[source]
        source: SceneError,
    },
    #[error("the loader for {0} stopped without a result")]
    LoadAborted(String),
    #[error("failed to upload {asset}: {error:#}")]
    SceneUpload { asset: String, error: anyhow::Error },

    #[error("rendering failed: {0}")]
    Render(#[source] WindowRunnerError),
}

impl WalkError {
    /// Fatal errors are about the GPU context, so a different asset won't
    /// help; everything else is recoverable by supplying one.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WalkError::Fatal(_) | WalkError::Render(_))
    }
}
