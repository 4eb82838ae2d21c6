use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Failed to import glTF: {0}")]
    Import(#[from] gltf::Error),

    #[error("Asset {0} has no scene to render.")]
    MissingScene(String),

    #[error("Mesh {mesh} primitive {primitive} references a missing buffer.")]
    MissingBuffer { mesh: String, primitive: usize },

    #[error("Asset file {0} does not exist.")]
    FileNotFound(PathBuf),
}
