mod bounds;
mod helpers;
mod mesh;

use std::{fmt, path::PathBuf, sync::Arc};

pub use bounds::{Bounds, Extent};
pub use helpers::SceneError;
pub use mesh::MeshData;

/// Where a scene asset comes from.
///
/// Network transport is the host's business: by the time an asset reaches
/// us it is either a file on disk or bytes in memory.
#[derive(Clone)]
pub enum AssetRef {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

impl AssetRef {
    pub fn name(&self) -> String {
        match self {
            AssetRef::Path(path) => path.display().to_string(),
            AssetRef::Bytes { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetRef::Path(path) => f.debug_tuple("Path").field(path).finish(),
            AssetRef::Bytes { name, bytes } => f
                .debug_struct("Bytes")
                .field("name", name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl From<PathBuf> for AssetRef {
    fn from(path: PathBuf) -> Self {
        AssetRef::Path(path)
    }
}

/// A fully parsed scene: every triangle primitive of the default scene,
/// flattened into world space, plus the extent of all of them.
#[derive(Debug, Clone)]
pub struct SceneAsset {
    pub name: String,
    pub meshes: Vec<MeshData>,

    /// [None] if the scene has no vertices at all.
    pub extent: Option<Extent>,
}

impl SceneAsset {
    /// Loads and parses the whole asset before computing the extent, so the
    /// extent is never taken from a partially parsed scene.
    pub fn load(asset: &AssetRef) -> Result<Self, SceneError> {
        let name = asset.name();

        let (document, buffers, _images) = match asset {
            AssetRef::Path(path) => {
                if !path.exists() {
                    return Err(SceneError::FileNotFound(path.clone()));
                }
                gltf::import(path)?
            }
            AssetRef::Bytes { bytes, .. } => gltf::import_slice(bytes)?,
        };

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| SceneError::MissingScene(name.clone()))?;

        let meshes = mesh::collect_meshes(&scene, &buffers)?;
        let extent = meshes
            .iter()
            .filter_map(MeshData::extent)
            .reduce(|a, b| a.union(&b));

        log::info!(
            "Loaded {}: {} meshes, {} triangles, extent {:?}",
            name,
            meshes.len(),
            meshes.iter().map(MeshData::triangle_count).sum::<usize>(),
            extent
        );

        Ok(SceneAsset {
            name,
            meshes,
            extent,
        })
    }

    /// The walkable footprint, if the scene has a usable one.
    pub fn bounds(&self, margin: f32, eye_height: f32) -> Option<Bounds> {
        self.extent
            .as_ref()
            .and_then(|extent| Bounds::from_extent(extent, margin, eye_height))
    }
}
