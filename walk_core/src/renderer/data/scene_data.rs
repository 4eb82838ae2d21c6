use anyhow::Result;
use encase::ShaderType;
use ultraviolet::Vec3;
use walk_scene::SceneAsset;
use wgpu::BufferUsages;

use crate::renderer::helpers::gpu::{GpuBuffer, GpuIndexBuffer};

#[derive(Debug, Clone, Copy, ShaderType)]
pub struct SceneVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec3,
}

/// Flattens every mesh of a scene into one vertex and one index list.
///
/// Base colour is baked into the vertices, so the whole scene draws in a
/// single indexed call.
pub fn scene_vertices(scene: &SceneAsset) -> (Vec<SceneVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for mesh in &scene.meshes {
        let base = vertices.len() as u32;
        let [r, g, b, _] = mesh.base_color;
        let color = Vec3::new(r, g, b);

        // Indices point at positions, so every position gets a vertex.
        vertices.extend(
            mesh.positions
                .iter()
                .enumerate()
                .map(|(i, position)| SceneVertex {
                    position: *position,
                    normal: mesh.normals.get(i).copied().unwrap_or_else(Vec3::unit_y),
                    color,
                }),
        );
        indices.extend(mesh.indices.iter().map(|index| base + index));
    }

    (vertices, indices)
}

/// The GPU side of a loaded scene.
pub struct SceneData {
    pub vertex_buf: GpuBuffer<SceneVertex>,
    pub index_buf: GpuIndexBuffer,
}

impl SceneData {
    /// [None] for a scene without a single triangle: there's nothing to draw,
    /// and wgpu won't create empty buffers.
    pub fn new(device: &wgpu::Device, scene: &SceneAsset) -> Result<Option<Self>> {
        let (vertices, indices) = scene_vertices(scene);
        if indices.is_empty() {
            log::warn!("{} has no triangles to draw", scene.name);
            return Ok(None);
        }

        let vertex_buf = GpuBuffer::new_vec(
            BufferUsages::VERTEX,
            device,
            vertices,
            Some("SceneData::vertex_buf"),
        )?;
        let index_buf = GpuBuffer::new_vec(
            BufferUsages::INDEX,
            device,
            indices,
            Some("SceneData::index_buf"),
        )?;

        Ok(Some(Self {
            vertex_buf,
            index_buf,
        }))
    }

    pub fn index_count(&self) -> u32 {
        self.index_buf.len() as u32
    }

    pub fn release(self) {
        self.vertex_buf.destroy();
        self.index_buf.destroy();
    }
}
