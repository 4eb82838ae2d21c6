use gltf::{buffer, mesh::Mode, Semantic};
use ultraviolet::{Mat3, Mat4, Vec3, Vec4};

use crate::{Extent, SceneError};

/// A single triangle list, already transformed into world space.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,

    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,

    /// Linear RGBA base colour of the primitive's material.
    pub base_color: [f32; 4],

    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl MeshData {
    pub fn extent(&self) -> Option<Extent> {
        Extent::from_points(self.positions.iter().copied())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn _node_matrix(node: &gltf::Node) -> Mat4 {
    let cols = node.transform().matrix();
    Mat4::new(
        Vec4::from(cols[0]),
        Vec4::from(cols[1]),
        Vec4::from(cols[2]),
        Vec4::from(cols[3]),
    )
}

/// Normals follow the inverse transpose of the linear part, so they stay
/// perpendicular to their surface under non-uniform scale.
fn _normal_matrix(world: &Mat4) -> Mat3 {
    let linear = Mat3::new(world.cols[0].xyz(), world.cols[1].xyz(), world.cols[2].xyz());

    if linear.determinant().abs() <= f32::EPSILON {
        // Flattened to a plane or a line; nothing sensible to invert.
        return linear;
    }
    linear.inversed().transposed()
}

fn _world_normal(normal_matrix: &Mat3, normal: Vec3) -> Vec3 {
    let n = *normal_matrix * normal;
    if n.mag_sq() > 0. {
        n.normalized()
    } else {
        Vec3::unit_y()
    }
}

/// Walks the node tree of `scene` and flattens every triangle primitive into
/// world space.
pub(crate) fn collect_meshes(
    scene: &gltf::Scene,
    buffers: &[buffer::Data],
) -> Result<Vec<MeshData>, SceneError> {
    let mut meshes = Vec::new();
    for node in scene.nodes() {
        _visit_node(&node, Mat4::identity(), buffers, &mut meshes)?;
    }
    Ok(meshes)
}

fn _visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[buffer::Data],
    out: &mut Vec<MeshData>,
) -> Result<(), SceneError> {
    let world = parent * _node_matrix(node);

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh#{}", mesh.index()));

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::debug!(
                    "Skipping {:?} primitive {} of {}.",
                    primitive.mode(),
                    primitive.index(),
                    mesh_name
                );
                continue;
            }

            if let Some(data) = _read_primitive(&mesh_name, &primitive, &world, buffers)? {
                out.push(data);
            }
        }
    }

    for child in node.children() {
        _visit_node(&child, world, buffers, out)?;
    }

    Ok(())
}

fn _read_primitive(
    mesh_name: &str,
    primitive: &gltf::Primitive,
    world: &Mat4,
    buffers: &[buffer::Data],
) -> Result<Option<MeshData>, SceneError> {
    // Primitives without positions have nothing to draw or bound.
    if primitive.get(&Semantic::Positions).is_none() {
        return Ok(None);
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| SceneError::MissingBuffer {
            mesh: mesh_name.to_string(),
            primitive: primitive.index(),
        })?
        .map(|p| world.transform_point3(Vec3::from(p)))
        .collect();

    let normal_matrix = _normal_matrix(world);
    let mut normals: Vec<Vec3> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| _world_normal(&normal_matrix, Vec3::from(n)))
            .collect(),
        None => Vec::new(),
    };

    // One normal per vertex, whatever the file says.
    if !normals.is_empty() && normals.len() != positions.len() {
        log::warn!(
            "{} primitive {} has {} normals for {} positions",
            mesh_name,
            primitive.index(),
            normals.len(),
            positions.len()
        );
    }
    normals.resize(positions.len(), Vec3::unit_y());

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Ok(Some(MeshData {
        name: mesh_name.to_string(),
        positions,
        normals,
        indices,
        base_color,
        cast_shadows: true,
        receive_shadows: true,
    }))
}
