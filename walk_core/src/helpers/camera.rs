use ultraviolet::{projection::perspective_wgpu_dx, Mat4, UVec2};

use super::Movable;

pub struct Camera<'a, M: Movable> {
    pub movable: &'a M,

    pub z_near: f32,
    pub z_far: f32,
    pub fov: f32,
}

impl<M: Movable> Camera<'_, M> {
    /// Right-handed view matrix. The up vector comes from the orientation
    /// itself, so looking straight up or down never degenerates.
    pub fn view_matrix(&self) -> Mat4 {
        let pos = self.movable.pos();
        Mat4::look_at(
            pos,
            pos + self.movable.look_at_vector(),
            self.movable.up_vector(),
        )
    }

    /// Perspective projection for WebGPU's 0..1 depth range.
    pub fn projection_matrix(&self, display_size: UVec2) -> Mat4 {
        let aspect_ratio = (display_size.x as f64 / display_size.y.max(1) as f64) as f32;
        perspective_wgpu_dx(self.fov.to_radians(), aspect_ratio, self.z_near, self.z_far)
    }

    pub fn view_projection_matrix(&self, display_size: UVec2) -> Mat4 {
        self.projection_matrix(display_size) * self.view_matrix()
    }
}
