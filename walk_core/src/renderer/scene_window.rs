use std::borrow::Cow;

use anyhow::Result;
use encase::{ShaderSize, ShaderType};
use ultraviolet::{Mat4, Vec3};
use walk_scene::SceneAsset;
use wgpu::{BufferUsages, ShaderStages};

use crate::{
    cvars::Tuning,
    helpers::Camera,
    navigation::CameraState,
    renderer::helpers::{
        gpu::{GpuBuffer, GpuFrameTexture, GpuFrameTextureDescriptor, LenOrData},
        window::WindowContext,
    },
};

use super::data::{SceneData, SceneVertex};

/// 0x87ceeb.
const SKY_SRGB: [f64; 3] = [135. / 255., 206. / 255., 235. / 255.];

const AMBIENT: f32 = 0.4;
const LIGHT_DIRECTION: Vec3 = Vec3 {
    x: 0.3,
    y: -1.0,
    z: 0.5,
};

fn _srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn _sky_color() -> wgpu::Color {
    let [r, g, b] = SKY_SRGB.map(_srgb_to_linear);
    wgpu::Color { r, g, b, a: 1.0 }
}

#[derive(Debug, Clone, Copy, ShaderType)]
struct SceneUniforms {
    view_proj: Mat4,
    light_dir: Vec3,
    ambient: f32,
}

/// Only 1x and 4x are guaranteed for every render target format.
fn _sample_count(requested: u32) -> u32 {
    match requested {
        0 | 1 => 1,
        4 => 4,
        other => {
            log::warn!("r_msaa {} is unsupported, using 4", other);
            4
        }
    }
}

pub struct SceneWindow {
    z_near: f32,
    z_far: f32,
    fov: f32,

    ubo: GpuBuffer<SceneUniforms>,
    bind_group: wgpu::BindGroup,
    render_pipeline: wgpu::RenderPipeline,

    msaa_texture: Option<GpuFrameTexture>,
    depth_texture: GpuFrameTexture,

    scene: Option<SceneData>,
}

fn _create_scene_render_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    pipeline_layout: &wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    let vertex_state = wgpu::VertexState {
        buffers: &[wgpu::VertexBufferLayout {
            array_stride: SceneVertex::SHADER_SIZE.get(),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 16,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 32,
                    shader_location: 2,
                },
            ],
        }],
        module: shader,
        entry_point: "vs_main",
        compilation_options: Default::default(),
    };

    let fragment_state = Some(wgpu::FragmentState {
        targets: &[Some(wgpu::ColorTargetState {
            format: surface_format,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })],
        module: shader,
        entry_point: "fs_main",
        compilation_options: Default::default(),
    });

    let depth_stencil = Some(wgpu::DepthStencilState {
        format: wgpu::TextureFormat::Depth32Float,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        layout: Some(pipeline_layout),
        vertex: vertex_state,
        fragment: fragment_state,
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Walls are regularly seen from both sides.
            cull_mode: None,
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil,
        label: Some("SceneWindow::render_pipeline"),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

impl SceneWindow {
    pub fn new(context: &WindowContext, tuning: &Tuning) -> Result<Self> {
        let device = context.device;
        let sample_count = _sample_count(tuning.msaa);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("SceneWindow::shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("./shaders/scene.wgsl"))),
        });

        let ubo = GpuBuffer::<SceneUniforms>::new(
            BufferUsages::UNIFORM,
            device,
            LenOrData::Len(SceneUniforms::SHADER_SIZE.get()),
            Some("SceneWindow::ubo"),
        )?;

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[ubo.bind_group_layout_entry(0, ShaderStages::VERTEX_FRAGMENT)],
            label: Some("SceneWindow::bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[ubo.bind_group_descriptor_entry(0)],
            label: Some("SceneWindow::bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            bind_group_layouts: &[&bind_group_layout],
            label: None,
            push_constant_ranges: &[],
        });

        let render_pipeline = _create_scene_render_pipeline(
            device,
            &shader,
            &pipeline_layout,
            *context.surface_format,
            sample_count,
        );

        let msaa_texture = (sample_count > 1).then(|| {
            GpuFrameTexture::new(
                device,
                &context.size,
                GpuFrameTextureDescriptor {
                    label: Some("SceneWindow::msaa_texture"),
                    format: *context.surface_format,
                    sample_count,
                },
            )
        });

        let depth_texture = GpuFrameTexture::new(
            device,
            &context.size,
            GpuFrameTextureDescriptor {
                label: Some("SceneWindow::depth_texture"),
                format: wgpu::TextureFormat::Depth32Float,
                sample_count,
            },
        );

        Ok(Self {
            z_near: tuning.z_near,
            z_far: tuning.z_far,
            fov: tuning.fov,

            ubo,
            bind_group,
            render_pipeline,

            msaa_texture,
            depth_texture,

            scene: None,
        })
    }

    /// Uploads `scene`, replacing (and freeing) whatever was attached before.
    pub fn attach_scene(&mut self, context: &WindowContext, scene: &SceneAsset) -> Result<()> {
        let data = SceneData::new(context.device, scene)?;

        self.release_scene();
        self.scene = data;

        Ok(())
    }

    pub fn release_scene(&mut self) {
        if let Some(scene) = self.scene.take() {
            scene.release();
        }
    }

    pub fn draw(
        &mut self,
        context: &WindowContext,
        texture: &wgpu::Texture,
        camera: &CameraState,
    ) -> Result<()> {
        let device = context.device;
        let queue = context.queue;

        let view_proj = Camera {
            movable: camera,
            z_near: self.z_near,
            z_far: self.z_far,
            fov: self.fov,
        }
        .view_projection_matrix(context.size);

        self.ubo.write(
            queue,
            SceneUniforms {
                view_proj,
                light_dir: LIGHT_DIRECTION.normalized(),
                ambient: AMBIENT,
            },
        )?;

        let output_final = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let output_msaa = self.msaa_texture.as_mut().map(|msaa_texture| {
            msaa_texture
                .create_texture(device, &context.size)
                .create_view(&wgpu::TextureViewDescriptor::default())
        });
        let output_depth = self
            .depth_texture
            .create_texture(device, &context.size)
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (view, resolve_target) = match &output_msaa {
            Some(output) => (output, Some(&output_final)),
            None => (&output_final, None),
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("command_encoder"),
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(_sky_color()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &output_depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                label: Some("SceneWindow::render_pass"),
                ..Default::default()
            });

            // Before the load finishes there's only sky.
            if let Some(scene) = &self.scene {
                rpass.set_pipeline(&self.render_pipeline);
                rpass.set_bind_group(0, &self.bind_group, &[]);
                rpass.set_vertex_buffer(0, scene.vertex_buf.buf.slice(..));
                rpass.set_index_buffer(scene.index_buf.buf.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..scene.index_count(), 0, 0..1);
            }
        }

        queue.submit([encoder.finish()]);
        Ok(())
    }
}

impl Drop for SceneWindow {
    fn drop(&mut self) {
        self.release_scene();
        self.ubo.destroy();
    }
}
