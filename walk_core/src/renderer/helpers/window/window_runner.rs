use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use thiserror::Error;
use ultraviolet::UVec2;
use walk_scene::SceneAsset;
use wgpu::{Backends, Gles3MinorVersion, Instance, InstanceDescriptor, InstanceFlags};

use super::WindowContext;
use crate::{
    cvars::Tuning,
    navigation::CameraState,
    renderer::{FrameRenderer, SceneWindow},
};

/// [WindowRunner] owns the whole GPU context of one mounted walkthrough: the
/// surface, device and queue, and the [SceneWindow] drawing into them.
pub struct WindowRunner {
    window: SceneWindow,

    size: UVec2,

    surface: wgpu::Surface<'static>,
    surface_format: wgpu::TextureFormat,
    present_mode: wgpu::PresentMode,

    device: wgpu::Device,
    queue: wgpu::Queue,
}

#[derive(Debug, Error)]
pub enum WindowRunnerError {
    #[error("window handle is unavailable: {0}")]
    HandleError(#[from] raw_window_handle::HandleError),

    #[error("failed to create surface: {0}")]
    CreateSurfaceError(#[from] wgpu::CreateSurfaceError),
    #[error("failed to request device: {0}")]
    RequestDeviceError(#[from] wgpu::RequestDeviceError),
    #[error("surface error: {0}")]
    SurfaceError(#[from] wgpu::SurfaceError),
    #[error("window setup failed: {0:#}")]
    WindowError(anyhow::Error),

    #[error("window has no drawable area")]
    InvalidWindowDimensions,

    #[error("no suitable graphics adapter")]
    NoSuitableAdapter,
    #[error("surface supports no texture formats")]
    NoSurfaceFormat,
}

fn _present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

fn _create_surface_information(
    surface_format: wgpu::TextureFormat,
    present_mode: wgpu::PresentMode,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width,
        height,
        present_mode,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: Vec::default(),
        desired_maximum_frame_latency: 2,
    }
}

impl WindowRunner {
    /// # Safety
    ///
    /// `system_window` must outlive the returned runner. The surface keeps
    /// raw handles to it, so the host can still borrow the window mutably
    /// (e.g. to switch it to fullscreen) while the runner is alive.
    pub async unsafe fn from_system_window<SW>(
        system_window: &SW,
        drawable_size: UVec2,
        tuning: &Tuning,
    ) -> Result<Self, WindowRunnerError>
    where
        SW: HasWindowHandle + HasDisplayHandle,
    {
        let (width, height) = (drawable_size.x, drawable_size.y);
        if width == 0 || height == 0 {
            return Err(WindowRunnerError::InvalidWindowDimensions);
        }

        let instance = Instance::new(InstanceDescriptor {
            backends: Backends::PRIMARY,
            flags: InstanceFlags::empty(),
            dx12_shader_compiler: Default::default(),
            gles_minor_version: Gles3MinorVersion::Automatic,
        });

        let surface = instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
            raw_window_handle: system_window.window_handle()?.into(),
            raw_display_handle: system_window.display_handle()?.into(),
        })?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(WindowRunnerError::NoSuitableAdapter)?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    ..Default::default()
                },
                None,
            )
            .await?;

        // Create swap chain.

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(WindowRunnerError::NoSurfaceFormat)?;
        let present_mode = _present_mode(tuning.vsync);

        surface.configure(
            &device,
            &_create_surface_information(surface_format, present_mode, width, height),
        );

        let window_context = WindowContext {
            device: &device,
            queue: &queue,
            surface_format: &surface_format,
            size: drawable_size,
        };

        let window =
            SceneWindow::new(&window_context, tuning).map_err(WindowRunnerError::WindowError)?;

        Ok(WindowRunner {
            window,

            size: drawable_size,

            surface,
            surface_format,
            present_mode,

            device,
            queue,
        })
    }

    fn _configure(&self) {
        self.surface.configure(
            &self.device,
            &_create_surface_information(
                self.surface_format,
                self.present_mode,
                self.size.x,
                self.size.y,
            ),
        );
    }
}

impl FrameRenderer for WindowRunner {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn resize(&mut self, size: UVec2) -> Result<(), WindowRunnerError> {
        // Minimized windows report zero; keep the last real size.
        if size.x == 0 || size.y == 0 {
            return Ok(());
        }

        self.size = size;
        self._configure();

        Ok(())
    }

    fn attach_scene(&mut self, scene: &SceneAsset) -> anyhow::Result<()> {
        let window_context = WindowContext {
            device: &self.device,
            queue: &self.queue,
            surface_format: &self.surface_format,
            size: self.size,
        };

        self.window.attach_scene(&window_context, scene)
    }

    fn release_scene(&mut self) {
        self.window.release_scene();
    }

    fn render(&mut self, camera: &CameraState) -> Result<(), WindowRunnerError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring and skipping a frame.");
                self._configure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Timed out waiting for the swapchain, skipping a frame.");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let window_context = WindowContext {
            device: &self.device,
            queue: &self.queue,
            surface_format: &self.surface_format,
            size: self.size,
        };

        self.window
            .draw(&window_context, &frame.texture, camera)
            .map_err(WindowRunnerError::WindowError)?;

        frame.present();
        Ok(())
    }
}
