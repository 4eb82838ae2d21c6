//! Lifecycle of one walkthrough: mounting a renderer and an asset, routing
//! input, running frames, and tearing it all down again.

mod error;
mod listeners;
mod loader;
mod scheduler;

use std::time::Instant;

use ultraviolet::{UVec2, Vec3};
use walk_scene::{AssetRef, Bounds, SceneAsset};

pub use error::WalkError;
pub use listeners::{ListenerId, Listeners};
pub use loader::{AssetLoader, LoadPoll, LoadResult, PendingLoad, ThreadLoader};
pub use scheduler::FrameScheduler;

use crate::{
    cvars::Tuning,
    navigation::{consume_look, integrate, CameraState, InputState, InputUnifier, MotionParams},
    renderer::{system::SystemEvent, FrameRenderer, WindowRunnerError},
};

/// Nominal floor plan size, for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintHint {
    pub width: f32,
    pub length: f32,
}

#[derive(Debug, Clone)]
pub struct WalkthroughOptions {
    pub asset: AssetRef,
    pub footprint_hint: Option<FootprintHint>,
    /// Used instead of the middle of the floor plan once loaded.
    pub start_position: Option<Vec3>,
    pub start_yaw: Option<f32>,
}

impl WalkthroughOptions {
    pub fn new(asset: impl Into<AssetRef>) -> Self {
        Self {
            asset: asset.into(),
            footprint_hint: None,
            start_position: None,
            start_yaw: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Inactive,
    Loading,
    Ready,
    /// The asset failed; supplying another one recovers.
    Failed(String),
    /// The renderer failed; this mount is dead.
    Fatal(String),
}

/// What the host should do to its surface. The controller's own flag only
/// changes once the host reports back with [SystemEvent::FullscreenChanged].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenRequest {
    Enter,
    Exit,
}

/// Everything that exists only while an asset is mounted.
struct Mount<R> {
    renderer: R,
    options: WalkthroughOptions,
    unifier: InputUnifier,

    pending: Option<PendingLoad>,
    bounds: Option<Bounds>,
}

type LoadedCallback = Box<dyn FnMut(&SceneAsset)>;
type ErrorCallback = Box<dyn FnMut(&WalkError)>;
type InteractionCallback = Box<dyn FnMut()>;

/// [WalkthroughController] is the first-person walkthrough of one scene
/// asset.
///
/// The host feeds it [SystemEvent]s and calls [WalkthroughController::frame]
/// once per display refresh. Everything runs on the host's thread except the
/// asset parse, which the [AssetLoader] does elsewhere.
pub struct WalkthroughController<R: FrameRenderer, L: AssetLoader = ThreadLoader> {
    tuning: Tuning,
    scale_factor: f32,
    loader: L,

    mount: Option<Mount<R>>,

    camera: CameraState,
    input: InputState,
    listeners: Listeners,
    scheduler: FrameScheduler,

    status: LoadStatus,
    fullscreen: bool,
    interacted: bool,

    on_loaded: Option<LoadedCallback>,
    on_error: Option<ErrorCallback>,
    on_first_interaction: Option<InteractionCallback>,
}

impl<R: FrameRenderer> WalkthroughController<R, ThreadLoader> {
    pub fn new(tuning: Tuning) -> Self {
        Self::with_loader(tuning, ThreadLoader)
    }
}

impl<R: FrameRenderer, L: AssetLoader> WalkthroughController<R, L> {
    pub fn with_loader(tuning: Tuning, loader: L) -> Self {
        Self {
            scheduler: FrameScheduler::new(tuning.max_frame_dt),
            tuning,
            scale_factor: 1.,
            loader,

            mount: None,

            camera: CameraState::default(),
            input: InputState::default(),
            listeners: Listeners::default(),

            status: LoadStatus::Inactive,
            fullscreen: false,
            interacted: false,

            on_loaded: None,
            on_error: None,
            on_first_interaction: None,
        }
    }

    /// Physical pixels per logical pixel, for laying out the arrow pad.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
        if let Some(mount) = self.mount.as_mut() {
            mount.unifier.set_scale_factor(scale_factor);
        }
    }

    /// Called once per asset, after it is uploaded and ready to render.
    pub fn on_loaded(&mut self, callback: impl FnMut(&SceneAsset) + 'static) {
        self.on_loaded = Some(Box::new(callback));
    }

    /// Called once per failure after activation: load, upload or render.
    pub fn on_error(&mut self, callback: impl FnMut(&WalkError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Called the first time a drag or arrow press starts, then never again.
    pub fn on_first_interaction(&mut self, callback: impl FnMut() + 'static) {
        self.on_first_interaction = Some(Box::new(callback));
    }

    /// Mounts `options.asset`, tearing down whatever was mounted before.
    ///
    /// `setup` creates the renderer. If it fails the error is returned (not
    /// passed to `on_error`) and the controller stays inert.
    pub fn activate<S>(&mut self, options: WalkthroughOptions, setup: S) -> Result<(), WalkError>
    where
        S: FnOnce() -> Result<R, WindowRunnerError>,
    {
        self.deactivate();

        let renderer = match setup() {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to create the renderer: {}", e);
                self.status = LoadStatus::Fatal(e.to_string());
                return Err(WalkError::Fatal(e));
            }
        };

        let unifier = InputUnifier::new(&self.tuning, renderer.size(), self.scale_factor);

        self.camera = CameraState::new(
            Vec3::new(0., self.tuning.eye_height, 0.),
            options.start_yaw.unwrap_or(0.),
            0.,
        );
        self.input = InputState::default();

        self.listeners.attach_all();
        self.scheduler.start();

        log::info!("Mounting {}", options.asset.name());
        let pending = self.loader.begin(&options.asset);

        self.mount = Some(Mount {
            renderer,
            options,
            unifier,

            pending: Some(pending),
            bounds: None,
        });
        self.status = LoadStatus::Loading;

        Ok(())
    }

    /// Swapping the asset is a full remount: nothing of the old one survives.
    pub fn set_asset<S>(&mut self, options: WalkthroughOptions, setup: S) -> Result<(), WalkError>
    where
        S: FnOnce() -> Result<R, WindowRunnerError>,
    {
        self.activate(options, setup)
    }

    /// Stops the frame loop, detaches every listener, frees the scene and the
    /// renderer, and cancels any load still in flight.
    pub fn deactivate(&mut self) {
        self._teardown();
        self.status = LoadStatus::Inactive;
    }

    fn _teardown(&mut self) {
        self.scheduler.stop();

        let detached = self.listeners.detach_all();
        self.input.clear();

        if let Some(mut mount) = self.mount.take() {
            if mount.pending.is_some() {
                log::debug!("Cancelling load of {}", mount.options.asset.name());
            }
            mount.renderer.release_scene();
            log::info!(
                "Unmounted {} ({} listeners detached)",
                mount.options.asset.name(),
                detached
            );
        }
    }

    fn _fail(&mut self, error: WalkError) {
        log::error!("{}", error);

        self._teardown();
        self.status = if error.is_fatal() {
            LoadStatus::Fatal(error.to_string())
        } else {
            LoadStatus::Failed(error.to_string())
        };

        if let Some(on_error) = self.on_error.as_mut() {
            on_error(&error);
        }
    }

    pub fn handle_event(&mut self, event: &SystemEvent) {
        let kind = match event.kind() {
            Some(kind) => kind,
            None => {
                if let SystemEvent::FullscreenChanged { fullscreen } = event {
                    self.fullscreen = *fullscreen;
                }
                return;
            }
        };

        if !self.listeners.is_attached(kind) {
            return;
        }
        let Some(mount) = self.mount.as_mut() else {
            return;
        };

        if let SystemEvent::SizeChanged { width, height } = event {
            if let Err(e) = mount.renderer.resize(UVec2::new(*width, *height)) {
                self._fail(WalkError::Render(e));
                return;
            }
        }

        let response = mount.unifier.handle_event(&mut self.input, event);

        if response.interaction && !self.interacted {
            self.interacted = true;
            if let Some(on_first_interaction) = self.on_first_interaction.as_mut() {
                on_first_interaction();
            }
        }
    }

    /// Runs one frame: load poll, look, motion, draw. `now` is the host's
    /// refresh timestamp.
    pub fn frame(&mut self, now: Instant) {
        let Some(dt) = self.scheduler.tick(now) else {
            return;
        };

        self._poll_load();

        let Some(mount) = self.mount.as_mut() else {
            return;
        };

        consume_look(&mut self.camera, &mut self.input);
        integrate(
            &mut self.camera,
            self.input.moves(),
            dt.as_secs_f32(),
            mount.bounds.as_ref(),
            &MotionParams::from(&self.tuning),
        );

        if let Err(e) = mount.renderer.render(&self.camera) {
            self._fail(WalkError::Render(e));
        }
    }

    fn _poll_load(&mut self) {
        let Some(mount) = self.mount.as_mut() else {
            return;
        };
        let Some(pending) = mount.pending.as_mut() else {
            return;
        };

        let result = match pending.poll() {
            LoadPoll::Pending => return,
            LoadPoll::Done(result) => result,
        };
        mount.pending = None;

        let scene = match result {
            Ok(scene) => scene,
            Err(e) => return self._fail(e),
        };

        if let Err(error) = mount.renderer.attach_scene(&scene) {
            return self._fail(WalkError::SceneUpload {
                asset: scene.name.clone(),
                error,
            });
        }

        mount.bounds = scene.bounds(self.tuning.bounds_margin, self.tuning.eye_height);
        if let Some(hint) = mount.options.footprint_hint {
            _log_footprint_hint(&scene, hint);
        }

        self.camera.position = _start_position(
            &scene,
            &mount.options,
            mount.bounds.as_ref(),
            &self.tuning,
        );
        self.camera
            .set_orientation(mount.options.start_yaw.unwrap_or(0.), 0.);

        log::info!(
            "{} is ready, bounds {:?}, starting at {:?}",
            scene.name,
            mount.bounds,
            self.camera.position
        );
        self.status = LoadStatus::Ready;

        if let Some(on_loaded) = self.on_loaded.as_mut() {
            on_loaded(&scene);
        }
    }

    /// Back to the middle of the floor plan, level, facing -Z.
    pub fn reset(&mut self) {
        let bounds = self.mount.as_ref().and_then(|mount| mount.bounds.as_ref());
        self.camera.reset_to(bounds);
    }

    pub fn toggle_fullscreen(&self) -> FullscreenRequest {
        if self.fullscreen {
            FullscreenRequest::Exit
        } else {
            FullscreenRequest::Enter
        }
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Failed(message) | LoadStatus::Fatal(message) => Some(message),
            _ => None,
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn bounds(&self) -> Option<&Bounds> {
        self.mount.as_ref().and_then(|mount| mount.bounds.as_ref())
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.mount.as_ref().map(|mount| &mount.renderer)
    }

    /// The arrow pad's current layout, for hosts that draw it.
    pub fn joystick(&self) -> Option<&crate::navigation::VirtualJoystick> {
        self.mount.as_ref().map(|mount| mount.unifier.joystick())
    }
}

impl<R: FrameRenderer, L: AssetLoader> Drop for WalkthroughController<R, L> {
    fn drop(&mut self) {
        self._teardown();
    }
}

fn _start_position(
    scene: &SceneAsset,
    options: &WalkthroughOptions,
    bounds: Option<&Bounds>,
    tuning: &Tuning,
) -> Vec3 {
    let mut position = match (options.start_position, bounds) {
        (Some(start), Some(bounds)) => bounds.clamp(start),
        (Some(start), None) => start,
        (None, Some(bounds)) => bounds.center(),
        // A degenerate footprint still has a middle.
        (None, None) => scene
            .extent
            .map(|extent| extent.center())
            .unwrap_or_else(Vec3::zero),
    };

    position.y = tuning.eye_height;
    position
}

fn _log_footprint_hint(scene: &SceneAsset, hint: FootprintHint) {
    let Some(extent) = scene.extent else {
        log::warn!(
            "{} has no geometry, expected about {}x{}",
            scene.name,
            hint.width,
            hint.length
        );
        return;
    };

    let size = extent.size();
    log::info!(
        "{} measures {:.2}x{:.2}, hint was {:.2}x{:.2}",
        scene.name,
        size.x,
        size.z,
        hint.width,
        hint.length
    );
}

#[cfg(test)]
mod tests;
