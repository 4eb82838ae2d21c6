use std::{
    cell::RefCell,
    path::PathBuf,
    rc::Rc,
    sync::mpsc::Sender,
    time::{Duration, Instant},
};

use keycode::KeyMappingId;
use ultraviolet::{UVec2, Vec3};
use walk_scene::{Extent, MeshData, SceneError};

use super::*;
use crate::renderer::system::{SystemMod, SystemMouseButton};

#[derive(Debug, Default)]
struct RendererLog {
    alive: usize,
    created: usize,
    renders: usize,
    attached: usize,
    released: usize,
    resizes: Vec<UVec2>,
    fail_attach: bool,
}

struct FakeRenderer {
    size: UVec2,
    log: Rc<RefCell<RendererLog>>,
}

impl FakeRenderer {
    fn setup(log: &Rc<RefCell<RendererLog>>) -> impl FnOnce() -> Result<Self, WindowRunnerError> {
        let log = log.clone();
        move || {
            {
                let mut log = log.borrow_mut();
                log.alive += 1;
                log.created += 1;
            }
            Ok(FakeRenderer {
                size: UVec2::new(800, 600),
                log,
            })
        }
    }
}

impl Drop for FakeRenderer {
    fn drop(&mut self) {
        self.log.borrow_mut().alive -= 1;
    }
}

impl FrameRenderer for FakeRenderer {
    fn size(&self) -> UVec2 {
        self.size
    }

    fn resize(&mut self, size: UVec2) -> Result<(), WindowRunnerError> {
        self.size = size;
        self.log.borrow_mut().resizes.push(size);
        Ok(())
    }

    fn attach_scene(&mut self, _scene: &SceneAsset) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_attach {
            return Err(anyhow::anyhow!("out of buffer space"));
        }
        log.attached += 1;
        Ok(())
    }

    fn release_scene(&mut self) {
        self.log.borrow_mut().released += 1;
    }

    fn render(&mut self, _camera: &CameraState) -> Result<(), WindowRunnerError> {
        self.log.borrow_mut().renders += 1;
        Ok(())
    }
}

/// Hands every load to the test, which completes it by hand.
#[derive(Clone, Default)]
struct ManualLoader {
    loads: Rc<RefCell<Vec<(String, Sender<LoadResult>)>>>,
}

impl ManualLoader {
    fn complete(&self, index: usize, result: LoadResult) -> bool {
        self.loads.borrow()[index].1.send(result).is_ok()
    }
}

impl AssetLoader for ManualLoader {
    fn begin(&mut self, asset: &AssetRef) -> PendingLoad {
        let (tx, pending) = PendingLoad::channel(asset);
        self.loads.borrow_mut().push((asset.name(), tx));
        pending
    }
}

/// Floor from (1.5, 0.5) to (8.5, 7.5): bounds (2, 8, 1, 7) after the margin.
fn floor_scene() -> SceneAsset {
    let positions = vec![
        Vec3::new(1.5, 0., 0.5),
        Vec3::new(8.5, 0., 0.5),
        Vec3::new(8.5, 0., 7.5),
        Vec3::new(1.5, 0., 7.5),
    ];
    let extent = Extent::from_points(positions.iter().copied());

    SceneAsset {
        name: "floor".to_string(),
        meshes: vec![MeshData {
            name: "floor".to_string(),
            positions,
            normals: vec![Vec3::unit_y(); 4],
            indices: vec![0, 2, 1, 0, 3, 2],
            base_color: [1.; 4],
            cast_shadows: true,
            receive_shadows: true,
        }],
        extent,
    }
}

fn options(name: &str) -> WalkthroughOptions {
    WalkthroughOptions::new(PathBuf::from(name))
}

type Controller = WalkthroughController<FakeRenderer, ManualLoader>;

struct Harness {
    controller: Controller,
    loader: ManualLoader,
    log: Rc<RefCell<RendererLog>>,
    loaded: Rc<RefCell<usize>>,
    errors: Rc<RefCell<Vec<String>>>,
    interactions: Rc<RefCell<usize>>,
    now: Instant,
}

impl Harness {
    fn new() -> Self {
        let loader = ManualLoader::default();
        let mut controller = Controller::with_loader(Tuning::default(), loader.clone());

        let loaded = Rc::new(RefCell::new(0));
        let errors = Rc::new(RefCell::new(Vec::new()));
        let interactions = Rc::new(RefCell::new(0));

        {
            let loaded = loaded.clone();
            controller.on_loaded(move |_| *loaded.borrow_mut() += 1);
        }
        {
            let errors = errors.clone();
            controller.on_error(move |e| errors.borrow_mut().push(e.to_string()));
        }
        {
            let interactions = interactions.clone();
            controller.on_first_interaction(move || *interactions.borrow_mut() += 1);
        }

        Self {
            controller,
            loader,
            log: Rc::new(RefCell::new(RendererLog::default())),
            loaded,
            errors,
            interactions,
            now: Instant::now(),
        }
    }

    fn activate(&mut self, name: &str) {
        self.activate_with(options(name));
    }

    fn activate_with(&mut self, options: WalkthroughOptions) {
        let setup = FakeRenderer::setup(&self.log);
        self.controller.activate(options, setup).unwrap();
    }

    fn frame(&mut self) {
        self.now += Duration::from_millis(16);
        self.controller.frame(self.now);
    }

    fn load(&mut self, index: usize, result: LoadResult) {
        assert!(self.loader.complete(index, result));
        self.frame();
    }

    fn key(&mut self, keycode: KeyMappingId, down: bool) {
        let mods = SystemMod::empty();
        let event = if down {
            SystemEvent::KeyDown { keycode, mods }
        } else {
            SystemEvent::KeyUp { keycode, mods }
        };
        self.controller.handle_event(&event);
    }
}

#[test]
fn activation_starts_everything() {
    let mut harness = Harness::new();

    harness.activate("a.glb");

    assert!(harness.controller.is_loading());
    assert!(harness.controller.is_running());
    assert_eq!(
        harness.controller.listeners().len(),
        crate::renderer::system::SystemEventKind::ALL.len()
    );
    assert_eq!(harness.loader.loads.borrow().len(), 1);

    // Before the load lands, frames still draw (just sky).
    harness.frame();
    harness.frame();
    assert_eq!(harness.log.borrow().renders, 2);
}

#[test]
fn remount_leaves_exactly_one_of_everything() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.frame();
    harness.controller.deactivate();

    assert!(!harness.controller.is_running());
    assert!(harness.controller.listeners().is_empty());
    assert_eq!(harness.log.borrow().alive, 0);

    harness.activate("b.glb");
    // Swapping without deactivating first is the same full teardown.
    harness.activate("c.glb");

    assert_eq!(
        harness.controller.listeners().len(),
        crate::renderer::system::SystemEventKind::ALL.len()
    );
    assert_eq!(harness.log.borrow().alive, 1);
    assert_eq!(harness.log.borrow().created, 3);

    let before = harness.log.borrow().renders;
    harness.frame();
    assert_eq!(harness.log.borrow().renders, before + 1);
}

#[test]
fn stale_loads_are_discarded() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.activate("b.glb");

    // Nobody is listening for the first load any more.
    assert!(!harness.loader.complete(0, Ok(floor_scene())));

    harness.frame();
    assert!(harness.controller.is_loading());
    assert_eq!(*harness.loaded.borrow(), 0);

    harness.load(1, Ok(floor_scene()));
    assert_eq!(*harness.loaded.borrow(), 1);
    assert_eq!(harness.log.borrow().attached, 1);
}

#[test]
fn load_failure_goes_inert() {
    let mut harness = Harness::new();

    harness.activate("broken.glb");
    harness.load(0, Err(SceneError::MissingScene("broken.glb".to_string())));

    assert_eq!(harness.errors.borrow().len(), 1);
    assert_eq!(*harness.loaded.borrow(), 0);
    assert!(!harness.controller.is_running());
    assert!(harness.controller.listeners().is_empty());
    assert_eq!(harness.log.borrow().alive, 0);

    assert!(matches!(harness.controller.status(), LoadStatus::Failed(_)));
    assert!(!harness.controller.is_loading());
    assert!(harness
        .controller
        .error_message()
        .is_some_and(|message| message.contains("broken.glb")));

    // Nothing runs, nothing is reported again.
    let renders = harness.log.borrow().renders;
    for _ in 0..10 {
        harness.frame();
    }
    harness.key(KeyMappingId::UsW, true);

    assert_eq!(harness.log.borrow().renders, renders);
    assert_eq!(harness.errors.borrow().len(), 1);

    // A different asset recovers.
    harness.activate("good.glb");
    harness.load(1, Ok(floor_scene()));
    assert_eq!(harness.controller.status(), &LoadStatus::Ready);
}

#[test]
fn vanished_loader_is_a_failure() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.loader.loads.borrow_mut().clear();
    harness.frame();

    assert_eq!(harness.errors.borrow().len(), 1);
    assert!(!harness.controller.is_running());
}

#[test]
fn upload_failure_goes_inert() {
    let mut harness = Harness::new();
    harness.log.borrow_mut().fail_attach = true;

    harness.activate("a.glb");
    harness.load(0, Ok(floor_scene()));

    assert_eq!(harness.errors.borrow().len(), 1);
    assert!(harness.errors.borrow()[0].contains("out of buffer space"));
    assert_eq!(*harness.loaded.borrow(), 0);
    assert!(matches!(harness.controller.status(), LoadStatus::Failed(_)));
}

#[test]
fn fatal_setup_is_returned_once() {
    let mut harness = Harness::new();

    let result = harness
        .controller
        .activate(options("a.glb"), || Err(WindowRunnerError::NoSuitableAdapter));

    assert!(matches!(result, Err(WalkError::Fatal(_))));
    assert!(harness.errors.borrow().is_empty());
    assert!(matches!(harness.controller.status(), LoadStatus::Fatal(_)));
    assert!(!harness.controller.is_running());
    assert!(harness.controller.listeners().is_empty());
    assert!(harness.loader.loads.borrow().is_empty());
}

#[test]
fn loaded_scene_starts_in_the_middle() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.load(0, Ok(floor_scene()));

    assert_eq!(*harness.loaded.borrow(), 1);
    assert_eq!(harness.controller.camera().position, Vec3::new(5., 1.6, 4.));
    assert_eq!(
        harness.controller.bounds(),
        Some(&Bounds::new(2., 8., 1., 7., 1.6).unwrap())
    );

    // Later frames don't report the load again.
    harness.frame();
    assert_eq!(*harness.loaded.borrow(), 1);
}

#[test]
fn explicit_start_wins() {
    let mut harness = Harness::new();

    let mut options = options("a.glb");
    options.start_position = Some(Vec3::new(3., 0., 2.));
    options.start_yaw = Some(1.);
    options.footprint_hint = Some(FootprintHint {
        width: 7.,
        length: 7.,
    });
    harness.activate_with(options);
    harness.load(0, Ok(floor_scene()));

    let camera = harness.controller.camera();
    assert_eq!(camera.position, Vec3::new(3., 1.6, 2.));
    assert_eq!(camera.yaw(), 1.);
    assert_eq!(camera.pitch(), 0.);
}

#[test]
fn walking_stays_inside_and_first_step_is_still() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.load(0, Ok(floor_scene()));

    harness.key(KeyMappingId::UsW, true);
    harness.key(KeyMappingId::ArrowRight, true);
    for _ in 0..600 {
        harness.frame();
    }

    let position = harness.controller.camera().position;
    assert!(harness.controller.bounds().unwrap().has_point(position));
    assert_eq!(position, Vec3::new(8., 1.6, 1.));

    harness.key(KeyMappingId::UsW, false);
    harness.key(KeyMappingId::ArrowRight, false);
    harness.frame();
    assert_eq!(harness.controller.camera().position, position);
}

#[test]
fn zero_step_after_restart() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.key(KeyMappingId::UsS, true);

    // First tick after start is zero-length, whatever the timestamp.
    harness.now += Duration::from_secs(5);
    harness.controller.frame(harness.now);
    assert_eq!(harness.controller.camera().position, Vec3::new(0., 1.6, 0.));

    harness.frame();
    assert!(harness.controller.camera().position.z > 0.);
}

#[test]
fn reset_returns_to_the_middle() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.load(0, Ok(floor_scene()));

    // Walk to the far corner, then look around.
    harness.key(KeyMappingId::UsD, true);
    harness.key(KeyMappingId::UsW, true);
    for _ in 0..200 {
        harness.frame();
    }
    harness.controller.handle_event(&SystemEvent::MouseButtonDown {
        mouse_btn: SystemMouseButton::Left,
        x: 10.,
        y: 10.,
    });
    harness
        .controller
        .handle_event(&SystemEvent::MouseMotion { x: 60., y: 40. });
    harness.key(KeyMappingId::UsD, false);
    harness.key(KeyMappingId::UsW, false);
    harness.frame();

    let camera = harness.controller.camera();
    assert_ne!(camera.yaw(), 0.);
    assert_ne!(camera.pitch(), 0.);

    harness.controller.reset();

    let camera = harness.controller.camera();
    assert_eq!(camera.position, Vec3::new(5., 1.6, 4.));
    assert_eq!(camera.yaw(), 0.);
    assert_eq!(camera.pitch(), 0.);
}

#[test]
fn resize_reaches_the_renderer() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    let position = harness.controller.camera().position;

    harness.controller.handle_event(&SystemEvent::SizeChanged {
        width: 1024,
        height: 768,
    });

    assert_eq!(harness.log.borrow().resizes, vec![UVec2::new(1024, 768)]);
    assert_eq!(
        harness.controller.renderer().map(|renderer| renderer.size()),
        Some(UVec2::new(1024, 768))
    );
    assert_eq!(harness.controller.camera().position, position);
}

#[test]
fn density_change_reaches_the_mounted_pad() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.controller.set_scale_factor(2.);
    harness.controller.handle_event(&SystemEvent::SizeChanged {
        width: 800,
        height: 600,
    });

    let joystick = harness.controller.joystick().unwrap();
    let (direction, rect) = *joystick.buttons().next().unwrap();
    assert_eq!(direction, crate::navigation::MoveDirection::Forward);
    assert_eq!(rect.max.x - rect.min.x, 112.);
}

#[test]
fn focus_loss_stops_touch_look() {
    let mut harness = Harness::new();

    harness.activate("a.glb");
    harness.load(0, Ok(floor_scene()));

    harness.controller.handle_event(&SystemEvent::TouchStart {
        id: 7,
        x: 700.,
        y: 300.,
    });
    harness.controller.handle_event(&SystemEvent::FocusLost);
    harness.controller.handle_event(&SystemEvent::TouchMove {
        id: 7,
        x: 800.,
        y: 300.,
    });
    harness.frame();

    assert_eq!(harness.controller.camera().yaw(), 0.);
}

#[test]
fn fullscreen_follows_the_platform() {
    let mut harness = Harness::new();
    harness.activate("a.glb");

    assert_eq!(
        harness.controller.toggle_fullscreen(),
        FullscreenRequest::Enter
    );
    // Asking doesn't change anything by itself.
    assert!(!harness.controller.is_fullscreen());

    harness
        .controller
        .handle_event(&SystemEvent::FullscreenChanged { fullscreen: true });
    assert!(harness.controller.is_fullscreen());
    assert_eq!(harness.controller.toggle_fullscreen(), FullscreenRequest::Exit);

    // The platform can leave on its own.
    harness
        .controller
        .handle_event(&SystemEvent::FullscreenChanged { fullscreen: false });
    assert!(!harness.controller.is_fullscreen());
}

#[test]
fn first_interaction_fires_once() {
    let mut harness = Harness::new();
    harness.activate("a.glb");

    for _ in 0..3 {
        harness.controller.handle_event(&SystemEvent::MouseButtonDown {
            mouse_btn: SystemMouseButton::Left,
            x: 0.,
            y: 0.,
        });
        harness.controller.handle_event(&SystemEvent::MouseButtonUp {
            mouse_btn: SystemMouseButton::Left,
        });
    }
    harness.controller.handle_event(&SystemEvent::JoystickButton {
        direction: crate::navigation::MoveDirection::Forward,
        pressed: true,
    });

    // Not even across a remount.
    harness.activate("b.glb");
    harness.controller.handle_event(&SystemEvent::MouseButtonDown {
        mouse_btn: SystemMouseButton::Left,
        x: 0.,
        y: 0.,
    });

    assert_eq!(*harness.interactions.borrow(), 1);
}

#[test]
fn dropping_the_controller_releases_the_renderer() {
    let mut harness = Harness::new();
    harness.activate("a.glb");
    harness.load(0, Ok(floor_scene()));

    let log = harness.log.clone();
    drop(harness);

    assert_eq!(log.borrow().alive, 0);
    assert_eq!(log.borrow().released, 1);
}
