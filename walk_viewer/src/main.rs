extern crate pollster;
extern crate sdl2;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use sdl2::{event::Event, keyboard::Scancode, video::FullscreenType, video::Window};
use ultraviolet::{UVec2, Vec3};

use walk_core::cvars::{apply_json_overrides, default_cvars, set_cvar, Tuning};
use walk_core::renderer::system::SystemEvent;
use walk_core::renderer::WindowRunner;
use walk_core::walkthrough::{
    FootprintHint, FullscreenRequest, LoadStatus, WalkError, WalkthroughController,
    WalkthroughOptions,
};

mod sdl2_system;

use sdl2_system::{scale_factor, ToSystemEventExt};

const USAGE: &str = "usage: walk-viewer <scene.glb|scene.gltf> [--start x,y,z] [--yaw radians] \
                     [--hint WIDTHxLENGTH] [--set name=value]... [--config overrides.json]";

const TITLE: &str = "Walkthrough";

struct Args {
    options: WalkthroughOptions,
    overrides: Vec<String>,
    config: Option<PathBuf>,
}

fn _parse_floats<const N: usize>(value: &str, separator: char) -> Result<[f32; N]> {
    let parts = value
        .split(separator)
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid number in {:?}", value))?;

    parts
        .try_into()
        .map_err(|_| anyhow!("Expected {} values separated by {:?}, got {:?}", N, separator, value))
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut model = None;
    let mut start_position = None;
    let mut start_yaw = None;
    let mut footprint_hint = None;
    let mut overrides = Vec::new();
    let mut config = None;

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| anyhow!("{} needs a value\n{}", flag, USAGE))
        };

        match arg.as_str() {
            "--start" => {
                let [x, y, z] = _parse_floats::<3>(&value("--start")?, ',')?;
                start_position = Some(Vec3::new(x, y, z));
            }
            "--yaw" => {
                let yaw = value("--yaw")?;
                start_yaw = Some(
                    yaw.parse::<f32>()
                        .with_context(|| format!("Invalid yaw {:?}", yaw))?,
                );
            }
            "--hint" => {
                let [width, length] = _parse_floats::<2>(&value("--hint")?, 'x')?;
                footprint_hint = Some(FootprintHint { width, length });
            }
            "--set" => overrides.push(value("--set")?),
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "-h" | "--help" => bail!("{}", USAGE),
            flag if flag.starts_with("--") => bail!("Unknown option {}\n{}", flag, USAGE),
            _ if model.is_none() => model = Some(PathBuf::from(&arg)),
            _ => bail!("Only one scene can be walked at a time\n{}", USAGE),
        }
    }

    let model = model.ok_or_else(|| anyhow!("{}", USAGE))?;

    let mut options = WalkthroughOptions::new(model);
    options.start_position = start_position;
    options.start_yaw = start_yaw;
    options.footprint_hint = footprint_hint;

    Ok(Args {
        options,
        overrides,
        config,
    })
}

fn load_tuning(args: &Args) -> Result<Tuning> {
    let mut cvars = default_cvars();

    if let Some(path) = &args.config {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        apply_json_overrides(&mut cvars, &json)?;
    }

    // The command line wins over the config file.
    for assignment in &args.overrides {
        set_cvar(&mut cvars, assignment)?;
    }

    Tuning::from_cvars(&cvars)
}

fn drawable_size(sdl_window: &Window) -> UVec2 {
    let (x, y) = sdl_window.drawable_size();
    UVec2 { x, y }
}

fn mount(
    controller: &mut WalkthroughController<WindowRunner>,
    sdl_window: &Window,
    options: WalkthroughOptions,
    tuning: &Tuning,
) -> Result<(), WalkError> {
    controller.activate(options, || {
        // SAFETY: the window outlives the controller, see main.
        unsafe {
            pollster::block_on(WindowRunner::from_system_window(
                sdl_window,
                drawable_size(sdl_window),
                tuning,
            ))
        }
    })
}

fn status_title(status: &LoadStatus) -> String {
    match status {
        LoadStatus::Inactive => TITLE.to_string(),
        LoadStatus::Loading => format!("{} (loading...)", TITLE),
        LoadStatus::Ready => TITLE.to_string(),
        LoadStatus::Failed(message) | LoadStatus::Fatal(message) => {
            format!("{} (error: {})", TITLE, message)
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args(std::env::args().skip(1))?;
    let tuning = load_tuning(&args)?;

    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut sdl_window = sdl
        .video()
        .map_err(|e| anyhow!(e))?
        .window(TITLE, 1280, 720)
        .position_centered()
        .resizable()
        .allow_highdpi()
        .metal_view()
        .build()?;

    // Declared after the window so it is dropped first; the surface holds raw
    // handles to the window.
    let mut controller: WalkthroughController<WindowRunner> =
        WalkthroughController::new(tuning.clone());
    controller.set_scale_factor(scale_factor(&sdl_window));

    controller.on_loaded(|scene| {
        log::info!(
            "Loaded {} ({} meshes, {} triangles)",
            scene.name,
            scene.meshes.len(),
            scene.meshes.iter().map(|mesh| mesh.triangle_count()).sum::<usize>()
        );
    });
    controller.on_error(|e| log::error!("{}", e));
    controller.on_first_interaction(|| log::debug!("First interaction"));

    mount(&mut controller, &sdl_window, args.options, &tuning)?;

    let mut title_status = None;

    let mut event_pump = sdl.event_pump().map_err(|e| anyhow!(e))?;
    'running: loop {
        // Step 1: Handle events.
        for event in event_pump.poll_iter() {
            match &event {
                Event::Quit { .. } => break 'running,
                Event::KeyDown {
                    scancode: Some(scancode),
                    repeat: false,
                    ..
                } => match scancode {
                    Scancode::F => {
                        let fullscreen = match controller.toggle_fullscreen() {
                            FullscreenRequest::Enter => FullscreenType::Desktop,
                            FullscreenRequest::Exit => FullscreenType::Off,
                        };
                        if let Err(e) = sdl_window.set_fullscreen(fullscreen) {
                            log::warn!("Failed to change fullscreen mode: {}", e);
                        }
                    }
                    Scancode::Escape if controller.is_fullscreen() => {
                        if let Err(e) = sdl_window.set_fullscreen(FullscreenType::Off) {
                            log::warn!("Failed to leave fullscreen: {}", e);
                        }
                    }
                    Scancode::R => controller.reset(),
                    _ => {}
                },
                Event::DropFile { filename, .. } => {
                    log::info!("Switching to {}", filename);
                    let options = WalkthroughOptions::new(PathBuf::from(filename));
                    mount(&mut controller, &sdl_window, options, &tuning)?;
                    continue;
                }
                _ => {}
            }

            if let Some(system_event) = event.to_system_event(&sdl_window) {
                // The window may have moved to a display with another density.
                if let SystemEvent::SizeChanged { .. } = system_event {
                    controller.set_scale_factor(scale_factor(&sdl_window));
                }
                controller.handle_event(&system_event);
            }
        }

        // SDL has no fullscreen event; compare against what we told the
        // controller last.
        let fullscreen = sdl_window.fullscreen_state() != FullscreenType::Off;
        if fullscreen != controller.is_fullscreen() {
            controller.handle_event(&SystemEvent::FullscreenChanged { fullscreen });
            controller.set_scale_factor(scale_factor(&sdl_window));
        }

        // Step 2: Walk and draw.
        controller.frame(Instant::now());

        if title_status.as_ref() != Some(controller.status()) {
            title_status = Some(controller.status().clone());
            if let Err(e) = sdl_window.set_title(&status_title(controller.status())) {
                log::warn!("Failed to set window title: {}", e);
            }
        }

        // Presenting blocks on vsync while running; otherwise don't spin.
        if !controller.is_running() {
            std::thread::sleep(Duration::from_millis(16));
        }
    }

    Ok(())
}
