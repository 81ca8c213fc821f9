//! # Raytracing lib
//!
//! Interactive progressive ray tracer. Every frame a compute kernel traces new samples and
//! blends them into a running mean of all frames since the last change, then a full-screen
//! quad shows the result.
//!
//! ## Modules
//!
//! - `interaction`: Turns input events into orbit angle, sample and bounce counts, and a reset signal.
//! - `accumulation`: Frame counter and blend weight of the running mean.
//! - `dispatch`: Sizes the compute grid from the framebuffer and the kernel's work-group size.
//! - `frame`: Per-tick orchestration against a `FrameTarget`.
//! - `state`: The wgpu `FrameTarget`.
use std::path::Path;
use std::sync::Arc;

use winit::{event::*, event_loop::{ControlFlow, EventLoop}, keyboard::PhysicalKey, window::WindowBuilder};

use scene::Config;

pub mod accumulation;
pub mod dispatch;
pub mod frame;
pub mod interaction;
mod error;
mod helper;
mod state;

pub use error::InitError;
pub use frame::{FrameOrchestrator, FramePlan, FrameTarget};
pub use interaction::InputEvent;
pub use state::State;

/// Config file used when `run` gets no path.
pub const DEFAULT_CONFIG_PATH: &str = "res/config.toml";

const CONTROLS: &str = "Controls:
  drag with left mouse button   orbit the camera
  1 - 9                         samples per frame
  keypad + / Page Up            more bounces
  keypad - / Page Down          fewer bounces
  Esc                           quit";

/// Loads `config_path`, or the default config file when it exists, or the built-in defaults.
pub fn load_config(config_path: Option<&str>) -> Result<Config, InitError> {
    match config_path {
        Some(path) => {
            log::info!("Using config file: {}", path);
            Config::new(path).map_err(InitError::Config)
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            log::info!("Using config file: {}", DEFAULT_CONFIG_PATH);
            Config::new(DEFAULT_CONFIG_PATH).map_err(InitError::Config)
        }
        None => {
            log::info!("Using default config");
            Ok(Config::default())
        }
    }
}

/// Translates a window event into the renderer's input events.
pub fn translate_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
        // Commands fire on release
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Released,
                    ..
                },
            ..
        } => InputEvent::from_key(*code),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::CursorMoved(position.x as f32)),
        WindowEvent::MouseInput {
            button: MouseButton::Left,
            state,
            ..
        } => Some(match state {
            ElementState::Pressed => InputEvent::DragStart,
            ElementState::Released => InputEvent::DragEnd,
        }),
        WindowEvent::Resized(size) => Some(InputEvent::Resized { width: size.width, height: size.height }),
        _ => None,
    }
}

/// Starts the application.
///
/// Initializes the logger (default level `info`, override with `RUST_LOG`), loads the
/// configuration, creates the window and the GPU state, then runs the event loop until a
/// close is requested.
///
/// Window events are buffered and handed to the `FrameOrchestrator` once per redraw.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the window, the GPU or the shaders
/// can't be set up. Running out of GPU memory ends the loop early but isn't an error.
pub async fn run(config_path: Option<String>) -> anyhow::Result<()> {
    // Ignore a logger that's already installed
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let userconfig = load_config(config_path.as_deref())?;
    log::info!("{}", CONTROLS);

    let event_loop = EventLoop::new().map_err(InitError::from)?;
    let window = WindowBuilder::new()
        .with_title(userconfig.window.title.as_str())
        .with_inner_size(winit::dpi::PhysicalSize::new(userconfig.window.width, userconfig.window.height))
        .build(&event_loop)
        .map_err(InitError::from)?;
    let window = Arc::new(window);

    // ControlFlow::Poll continuously runs the event loop,
    // even if the OS hasn't dispatched any events.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut state = State::new(window.clone(), &userconfig).await?;
    let size = window.inner_size();
    let mut frames = FrameOrchestrator::new(&userconfig, size.width, size.height, state.workgroup_size());
    let mut pending: Vec<InputEvent> = Vec::new();

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == state.window().id() => {
                if let Some(input) = translate_event(event) {
                    pending.push(input);
                }
                if let WindowEvent::RedrawRequested = event {
                    match frames.tick(pending.drain(..), instant::Instant::now(), &mut state) {
                        Ok(()) => {}
                        // Reconfigure the surface if it's lost or outdated
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.reconfigure(),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("GPU out of memory, stopping");
                            elwt.exit();
                        }
                        // We're ignoring timeouts
                        Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
                    }
                    if frames.should_stop() {
                        elwt.exit();
                    }
                }
            }
            // Request a redraw before the system goes to idle
            Event::AboutToWait => state.window().request_redraw(),
            _ => (),
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_missing_file() {
        let config = load_config(Some("does/not/exist.toml"));
        assert!(matches!(config, Err(InitError::Config(_))));
    }

    #[test]
    fn test_load_shipped_config() {
        let config = load_config(Some("../res/config.toml")).expect("shipped config should load");
        assert_eq!(config.render.samples_per_frame, 1);
    }

    #[test]
    fn test_load_default_config() {
        // Tests run in the crate directory, where no res/config.toml exists
        let config = load_config(None).expect("defaults should load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_translate_window_events() {
        assert_eq!(translate_event(&WindowEvent::CloseRequested), Some(InputEvent::CloseRequested));
        assert_eq!(
            translate_event(&WindowEvent::Resized(winit::dpi::PhysicalSize::new(640, 480))),
            Some(InputEvent::Resized { width: 640, height: 480 })
        );
        assert_eq!(translate_event(&WindowEvent::RedrawRequested), None);
        assert_eq!(translate_event(&WindowEvent::Focused(true)), None);
    }
}
