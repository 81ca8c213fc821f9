//! # Scene
//!
//! This crate contains everything the renderer knows about the view it traces: the camera,
//! the user configuration and the parameter block handed to the trace kernel.
//!
//! ## Modules
//!
//! - `camera`: The `Camera` with its orthonormal basis and frustum extents, the `Projection`
//!   that tracks the framebuffer aspect ratio and the `OrbitRig` that places the camera.
//! - `config`: Loads the TOML configuration file.
//! - `structs`: Contains `TraceParams`, the GPU compatible per-frame kernel inputs.
//!
//! ## Usage
//!
//! ```
//! use scene::{Camera, Config, OrbitRig, TraceParams};
//!
//! let config = Config::default();
//! let mut camera = Camera::new();
//! let rig = OrbitRig {
//!     target: config.camera.look_at.into(),
//!     up: config.camera.up.into(),
//!     radius: config.camera.orbit_radius,
//!     height: config.camera.orbit_height,
//! };
//! rig.aim(&mut camera, config.camera.rotation);
//!
//! let params = TraceParams::new(camera.position(), &camera.corner_rays(), 0.0, 0.0, 1, 1, 0);
//! assert_eq!(params.sample_count, 1);
//! ```
mod config;
mod structs;
mod camera;

pub use config::{Config, WindowConfig, CameraConfig, RenderConfig, DispatchRounding, SAMPLES_RANGE, BOUNCES_RANGE};
pub use structs::TraceParams;
pub use camera::{Camera, CornerRays, OrbitRig, Projection};
