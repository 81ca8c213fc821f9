use std::fs;
use std::ops::RangeInclusive;
use serde::Deserialize;
use toml;

/// Valid samples-per-frame counts.
pub const SAMPLES_RANGE: RangeInclusive<u32> = 1..=9;
/// Valid bounce counts.
pub const BOUNCES_RANGE: RangeInclusive<u32> = 1..=4;

/// How the dispatch grid is sized from the framebuffer dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchRounding {
    /// Round each dimension up to the next multiple of the work-group size.
    #[default]
    TileMultiple,
    /// Round each dimension up to the next power of two first (over-dispatches).
    PowerOfTwo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Raytracing Demo (compute shader)".to_string(),
            width: 1024,
            height: 768,
            vsync: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near_far: [f32; 2],
    pub look_at: [f32; 3],
    pub up: [f32; 3],
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Initial rotation about the Y axis in radians
    pub rotation: f32,
    /// Radians of rotation per pixel of horizontal drag
    pub drag_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near_far: [1.0, 2.0],
            look_at: [0.0, 0.5, 0.0],
            up: [0.0, 1.0, 0.0],
            orbit_radius: 3.0,
            orbit_height: 2.0,
            rotation: 0.8,
            drag_sensitivity: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub samples_per_frame: u32,
    pub bounces: u32,
    pub dispatch_rounding: DispatchRounding,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_frame: 1,
            bounces: 1,
            dispatch_rounding: DispatchRounding::TileMultiple,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
}

impl Config {
    pub fn new(config_path: &str) -> Result<Self, String> {
        let toml_str = fs::read_to_string(config_path)
            .map_err(|e| format!("Could not find/read config file {}: {}", config_path, e))?;
        Self::from_str(&toml_str)
    }

    pub fn from_str(toml_str: &str) -> Result<Self, String> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| format!("Could not parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the renderer can't work with instead of clamping them silently.
    pub fn validate(&self) -> Result<(), String> {
        let window = &self.window;
        if window.width == 0 || window.height == 0 {
            return Err(format!("Window size must be positive, got {}x{}", window.width, window.height));
        }

        let camera = &self.camera;
        if !(camera.fov > 0.0 && camera.fov < 180.0) {
            return Err(format!("Camera fov must be between 0 and 180 degrees, got {}", camera.fov));
        }
        let [near, far] = camera.near_far;
        if !(near > 0.0 && far > near) {
            return Err(format!("Camera near_far must satisfy 0 < near < far, got [{}, {}]", near, far));
        }
        if !(camera.orbit_radius > 0.0) {
            return Err(format!("Camera orbit_radius must be positive, got {}", camera.orbit_radius));
        }
        if !camera.drag_sensitivity.is_finite() {
            return Err("Camera drag_sensitivity must be finite".to_string());
        }
        let finite = |values: &[f32]| values.iter().all(|v| v.is_finite());
        if !finite(&camera.look_at) || !finite(&camera.up) || !camera.rotation.is_finite() || !camera.orbit_height.is_finite() {
            return Err("Camera look_at, up, rotation and orbit_height must be finite".to_string());
        }

        let render = &self.render;
        if !SAMPLES_RANGE.contains(&render.samples_per_frame) {
            return Err(format!("samples_per_frame must be in {:?}, got {}", SAMPLES_RANGE, render.samples_per_frame));
        }
        if !BOUNCES_RANGE.contains(&render.bounces) {
            return Err(format!("bounces must be in {:?}, got {}", BOUNCES_RANGE, render.bounces));
        }
        Ok(())
    }
}
