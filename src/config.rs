//! Engine-wide settings.
//!
//! [`EngineConfig`] is built once at startup and handed to the components
//! that need it (window, renderer, frame loop). The defaults reproduce the
//! look and feel of the reference scenes.

use std::path::PathBuf;

use crate::render::{MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub title: String,
    /// Window width in pixels. A width or height of zero opens a maximised window.
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Fixed simulation rate in ticks per second.
    pub tick_rate: f32,
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub clear_colour: wgpu::Color,
    pub ambient_light: [f32; 3],
    pub specular_power: f32,
    pub camera_step: f32,
    pub mouse_sensitivity: f32,
    /// Directory every asset path is resolved against.
    pub asset_root: PathBuf,
    /// At most the array sizes compiled into the lighting shader
    /// ([`crate::render::MAX_POINT_LIGHTS`], [`crate::render::MAX_SPOT_LIGHTS`]).
    /// Slots past this capacity stay switched off.
    pub max_point_lights: usize,
    pub max_spot_lights: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "ENGINE".to_string(),
            width: 800,
            height: 600,
            vsync: false,
            tick_rate: 120.0,
            fov_degrees: 60.0,
            z_near: 0.05,
            z_far: 1000.0,
            clear_colour: wgpu::Color {
                r: 0.5,
                g: 0.5,
                b: 0.5,
                a: 0.0,
            },
            ambient_light: [1.5, 1.5, 1.5],
            specular_power: 10.0,
            camera_step: 0.05,
            mouse_sensitivity: 0.08,
            asset_root: PathBuf::from("assets"),
            max_point_lights: MAX_POINT_LIGHTS,
            max_spot_lights: MAX_SPOT_LIGHTS,
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: f32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    /// Duration of one fixed simulation step in seconds.
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }
}
