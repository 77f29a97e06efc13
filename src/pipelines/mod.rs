//! GPU pipeline objects and per-frame command recording.
//!
//! - `basic`: the lit, textured pipeline behind a linked shader program
//! - `frame`: [`frame::GpuFrame`], the GPU implementation of
//!   [`crate::render::DrawTarget`]
//!
//! The WGSL sources live in `shaders/`. `uniforms.wgsl` is prepended to each
//! stage so both stages see the same uniform block. The light array sizes are
//! injected from [`MAX_POINT_LIGHTS`] and [`MAX_SPOT_LIGHTS`] ahead of it.

pub mod basic;
pub mod frame;

use crate::render::{MAX_POINT_LIGHTS, MAX_SPOT_LIGHTS};

pub const UNIFORMS_WGSL: &str = include_str!("shaders/uniforms.wgsl");
pub const VERTEX_WGSL: &str = include_str!("shaders/vertex.wgsl");
pub const FRAGMENT_WGSL: &str = include_str!("shaders/fragment.wgsl");

fn light_capacities() -> String {
    format!(
        "const MAX_POINT_LIGHTS: u32 = {MAX_POINT_LIGHTS}u;\nconst MAX_SPOT_LIGHTS: u32 = {MAX_SPOT_LIGHTS}u;\n"
    )
}

/// Full source of the default vertex stage.
pub fn vertex_source() -> String {
    format!("{}{UNIFORMS_WGSL}\n{VERTEX_WGSL}", light_capacities())
}

/// Full source of the default fragment stage.
pub fn fragment_source() -> String {
    format!("{}{UNIFORMS_WGSL}\n{FRAGMENT_WGSL}", light_capacities())
}
