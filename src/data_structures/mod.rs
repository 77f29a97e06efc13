//! Engine data structures: models, materials, textures, entities and lights.
//!
//! This module contains the plain data the renderer consumes every frame:
//!
//! - `model` contains the GPU geometry handle, its material and the vertex layout
//! - `texture` contains the texture handle and the GPU texture wrapper
//! - `entity` places a model in the scene with its own transform
//! - `light` holds directional, point and spot light parameters

pub mod entity;
pub mod light;
pub mod model;
pub mod texture;
