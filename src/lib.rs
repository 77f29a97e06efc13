//! lumen-ngin
//!
//! A minimal real-time 3D engine: textured, Phong-lit entities drawn in
//! per-model batches under a fixed-timestep loop. Game code implements
//! [`flow::GameLogic`], submits entities to a [`render::Renderer`] every
//! frame and hands the engine a [`window::Window`] to drive.
//!
//! High-level modules
//! - `camera`: viewer position/rotation and the perspective projection
//! - `config`: engine-wide settings and their defaults
//! - `context`: GPU device, queue and surface of a window
//! - `data_structures`: entities, models, materials, textures and lights
//! - `error`: typed errors of shaders, assets and engine setup
//! - `flow`: the fixed-timestep frame loop and the game logic callbacks
//! - `input`: poll-based mouse snapshot
//! - `pipelines`: WGSL sources, the render pipeline and per-frame recording
//! - `render`: entity batching and draw submission
//! - `resources`: helpers to load textures/models and create GPU resources
//! - `shader`: shader programs and their named-uniform interface
//! - `transformation`: model and view matrices
//! - `window`: the window collaborator and its winit implementation
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod shader;
pub mod transformation;
pub mod window;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use winit::keyboard::KeyCode;
pub use wgpu::Color;
