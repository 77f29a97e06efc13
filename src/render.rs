//! Entity batching and per-frame draw submission.
//!
//! The [`Renderer`] owns the scene shader program. Game logic submits the
//! entities it wants drawn with [`Renderer::process_entity`]; entities are
//! grouped into one bucket per [`Model`] so that geometry, texture and
//! material are bound once per bucket instead of once per entity. Buckets only
//! live for one frame: [`Renderer::render_frame`] drains them.
//!
//! A bucket belongs to one shared `Rc<Model>`, not to its geometry id.
//! Models derived with [`Model::with_material`] reuse the mesh but are
//! batched apart, each with its own texture and material.
//!
//! Draw calls go through a [`DrawTarget`]. On the GPU that is a
//! [`crate::pipelines::frame::GpuFrame`]; tests record the calls instead.
//!
//! # Key types
//!
//! - [`Renderer`] holds the program and the buckets
//! - [`DrawTarget`] is the sink for clear/bind/draw commands
//! - [`SceneLights`] is the light set of one frame
//!

use std::{collections::HashMap, rc::Rc};

use cgmath::{Matrix4, Vector3};

use crate::{
    camera::Camera,
    config::EngineConfig,
    context::GpuContext,
    data_structures::{
        entity::Entity,
        light::{DirectionalLight, PointLight, SpotLight},
        model::Model,
        texture::Texture,
    },
    error::ShaderError,
    pipelines::{self, frame::GpuFrame},
    resources::AssetLoader,
    shader::{ShaderProgram, ShaderStage},
    transformation,
};

/// Array sizes compiled into the default shaders. The WGSL sources get the
/// same values through [`crate::pipelines::vertex_source`].
pub const MAX_POINT_LIGHTS: usize = 5;
pub const MAX_SPOT_LIGHTS: usize = 5;

/// Receiver of the renderer's state changes and draw calls.
///
/// Calls arrive in the order the graphics API would see them: one `clear`,
/// one `bind_program`, then per bucket `bind_model`, `bind_texture`, one
/// `draw_indexed` per entity and `unbind_model`, and finally
/// `unbind_program`. `uniforms` is the program's uniform block at the time of
/// the draw.
pub trait DrawTarget {
    fn clear(&mut self, colour: wgpu::Color);
    fn bind_program(&mut self, program: &ShaderProgram) -> anyhow::Result<()>;
    fn bind_model(&mut self, model: &Model) -> anyhow::Result<()>;
    fn bind_texture(&mut self, texture: Option<Texture>) -> anyhow::Result<()>;
    fn draw_indexed(&mut self, index_count: u32, uniforms: &[u8]);
    fn unbind_model(&mut self);
    fn unbind_program(&mut self);
}

/// Every light of one frame. Lights are copied in and never retained.
#[derive(Clone, Copy, Debug)]
pub struct SceneLights<'a> {
    pub directional: DirectionalLight,
    pub point: &'a [PointLight],
    pub spot: &'a [SpotLight],
}

pub struct Renderer {
    shader: ShaderProgram,
    // Keyed by the model's address; the `Rc` kept in the value pins it.
    buckets: HashMap<*const Model, (Rc<Model>, Vec<Entity>)>,
    clear_colour: wgpu::Color,
    ambient_light: Vector3<f32>,
    specular_power: f32,
    max_point_lights: usize,
    max_spot_lights: usize,
}

impl Renderer {
    /// Compile, link and declare the default lighting program.
    pub fn new(config: &EngineConfig) -> Result<Self, ShaderError> {
        let mut shader = ShaderProgram::new();
        shader.compile(ShaderStage::Vertex, &pipelines::vertex_source())?;
        shader.compile(ShaderStage::Fragment, &pipelines::fragment_source())?;
        shader.link()?;
        Self::with_program(shader, config)
    }

    /// Use an already linked program that follows the default uniform names.
    pub fn with_program(mut shader: ShaderProgram, config: &EngineConfig) -> Result<Self, ShaderError> {
        shader.declare_uniform("transformation_matrix")?;
        shader.declare_uniform("projection_matrix")?;
        shader.declare_uniform("view_matrix")?;
        shader.declare_uniform("ambient_light")?;
        shader.declare_material_uniform("material")?;
        shader.declare_uniform("specular_power")?;
        shader.declare_directional_light_uniform("directional_light")?;
        shader.declare_point_light_list_uniform("point_lights", config.max_point_lights)?;
        shader.declare_spot_light_list_uniform("spot_lights", config.max_spot_lights)?;

        let [r, g, b] = config.ambient_light;
        Ok(Self {
            shader,
            buckets: HashMap::new(),
            clear_colour: config.clear_colour,
            ambient_light: Vector3::new(r, g, b),
            specular_power: config.specular_power,
            max_point_lights: config.max_point_lights,
            max_spot_lights: config.max_spot_lights,
        })
    }

    /// Create the GPU pipeline of the program for `ctx`'s surface format.
    pub fn upload(&mut self, ctx: &GpuContext) -> Result<(), ShaderError> {
        self.shader.upload(&ctx.device, ctx.colour_format())
    }

    pub fn shader(&self) -> &ShaderProgram {
        &self.shader
    }

    pub fn set_clear_colour(&mut self, colour: wgpu::Color) {
        self.clear_colour = colour;
    }

    /// Queue `entity` for the next frame, grouped with other entities of the
    /// same model.
    pub fn process_entity(&mut self, entity: &Entity) {
        let model = entity.model();
        self.buckets
            .entry(Rc::as_ptr(model))
            .or_insert_with(|| (Rc::clone(model), Vec::new()))
            .1
            .push(entity.clone());
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entities queued for exactly this shared model.
    pub fn bucket_len(&self, model: &Rc<Model>) -> usize {
        self.buckets
            .get(&Rc::as_ptr(model))
            .map_or(0, |(_, entities)| entities.len())
    }

    /// Draw every queued entity into `target` and empty the buckets.
    pub fn render_frame(
        &mut self,
        target: &mut dyn DrawTarget,
        camera: &Camera,
        projection: Matrix4<f32>,
        lights: SceneLights<'_>,
    ) -> anyhow::Result<()> {
        target.clear(self.clear_colour);
        self.shader.bind()?;
        target.bind_program(&self.shader)?;
        self.shader.set_mat4("projection_matrix", projection)?;
        self.render_lights(lights)?;

        let view = transformation::view_matrix(camera);
        let mut draws = 0;
        for (model, entities) in self.buckets.values() {
            if entities.is_empty() {
                log::warn!("Skipping an empty bucket for {:?}", model.id());
                continue;
            }
            target.bind_model(model)?;
            target.bind_texture(model.texture())?;
            self.shader.set_material("material", model.material())?;
            for entity in entities {
                self.shader
                    .set_mat4("transformation_matrix", transformation::model_matrix(entity))?;
                self.shader.set_mat4("view_matrix", view)?;
                target.draw_indexed(model.index_count(), self.shader.uniform_bytes());
                draws += 1;
            }
            target.unbind_model();
        }
        log::debug!("Rendered {} buckets with {} draws", self.buckets.len(), draws);

        self.buckets.clear();
        self.shader.unbind();
        target.unbind_program();
        Ok(())
    }

    /// [`Self::render_frame`] straight to `ctx`'s surface.
    pub fn render(
        &mut self,
        ctx: &GpuContext,
        assets: &AssetLoader,
        camera: &Camera,
        projection: Matrix4<f32>,
        lights: SceneLights<'_>,
    ) -> anyhow::Result<()> {
        let mut frame = GpuFrame::new(ctx, assets);
        self.render_frame(&mut frame, camera, projection, lights)?;
        frame.finish(&self.shader)
    }

    fn render_lights(&mut self, lights: SceneLights<'_>) -> Result<(), ShaderError> {
        self.shader.set_vec3("ambient_light", self.ambient_light)?;
        self.shader.set_float("specular_power", self.specular_power)?;

        let spot = fill_slots(lights.spot, self.max_spot_lights, SpotLight::off(), "spot");
        self.shader.set_spot_lights("spot_lights", &spot)?;
        let point = fill_slots(lights.point, self.max_point_lights, PointLight::off(), "point");
        self.shader.set_point_lights("point_lights", &point)?;
        self.shader.set_directional_light("directional_light", &lights.directional)
    }

    pub fn cleanup(&mut self) {
        self.shader.cleanup();
    }
}

/// Exactly `capacity` lights: the first ones given, then `off` fillers.
fn fill_slots<L: Copy>(lights: &[L], capacity: usize, off: L, kind: &str) -> Vec<L> {
    if lights.len() > capacity {
        log::warn!(
            "{} {kind} lights were given but only {capacity} fit, the rest are ignored",
            lights.len()
        );
    }
    let mut slots: Vec<L> = lights.iter().take(capacity).copied().collect();
    slots.resize(capacity, off);
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excess_lights_are_truncated() {
        let slots = fill_slots(&[1, 2, 3], 2, 0, "point");
        assert_eq!(slots, vec![1, 2]);
    }

    #[test]
    fn missing_lights_are_switched_off() {
        let slots = fill_slots(&[7], 3, 0, "spot");
        assert_eq!(slots, vec![7, 0, 0]);
    }
}
