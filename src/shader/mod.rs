//! Shader programs and their named-uniform interface.
//!
//! A [`ShaderProgram`] walks through `Uninitialized -> Compiled -> Linked`
//! and then toggles between bound and unbound for as long as it lives.
//! Stages are WGSL sources compiled and validated by naga. Linking merges the
//! reflected uniform blocks of both stages and checks that the fragment
//! stage only reads what the vertex stage writes.
//!
//! Uniforms are addressed by name. Every leaf name has to be declared once
//! after linking; declaring resolves it to a [`UniformSlot`] inside the
//! uniform block. Setting writes the value into a CPU staging copy of the
//! block, which the renderer snapshots for every draw.

pub mod reflect;
pub mod uniform;

use std::{
    collections::HashMap,
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use cgmath::{Matrix4, Vector3, Vector4};
use wgpu::naga;

use crate::{
    data_structures::{
        light::{DirectionalLight, PointLight, SpotLight},
        model::Material,
    },
    error::ShaderError,
    pipelines::basic::GpuProgram,
};

pub use reflect::{UniformBlock, UniformSlot};
pub use uniform::{UniformKind, UniformValue};

static NEXT_PROGRAM_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga(&self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgramState {
    Uninitialized,
    Compiled,
    Linked,
    Bound,
    Deleted,
}

impl ProgramState {
    fn name(&self) -> &'static str {
        match self {
            ProgramState::Uninitialized => "uninitialized",
            ProgramState::Compiled => "compiled",
            ProgramState::Linked => "linked",
            ProgramState::Bound => "bound",
            ProgramState::Deleted => "deleted",
        }
    }
}

/// Handle to a compiled stage of a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageHandle {
    pub stage: ShaderStage,
    pub program: u32,
}

struct CompiledStage {
    stage: ShaderStage,
    source: String,
    entry_point: String,
    module: naga::Module,
}

/// What survives of a stage once the program is linked.
#[derive(Clone, Debug)]
pub struct LinkedStage {
    pub source: String,
    pub entry_point: String,
}

pub const MATERIAL_FIELDS: [&str; 5] = ["ambient", "diffuse", "specular", "has_texture", "reflectance"];
pub const DIRECTIONAL_LIGHT_FIELDS: [&str; 3] = ["color", "direction", "intensity"];
pub const POINT_LIGHT_FIELDS: [&str; 6] = ["color", "position", "intensity", "constant", "linear", "exponent"];

pub struct ShaderProgram {
    id: u32,
    state: ProgramState,
    stages: Vec<CompiledStage>,
    linked: Option<(LinkedStage, LinkedStage)>,
    block: UniformBlock,
    uniforms: HashMap<String, UniformSlot>,
    staging: Vec<u8>,
    gpu: Option<GpuProgram>,
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("uniforms", &self.uniforms.len())
            .finish()
    }
}

impl Default for ShaderProgram {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderProgram {
    pub fn new() -> Self {
        Self {
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
            state: ProgramState::Uninitialized,
            stages: Vec::new(),
            linked: None,
            block: UniformBlock::default(),
            uniforms: HashMap::new(),
            staging: Vec::new(),
            gpu: None,
        }
    }

    /// Zero once the program has been cleaned up.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    pub fn is_bound(&self) -> bool {
        self.state == ProgramState::Bound
    }

    /// Parse and validate one stage. Compiling a stage twice replaces it.
    pub fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<StageHandle, ShaderError> {
        self.expect_state(
            "compile",
            &[ProgramState::Uninitialized, ProgramState::Compiled],
        )?;
        let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| ShaderError::Compile {
            stage,
            log: e.emit_to_string(source),
        })?;
        let entry_point = reflect::entry_point(&module, stage.naga())
            .map(|ep| ep.name.clone())
            .ok_or_else(|| ShaderError::Compile {
                stage,
                log: format!("no @{stage} entry point"),
            })?;

        if let Some(pos) = self.stages.iter().position(|s| s.stage == stage) {
            log::warn!("Replacing the {stage} stage of shader program {}", self.id);
            self.stages.remove(pos);
        }
        self.stages.push(CompiledStage {
            stage,
            source: source.to_string(),
            entry_point,
            module,
        });
        self.state = ProgramState::Compiled;
        Ok(StageHandle {
            stage,
            program: self.id,
        })
    }

    /// Link both stages, detach them and validate the resulting program.
    pub fn link(&mut self) -> Result<(), ShaderError> {
        self.expect_state("link", &[ProgramState::Compiled])?;
        let vertex = self.stage(ShaderStage::Vertex)?;
        let fragment = self.stage(ShaderStage::Fragment)?;

        let vertex_block = reflect::uniform_block(&vertex.module).map_err(ShaderError::Link)?;
        let fragment_block = reflect::uniform_block(&fragment.module).map_err(ShaderError::Link)?;
        let block = match (vertex_block, fragment_block) {
            (Some(v), Some(f)) if v != f => {
                return Err(ShaderError::Link(
                    "the uniform block differs between the vertex and fragment stage".to_string(),
                ));
            }
            (Some(block), _) | (None, Some(block)) => block,
            (None, None) => UniformBlock::default(),
        };

        let outputs = reflect::entry_point(&vertex.module, naga::ShaderStage::Vertex)
            .map(|ep| reflect::outputs(&vertex.module, ep))
            .unwrap_or_default();
        let inputs = reflect::entry_point(&fragment.module, naga::ShaderStage::Fragment)
            .map(|ep| reflect::inputs(&fragment.module, ep))
            .unwrap_or_default();

        for (location, shape) in &inputs.locations {
            match outputs.locations.get(location) {
                None => {
                    return Err(ShaderError::Validation(format!(
                        "fragment input @location({location}) is not written by the vertex stage"
                    )));
                }
                Some(written) if written != shape => {
                    return Err(ShaderError::Validation(format!(
                        "fragment input @location({location}) does not match the vertex output type"
                    )));
                }
                Some(_) => (),
            }
        }

        let linked = (
            LinkedStage {
                source: vertex.source.clone(),
                entry_point: vertex.entry_point.clone(),
            },
            LinkedStage {
                source: fragment.source.clone(),
                entry_point: fragment.entry_point.clone(),
            },
        );
        // Compiled stage objects are no longer needed once linked.
        self.stages.clear();

        self.staging = vec![0; block.size() as usize];
        self.block = block;
        self.linked = Some(linked);
        self.state = ProgramState::Linked;
        log::info!(
            "Linked shader program {} with {} uniform fields ({} bytes)",
            self.id,
            self.block.len(),
            self.block.size()
        );
        Ok(())
    }

    /// Resolve and cache the location of a leaf uniform.
    pub fn declare_uniform(&mut self, name: &str) -> Result<UniformSlot, ShaderError> {
        self.expect_state("declare uniforms on", &[ProgramState::Linked, ProgramState::Bound])?;
        let slot = self
            .block
            .get(name)
            .ok_or_else(|| ShaderError::UnknownUniform(name.to_string()))?;
        self.uniforms.insert(name.to_string(), slot);
        Ok(slot)
    }

    pub fn declare_material_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        for field in MATERIAL_FIELDS {
            self.declare_uniform(&format!("{name}.{field}"))?;
        }
        Ok(())
    }

    pub fn declare_directional_light_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        for field in DIRECTIONAL_LIGHT_FIELDS {
            self.declare_uniform(&format!("{name}.{field}"))?;
        }
        Ok(())
    }

    pub fn declare_point_light_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        for field in POINT_LIGHT_FIELDS {
            self.declare_uniform(&format!("{name}.{field}"))?;
        }
        Ok(())
    }

    pub fn declare_spot_light_uniform(&mut self, name: &str) -> Result<(), ShaderError> {
        self.declare_point_light_uniform(&format!("{name}.pl"))?;
        self.declare_uniform(&format!("{name}.cone_dir"))?;
        self.declare_uniform(&format!("{name}.cutoff"))?;
        Ok(())
    }

    /// `count` must not exceed the array size compiled into the shader.
    pub fn declare_point_light_list_uniform(&mut self, name: &str, count: usize) -> Result<(), ShaderError> {
        for i in 0..count {
            self.declare_point_light_uniform(&format!("{name}[{i}]"))?;
        }
        Ok(())
    }

    pub fn declare_spot_light_list_uniform(&mut self, name: &str, count: usize) -> Result<(), ShaderError> {
        for i in 0..count {
            self.declare_spot_light_uniform(&format!("{name}[{i}]"))?;
        }
        Ok(())
    }

    /// The declared location of `name`, if any.
    pub fn uniform_location(&self, name: &str) -> Option<UniformSlot> {
        self.uniforms.get(name).copied()
    }

    pub fn uniform_block(&self) -> &UniformBlock {
        &self.block
    }

    /// Current contents of the uniform block, laid out as the GPU expects.
    pub fn uniform_bytes(&self) -> &[u8] {
        &self.staging
    }

    /// Write one leaf value. The program must be bound.
    pub fn set_uniform(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), ShaderError> {
        let value = value.into();
        match self.state {
            ProgramState::Bound => (),
            ProgramState::Linked => return Err(ShaderError::NotBound(name.to_string())),
            state => {
                return Err(ShaderError::InvalidState {
                    operation: "set uniforms on",
                    state: state.name(),
                });
            }
        }
        let slot = self
            .uniforms
            .get(name)
            .copied()
            .ok_or_else(|| ShaderError::UndeclaredUniform(name.to_string()))?;
        if !value.write_to(slot.kind, &mut self.staging[slot.range()]) {
            return Err(ShaderError::TypeMismatch {
                name: name.to_string(),
                expected: slot.kind.name(),
                found: value.type_name(),
            });
        }
        Ok(())
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_vec4(&mut self, name: &str, value: Vector4<f32>) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_mat4(&mut self, name: &str, value: Matrix4<f32>) -> Result<(), ShaderError> {
        self.set_uniform(name, value)
    }

    pub fn set_material(&mut self, name: &str, material: &Material) -> Result<(), ShaderError> {
        self.set_vec4(&format!("{name}.ambient"), material.ambient)?;
        self.set_vec4(&format!("{name}.diffuse"), material.diffuse)?;
        self.set_vec4(&format!("{name}.specular"), material.specular)?;
        self.set_bool(&format!("{name}.has_texture"), material.has_texture())?;
        self.set_float(&format!("{name}.reflectance"), material.reflectance)
    }

    pub fn set_directional_light(&mut self, name: &str, light: &DirectionalLight) -> Result<(), ShaderError> {
        self.set_vec3(&format!("{name}.color"), light.colour)?;
        self.set_vec3(&format!("{name}.direction"), light.direction)?;
        self.set_float(&format!("{name}.intensity"), light.intensity)
    }

    pub fn set_point_light(&mut self, name: &str, light: &PointLight) -> Result<(), ShaderError> {
        self.set_vec3(&format!("{name}.color"), light.colour)?;
        self.set_vec3(&format!("{name}.position"), light.position)?;
        self.set_float(&format!("{name}.intensity"), light.intensity)?;
        self.set_float(&format!("{name}.constant"), light.attenuation.constant)?;
        self.set_float(&format!("{name}.linear"), light.attenuation.linear)?;
        self.set_float(&format!("{name}.exponent"), light.attenuation.exponent)
    }

    pub fn set_spot_light(&mut self, name: &str, light: &SpotLight) -> Result<(), ShaderError> {
        self.set_point_light(&format!("{name}.pl"), &light.point)?;
        self.set_vec3(&format!("{name}.cone_dir"), light.cone_direction)?;
        self.set_float(&format!("{name}.cutoff"), light.cutoff)
    }

    /// Sets `name[index]`.
    pub fn set_point_light_at(&mut self, name: &str, light: &PointLight, index: usize) -> Result<(), ShaderError> {
        self.set_point_light(&format!("{name}[{index}]"), light)
    }

    pub fn set_spot_light_at(&mut self, name: &str, light: &SpotLight, index: usize) -> Result<(), ShaderError> {
        self.set_spot_light(&format!("{name}[{index}]"), light)
    }

    pub fn set_point_lights(&mut self, name: &str, lights: &[PointLight]) -> Result<(), ShaderError> {
        for (i, light) in lights.iter().enumerate() {
            self.set_point_light_at(name, light, i)?;
        }
        Ok(())
    }

    pub fn set_spot_lights(&mut self, name: &str, lights: &[SpotLight]) -> Result<(), ShaderError> {
        for (i, light) in lights.iter().enumerate() {
            self.set_spot_light_at(name, light, i)?;
        }
        Ok(())
    }

    pub fn bind(&mut self) -> Result<(), ShaderError> {
        self.expect_state("bind", &[ProgramState::Linked, ProgramState::Bound])?;
        self.state = ProgramState::Bound;
        Ok(())
    }

    pub fn unbind(&mut self) {
        if self.state == ProgramState::Bound {
            self.state = ProgramState::Linked;
        }
    }

    /// Unbind and release the program. A second call is a no-op.
    pub fn cleanup(&mut self) {
        self.unbind();
        if self.id == 0 {
            return;
        }
        log::info!("Releasing shader program {}", self.id);
        self.gpu = None;
        self.stages.clear();
        self.linked = None;
        self.uniforms.clear();
        self.staging.clear();
        self.block = UniformBlock::default();
        self.id = 0;
        self.state = ProgramState::Deleted;
    }

    /// The vertex and fragment stage sources kept after linking.
    pub fn linked_stages(&self) -> Option<(&LinkedStage, &LinkedStage)> {
        self.linked.as_ref().map(|(v, f)| (v, f))
    }

    /// Create the GPU pipeline for this linked program.
    pub fn upload(&mut self, device: &wgpu::Device, colour_format: wgpu::TextureFormat) -> Result<(), ShaderError> {
        self.expect_state("upload", &[ProgramState::Linked, ProgramState::Bound])?;
        let (vertex, fragment) = self.linked_stages().ok_or(ShaderError::InvalidState {
            operation: "upload",
            state: self.state.name(),
        })?;
        let gpu = GpuProgram::new(device, vertex, fragment, self.block.size(), colour_format);
        self.gpu = Some(gpu);
        Ok(())
    }

    pub fn gpu(&self) -> Option<&GpuProgram> {
        self.gpu.as_ref()
    }

    fn stage(&self, stage: ShaderStage) -> Result<&CompiledStage, ShaderError> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .ok_or_else(|| ShaderError::Link(format!("no {stage} stage was compiled")))
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ProgramState]) -> Result<(), ShaderError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ShaderError::InvalidState {
                operation,
                state: self.state.name(),
            })
        }
    }
}
