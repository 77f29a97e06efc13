//! Uniform block and stage interface reflection over naga modules.
//!
//! The engine's shaders expose all of their uniforms through one struct bound
//! at `@group(0) @binding(0)` in the uniform address space. Reflection
//! flattens that struct into dotted/indexed leaf names (`material.ambient`,
//! `point_lights[2].constant`) mapped to byte offsets, which is what the
//! program hands out as uniform locations.

use std::collections::BTreeMap;

use wgpu::naga;

use crate::shader::uniform::UniformKind;

pub const UNIFORM_GROUP: u32 = 0;
pub const UNIFORM_BINDING: u32 = 0;

/// Resolved location of one leaf uniform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformSlot {
    pub offset: u32,
    pub kind: UniformKind,
}

impl UniformSlot {
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.kind.size()
    }
}

/// Flattened layout of a program's uniform block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformBlock {
    size: u32,
    slots: BTreeMap<String, UniformSlot>,
}

impl UniformBlock {
    /// Size of the block in bytes, as the GPU sees it.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn get(&self, name: &str) -> Option<UniformSlot> {
        self.slots.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}

/// Reflect the uniform block of `module`, if it declares one.
pub(crate) fn uniform_block(module: &naga::Module) -> Result<Option<UniformBlock>, String> {
    let global = module.global_variables.iter().find(|(_, var)| {
        var.space == naga::AddressSpace::Uniform
            && var
                .binding
                .as_ref()
                .is_some_and(|b| b.group == UNIFORM_GROUP && b.binding == UNIFORM_BINDING)
    });
    let Some((_, var)) = global else {
        return Ok(None);
    };
    let size = match &module.types[var.ty].inner {
        naga::TypeInner::Struct { span, .. } => *span,
        _ => {
            return Err(format!(
                "the uniform at @group({UNIFORM_GROUP}) @binding({UNIFORM_BINDING}) must be a struct"
            ));
        }
    };
    let mut slots = BTreeMap::new();
    flatten(module, var.ty, "", 0, &mut slots)?;
    Ok(Some(UniformBlock { size, slots }))
}

fn flatten(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    path: &str,
    offset: u32,
    slots: &mut BTreeMap<String, UniformSlot>,
) -> Result<(), String> {
    let inner = &module.types[ty].inner;
    match inner {
        naga::TypeInner::Struct { members, .. } => {
            for member in members {
                let name = member
                    .name
                    .as_deref()
                    .ok_or_else(|| format!("unnamed member in uniform struct at {path:?}"))?;
                let child = if path.is_empty() {
                    name.to_string()
                } else {
                    format!("{path}.{name}")
                };
                flatten(module, member.ty, &child, offset + member.offset, slots)?;
            }
        }
        naga::TypeInner::Array { base, size, stride } => {
            let count = match size {
                naga::ArraySize::Constant(count) => count.get(),
                _ => return Err(format!("uniform array {path} must have a constant size")),
            };
            for i in 0..count {
                flatten(module, *base, &format!("{path}[{i}]"), offset + i * stride, slots)?;
            }
        }
        _ => {
            let kind = leaf_kind(inner).ok_or_else(|| format!("uniform {path} has an unsupported type"))?;
            slots.insert(path.to_string(), UniformSlot { offset, kind });
        }
    }
    Ok(())
}

fn leaf_kind(inner: &naga::TypeInner) -> Option<UniformKind> {
    match inner {
        naga::TypeInner::Scalar(scalar) if scalar.width == 4 => match scalar.kind {
            naga::ScalarKind::Float => Some(UniformKind::Float),
            naga::ScalarKind::Sint => Some(UniformKind::Int),
            naga::ScalarKind::Uint => Some(UniformKind::UInt),
            _ => None,
        },
        naga::TypeInner::Vector { size, scalar }
            if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 =>
        {
            match size {
                naga::VectorSize::Bi => Some(UniformKind::Vec2),
                naga::VectorSize::Tri => Some(UniformKind::Vec3),
                naga::VectorSize::Quad => Some(UniformKind::Vec4),
            }
        }
        naga::TypeInner::Matrix {
            columns: naga::VectorSize::Quad,
            rows: naga::VectorSize::Quad,
            scalar,
        } if scalar.kind == naga::ScalarKind::Float && scalar.width == 4 => Some(UniformKind::Mat4),
        _ => None,
    }
}

/// Scalar type and component count of one user-defined stage input/output.
pub(crate) type IoShape = (naga::Scalar, u8);

/// `@location(n)` inputs or outputs of a stage's entry point.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct StageInterface {
    pub locations: BTreeMap<u32, Option<IoShape>>,
}

pub(crate) fn entry_point(module: &naga::Module, stage: naga::ShaderStage) -> Option<&naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.stage == stage)
}

pub(crate) fn outputs(module: &naga::Module, ep: &naga::EntryPoint) -> StageInterface {
    let mut interface = StageInterface::default();
    if let Some(result) = &ep.function.result {
        collect(module, result.ty, result.binding.as_ref(), &mut interface);
    }
    interface
}

pub(crate) fn inputs(module: &naga::Module, ep: &naga::EntryPoint) -> StageInterface {
    let mut interface = StageInterface::default();
    for argument in &ep.function.arguments {
        collect(module, argument.ty, argument.binding.as_ref(), &mut interface);
    }
    interface
}

fn collect(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    interface: &mut StageInterface,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            interface.locations.insert(*location, io_shape(inner));
        }
        Some(_) => (),
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect(module, member.ty, member.binding.as_ref(), interface);
                }
            }
        }
    }
}

fn io_shape(inner: &naga::TypeInner) -> Option<IoShape> {
    match inner {
        naga::TypeInner::Scalar(scalar) => Some((*scalar, 1)),
        naga::TypeInner::Vector { size, scalar } => {
            let components = match size {
                naga::VectorSize::Bi => 2,
                naga::VectorSize::Tri => 3,
                naga::VectorSize::Quad => 4,
            };
            Some((*scalar, components))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
struct Light {
    color: vec3<f32>,
    intensity: f32,
}

struct Uniforms {
    projection: mat4x4<f32>,
    tint: vec4<f32>,
    lights: array<Light, 2>,
    count: i32,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.projection * vec4<f32>(position, 1.0);
}
"#;

    #[test]
    fn flattens_nested_struct_arrays() {
        let module = naga::front::wgsl::parse_str(SOURCE).expect("valid wgsl");
        let block = uniform_block(&module).expect("reflects").expect("has block");
        assert_eq!(block.get("projection").unwrap().offset, 0);
        assert_eq!(block.get("tint").unwrap().offset, 64);
        assert_eq!(block.get("lights[0].color").unwrap().offset, 80);
        assert_eq!(block.get("lights[0].intensity").unwrap().offset, 92);
        assert_eq!(block.get("lights[1].color").unwrap().offset, 96);
        assert_eq!(block.get("count").unwrap().kind, UniformKind::Int);
        assert!(block.get("lights").is_none());
        assert!(block.get("lights[2].color").is_none());
    }

    #[test]
    fn module_without_uniforms_has_no_block() {
        let module = naga::front::wgsl::parse_str(
            "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }",
        )
        .expect("valid wgsl");
        assert_eq!(uniform_block(&module), Ok(None));
    }
}
