mod common;

use lumen_ngin::{
    cgmath::{Matrix4, SquareMatrix, Vector3, Vector4},
    data_structures::light::{Attenuation, PointLight},
    error::ShaderError,
    shader::{ProgramState, ShaderProgram, ShaderStage, UniformKind},
};

use crate::common::test_utils::{linked_program, read_f32};

const VERTEX: &str = r#"
struct Uniforms {
    tint: vec4<f32>,
    scale: f32,
    frame: i32,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) shade: f32,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = vec4<f32>(position * u.scale, 1.0);
    out.shade = 1.0;
    return out;
}
"#;

const FRAGMENT: &str = r#"
struct Uniforms {
    tint: vec4<f32>,
    scale: f32,
    frame: i32,
}

@group(0) @binding(0)
var<uniform> u: Uniforms;

@fragment
fn fs_main(@location(0) shade: f32) -> @location(0) vec4<f32> {
    return u.tint * shade;
}
"#;

fn small_program() -> ShaderProgram {
    let mut program = ShaderProgram::new();
    program.compile(ShaderStage::Vertex, VERTEX).expect("vertex compiles");
    program.compile(ShaderStage::Fragment, FRAGMENT).expect("fragment compiles");
    program.link().expect("links");
    program
}

#[test]
fn program_walks_through_its_states() {
    let mut program = ShaderProgram::new();
    assert_eq!(program.state(), ProgramState::Uninitialized);
    assert_ne!(program.id(), 0);

    let handle = program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    assert_eq!(handle.stage, ShaderStage::Vertex);
    assert_eq!(handle.program, program.id());
    assert_eq!(program.state(), ProgramState::Compiled);

    program.compile(ShaderStage::Fragment, FRAGMENT).unwrap();
    program.link().unwrap();
    assert_eq!(program.state(), ProgramState::Linked);

    program.bind().unwrap();
    assert!(program.is_bound());
    program.unbind();
    assert_eq!(program.state(), ProgramState::Linked);
}

#[test]
fn program_ids_are_unique() {
    let a = ShaderProgram::new();
    let b = ShaderProgram::new();
    assert_ne!(a.id(), b.id());
}

#[test]
fn declared_uniforms_are_written_into_the_block() {
    let mut program = small_program();
    let scale = program.declare_uniform("scale").unwrap();
    program.declare_uniform("tint").unwrap();
    assert_eq!(scale.kind, UniformKind::Float);
    assert_eq!(program.uniform_location("scale"), Some(scale));

    program.bind().unwrap();
    program.set_float("scale", 2.5).unwrap();
    program.set_vec4("tint", Vector4::new(0.1, 0.2, 0.3, 0.4)).unwrap();

    let bytes = program.uniform_bytes();
    assert_eq!(bytes.len() as u32, program.uniform_block().size());
    assert_eq!(read_f32(bytes, scale.offset), 2.5);
    assert_eq!(read_f32(bytes, 8), 0.3);
}

#[test]
fn setting_an_undeclared_uniform_fails() {
    let mut program = small_program();
    program.bind().unwrap();
    let err = program.set_float("scale", 1.0).unwrap_err();
    assert!(matches!(err, ShaderError::UndeclaredUniform(name) if name == "scale"));
}

#[test]
fn declaring_a_missing_uniform_fails() {
    let mut program = small_program();
    let err = program.declare_uniform("does_not_exist").unwrap_err();
    assert!(matches!(err, ShaderError::UnknownUniform(name) if name == "does_not_exist"));
    assert_eq!(program.uniform_location("does_not_exist"), None);
}

#[test]
fn setting_while_unbound_fails() {
    let mut program = small_program();
    program.declare_uniform("scale").unwrap();
    let err = program.set_float("scale", 1.0).unwrap_err();
    assert!(matches!(err, ShaderError::NotBound(_)));
}

#[test]
fn setting_the_wrong_type_fails() {
    let mut program = small_program();
    program.declare_uniform("scale").unwrap();
    program.declare_uniform("frame").unwrap();
    program.bind().unwrap();

    let err = program.set_vec3("scale", Vector3::new(1.0, 2.0, 3.0)).unwrap_err();
    assert!(matches!(
        err,
        ShaderError::TypeMismatch { expected: "f32", found: "vec3<f32>", .. }
    ));
    program.set_int("frame", 7).unwrap();
    assert!(program.set_float("frame", 7.0).is_err());
}

#[test]
fn cleanup_releases_the_program_once() {
    let mut program = small_program();
    program.declare_uniform("scale").unwrap();
    program.bind().unwrap();

    program.cleanup();
    assert_eq!(program.id(), 0);
    assert_eq!(program.state(), ProgramState::Deleted);
    assert!(program.uniform_location("scale").is_none());

    program.cleanup();
    assert_eq!(program.state(), ProgramState::Deleted);
    assert!(matches!(program.bind(), Err(ShaderError::InvalidState { .. })));
    assert!(matches!(
        program.set_float("scale", 1.0),
        Err(ShaderError::InvalidState { .. })
    ));
}

#[test]
fn invalid_source_reports_the_stage() {
    let mut program = ShaderProgram::new();
    program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    let err = program
        .compile(ShaderStage::Fragment, "@fragment fn fs_main( -> {")
        .unwrap_err();
    match err {
        ShaderError::Compile { stage, log } => {
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(!log.is_empty());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn source_without_an_entry_point_is_rejected() {
    let mut program = ShaderProgram::new();
    let err = program
        .compile(ShaderStage::Vertex, "fn helper() -> f32 { return 1.0; }")
        .unwrap_err();
    assert!(matches!(err, ShaderError::Compile { stage: ShaderStage::Vertex, .. }));
}

#[test]
fn fragment_inputs_must_be_written_by_the_vertex_stage() {
    let fragment = FRAGMENT.replace("@location(0) shade", "@location(3) shade");
    let mut program = ShaderProgram::new();
    program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    program.compile(ShaderStage::Fragment, &fragment).unwrap();
    assert!(matches!(program.link(), Err(ShaderError::Validation(_))));

    // The failed link leaves both stages in place.
    assert_eq!(program.state(), ProgramState::Compiled);
    assert!(matches!(program.link(), Err(ShaderError::Validation(_))));
    assert_eq!(program.state(), ProgramState::Compiled);
    assert!(program.linked_stages().is_none());

    program.compile(ShaderStage::Fragment, FRAGMENT).unwrap();
    program.link().unwrap();
    assert_eq!(program.state(), ProgramState::Linked);
}

#[test]
fn stages_must_agree_on_the_uniform_block() {
    let fragment = FRAGMENT.replacen("    frame: i32,\n", "", 1);
    let mut program = ShaderProgram::new();
    program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    program.compile(ShaderStage::Fragment, &fragment).unwrap();
    assert!(matches!(program.link(), Err(ShaderError::Link(_))));
}

#[test]
fn linking_needs_both_stages() {
    let mut program = ShaderProgram::new();
    program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    assert!(matches!(program.link(), Err(ShaderError::Link(_))));
}

#[test]
fn linked_programs_cannot_be_recompiled() {
    let mut program = small_program();
    let err = program.compile(ShaderStage::Vertex, VERTEX).unwrap_err();
    assert!(matches!(err, ShaderError::InvalidState { operation: "compile", .. }));
    assert!(program.linked_stages().is_some());
}

#[test]
fn recompiling_a_stage_replaces_it() {
    let mut program = ShaderProgram::new();
    program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    program.compile(ShaderStage::Vertex, VERTEX).unwrap();
    program.compile(ShaderStage::Fragment, FRAGMENT).unwrap();
    program.link().unwrap();
    assert_eq!(program.state(), ProgramState::Linked);
}

#[test]
fn light_lists_cannot_exceed_the_compiled_array() {
    let mut program = linked_program();
    program.declare_point_light_list_uniform("point_lights", 5).unwrap();
    let err = program.declare_point_light_list_uniform("point_lights", 6).unwrap_err();
    assert!(matches!(err, ShaderError::UnknownUniform(name) if name.starts_with("point_lights[5]")));
}

#[test]
fn point_lights_are_laid_out_by_array_stride() {
    let mut program = linked_program();
    program.declare_point_light_list_uniform("point_lights", 2).unwrap();
    let slot = program.uniform_location("point_lights[1].intensity").unwrap();
    assert_eq!(slot.offset, 364);

    program.bind().unwrap();
    let light = PointLight::with_attenuation(
        Vector3::new(1.0, 0.5, 0.25),
        Vector3::new(0.0, 1.0, 2.0),
        3.0,
        Attenuation {
            constant: 0.0,
            linear: 0.0,
            exponent: 1.0,
        },
    );
    program.set_point_light_at("point_lights", &light, 1).unwrap();
    let bytes = program.uniform_bytes();
    assert_eq!(read_f32(bytes, 364), 3.0);
    assert_eq!(read_f32(bytes, 352 + 4), 0.5);
    assert_eq!(read_f32(bytes, 352 + 36), 1.0);
    // Slot 0 is untouched.
    assert_eq!(read_f32(bytes, 316), 0.0);
}

#[test]
fn default_program_exposes_the_lighting_uniforms() {
    let mut program = linked_program();
    assert_eq!(program.uniform_block().size(), 864);
    program.declare_uniform("projection_matrix").unwrap();
    program.declare_material_uniform("material").unwrap();
    program.declare_directional_light_uniform("directional_light").unwrap();
    program.declare_spot_light_list_uniform("spot_lights", 5).unwrap();

    program.bind().unwrap();
    program.set_mat4("projection_matrix", Matrix4::identity()).unwrap();
    let has_texture = program.uniform_location("material.has_texture").unwrap();
    assert_eq!(has_texture.offset, 256);
    assert_eq!(
        program.uniform_location("spot_lights[1].cutoff").map(|s| s.offset),
        Some(544 + 64 + 60)
    );
    assert_eq!(read_f32(program.uniform_bytes(), 0), 1.0);
    assert_eq!(read_f32(program.uniform_bytes(), 20), 1.0);
}
