//! Uniform values and their byte encoding.

use cgmath::{Matrix4, Vector3, Vector4};

/// Shape of a leaf field inside a uniform block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Int,
    UInt,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Bytes written for a value of this kind (no trailing padding).
    pub fn size(&self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int | UniformKind::UInt => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UniformKind::Float => "f32",
            UniformKind::Int => "i32",
            UniformKind::UInt => "u32",
            UniformKind::Vec2 => "vec2<f32>",
            UniformKind::Vec3 => "vec3<f32>",
            UniformKind::Vec4 => "vec4<f32>",
            UniformKind::Mat4 => "mat4x4<f32>",
        }
    }
}

/// A single value destined for one uniform slot.
///
/// Booleans have no host-shareable representation in WGSL and are stored as
/// `1.0` / `0.0` in an `f32` slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat4(Matrix4<f32>),
}

impl UniformValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "f32",
            UniformValue::Int(_) => "i32",
            UniformValue::Bool(_) => "bool",
            UniformValue::Vec3(_) => "vec3<f32>",
            UniformValue::Vec4(_) => "vec4<f32>",
            UniformValue::Mat4(_) => "mat4x4<f32>",
        }
    }

    /// Encode into `out`, which must be exactly `kind.size()` bytes long.
    ///
    /// Returns `false` if the value does not fit a slot of `kind`.
    pub(crate) fn write_to(&self, kind: UniformKind, out: &mut [u8]) -> bool {
        match (self, kind) {
            (UniformValue::Float(v), UniformKind::Float) => out.copy_from_slice(bytemuck::bytes_of(v)),
            (UniformValue::Bool(v), UniformKind::Float) => {
                let encoded: f32 = if *v { 1.0 } else { 0.0 };
                out.copy_from_slice(bytemuck::bytes_of(&encoded));
            }
            (UniformValue::Int(v), UniformKind::Int) => out.copy_from_slice(bytemuck::bytes_of(v)),
            (UniformValue::Vec3(v), UniformKind::Vec3) => {
                let raw: [f32; 3] = (*v).into();
                out.copy_from_slice(bytemuck::cast_slice(&raw));
            }
            (UniformValue::Vec4(v), UniformKind::Vec4) => {
                let raw: [f32; 4] = (*v).into();
                out.copy_from_slice(bytemuck::cast_slice(&raw));
            }
            (UniformValue::Mat4(m), UniformKind::Mat4) => {
                let raw: [[f32; 4]; 4] = (*m).into();
                out.copy_from_slice(bytemuck::cast_slice(&raw));
            }
            _ => return false,
        }
        true
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::Bool(value)
    }
}

impl From<Vector3<f32>> for UniformValue {
    fn from(value: Vector3<f32>) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<Vector4<f32>> for UniformValue {
    fn from(value: Vector4<f32>) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<Matrix4<f32>> for UniformValue {
    fn from(value: Matrix4<f32>) -> Self {
        UniformValue::Mat4(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_is_stored_as_float() {
        let mut out = [0u8; 4];
        assert!(UniformValue::Bool(true).write_to(UniformKind::Float, &mut out));
        assert_eq!(f32::from_le_bytes(out), 1.0);
        assert!(UniformValue::Bool(false).write_to(UniformKind::Float, &mut out));
        assert_eq!(f32::from_le_bytes(out), 0.0);
    }

    #[test]
    fn matrices_are_written_column_major() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let mut out = [0u8; 64];
        assert!(UniformValue::Mat4(m).write_to(UniformKind::Mat4, &mut out));
        let floats: Vec<f32> = out
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn mismatched_kind_is_rejected() {
        let mut out = [0u8; 12];
        assert!(!UniformValue::Float(1.0).write_to(UniformKind::Vec3, &mut out[..12]));
    }
}
