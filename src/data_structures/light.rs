//! Light parameters.
//!
//! All lights are plain values: game logic owns and mutates them, the
//! renderer receives copies every frame.

use cgmath::Vector3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub colour: Vector3<f32>,
    pub direction: Vector3<f32>,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(colour: Vector3<f32>, direction: Vector3<f32>, intensity: f32) -> Self {
        Self {
            colour,
            direction,
            intensity,
        }
    }
}

/// Distance falloff: `constant + linear * d + exponent * d * d`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub exponent: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            exponent: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub colour: Vector3<f32>,
    pub position: Vector3<f32>,
    pub intensity: f32,
    pub attenuation: Attenuation,
}

impl PointLight {
    /// A light without distance falloff.
    pub fn new(colour: Vector3<f32>, position: Vector3<f32>, intensity: f32) -> Self {
        Self::with_attenuation(colour, position, intensity, Attenuation::default())
    }

    pub fn with_attenuation(
        colour: Vector3<f32>,
        position: Vector3<f32>,
        intensity: f32,
        attenuation: Attenuation,
    ) -> Self {
        Self {
            colour,
            position,
            intensity,
            attenuation,
        }
    }

    /// Written into unused shader slots; contributes nothing.
    pub fn off() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0), 0.0)
    }
}

/// A point light restricted to a cone.
///
/// `cutoff` is the cosine of the cone's half angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub point: PointLight,
    pub cone_direction: Vector3<f32>,
    pub cutoff: f32,
}

impl SpotLight {
    pub fn new(point: PointLight, cone_direction: Vector3<f32>, cutoff: f32) -> Self {
        Self {
            point,
            cone_direction,
            cutoff,
        }
    }

    pub fn off() -> Self {
        Self::new(PointLight::off(), Vector3::new(0.0, 0.0, 1.0), 1.0)
    }
}
