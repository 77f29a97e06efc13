//! Geometry handles, materials and the vertex layout.

use cgmath::Vector4;

use crate::data_structures::texture::Texture;

/// Opaque id of a mesh registered with the [`crate::resources::AssetLoader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u32);

impl ModelId {
    /// Wraps a raw id. Ids handed out by the loader start at 1.
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// White with zero alpha, the colour of an untouched material.
pub const DEFAULT_COLOUR: Vector4<f32> = Vector4 {
    x: 1.0,
    y: 1.0,
    z: 1.0,
    w: 0.0,
};

/// Surface description pushed to the shader once per model bucket.
///
/// The texture is a shared handle: several materials may point at the same
/// texture, which stays owned by the asset loader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vector4<f32>,
    pub diffuse: Vector4<f32>,
    pub specular: Vector4<f32>,
    pub reflectance: f32,
    pub texture: Option<Texture>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(DEFAULT_COLOUR, DEFAULT_COLOUR, DEFAULT_COLOUR, 0.0, None)
    }
}

impl Material {
    pub fn new(
        ambient: Vector4<f32>,
        diffuse: Vector4<f32>,
        specular: Vector4<f32>,
        reflectance: f32,
        texture: Option<Texture>,
    ) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            reflectance,
            texture,
        }
    }

    /// One colour for all three components.
    pub fn from_colour(colour: Vector4<f32>, reflectance: f32) -> Self {
        Self::new(colour, colour, colour, reflectance, None)
    }

    pub fn with_texture(texture: Texture) -> Self {
        Self {
            texture: Some(texture),
            ..Self::default()
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

/// Immutable handle to GPU-resident geometry plus its material.
///
/// The index count is fixed at load time. Entities share a model through an
/// `Rc`, the GPU buffers behind [`ModelId`] are released by the loader.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    id: ModelId,
    vertex_count: u32,
    index_count: u32,
    material: Material,
}

impl Model {
    /// Usually called by the loader once the buffers behind `id` exist.
    pub fn new(id: ModelId, vertex_count: u32, index_count: u32) -> Self {
        Self {
            id,
            vertex_count,
            index_count,
            material: Material::default(),
        }
    }

    /// Same geometry, different surface.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_texture(mut self, texture: Texture, reflectance: f32) -> Self {
        self.material.texture = Some(texture);
        self.material.reflectance = reflectance;
        self
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Number of indices issued by one draw of this model's triangle list.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn texture(&self) -> Option<Texture> {
        self.material.texture
    }
}

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
