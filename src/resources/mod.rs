//! Loading of meshes and textures from external files.
//!
//! The [`AssetLoader`] owns every GPU buffer and texture it creates. Models and
//! materials only carry ids into its registries, and nothing is released until
//! [`AssetLoader::cleanup`] runs at shutdown.

pub mod mesh;
pub mod texture;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use wgpu::util::DeviceExt;

use crate::{
    context::GpuContext,
    data_structures::{
        model::{Model, ModelId},
        texture::{GpuTexture, Texture, TextureId},
    },
    error::AssetError,
    resources::{
        mesh::{MeshData, parse_obj},
        texture::{decode_image, load_binary, load_string, resolve, texture_layout},
    },
};

/// Vertex and index buffers of one loaded model.
#[derive(Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug)]
struct TextureEntry {
    texture: GpuTexture,
    bind_group: wgpu::BindGroup,
}

pub struct AssetLoader {
    device: wgpu::Device,
    queue: wgpu::Queue,
    root: PathBuf,
    layout: wgpu::BindGroupLayout,
    meshes: HashMap<ModelId, GpuMesh>,
    textures: HashMap<TextureId, TextureEntry>,
    default_texture: TextureEntry,
    next_model: u32,
    next_texture: u32,
}

impl AssetLoader {
    pub fn new(ctx: &GpuContext, root: impl Into<PathBuf>) -> Self {
        Self::with_device(ctx.device.clone(), ctx.queue.clone(), root)
    }

    /// A loader on a bare device, without a window surface.
    pub fn with_device(device: wgpu::Device, queue: wgpu::Queue, root: impl Into<PathBuf>) -> Self {
        let layout = texture_layout(&device);
        let white = GpuTexture::create_solid([255, 255, 255, 255], &device, &queue, "default_texture");
        let default_texture = TextureEntry {
            bind_group: white.bind_group(&device, &layout),
            texture: white,
        };
        Self {
            device,
            queue,
            root: root.into(),
            layout,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            default_texture,
            next_model: 1,
            next_texture: 1,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load an OBJ file relative to the asset root.
    pub fn load_model(&mut self, file_name: &str) -> anyhow::Result<Model> {
        let text = load_string(&self.root, file_name)?;
        let model = self.load_model_from_str(file_name, &text)?;
        log::info!(
            "Loaded model {file_name} ({} indices) as {:?}",
            model.index_count(),
            model.id()
        );
        Ok(model)
    }

    /// Decode OBJ text that is already in memory. `name` only labels errors
    /// and GPU resources.
    pub fn load_model_from_str(&mut self, name: &str, text: &str) -> Result<Model, AssetError> {
        let mesh = parse_obj(text, Path::new(name))?;
        Ok(self.upload_mesh(name, &mesh))
    }

    pub fn upload_mesh(&mut self, name: &str, mesh: &MeshData) -> Model {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let id = ModelId(self.next_model);
        self.next_model += 1;
        let index_count = mesh.indices.len() as u32;
        self.meshes.insert(
            id,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count,
            },
        );
        Model::new(id, mesh.vertices.len() as u32, index_count)
    }

    /// Decode an image file relative to the asset root into an RGBA texture.
    pub fn load_texture(&mut self, file_name: &str) -> anyhow::Result<Texture> {
        let bytes = load_binary(&self.root, file_name)?;
        let path = resolve(&self.root, file_name);
        let image = decode_image(&bytes, &path)?;
        let texture = GpuTexture::from_image(&self.device, &self.queue, &image, Some(file_name));
        let bind_group = texture.bind_group(&self.device, &self.layout);

        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, TextureEntry { texture, bind_group });
        log::info!("Loaded texture {file_name} as {id:?}");
        Ok(Texture::new(id))
    }

    pub fn mesh(&self, id: ModelId) -> Result<&GpuMesh, AssetError> {
        self.meshes.get(&id).ok_or(AssetError::UnknownModel(id))
    }

    /// Bind group of `texture`, or of the white fallback for `None`.
    pub fn texture_bind_group(&self, texture: Option<Texture>) -> Result<&wgpu::BindGroup, AssetError> {
        match texture {
            None => Ok(&self.default_texture.bind_group),
            Some(texture) => self
                .textures
                .get(&texture.id())
                .map(|entry| &entry.bind_group)
                .ok_or(AssetError::UnknownTexture(texture.id())),
        }
    }

    pub fn model_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Release every buffer and texture this loader created.
    pub fn cleanup(&mut self) {
        if self.meshes.is_empty() && self.textures.is_empty() {
            return;
        }
        log::info!(
            "Releasing {} meshes and {} textures",
            self.meshes.len(),
            self.textures.len()
        );
        for (_, mesh) in self.meshes.drain() {
            mesh.vertex_buffer.destroy();
            mesh.index_buffer.destroy();
        }
        for (_, entry) in self.textures.drain() {
            entry.texture.destroy();
        }
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.cleanup();
        self.default_texture.texture.destroy();
    }
}
