use std::{iter, num::NonZeroU64};

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::{
    context::GpuContext,
    data_structures::{
        model::{Model, ModelId},
        texture::Texture,
    },
    render::DrawTarget,
    resources::AssetLoader,
    shader::ShaderProgram,
};

enum Command {
    Model(ModelId),
    Texture(Option<Texture>),
    Draw { index_count: u32, offset: u32 },
}

/// Records one frame of draw calls and replays them in a single render pass.
///
/// Every draw carries its own copy of the uniform block. All copies are
/// packed into one buffer at `min_uniform_buffer_offset_alignment` strides
/// and selected per draw with a dynamic offset.
pub struct GpuFrame<'a> {
    ctx: &'a GpuContext,
    assets: &'a AssetLoader,
    clear_colour: Option<wgpu::Color>,
    commands: Vec<Command>,
    uniforms: Vec<u8>,
    stride: usize,
}

impl<'a> GpuFrame<'a> {
    pub fn new(ctx: &'a GpuContext, assets: &'a AssetLoader) -> Self {
        Self {
            ctx,
            assets,
            clear_colour: None,
            commands: Vec::new(),
            uniforms: Vec::new(),
            stride: 0,
        }
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. }))
            .count()
    }

    /// Submit the recorded frame and present it.
    pub fn finish(self, program: &ShaderProgram) -> anyhow::Result<()> {
        let gpu = program
            .gpu()
            .context("the shader program has not been uploaded to the GPU")?;
        let Some(output) = self.ctx.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let device = &self.ctx.device;

        let uniform_buffer = (!self.uniforms.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Frame Uniform Buffer"),
                contents: &self.uniforms,
                usage: wgpu::BufferUsages::UNIFORM,
            })
        });
        let uniform_group = uniform_buffer.as_ref().map(|buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &gpu.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset: 0,
                        size: NonZeroU64::new(gpu.block_size),
                    }),
                }],
                label: Some("frame_uniform_bind_group"),
            })
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: self
                            .clear_colour
                            .map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&gpu.pipeline);
            for command in &self.commands {
                match command {
                    Command::Model(id) => {
                        let mesh = self.assets.mesh(*id)?;
                        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    }
                    Command::Texture(texture) => {
                        render_pass.set_bind_group(1, self.assets.texture_bind_group(*texture)?, &[]);
                    }
                    Command::Draw { index_count, offset } => {
                        if let Some(group) = &uniform_group {
                            render_pass.set_bind_group(0, group, &[*offset]);
                        }
                        render_pass.draw_indexed(0..*index_count, 0, 0..1);
                    }
                }
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl DrawTarget for GpuFrame<'_> {
    fn clear(&mut self, colour: wgpu::Color) {
        self.clear_colour = Some(colour);
    }

    fn bind_program(&mut self, program: &ShaderProgram) -> anyhow::Result<()> {
        program
            .gpu()
            .context("the shader program has not been uploaded to the GPU")?;
        let alignment = self.ctx.device.limits().min_uniform_buffer_offset_alignment as usize;
        let size = (program.uniform_block().size() as usize).max(16);
        self.stride = size.div_ceil(alignment) * alignment;
        Ok(())
    }

    fn bind_model(&mut self, model: &Model) -> anyhow::Result<()> {
        self.assets.mesh(model.id())?;
        self.commands.push(Command::Model(model.id()));
        Ok(())
    }

    fn bind_texture(&mut self, texture: Option<Texture>) -> anyhow::Result<()> {
        self.assets.texture_bind_group(texture)?;
        self.commands.push(Command::Texture(texture));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, uniforms: &[u8]) {
        let offset = self.uniforms.len();
        self.uniforms.resize(offset + self.stride.max(uniforms.len()), 0);
        self.uniforms[offset..offset + uniforms.len()].copy_from_slice(uniforms);
        self.commands.push(Command::Draw {
            index_count,
            offset: offset as u32,
        });
    }

    fn unbind_model(&mut self) {}

    fn unbind_program(&mut self) {}
}
