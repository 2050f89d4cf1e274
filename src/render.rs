//! Per-frame rendering of the "HI" scene.
//!
//! [`Renderer`] owns the linked pipeline, the projection uniform and one
//! [`Shape`] per letter part. It is independent of the window surface, so
//! the same renderer draws into a swapchain image or an offscreen texture.

use std::sync::Arc;

use crate::{
    config::Config,
    data_structures::shape::{DrawShape, PROJECTION_GROUP, Shape},
    pipelines::{
        program::Program,
        uniform::{self, MatrixUniform},
    },
    resources,
    scene::{self, Part},
};

pub const MESH_FILE: &str = "cube.obj";

#[derive(Debug)]
pub struct Renderer {
    pipeline: wgpu::RenderPipeline,
    projection: MatrixUniform,
    projection_buffer: wgpu::Buffer,
    projection_bind_group: wgpu::BindGroup,
    shapes: Vec<(Part, Shape)>,
}

impl Renderer {
    /// Compiles the shader program, loads the cube mesh and creates one shape
    /// per letter part.
    ///
    /// Shader failures come back as a [`crate::pipelines::program::ShaderError`]
    /// inside the `anyhow::Error`.
    pub async fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        config: &Config,
    ) -> anyhow::Result<Self> {
        let program = Program::load(&config.resource_dir, config.verbose_shaders).await?;

        let projection_layout = uniform::mk_bind_group_layout(device, "projection_bind_group_layout");
        let model_view_layout = uniform::mk_bind_group_layout(device, "model_view_bind_group_layout");
        let pipeline =
            program.build_pipeline(device, color_format, &projection_layout, &model_view_layout);

        let projection = MatrixUniform::default();
        let projection_buffer = uniform::mk_buffer(device, "P Buffer", projection);
        let projection_bind_group =
            uniform::mk_bind_group(device, &projection_layout, &projection_buffer);

        // All parts are the same cube; upload it once and share it.
        let mesh = Arc::new(resources::load_mesh(&config.resource(MESH_FILE), device).await?);
        let shapes = Part::ALL
            .iter()
            .map(|&part| {
                (
                    part,
                    Shape::new(device, part.label(), mesh.clone(), &model_view_layout),
                )
            })
            .collect();

        Ok(Self {
            pipeline,
            projection,
            projection_buffer,
            projection_bind_group,
            shapes,
        })
    }

    /// Recomputes `P` for the framebuffer size and `MV` of every part for
    /// `elapsed` seconds, and queues the uploads.
    pub fn update(&mut self, queue: &wgpu::Queue, elapsed: f32, width: u32, height: u32) {
        self.projection.matrix = scene::clip_projection(width, height);
        queue.write_buffer(
            &self.projection_buffer,
            0,
            bytemuck::cast_slice(&[self.projection]),
        );
        for (part, shape) in self.shapes.iter_mut() {
            shape.set_model_view(queue, part.model_view(elapsed));
        }
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(PROJECTION_GROUP, &self.projection_bind_group, &[]);
        for (_, shape) in &self.shapes {
            render_pass.draw_shape(shape);
        }
    }
}

/// Begins a pass that clears `color` to `clear_colour` and `depth` to the far
/// plane. Whatever the caller records into it is depth tested.
pub fn begin_frame_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    color: &wgpu::TextureView,
    depth: &wgpu::TextureView,
    clear_colour: wgpu::Color,
) -> wgpu::RenderPass<'e> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Render Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: color,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_colour),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: depth,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
        ..Default::default()
    })
}
