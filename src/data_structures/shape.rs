//! GPU-resident meshes and the shapes that draw them.
//!
//! A [`Mesh`] owns the uploaded vertex and index buffers. A [`Shape`] pairs a
//! shared mesh with its own model-view uniform so several shapes can reuse one
//! mesh while being placed independently.

use std::sync::Arc;

use crate::{
    matrix::Mat4,
    pipelines::uniform::{MatrixUniform, mk_bind_group, mk_buffer},
};

/// Bind group slot of the projection matrix.
pub const PROJECTION_GROUP: u32 = 0;
/// Bind group slot of the per-shape model-view matrix.
pub const MODEL_VIEW_GROUP: u32 = 1;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl ShapeVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    /// Layout of the vertex buffer: `vertPos`, `vertNor` and `vertTex` at
    /// shader locations 0, 1 and 2.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

#[derive(Debug)]
pub struct Shape {
    pub name: String,
    pub mesh: Arc<Mesh>,
    model_view: MatrixUniform,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Shape {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        mesh: Arc<Mesh>,
        model_view_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let model_view = MatrixUniform::default();
        let buffer = mk_buffer(device, &format!("{name} MV Buffer"), model_view);
        let bind_group = mk_bind_group(device, model_view_layout, &buffer);
        Self {
            name: name.to_string(),
            mesh,
            model_view,
            buffer,
            bind_group,
        }
    }

    /// Stores the new model-view matrix and queues its upload.
    pub fn set_model_view(&mut self, queue: &wgpu::Queue, mv: Mat4) {
        self.model_view.matrix = mv;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.model_view]));
    }
}

pub trait DrawShape {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_shape(&mut self, shape: &Shape);
}

impl DrawShape for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }

    fn draw_shape(&mut self, shape: &Shape) {
        self.set_bind_group(MODEL_VIEW_GROUP, &shape.bind_group, &[]);
        self.draw_mesh(&shape.mesh);
    }
}
