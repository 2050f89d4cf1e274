use wgpu::util::DeviceExt;

use crate::matrix::Mat4;

/// A single 4x4 matrix as laid out in a WGSL uniform (`mat4x4<f32>`).
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixUniform {
    pub matrix: Mat4,
}

impl From<Mat4> for MatrixUniform {
    fn from(matrix: Mat4) -> Self {
        Self { matrix }
    }
}

pub fn mk_buffer(device: &wgpu::Device, label: &str, uniform: MatrixUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(&[uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// Layout of a bind group holding one matrix uniform at binding 0, visible to
/// the vertex stage.
pub fn mk_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<MatrixUniform>() as u64),
            },
            count: None,
        }],
        label: Some(label),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_a_bare_column_major_matrix() {
        assert_eq!(std::mem::size_of::<MatrixUniform>(), 64);
        let uniform = MatrixUniform::from(Mat4::translate(1.0, 2.0, 3.0));
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&uniform));
        assert_eq!(&floats[12..15], &[1.0, 2.0, 3.0]);
    }
}
