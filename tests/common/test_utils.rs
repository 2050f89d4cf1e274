#![cfg(feature = "integration-tests")]

use std::iter;

use hi_cubes::{
    config::Config,
    data_structures::texture::Texture,
    render::{Renderer, begin_frame_pass},
};
use instant::Duration;

pub(crate) const SIZE: u32 = 256;
pub(crate) const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

pub(crate) fn f_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// A tightly packed RGBA8 image read back from the GPU.
pub(crate) struct Frame {
    pub(crate) width: u32,
    pub(crate) pixels: Vec<u8>,
}

impl Frame {
    pub(crate) fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

pub(crate) fn assert_close(actual: [u8; 4], expected: [u8; 4], tolerance: u8, what: &str) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(
            a.abs_diff(*e) <= tolerance,
            "{what}: got {actual:?}, expected {expected:?}"
        );
    }
}

pub(crate) async fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .expect("No adapter available for the integration tests");
    adapter
        .request_device(&wgpu::DeviceDescriptor::default())
        .await
        .expect("Failed to create a device")
}

/// Renders the scene `elapsed` seconds after start into an offscreen
/// `SIZE`x`SIZE` texture and reads it back.
pub(crate) async fn render_scene(config: &Config, elapsed: f32) -> Frame {
    let (device, queue) = headless_device().await;
    let mut renderer = Renderer::new(&device, FORMAT, config)
        .await
        .expect("Failed to build the renderer");
    renderer.update(&queue, elapsed, SIZE, SIZE);

    let extent = wgpu::Extent3d {
        width: SIZE,
        height: SIZE,
        depth_or_array_layers: 1,
    };
    let target = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Golden Image Test Output Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: FORMAT,
        usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth = Texture::create_depth_texture(&device, [SIZE, SIZE], "test_depth_texture");
    let view = target.create_view(&wgpu::TextureViewDescriptor::default());

    let u32_size = std::mem::size_of::<u32>() as u32;
    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        size: (u32_size * SIZE * SIZE) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        label: None,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Test Encoder"),
    });
    {
        let mut render_pass =
            begin_frame_pass(&mut encoder, &view, &depth.view, Config::default().clear_colour);
        renderer.draw(&mut render_pass);
    }
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture: &target,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &output_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(u32_size * SIZE),
                rows_per_image: Some(SIZE),
            },
        },
        extent,
    );
    queue.submit(iter::once(encoder.finish()));

    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    let buffer_slice = output_buffer.slice(..);
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).unwrap();
    });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: Some(Duration::from_secs(3)),
        })
        .unwrap();
    rx.receive().await.unwrap().unwrap();
    let pixels = buffer_slice.get_mapped_range().to_vec();

    Frame {
        width: SIZE,
        pixels,
    }
}
