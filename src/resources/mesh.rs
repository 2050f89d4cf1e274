use std::io::{BufReader, Cursor};

use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::data_structures::shape::{Mesh, ShapeVertex};

/// Triangle mesh data as read from an OBJ file, before it reaches the GPU.
///
/// All buffers share one index space (`single_index`). Normals and texture
/// coordinates are either empty or carry one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub indices: Vec<u32>,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
}

pub fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Parses OBJ text. Material libraries are not needed for drawing and are
/// skipped.
pub async fn parse_obj(obj_text: &str, name: &str) -> anyhow::Result<MeshData> {
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    let (models, _materials) =
        tobj::load_obj_buf_async(&mut obj_reader, &load_options(), |p| async move {
            log::debug!("Skipping material library {p}");
            let materials: tobj::MTLLoadResult = Ok(Default::default());
            materials
        })
        .await
        .with_context(|| format!("Could not parse mesh {name}"))?;
    MeshData::from_models(&models, name)
}

impl MeshData {
    /// Merges all objects of a file into one mesh.
    pub fn from_models(models: &[tobj::Model], name: &str) -> anyhow::Result<Self> {
        let mut data = MeshData {
            name: name.to_string(),
            ..Default::default()
        };
        for m in models {
            let offset = u32::try_from(data.vertex_count())
                .with_context(|| format!("Mesh {name} has too many vertices"))?;
            let count = m.mesh.positions.len() / 3;
            data.positions.extend_from_slice(&m.mesh.positions);
            data.normals.extend(padded(&m.mesh.normals, count * 3));
            data.tex_coords.extend(padded(&m.mesh.texcoords, count * 2));
            data.indices.extend(m.mesh.indices.iter().map(|i| i + offset));
        }
        if data.indices.is_empty() {
            anyhow::bail!("Mesh {name} contains no triangles");
        }
        if let Some(bad) = data.indices.iter().find(|&&i| i as usize >= data.vertex_count()) {
            anyhow::bail!("Mesh {name} references vertex {bad} out of range");
        }
        Ok(data)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Per-axis `(min, max)` of the positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut points = self.positions.chunks_exact(3);
        let first = points.next()?;
        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for p in points {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }

    /// Recenters the mesh on the origin and scales it uniformly so its largest
    /// extent spans `-1..1`.
    pub fn resize(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let extent = [max[0] - min[0], max[1] - min[1], max[2] - min[2]];
        let max_extent = extent[0].max(extent[1]).max(extent[2]);
        if max_extent <= f32::EPSILON {
            log::warn!("Mesh {} is degenerate and will not be resized", self.name);
            return;
        }
        let scale = 2.0 / max_extent;
        let shift = [
            min[0] + extent[0] / 2.0,
            min[1] + extent[1] / 2.0,
            min[2] + extent[2] / 2.0,
        ];
        for p in self.positions.chunks_exact_mut(3) {
            for axis in 0..3 {
                p[axis] = (p[axis] - shift[axis]) * scale;
            }
        }
    }

    pub fn vertices(&self) -> Vec<ShapeVertex> {
        (0..self.vertex_count())
            .map(|i| ShapeVertex {
                position: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                ],
                normal: [
                    self.normals[i * 3],
                    self.normals[i * 3 + 1],
                    self.normals[i * 3 + 2],
                ],
                tex_coords: [self.tex_coords[i * 2], self.tex_coords[i * 2 + 1]],
            })
            .collect()
    }

    /// Uploads vertex and index buffers to the device.
    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        let vertices = self.vertices();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Mesh {
            name: self.name.clone(),
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
        }
    }
}

// Missing attributes are zero-filled so every vertex has the same layout.
fn padded(values: &[f32], len: usize) -> impl Iterator<Item = f32> + '_ {
    values.iter().copied().chain(std::iter::repeat(0.0)).take(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "
v 0.0 0.0 0.0
v 4.0 0.0 0.0
v 0.0 2.0 -2.0
f 1 2 3
";

    const QUAD_WITH_NORMALS: &str = "
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vn 0.0 0.0 1.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[tokio::test]
    async fn triangulates_and_keeps_normals() {
        let mesh = parse_obj(QUAD_WITH_NORMALS, "quad").await.unwrap();
        assert_eq!(mesh.indices.len(), 6);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.tex_coords.len(), mesh.vertex_count() * 2);
        for v in mesh.vertices() {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
        }
    }

    #[tokio::test]
    async fn missing_normals_are_zero_filled() {
        let mesh = parse_obj(TRIANGLE, "triangle").await.unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(mesh.normals.iter().all(|n| *n == 0.0));
        assert_eq!(mesh.normals.len(), 9);
        assert_eq!(mesh.tex_coords.len(), 6);
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        assert!(parse_obj("# nothing here\n", "empty").await.is_err());
    }

    #[tokio::test]
    async fn resize_fits_largest_extent_into_unit_cube() {
        let mut mesh = parse_obj(TRIANGLE, "triangle").await.unwrap();
        mesh.resize();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min[0], -1.0);
        assert_eq!(max[0], 1.0);
        // Uniform scale keeps proportions: y spans 2 of the original 4.
        assert!((max[1] - min[1] - 1.0).abs() < 1e-6);
        assert!((max[1] + min[1]).abs() < 1e-6);
        assert!((max[2] + min[2]).abs() < 1e-6);
    }

    #[tokio::test]
    async fn bundled_cube_is_already_unit_sized() {
        let text = std::fs::read_to_string(
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/cube.obj"),
        )
        .unwrap();
        let mut mesh = parse_obj(&text, "cube.obj").await.unwrap();
        assert_eq!(mesh.indices.len(), 36);
        mesh.resize();
        assert_eq!(mesh.bounds(), Some(([-1.0; 3], [1.0; 3])));
    }

    #[test]
    fn resize_leaves_degenerate_mesh_alone() {
        let mut mesh = MeshData {
            name: "point".into(),
            positions: vec![1.0, 1.0, 1.0],
            ..Default::default()
        };
        mesh.resize();
        assert_eq!(mesh.positions, vec![1.0, 1.0, 1.0]);

        let mut empty = MeshData::default();
        empty.resize();
        assert!(empty.bounds().is_none());
    }
}
