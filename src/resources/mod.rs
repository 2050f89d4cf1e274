//! Loading meshes and shader sources from the resource directory.

use std::path::Path;

use anyhow::Context as _;

use crate::{data_structures::shape::Mesh, resources::mesh::MeshData};

pub mod mesh;

pub async fn load_string(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read {}", path.display()))
}

/// Reads an OBJ file and normalises it to the unit cube.
pub async fn load_mesh_data(path: &Path) -> anyhow::Result<MeshData> {
    let obj_text = load_string(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut data = mesh::parse_obj(&obj_text, &name).await?;
    data.resize();
    Ok(data)
}

/// [`load_mesh_data`] followed by the upload to `device`.
pub async fn load_mesh(path: &Path, device: &wgpu::Device) -> anyhow::Result<Mesh> {
    let data = load_mesh_data(path).await?;
    log::info!(
        "Loaded mesh {} with {} vertices and {} triangles",
        data.name,
        data.vertex_count(),
        data.indices.len() / 3
    );
    Ok(data.upload(device))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = load_string(Path::new("/definitely/not/here.obj"))
            .await
            .unwrap_err();
        assert!(format!("{err}").contains("/definitely/not/here.obj"));
    }

    #[tokio::test]
    async fn loads_bundled_cube() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/cube.obj");
        let data = load_mesh_data(&path).await.unwrap();
        assert_eq!(data.indices.len() / 3, 12);
    }
}
