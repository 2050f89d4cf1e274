//! The shader program: a vertex and a fragment stage compiled and linked
//! into one render pipeline.
//!
//! Both stages are WGSL files read from the resource directory. "Compiling"
//! parses and validates a stage with naga, so errors surface with readable
//! diagnostics before anything reaches the device. "Linking" checks that every
//! input the fragment stage reads is written by the vertex stage.

use std::{
    borrow::Cow,
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
};

use wgpu::naga;

use crate::{
    data_structures::{shape::ShapeVertex, texture::Texture},
    pipelines::basic::mk_render_pipeline,
};

pub const VERTEX_SHADER: &str = "simple_vert.wgsl";
pub const FRAGMENT_SHADER: &str = "simple_frag.wgsl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn entry_point(&self) -> &'static str {
        match self {
            Stage::Vertex => "vs_main",
            Stage::Fragment => "fs_main",
        }
    }

    fn naga_stage(&self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A shader stage failed to load, compile or link.
#[derive(Debug)]
pub struct ShaderError {
    /// `None` when the failure is in linking both stages together.
    pub stage: Option<Stage>,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            Some(stage) => write!(
                f,
                "{} shader {} failed: {}",
                stage,
                self.path.display(),
                self.message
            ),
            None => write!(f, "linking {} failed: {}", self.path.display(), self.message),
        }
    }
}

impl std::error::Error for ShaderError {}

/// A validated shader stage.
#[derive(Debug)]
pub struct CompiledShader {
    pub stage: Stage,
    pub path: PathBuf,
    pub source: String,
    module: naga::Module,
}

impl CompiledShader {
    pub fn compile(stage: Stage, path: &Path, source: String) -> Result<Self, ShaderError> {
        let fail = |message: String| ShaderError {
            stage: Some(stage),
            path: path.to_path_buf(),
            message,
        };

        let module = naga::front::wgsl::parse_str(&source)
            .map_err(|e| fail(e.emit_to_string(&source)))?;
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| fail(e.emit_to_string(&source)))?;

        let has_entry_point = module
            .entry_points
            .iter()
            .any(|ep| ep.name == stage.entry_point() && ep.stage == stage.naga_stage());
        if !has_entry_point {
            return Err(fail(format!(
                "missing @{} entry point `{}`",
                stage,
                stage.entry_point()
            )));
        }

        Ok(Self {
            stage,
            path: path.to_path_buf(),
            source,
            module,
        })
    }

    fn entry_point(&self) -> Option<&naga::EntryPoint> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == self.stage.entry_point())
    }

    /// User-defined `@location`s written by a vertex entry point.
    fn output_locations(&self) -> BTreeSet<u32> {
        let mut locations = BTreeSet::new();
        if let Some(result) = self.entry_point().and_then(|ep| ep.function.result.as_ref()) {
            collect_locations(&self.module, result.ty, result.binding.as_ref(), &mut locations);
        }
        locations
    }

    /// User-defined `@location`s read by a fragment entry point.
    fn input_locations(&self) -> BTreeSet<u32> {
        let mut locations = BTreeSet::new();
        if let Some(ep) = self.entry_point() {
            for arg in &ep.function.arguments {
                collect_locations(&self.module, arg.ty, arg.binding.as_ref(), &mut locations);
            }
        }
        locations
    }

    fn descriptor(&self) -> wgpu::ShaderModuleDescriptor<'_> {
        wgpu::ShaderModuleDescriptor {
            label: Some(self.stage.entry_point()),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&self.source)),
        }
    }
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(naga::Binding::BuiltIn(_)) => (),
        None => {
            if let naga::TypeInner::Struct { ref members, .. } = module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// A linked vertex + fragment pair.
#[derive(Debug)]
pub struct Program {
    pub vertex: CompiledShader,
    pub fragment: CompiledShader,
}

impl Program {
    /// Reads, compiles and links `simple_vert.wgsl` and `simple_frag.wgsl`
    /// from `resource_dir`.
    pub async fn load(resource_dir: &Path, verbose: bool) -> Result<Self, ShaderError> {
        let vertex = load_stage(Stage::Vertex, &resource_dir.join(VERTEX_SHADER), verbose).await?;
        let fragment =
            load_stage(Stage::Fragment, &resource_dir.join(FRAGMENT_SHADER), verbose).await?;
        let program = Self::link(vertex, fragment)?;
        if verbose {
            log::info!("Linked shader program from {}", resource_dir.display());
        }
        Ok(program)
    }

    pub fn link(vertex: CompiledShader, fragment: CompiledShader) -> Result<Self, ShaderError> {
        let written = vertex.output_locations();
        let read = fragment.input_locations();
        if let Some(missing) = read.difference(&written).next() {
            return Err(ShaderError {
                stage: None,
                path: fragment.path.clone(),
                message: format!(
                    "fragment input @location({}) is not written by {}",
                    missing,
                    vertex.path.display()
                ),
            });
        }
        Ok(Self { vertex, fragment })
    }

    /// Creates the render pipeline. Bind group 0 holds `P`, group 1 holds `MV`.
    pub fn build_pipeline(
        &self,
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        projection_layout: &wgpu::BindGroupLayout,
        model_view_layout: &wgpu::BindGroupLayout,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simple Pipeline Layout"),
            bind_group_layouts: &[Some(projection_layout), Some(model_view_layout)],
            ..Default::default()
        });
        mk_render_pipeline(
            device,
            &layout,
            color_format,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            &[ShapeVertex::desc()],
            self.vertex.descriptor(),
            self.fragment.descriptor(),
        )
    }
}

async fn load_stage(stage: Stage, path: &Path, verbose: bool) -> Result<CompiledShader, ShaderError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ShaderError {
            stage: Some(stage),
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    match CompiledShader::compile(stage, path, source) {
        Ok(shader) => {
            if verbose {
                log::info!("Compiled {} shader {}", stage, path.display());
            }
            Ok(shader)
        }
        Err(e) => {
            if verbose {
                log::error!("{}", e);
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERT: &str = "
struct Out {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) normal: vec3<f32>,
};
@vertex
fn vs_main(@location(0) pos: vec3<f32>, @location(1) nor: vec3<f32>) -> Out {
    var out: Out;
    out.clip_position = vec4<f32>(pos, 1.0);
    out.normal = nor;
    return out;
}
";

    const FRAG_READS_ONE: &str = "
@fragment
fn fs_main(@location(1) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
";

    fn bundled(file: &str) -> (PathBuf, String) {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources").join(file);
        let source = std::fs::read_to_string(&path).unwrap();
        (path, source)
    }

    #[test]
    fn bundled_shaders_compile_and_link() {
        let (vp, vs) = bundled(VERTEX_SHADER);
        let (fp, fs) = bundled(FRAGMENT_SHADER);
        let vertex = CompiledShader::compile(Stage::Vertex, &vp, vs).unwrap();
        let fragment = CompiledShader::compile(Stage::Fragment, &fp, fs).unwrap();
        assert_eq!(vertex.output_locations(), BTreeSet::from([0]));
        assert!(Program::link(vertex, fragment).is_ok());
    }

    #[test]
    fn syntax_error_is_reported_with_stage() {
        let err = CompiledShader::compile(
            Stage::Vertex,
            Path::new("broken.wgsl"),
            "fn vs_main( {".to_string(),
        )
        .unwrap_err();
        assert_eq!(err.stage, Some(Stage::Vertex));
        assert!(err.to_string().starts_with("vertex shader broken.wgsl failed"));
    }

    #[test]
    fn type_error_fails_validation() {
        let source = "
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    let x: f32 = 1u;
    return vec4<f32>(x);
}
";
        assert!(CompiledShader::compile(Stage::Fragment, Path::new("f.wgsl"), source.into()).is_err());
    }

    #[test]
    fn wrong_entry_point_is_rejected() {
        let err = CompiledShader::compile(Stage::Fragment, Path::new("v.wgsl"), VERT.into())
            .unwrap_err();
        assert!(err.message.contains("fs_main"));
    }

    #[test]
    fn link_rejects_unwritten_fragment_inputs() {
        let vertex = CompiledShader::compile(Stage::Vertex, Path::new("v.wgsl"), VERT.into()).unwrap();
        let fragment =
            CompiledShader::compile(Stage::Fragment, Path::new("f.wgsl"), FRAG_READS_ONE.into())
                .unwrap();
        let err = Program::link(vertex, fragment).unwrap_err();
        assert_eq!(err.stage, None);
        assert!(err.message.contains("@location(1)"));
    }

    #[tokio::test]
    async fn missing_shader_file_is_a_shader_error() {
        let err = Program::load(Path::new("/no/such/dir"), false).await.unwrap_err();
        assert_eq!(err.stage, Some(Stage::Vertex));
    }

    #[tokio::test]
    async fn loads_bundled_program() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources");
        let program = Program::load(&dir, false).await.unwrap();
        assert_eq!(program.fragment.stage, Stage::Fragment);
    }
}
