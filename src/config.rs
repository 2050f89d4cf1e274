//! Startup configuration.
//!
//! The only runtime input is an optional positional argument naming the
//! resource directory; everything else has a fixed default.

use std::path::PathBuf;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `cube.obj` and the shader sources.
    pub resource_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_colour: wgpu::Color,
    /// Log shader diagnostics per stage while building the program.
    pub verbose_shaders: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources"),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: "HI".to_string(),
            clear_colour: wgpu::Color {
                r: 0.12,
                g: 0.34,
                b: 0.56,
                a: 1.0,
            },
            verbose_shaders: true,
        }
    }
}

impl Config {
    /// Builds the config from process arguments, program name included.
    ///
    /// The first argument after the program name overrides the resource
    /// directory. Any further arguments are ignored.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter().skip(1).map(Into::into);
        if let Some(dir) = args.next() {
            config.resource_dir = PathBuf::from(dir);
        }
        let ignored: Vec<String> = args.collect();
        if !ignored.is_empty() {
            log::warn!("Ignoring extra arguments: {:?}", ignored);
        }
        config
    }

    pub fn resource(&self, file_name: &str) -> PathBuf {
        self.resource_dir.join(file_name)
    }
}
