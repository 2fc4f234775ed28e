//! Render configuration loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable config files.
//! Every field is optional in the file; missing ones take their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{RasterSettings, HEIGHT, WIDTH};

/// Config file looked up in the working directory at startup
pub const CONFIG_PATH: &str = "softras.ron";

/// Everything the demo needs to set up a window, a camera and a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Initial screen width in pixels
    pub width: usize,
    /// Initial screen height in pixels
    pub height: usize,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Number of points in the star field
    pub star_count: usize,
    pub star_seed: u64,
    /// Image applied to the demo triangles (falls back to a checkerboard)
    pub texture_path: String,
    /// Optional mesh file drawn in front of the camera
    pub mesh_path: Option<String>,
    pub raster: RasterSettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            fov: 45.0,
            near: 1.0,
            far: 45.0,
            star_count: 2000,
            star_seed: 1,
            texture_path: "assets/brick.png".to_string(),
            mesh_path: None,
            raster: RasterSettings::default(),
        }
    }
}

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::SerializeError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

/// Load a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load a config from a RON string
pub fn load_config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    Ok(ron::from_str(s)?)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load `path` if it exists, otherwise fall back to defaults.
/// A file that exists but fails to parse is reported and ignored.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> RenderConfig {
    let path = path.as_ref();
    if !path.exists() {
        return RenderConfig::default();
    }

    match load_config(path) {
        Ok(config) => {
            println!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            eprintln!("Ignoring {}: {}", path.display(), e);
            RenderConfig::default()
        }
    }
}
