//! Sandbox configuration. Loaded from terrain.ron at startup.

use procgen::TerrainConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Terrain parameters plus the scripted session to play against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SandboxConfig {
    #[serde(default)]
    pub terrain: TerrainConfig,
    /// Minimum height the observer keeps above the surface.
    #[serde(default = "default_clearance")]
    pub clearance: f32,
    /// Distance covered per frame of held movement.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Observer start position (x, y, z) in grid units.
    #[serde(default = "default_start")]
    pub start: [f32; 3],
    /// Whitespace-separated frames; each frame lists the keys held (`.` = none).
    #[serde(default = "default_script")]
    pub script: String,
}

fn default_clearance() -> f32 {
    physics::GroundQuery::DEFAULT_CLEARANCE
}
fn default_move_speed() -> f32 {
    0.5
}
fn default_start() -> [f32; 3] {
    [10.0, 40.0, 10.0]
}
fn default_script() -> String {
    "wwwwwwwwwwwwwwwwwwwwwwww dddddddd qqqqqqqqqqqqqqqqqqqq wwwwwwwwwwww . g . eeee wwww".to_string()
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            clearance: default_clearance(),
            move_speed: default_move_speed(),
            start: default_start(),
            script: default_script(),
        }
    }
}

impl SandboxConfig {
    /// Load config from `path`, or `terrain.ron` in the current directory. If the file is
    /// missing or invalid, returns default config.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        match std::fs::read_to_string(&path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("terrain.ron")
}
