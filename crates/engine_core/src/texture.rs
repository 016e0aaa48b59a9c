//! Texture-provider boundary.
//!
//! Terrain never looks inside a texture. It asks a provider to resolve a name
//! into an opaque handle and hands those handles to whatever renders the mesh.

use serde::{Deserialize, Serialize};

use crate::TerrainError;

/// Opaque handle issued by a [`TextureProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Resolves texture names into handles.
pub trait TextureProvider {
    fn load(&mut self, name: &str) -> Result<TextureHandle, TerrainError>;
}

/// Names of the three terrain layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureNames {
    #[serde(default = "default_grass")]
    pub grass: String,
    #[serde(default = "default_slope")]
    pub slope: String,
    #[serde(default = "default_rock")]
    pub rock: String,
}

fn default_grass() -> String {
    "grass".to_string()
}
fn default_slope() -> String {
    "slope".to_string()
}
fn default_rock() -> String {
    "rock".to_string()
}

impl Default for TextureNames {
    fn default() -> Self {
        Self {
            grass: default_grass(),
            slope: default_slope(),
            rock: default_rock(),
        }
    }
}

/// Handles for the grass, slope and rock layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainTextures {
    pub grass: TextureHandle,
    pub slope: TextureHandle,
    pub rock: TextureHandle,
}

impl TerrainTextures {
    /// Resolve grass, slope and rock in that order. The first failure aborts.
    pub fn load(
        provider: &mut dyn TextureProvider,
        names: &TextureNames,
    ) -> Result<Self, TerrainError> {
        let grass = provider.load(&names.grass)?;
        let slope = provider.load(&names.slope)?;
        let rock = provider.load(&names.rock)?;
        log::debug!(
            "Terrain textures resolved: grass={:?} slope={:?} rock={:?}",
            grass,
            slope,
            rock
        );
        Ok(Self { grass, slope, rock })
    }
}
