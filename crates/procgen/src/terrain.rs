//! The terrain entity: configuration, the height field it owns, and regeneration.
//!
//! **Seed-based determinism:** noise and particle drops are both derived from
//! `config.seed`, so the same seed and the same sequence of regenerations always
//! produce the same terrain.

use engine_core::{TerrainError, TerrainTextures, TextureNames, TextureProvider};
use serde::{Deserialize, Serialize};

use crate::deposition::ParticleDepositor;
use crate::heightfield::HeightField;
use crate::mesh::{MeshRenderer, TerrainMesh};
use crate::normals::recompute_normals;
use crate::pipeline::{GenerationGuard, Stage, TerrainPipeline};
use crate::smoothing::SmoothingPolicy;
use crate::volcano::VolcanoShaper;

/// Configuration for terrain generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Number of columns (world X).
    pub width: u32,
    /// Number of rows (world Z).
    pub height: u32,
    /// Seed for noise and particle drops.
    pub seed: u64,
    /// `(row, col)` of the deposition centre. None = middle of the grid.
    pub drop_center: Option<(u32, u32)>,
    /// Most particles one deposition pass may release.
    pub particle_count: u32,
    /// Deposition stops once a settling particle lifts a cell to this height.
    pub particle_target_height: f32,
    /// Elevation added per settled particle.
    pub particle_increment: f32,
    /// Cells at or above this elevation are folded into the crater.
    pub volcano_threshold: f32,
    pub crater_depth_scale: f32,
    pub smoothing: SmoothingPolicy,
    /// Texture tiling period in cells.
    pub texture_repeat: u32,
    /// Sculpt on top of the current field instead of flattening before each run.
    pub accumulate: bool,
    pub textures: TextureNames,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            seed: 0,
            drop_center: None,
            particle_count: 1_000_000,
            particle_target_height: 25.0,
            particle_increment: ParticleDepositor::DEFAULT_INCREMENT,
            volcano_threshold: 20.0,
            crater_depth_scale: 1.5,
            smoothing: SmoothingPolicy::InPlace,
            texture_repeat: 32,
            accumulate: false,
            textures: TextureNames::default(),
        }
    }
}

impl TerrainConfig {
    /// Flat index of the deposition centre, checked against the grid.
    pub fn drop_center_index(&self, field: &HeightField) -> Result<usize, TerrainError> {
        let (row, col) = self
            .drop_center
            .unwrap_or((field.height() / 2, field.width() / 2));
        if row >= field.height() || col >= field.width() {
            return Err(TerrainError::InvalidDropCenter {
                row,
                col,
                width: field.width(),
                height: field.height(),
            });
        }
        Ok(field.index(row, col))
    }

    fn pipeline(&self, center: usize) -> TerrainPipeline {
        TerrainPipeline::standard(
            self.seed,
            ParticleDepositor {
                center,
                target_height: self.particle_target_height,
                increment: self.particle_increment,
                particle_budget: self.particle_count,
            },
            self.smoothing,
            VolcanoShaper {
                threshold: self.volcano_threshold,
                depth_scale: self.crater_depth_scale,
            },
        )
    }
}

/// A generated terrain and everything needed to regenerate it.
pub struct Terrain {
    config: TerrainConfig,
    field: HeightField,
    pipeline: TerrainPipeline,
    guard: GenerationGuard,
    textures: TerrainTextures,
    mesh: TerrainMesh,
}

impl Terrain {
    /// Allocate a flat field, resolve textures and run the pipeline once.
    pub fn new(config: TerrainConfig, provider: &mut dyn TextureProvider) -> Result<Self, TerrainError> {
        let mut field = HeightField::new(config.width, config.height)?;
        recompute_normals(&mut field)?;
        field.compute_texcoords(config.texture_repeat);

        let textures = TerrainTextures::load(provider, &config.textures)?;
        let center = config.drop_center_index(&field)?;
        let pipeline = config.pipeline(center);
        let mesh = TerrainMesh::from_field(&field)?;

        let mut terrain = Self {
            config,
            field,
            pipeline,
            guard: GenerationGuard::default(),
            textures,
            mesh,
        };
        terrain.generate()?;
        Ok(terrain)
    }

    /// Run the full pipeline and rebuild the mesh.
    ///
    /// Unless `accumulate` is set the field is flattened first. On failure the
    /// previous mesh is kept and the field holds the last completed pass.
    pub fn generate(&mut self) -> Result<Stage, TerrainError> {
        if !self.config.accumulate {
            self.clear();
        }
        let stage = self.pipeline.run(&mut self.field)?;
        self.mesh = TerrainMesh::from_field(&self.field)?;
        Ok(stage)
    }

    /// Feed the regenerate key state. Returns whether a run happened.
    pub fn on_generate_key(&mut self, pressed: bool) -> Result<bool, TerrainError> {
        if !self.guard.on_key(pressed) {
            return Ok(false);
        }
        let result = self.generate();
        self.guard.finish();
        result.map(|_| true)
    }

    /// Flatten the field back to elevation 0 and rebuild the mesh to match.
    pub fn reset(&mut self) -> Result<(), TerrainError> {
        self.clear();
        self.mesh = TerrainMesh::from_field(&self.field)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.field.flatten();
        self.pipeline.rewind();
    }

    /// Hand the current mesh to the renderer.
    pub fn upload(&self, renderer: &mut dyn MeshRenderer) -> anyhow::Result<()> {
        renderer.upload(&self.mesh)
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn textures(&self) -> &TerrainTextures {
        &self.textures
    }

    pub fn stage(&self) -> Stage {
        self.pipeline.stage()
    }

    pub fn is_generating(&self) -> bool {
        self.guard.is_in_progress()
    }
}
