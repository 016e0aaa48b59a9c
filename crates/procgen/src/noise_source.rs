//! Coherent 2D noise with an advancing phase offset.
//!
//! Each noise pass first moves the phase by one cell on both axes, so repeated
//! passes sample fresh regions of the same Perlin field and add onto whatever
//! the grid already holds.

use glam::Vec2;
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::heightfield::HeightField;

/// Derive a deterministic u32 noise seed from a world seed and an offset.
/// Same (seed, offset) always gives the same result so terrain is reproducible.
#[inline]
pub fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// How grid coordinates are scaled into noise space and how strongly the result lands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Grid coordinates are divided by this before sampling (larger = broader features).
    pub divisor: f32,
    /// Multiplier applied to the raw noise value.
    pub amplitude: f32,
}

impl NoiseProfile {
    /// Broad hills for the base shape.
    pub const LOW_FREQUENCY: Self = Self {
        divisor: 12.0,
        amplitude: 10.0,
    };

    /// Fine surface detail.
    pub const HIGH_FREQUENCY: Self = Self {
        divisor: 2.0,
        amplitude: 1.0,
    };
}

/// Seeded Perlin noise plus the phase offset that successive passes advance.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    perlin: Perlin,
    phase: Vec2,
}

impl NoiseSource {
    pub const INITIAL_PHASE: Vec2 = Vec2::ONE;

    pub fn new(seed: u64) -> Self {
        Self {
            perlin: Perlin::new(deterministic_noise_seed(seed, 0)),
            phase: Self::INITIAL_PHASE,
        }
    }

    pub fn phase(&self) -> Vec2 {
        self.phase
    }

    /// Move the phase one cell along both axes.
    pub fn advance(&mut self) {
        self.phase += Vec2::ONE;
    }

    /// Raw noise at a point in noise space, roughly in [-1, 1].
    pub fn sample(&self, coord: Vec2) -> f32 {
        self.perlin.get([coord.x as f64, coord.y as f64]) as f32
    }

    /// Scaled noise for grid cell `(row, col)` under `profile` at the current phase.
    pub fn sample_cell(&self, row: u32, col: u32, profile: NoiseProfile) -> f32 {
        let coord = (Vec2::new(col as f32, row as f32) + self.phase) / profile.divisor;
        self.sample(coord) * profile.amplitude
    }

    /// Advance the phase, then add scaled noise to every sample's elevation.
    pub fn apply(&mut self, field: &mut HeightField, profile: NoiseProfile) {
        self.advance();
        for row in 0..field.height() {
            for col in 0..field.width() {
                let index = field.index(row, col);
                field.add_elevation(index, self.sample_cell(row, col, profile));
            }
        }
        log::debug!(
            "Noise pass (divisor {}, amplitude {}) at phase {:?}",
            profile.divisor,
            profile.amplitude,
            self.phase
        );
    }
}
