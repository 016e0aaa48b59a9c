//! Error types for terrain construction and generation.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors surfaced by terrain construction and pipeline runs.
///
/// Degenerate geometry and out-of-range neighbour lookups are handled where they
/// occur and never show up here.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("Invalid grid dimensions {width}x{height}: both sides must be at least 2")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Expected {expected} elevations for the grid, got {actual}")]
    ElevationCount { expected: usize, actual: usize },

    #[error("Drop centre ({row}, {col}) lies outside the {width}x{height} grid")]
    InvalidDropCenter {
        row: u32,
        col: u32,
        width: u32,
        height: u32,
    },

    #[error("Failed to allocate {what} ({requested} elements): {source}")]
    Allocation {
        what: &'static str,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("Texture '{name}' could not be loaded: {reason}")]
    Texture { name: String, reason: String },

    #[error("Generation stopped at stage '{stage}': {source}")]
    StageFailed {
        stage: &'static str,
        #[source]
        source: Box<TerrainError>,
    },
}

impl TerrainError {
    /// Wrap an error raised while running the named pipeline stage.
    pub fn at_stage(stage: &'static str, source: TerrainError) -> Self {
        Self::StageFailed {
            stage,
            source: Box::new(source),
        }
    }
}

/// Allocate a zero-initialised buffer of `len` elements, reporting failure
/// instead of aborting.
pub fn try_alloc<T: Clone>(what: &'static str, len: usize, fill: T) -> Result<Vec<T>, TerrainError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|source| TerrainError::Allocation {
            what,
            requested: len,
            source,
        })?;
    buf.resize(len, fill);
    Ok(buf)
}
