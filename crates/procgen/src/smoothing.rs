//! Diffusion smoothing: each cell becomes the mean of itself and its existing neighbours.

use engine_core::{try_alloc, TerrainError};
use serde::{Deserialize, Serialize};

use crate::heightfield::HeightField;

/// Whether a smoothing pass reads neighbours from a snapshot or from the live grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmoothingPolicy {
    /// Update cells in row-major order, so later cells see already-smoothed
    /// values from earlier rows and columns. No scratch buffer.
    #[default]
    InPlace,
    /// Read every neighbour from a copy taken before the pass: a true 3x3 box
    /// convolution, independent of visiting order.
    Buffered,
}

/// Run one smoothing pass over the whole field.
pub fn smooth(field: &mut HeightField, policy: SmoothingPolicy) -> Result<(), TerrainError> {
    match policy {
        SmoothingPolicy::InPlace => {
            for index in 0..field.len() {
                let mean = local_mean(field, index, |i| field.elevation(i));
                field.set_elevation(index, mean);
            }
        }
        SmoothingPolicy::Buffered => {
            let mut snapshot = try_alloc("smoothing snapshot", field.len(), 0.0_f32)?;
            for (i, y) in snapshot.iter_mut().enumerate() {
                *y = field.elevation(i);
            }
            for index in 0..field.len() {
                let mean = local_mean(field, index, |i| snapshot[i]);
                field.set_elevation(index, mean);
            }
        }
    }
    log::debug!("Smoothed {} cells ({:?})", field.len(), policy);
    Ok(())
}

fn local_mean(field: &HeightField, index: usize, elevation: impl Fn(usize) -> f32) -> f32 {
    let mut sum = elevation(index);
    let mut count = 1;
    for n in field.neighbours(index) {
        sum += elevation(n);
        count += 1;
    }
    sum / count as f32
}
