//! Vertex normals from averaged quad face normals.

use engine_core::{try_alloc, TerrainError};
use glam::Vec3;

use crate::heightfield::HeightField;

/// Recompute every vertex normal from the current elevations.
///
/// Each quad contributes one un-normalised face normal built from its
/// bottom-left, bottom-right and upper-left corners. A vertex averages the faces
/// of the up-to-four quads touching it. A zero-length average keeps the
/// previous normal.
pub fn recompute_normals(field: &mut HeightField) -> Result<(), TerrainError> {
    let width = field.width();
    let height = field.height();
    let face_stride = (width - 1) as usize;
    let mut faces = try_alloc("face normals", face_stride * (height - 1) as usize, Vec3::ZERO)?;

    for row in 0..height - 1 {
        for col in 0..width - 1 {
            let bottom_left = field.position(row, col);
            let bottom_right = field.position(row, col + 1);
            let upper_left = field.position(row + 1, col);

            let a = bottom_left - upper_left;
            let b = upper_left - bottom_right;
            faces[row as usize * face_stride + col as usize] = a.cross(b);
        }
    }

    let face = |row: u32, col: u32| faces[row as usize * face_stride + col as usize];

    let mut degenerate = 0;
    for row in 0..height {
        for col in 0..width {
            let mut sum = Vec3::ZERO;
            let mut count = 0;

            if col > 0 && row > 0 {
                sum += face(row - 1, col - 1);
                count += 1;
            }
            if col < width - 1 && row > 0 {
                sum += face(row - 1, col);
                count += 1;
            }
            if col > 0 && row < height - 1 {
                sum += face(row, col - 1);
                count += 1;
            }
            if col < width - 1 && row < height - 1 {
                sum += face(row, col);
                count += 1;
            }

            let index = field.index(row, col);
            match (sum / count as f32).try_normalize() {
                Some(n) => field.samples_mut()[index].normal = n,
                None => degenerate += 1,
            }
        }
    }

    if degenerate > 0 {
        log::debug!("{} vertices kept their previous normal (degenerate faces)", degenerate);
    }
    Ok(())
}
