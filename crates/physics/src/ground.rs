//! Grounding query: can an observer stand at a given position above the terrain?

use glam::Vec3;
use procgen::HeightField;

use crate::raycast::{ray_triangle, Ray, RaycastHit};

/// How far above the highest relevant point the probe ray starts.
const PROBE_LIFT: f32 = 1.0;

/// Where the terrain surface lies under the observer and whether they may move there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    pub point: Vec3,
    /// False when the observer is below `point.y + clearance`.
    pub movable: bool,
}

/// Vertical ray test against the triangles of the cell under the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundQuery {
    pub clearance: f32,
}

impl Default for GroundQuery {
    fn default() -> Self {
        Self {
            clearance: Self::DEFAULT_CLEARANCE,
        }
    }
}

impl GroundQuery {
    pub const DEFAULT_CLEARANCE: f32 = 4.0;

    pub fn new(clearance: f32) -> Self {
        Self { clearance }
    }

    /// The two triangles of the cell containing `(x, z)`: (cell, right, down)
    /// first, then (right, down-right, down). `None` outside the grid.
    pub fn cell_triangles(field: &HeightField, x: f32, z: f32) -> Option<[[Vec3; 3]; 2]> {
        if !(x.is_finite() && z.is_finite()) || x < 0.0 || z < 0.0 {
            return None;
        }
        let col = x.floor() as u32;
        let row = z.floor() as u32;
        if col >= field.width() - 1 || row >= field.height() - 1 {
            return None;
        }

        let cell = field.position(row, col);
        let right = field.position(row, col + 1);
        let down = field.position(row + 1, col);
        let diagonal = field.position(row + 1, col + 1);
        Some([[cell, right, down], [right, diagonal, down]])
    }

    /// Cast straight down through the observer's column.
    ///
    /// `None` means the observer is off the grid or no triangle was hit; callers
    /// treat that as free to move.
    pub fn ground_height(&self, field: &HeightField, observer: Vec3) -> Option<GroundContact> {
        let Some(triangles) = Self::cell_triangles(field, observer.x, observer.z) else {
            log::warn!("Observer at {:?} is outside the terrain grid", observer);
            return None;
        };

        let top = triangles
            .iter()
            .flatten()
            .map(|v| v.y)
            .fold(observer.y, f32::max);
        let ray = Ray::down(Vec3::new(observer.x, top + PROBE_LIFT, observer.z));

        let hit: RaycastHit = triangles
            .iter()
            .find_map(|&triangle| ray_triangle(&ray, triangle))?;

        Some(GroundContact {
            point: hit.point,
            movable: observer.y >= hit.point.y + self.clearance,
        })
    }

    /// Movement gate: allowed unless the query finds the observer too close to (or under) the ground.
    pub fn can_move(&self, field: &HeightField, observer: Vec3) -> bool {
        self.ground_height(field, observer)
            .map_or(true, |contact| contact.movable)
    }
}
