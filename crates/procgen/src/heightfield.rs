//! The elevation grid every generation pass sculpts.
//!
//! Samples are stored row-major with a single stride equal to the grid width:
//! `index = row * width + col`. Column maps to world X, row maps to world Z and
//! elevation lives in Y.

use engine_core::{try_alloc, TerrainError};
use glam::{Vec2, Vec3};

/// Row/column deltas of the eight grid-adjacent neighbours.
pub const NEIGHBOUR_DELTAS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// One grid sample: position, texture coordinate and vertex normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSample {
    pub position: Vec3,
    pub texcoord: Vec2,
    pub normal: Vec3,
}

impl Default for HeightSample {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            texcoord: Vec2::ZERO,
            normal: Vec3::Y,
        }
    }
}

/// A `width` x `height` grid of elevation samples.
#[derive(Debug, Clone)]
pub struct HeightField {
    width: u32,
    height: u32,
    samples: Vec<HeightSample>,
}

impl HeightField {
    /// Allocate a flat field at elevation 0 with upward normals.
    pub fn new(width: u32, height: u32) -> Result<Self, TerrainError> {
        if width < 2 || height < 2 {
            return Err(TerrainError::InvalidDimensions { width, height });
        }
        let len = width as usize * height as usize;
        let samples = try_alloc("height field", len, HeightSample::default())?;

        let mut field = Self {
            width,
            height,
            samples,
        };
        field.flatten();
        Ok(field)
    }

    /// Build a field from row-major elevations (tests and tooling).
    pub fn from_elevations(width: u32, height: u32, elevations: &[f32]) -> Result<Self, TerrainError> {
        let mut field = Self::new(width, height)?;
        if elevations.len() != field.len() {
            return Err(TerrainError::ElevationCount {
                expected: field.len(),
                actual: elevations.len(),
            });
        }
        for (sample, &y) in field.samples.iter_mut().zip(elevations) {
            sample.position.y = y;
        }
        Ok(field)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Flat-index distance between two vertically adjacent samples.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.stride() + col as usize
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (u32, u32) {
        ((index / self.stride()) as u32, (index % self.stride()) as u32)
    }

    /// Flat index of `(row + dr, col + dc)`, or `None` when that lands off the grid.
    #[inline]
    pub fn offset(&self, row: u32, col: u32, dr: i32, dc: i32) -> Option<usize> {
        let r = row as i64 + dr as i64;
        let c = col as i64 + dc as i64;
        if r < 0 || c < 0 || r >= self.height as i64 || c >= self.width as i64 {
            return None;
        }
        let delta = dr as isize * self.stride() as isize + dc as isize;
        Some((self.index(row, col) as isize + delta) as usize)
    }

    /// Indices of the up-to-eight neighbours of `index` that exist on the grid.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = self.coords(index);
        NEIGHBOUR_DELTAS
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(row, col, dr, dc))
    }

    pub fn sample(&self, row: u32, col: u32) -> Option<&HeightSample> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.samples.get(self.index(row, col))
    }

    pub fn samples(&self) -> &[HeightSample] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [HeightSample] {
        &mut self.samples
    }

    #[inline]
    pub fn elevation(&self, index: usize) -> f32 {
        self.samples[index].position.y
    }

    #[inline]
    pub fn set_elevation(&mut self, index: usize, y: f32) {
        self.samples[index].position.y = y;
    }

    #[inline]
    pub fn add_elevation(&mut self, index: usize, dy: f32) {
        self.samples[index].position.y += dy;
    }

    #[inline]
    pub fn position(&self, row: u32, col: u32) -> Vec3 {
        self.samples[self.index(row, col)].position
    }

    /// Lowest and highest elevation in the field.
    pub fn elevation_range(&self) -> (f32, f32) {
        self.samples
            .iter()
            .map(|s| s.position.y)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)))
    }

    /// Reset every sample to elevation 0 with an upward normal. Texture coordinates are kept.
    pub fn flatten(&mut self) {
        let width = self.stride();
        for (i, sample) in self.samples.iter_mut().enumerate() {
            let (row, col) = (i / width, i % width);
            sample.position = Vec3::new(col as f32, 0.0, row as f32);
            sample.normal = Vec3::Y;
        }
    }

    /// Lay out tiling texture coordinates.
    ///
    /// `tu` climbs by `repeat / width` per column and restarts every
    /// `width / repeat` columns; `tv` starts at 1 and falls by the same step per
    /// row, restarting on the same period. Counters carry across row ends.
    pub fn compute_texcoords(&mut self, repeat: u32) {
        let increment = repeat as f32 / self.width as f32;
        let period = self.width.checked_div(repeat).unwrap_or(0);

        let mut tu = 0.0_f32;
        let mut tv = 1.0_f32;
        let mut tu_count = 0;
        let mut tv_count = 0;

        for row in 0..self.height {
            for col in 0..self.width {
                let index = self.index(row, col);
                self.samples[index].texcoord = Vec2::new(tu, tv);

                tu += increment;
                tu_count += 1;
                if tu_count == period {
                    tu = 0.0;
                    tu_count = 0;
                }
            }

            tv -= increment;
            tv_count += 1;
            if tv_count == period {
                tv = 1.0;
                tv_count = 0;
            }
        }
    }
}
