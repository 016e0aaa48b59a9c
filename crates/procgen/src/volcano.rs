//! Crater shaping: fold everything above a threshold back down below it.

use crate::heightfield::HeightField;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolcanoShaper {
    pub threshold: f32,
    /// How far below the threshold a cell lands per unit it stood above it.
    pub depth_scale: f32,
}

impl Default for VolcanoShaper {
    fn default() -> Self {
        Self {
            threshold: 20.0,
            depth_scale: 1.5,
        }
    }
}

impl VolcanoShaper {
    /// Map every elevation `y >= threshold` to `threshold - (y - threshold) * depth_scale`.
    /// Returns how many cells were folded.
    pub fn invert_above(&self, field: &mut HeightField) -> usize {
        let mut folded = 0;
        for sample in field.samples_mut() {
            let y = sample.position.y;
            if y >= self.threshold {
                sample.position.y = self.threshold - (y - self.threshold) * self.depth_scale;
                folded += 1;
            }
        }
        log::debug!("Crater folded {} cells above {:.1}", folded, self.threshold);
        folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_peak_into_crater() {
        let mut field = HeightField::from_elevations(2, 2, &[24.0, 19.9, 20.0, -3.0]).unwrap();
        let folded = VolcanoShaper::default().invert_above(&mut field);
        assert_eq!(folded, 2);
        assert!((field.elevation(0) - 14.0).abs() < 1e-6);
        assert_eq!(field.elevation(1), 19.9);
        assert_eq!(field.elevation(2), 20.0);
        assert_eq!(field.elevation(3), -3.0);
    }

    #[test]
    fn folded_cells_end_up_at_or_below_threshold() {
        let mut field = HeightField::from_elevations(3, 2, &[30.0, 21.0, 5.0, 50.0, 20.5, 0.0]).unwrap();
        let shaper = VolcanoShaper::default();
        shaper.invert_above(&mut field);
        assert!(field.samples().iter().all(|s| s.position.y <= shaper.threshold));
    }
}
