//! Fixed-order generation pipeline.
//!
//! `Flat -> BaseShaped -> Peaked -> Smoothed1 -> Detailed -> Crater -> Smoothed2`.
//! Every pass is followed by a normal recomputation. A failing stage stops the
//! run and leaves the field as the last completed pass left it.

use engine_core::TerrainError;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::deposition::ParticleDepositor;
use crate::heightfield::HeightField;
use crate::noise_source::{NoiseProfile, NoiseSource};
use crate::normals::recompute_normals;
use crate::smoothing::{smooth, SmoothingPolicy};
use crate::volcano::VolcanoShaper;

/// Generation progress. Each pass moves the field into its target stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Flat,
    BaseShaped,
    Peaked,
    Smoothed1,
    Detailed,
    Crater,
    Smoothed2,
}

impl Stage {
    /// Terminal stage of a full run.
    pub const READY: Self = Self::Smoothed2;

    pub fn name(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::BaseShaped => "base-shaped",
            Self::Peaked => "peaked",
            Self::Smoothed1 => "smoothed-1",
            Self::Detailed => "detailed",
            Self::Crater => "crater",
            Self::Smoothed2 => "smoothed-2",
        }
    }

    pub fn is_ready(self) -> bool {
        self == Self::READY
    }
}

/// Mutable state a pass may draw on.
pub struct PassContext<'a> {
    pub noise: &'a mut NoiseSource,
    pub rng: &'a mut StdRng,
}

/// One whole-field transformation.
pub trait HeightFieldPass {
    fn name(&self) -> &'static str;
    fn apply(&mut self, field: &mut HeightField, ctx: &mut PassContext<'_>) -> Result<(), TerrainError>;
}

/// Additive noise at a given profile. Advances the shared phase.
pub struct NoisePass(pub NoiseProfile);

impl HeightFieldPass for NoisePass {
    fn name(&self) -> &'static str {
        "noise"
    }

    fn apply(&mut self, field: &mut HeightField, ctx: &mut PassContext<'_>) -> Result<(), TerrainError> {
        ctx.noise.apply(field, self.0);
        Ok(())
    }
}

pub struct DepositionPass(pub ParticleDepositor);

impl HeightFieldPass for DepositionPass {
    fn name(&self) -> &'static str {
        "particle-deposition"
    }

    fn apply(&mut self, field: &mut HeightField, ctx: &mut PassContext<'_>) -> Result<(), TerrainError> {
        self.0.deposit(field, &mut *ctx.rng).map(|_| ())
    }
}

pub struct SmoothingPass(pub SmoothingPolicy);

impl HeightFieldPass for SmoothingPass {
    fn name(&self) -> &'static str {
        "smoothing"
    }

    fn apply(&mut self, field: &mut HeightField, _ctx: &mut PassContext<'_>) -> Result<(), TerrainError> {
        smooth(field, self.0)
    }
}

pub struct VolcanoPass(pub VolcanoShaper);

impl HeightFieldPass for VolcanoPass {
    fn name(&self) -> &'static str {
        "crater"
    }

    fn apply(&mut self, field: &mut HeightField, _ctx: &mut PassContext<'_>) -> Result<(), TerrainError> {
        self.0.invert_above(field);
        Ok(())
    }
}

struct PipelineStep {
    stage: Stage,
    pass: Box<dyn HeightFieldPass>,
}

/// Ordered passes plus the noise phase and RNG they share.
pub struct TerrainPipeline {
    steps: Vec<PipelineStep>,
    noise: NoiseSource,
    rng: StdRng,
    stage: Stage,
}

impl TerrainPipeline {
    /// An empty pipeline seeded for reproducible runs.
    pub fn new(seed: u64) -> Self {
        Self {
            steps: Vec::new(),
            noise: NoiseSource::new(seed),
            rng: StdRng::seed_from_u64(seed),
            stage: Stage::Flat,
        }
    }

    /// Hills, central peak, smoothing, detail, crater, smoothing.
    pub fn standard(
        seed: u64,
        depositor: ParticleDepositor,
        smoothing: SmoothingPolicy,
        shaper: VolcanoShaper,
    ) -> Self {
        Self::new(seed)
            .with_pass(Stage::BaseShaped, NoisePass(NoiseProfile::LOW_FREQUENCY))
            .with_pass(Stage::Peaked, DepositionPass(depositor))
            .with_pass(Stage::Smoothed1, SmoothingPass(smoothing))
            .with_pass(Stage::Detailed, NoisePass(NoiseProfile::HIGH_FREQUENCY))
            .with_pass(Stage::Crater, VolcanoPass(shaper))
            .with_pass(Stage::Smoothed2, SmoothingPass(smoothing))
    }

    pub fn with_pass(mut self, stage: Stage, pass: impl HeightFieldPass + 'static) -> Self {
        self.steps.push(PipelineStep {
            stage,
            pass: Box::new(pass),
        });
        self
    }

    /// Drop the pass that produces `stage`, if any.
    pub fn skip(&mut self, stage: Stage) {
        self.steps.retain(|step| step.stage != stage);
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.steps.iter().map(|step| step.stage).collect()
    }

    /// Stage reached by the most recent run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn noise(&self) -> &NoiseSource {
        &self.noise
    }

    /// Mark the field as flat again (after the owner resets it).
    pub fn rewind(&mut self) {
        self.stage = Stage::Flat;
    }

    /// Run every pass in order, recomputing normals after each.
    pub fn run(&mut self, field: &mut HeightField) -> Result<Stage, TerrainError> {
        self.stage = Stage::Flat;
        let mut ctx = PassContext {
            noise: &mut self.noise,
            rng: &mut self.rng,
        };

        for step in &mut self.steps {
            log::debug!("Stage '{}': running {}", step.stage.name(), step.pass.name());
            let result = step
                .pass
                .apply(field, &mut ctx)
                .and_then(|()| recompute_normals(field));
            if let Err(e) = result {
                log::error!("Terrain generation aborted at '{}': {}", step.stage.name(), e);
                return Err(TerrainError::at_stage(step.stage.name(), e));
            }
            self.stage = step.stage;
        }

        let (lo, hi) = field.elevation_range();
        log::info!(
            "Terrain {}x{} reached stage '{}' (elevation {:.2}..{:.2})",
            field.width(),
            field.height(),
            self.stage.name(),
            lo,
            hi
        );
        Ok(self.stage)
    }
}

/// Edge-triggered gate for generation requests.
///
/// A request starts a run only on a fresh key press (the key must be released
/// in between) and only while no other run is in progress.
#[derive(Debug, Default)]
pub struct GenerationGuard {
    key_latched: bool,
    in_progress: bool,
}

impl GenerationGuard {
    /// Feed the current key state. Returns `true` when a run should start now.
    pub fn on_key(&mut self, pressed: bool) -> bool {
        if !pressed {
            self.key_latched = false;
            return false;
        }
        let fresh = !self.key_latched;
        self.key_latched = true;
        if !fresh || self.in_progress {
            return false;
        }
        self.in_progress = true;
        true
    }

    pub fn finish(&mut self) {
        self.in_progress = false;
    }

    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_for(field: &HeightField, seed: u64) -> TerrainPipeline {
        let center = field.index(field.height() / 2, field.width() / 2);
        TerrainPipeline::standard(
            seed,
            ParticleDepositor {
                center,
                target_height: 25.0,
                increment: ParticleDepositor::DEFAULT_INCREMENT,
                particle_budget: 200_000,
            },
            SmoothingPolicy::InPlace,
            VolcanoShaper::default(),
        )
    }

    struct Failing;

    impl HeightFieldPass for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn apply(&mut self, field: &mut HeightField, _ctx: &mut PassContext<'_>) -> Result<(), TerrainError> {
            Err(TerrainError::InvalidDimensions {
                width: field.width(),
                height: field.height(),
            })
        }
    }

    #[test]
    fn standard_order() {
        let field = HeightField::new(10, 10).unwrap();
        let pipeline = standard_for(&field, 0);
        assert_eq!(
            pipeline.stages(),
            vec![
                Stage::BaseShaped,
                Stage::Peaked,
                Stage::Smoothed1,
                Stage::Detailed,
                Stage::Crater,
                Stage::Smoothed2,
            ]
        );
    }

    #[test]
    fn full_run_reaches_ready_with_finite_relief() {
        let mut field = HeightField::new(10, 10).unwrap();
        let mut pipeline = standard_for(&field, 4);
        let stage = pipeline.run(&mut field).unwrap();
        assert!(stage.is_ready());
        assert!(field.samples().iter().all(|s| s.position.y.is_finite()));
        assert!(field.samples().iter().any(|s| s.position.y != 0.0));
        assert!(field
            .samples()
            .iter()
            .all(|s| (s.normal.length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn noise_phase_advances_twice_per_run() {
        let mut field = HeightField::new(6, 6).unwrap();
        let mut pipeline = standard_for(&field, 1);
        pipeline.run(&mut field).unwrap();
        assert_eq!(pipeline.noise().phase(), NoiseSource::INITIAL_PHASE + 2.0);
    }

    #[test]
    fn same_seed_same_terrain() {
        let generate = |seed| {
            let mut field = HeightField::new(12, 12).unwrap();
            standard_for(&field, seed).run(&mut field).unwrap();
            field.samples().iter().map(|s| s.position.y).collect::<Vec<_>>()
        };
        assert_eq!(generate(8), generate(8));
    }

    #[test]
    fn skipped_passes_are_not_run() {
        let mut field = HeightField::new(8, 8).unwrap();
        let mut pipeline = standard_for(&field, 3);
        for stage in [Stage::BaseShaped, Stage::Peaked, Stage::Detailed] {
            pipeline.skip(stage);
        }
        pipeline.run(&mut field).unwrap();
        // Smoothing and the crater pass leave a flat field flat.
        assert!(field.samples().iter().all(|s| s.position.y == 0.0));
        assert_eq!(pipeline.noise().phase(), NoiseSource::INITIAL_PHASE);
    }

    #[test]
    fn failing_stage_stops_the_run() {
        let mut field = HeightField::new(6, 6).unwrap();
        let mut pipeline = TerrainPipeline::new(0)
            .with_pass(Stage::BaseShaped, NoisePass(NoiseProfile::LOW_FREQUENCY))
            .with_pass(Stage::Peaked, Failing)
            .with_pass(Stage::Detailed, NoisePass(NoiseProfile::HIGH_FREQUENCY));
        let err = pipeline.run(&mut field).unwrap_err();
        assert!(matches!(err, TerrainError::StageFailed { stage: "peaked", .. }));
        assert_eq!(pipeline.stage(), Stage::BaseShaped);
        // The detail pass never ran, so the phase moved only once.
        assert_eq!(pipeline.noise().phase(), NoiseSource::INITIAL_PHASE + 1.0);
    }

    #[test]
    fn guard_ignores_held_key_and_busy_runs() {
        let mut guard = GenerationGuard::default();
        assert!(guard.on_key(true));
        assert!(guard.is_in_progress());
        // Still held: ignored.
        assert!(!guard.on_key(true));
        // Released and pressed again while the first run has not finished.
        assert!(!guard.on_key(false));
        assert!(!guard.on_key(true));
        guard.finish();
        assert!(!guard.on_key(true), "key is still latched from the ignored press");
        assert!(!guard.on_key(false));
        assert!(guard.on_key(true));
    }
}
