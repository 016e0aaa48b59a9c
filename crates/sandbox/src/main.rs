//! Volcano sandbox - generates a crater landscape and walks an observer across it.

mod config;
mod session;

use anyhow::{Context, Result};
use config::SandboxConfig;
use glam::Vec3;
use physics::GroundQuery;
use procgen::Terrain;
use session::{parse_script, LoggingRenderer, Session, TextureRegistry};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = SandboxConfig::load(path.as_deref());
    log::info!(
        "Generating {}x{} terrain (seed {})",
        config.terrain.width,
        config.terrain.height,
        config.terrain.seed
    );

    let mut textures = TextureRegistry::default();
    let terrain = Terrain::new(config.terrain.clone(), &mut textures)
        .context("terrain initialisation failed")?;

    let mut renderer = LoggingRenderer::default();
    terrain.upload(&mut renderer)?;

    let mut session = Session::new(
        terrain,
        Vec3::from(config.start),
        GroundQuery::new(config.clearance),
        config.move_speed,
    );

    let frames = parse_script(&config.script);
    let (mut moved, mut blocked, mut regenerated) = (0, 0, 0);
    for (i, held) in frames.iter().enumerate() {
        let report = session.frame(held, &mut renderer)?;
        moved += report.moved as u32;
        blocked += report.blocked as u32;
        regenerated += report.regenerated as u32;
        if report.blocked {
            if let Some(contact) = report.contact {
                log::info!(
                    "Frame {}: blocked at {:?}, ground {:.2}",
                    i,
                    session.observer,
                    contact.point.y
                );
            }
        }
    }

    let (lo, hi) = session.terrain.field().elevation_range();
    log::info!(
        "{} frames: {} moves, {} blocked, {} regenerations; observer at {:?}; elevation {:.2}..{:.2}",
        frames.len(),
        moved,
        blocked,
        regenerated,
        session.observer,
        lo,
        hi
    );

    Ok(())
}
