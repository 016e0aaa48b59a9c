//! Frame-by-frame driver: key events in, regeneration and gated movement out.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use engine_core::{TerrainError, TextureHandle, TextureProvider};
use glam::Vec3;
use input::{InputState, Key, KeyState};
use physics::{GroundContact, GroundQuery};
use procgen::{MeshRenderer, Terrain, TerrainMesh};

/// Hands out sequential handles per distinct texture name.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    handles: HashMap<String, TextureHandle>,
}

impl TextureProvider for TextureRegistry {
    fn load(&mut self, name: &str) -> Result<TextureHandle, TerrainError> {
        if name.trim().is_empty() {
            return Err(TerrainError::Texture {
                name: name.to_string(),
                reason: "empty texture name".to_string(),
            });
        }
        let next = TextureHandle(self.handles.len() as u32 + 1);
        Ok(*self.handles.entry(name.to_string()).or_insert(next))
    }
}

/// Stands in for the GPU: checks the stream and logs what would be uploaded.
#[derive(Debug, Default)]
pub struct LoggingRenderer {
    pub uploads: usize,
    pub last_vertex_count: usize,
}

impl MeshRenderer for LoggingRenderer {
    fn upload(&mut self, mesh: &TerrainMesh) -> Result<()> {
        anyhow::ensure!(
            mesh.vertices.len() == mesh.indices.len(),
            "vertex/index count mismatch: {} vs {}",
            mesh.vertices.len(),
            mesh.indices.len()
        );
        self.uploads += 1;
        self.last_vertex_count = mesh.vertices.len();
        log::info!(
            "Uploaded terrain mesh: {} vertices, {} indices, {} bytes",
            mesh.vertices.len(),
            mesh.index_count(),
            mesh.vertex_bytes().len()
        );
        Ok(())
    }
}

/// What one frame did.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub regenerated: bool,
    pub reset: bool,
    pub moved: bool,
    pub blocked: bool,
    pub contact: Option<GroundContact>,
}

pub struct Session {
    pub terrain: Terrain,
    pub observer: Vec3,
    input: InputState,
    query: GroundQuery,
    move_speed: f32,
    held: HashSet<Key>,
}

impl Session {
    pub fn new(terrain: Terrain, start: Vec3, query: GroundQuery, move_speed: f32) -> Self {
        Self {
            terrain,
            observer: start,
            input: InputState::new(),
            query,
            move_speed,
            held: HashSet::new(),
        }
    }

    /// Advance one frame with exactly `held` keys down.
    pub fn frame(&mut self, held: &HashSet<Key>, renderer: &mut dyn MeshRenderer) -> Result<FrameReport> {
        self.input.begin_frame();
        for &key in self.held.difference(held) {
            self.input.process_keyboard(key, KeyState::Released);
        }
        for &key in held {
            self.input.process_keyboard(key, KeyState::Pressed);
        }
        self.held = held.clone();

        let mut report = FrameReport::default();

        if self.input.is_key_pressed(Key::Reset) {
            self.terrain.reset().context("terrain reset failed")?;
            self.terrain.upload(renderer)?;
            report.reset = true;
        }

        report.regenerated = self
            .terrain
            .on_generate_key(self.input.is_key_held(Key::Generate))
            .context("terrain regeneration failed")?;
        if report.regenerated {
            self.terrain.upload(renderer)?;
        }

        let (right, up, forward) = self.input.movement_axes();
        let step = Vec3::new(right, up, forward) * self.move_speed;
        if step != Vec3::ZERO {
            let candidate = self.observer + step;
            report.contact = self.query.ground_height(self.terrain.field(), candidate);
            if report.contact.map_or(true, |c| c.movable) {
                self.observer = candidate;
                report.moved = true;
            } else {
                report.blocked = true;
            }
        }

        Ok(report)
    }
}

/// Parse a script of whitespace-separated frames into held-key sets.
pub fn parse_script(script: &str) -> Vec<HashSet<Key>> {
    script
        .split_whitespace()
        .map(|frame| frame.chars().filter_map(Key::from_char).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::TerrainConfig;

    fn session(start: Vec3) -> Session {
        let config = TerrainConfig {
            width: 16,
            height: 16,
            seed: 5,
            ..Default::default()
        };
        let terrain = Terrain::new(config, &mut TextureRegistry::default()).unwrap();
        Session::new(terrain, start, GroundQuery::default(), 1.0)
    }

    fn keys(s: &str) -> HashSet<Key> {
        s.chars().filter_map(Key::from_char).collect()
    }

    #[test]
    fn registry_reuses_handles() {
        let mut registry = TextureRegistry::default();
        let a = registry.load("grass").unwrap();
        let b = registry.load("rock").unwrap();
        assert_ne!(a, b);
        assert_eq!(registry.load("grass").unwrap(), a);
        assert!(registry.load("  ").is_err());
    }

    #[test]
    fn script_frames() {
        let frames = parse_script("ww . gd");
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], keys("w"));
        assert!(frames[1].is_empty());
        assert_eq!(frames[2], keys("gd"));
    }

    #[test]
    fn regenerate_only_on_fresh_press() {
        let mut s = session(Vec3::new(4.0, 100.0, 4.0));
        let mut renderer = LoggingRenderer::default();
        assert!(s.frame(&keys("g"), &mut renderer).unwrap().regenerated);
        assert!(!s.frame(&keys("g"), &mut renderer).unwrap().regenerated);
        assert!(!s.frame(&keys(""), &mut renderer).unwrap().regenerated);
        assert!(s.frame(&keys("g"), &mut renderer).unwrap().regenerated);
        assert_eq!(renderer.uploads, 2);
        assert_eq!(renderer.last_vertex_count, 15 * 15 * 6);
    }

    #[test]
    fn reset_uploads_flat_mesh() {
        let mut s = session(Vec3::new(4.0, 100.0, 4.0));
        let mut renderer = LoggingRenderer::default();
        let report = s.frame(&keys("r"), &mut renderer).unwrap();
        assert!(report.reset);
        assert_eq!(renderer.uploads, 1);
        assert!(s.terrain.mesh().vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn high_observer_walks_freely() {
        let mut s = session(Vec3::new(4.0, 500.0, 4.0));
        let mut renderer = LoggingRenderer::default();
        let report = s.frame(&keys("w"), &mut renderer).unwrap();
        assert!(report.moved);
        assert!(report.contact.is_some());
        assert_eq!(s.observer, Vec3::new(4.0, 500.0, 5.0));
    }

    #[test]
    fn descending_into_the_ground_is_blocked() {
        let mut s = session(Vec3::new(4.0, -500.0, 4.0));
        let mut renderer = LoggingRenderer::default();
        let report = s.frame(&keys("q"), &mut renderer).unwrap();
        assert!(report.blocked);
        assert_eq!(s.observer, Vec3::new(4.0, -500.0, 4.0));
    }

    #[test]
    fn leaving_the_grid_is_fail_open() {
        let mut s = session(Vec3::new(0.2, -500.0, 4.0));
        let mut renderer = LoggingRenderer::default();
        let report = s.frame(&keys("a"), &mut renderer).unwrap();
        assert!(report.moved);
        assert!(report.contact.is_none());
    }

    #[test]
    fn reset_key_flattens() {
        let mut s = session(Vec3::new(4.0, 100.0, 4.0));
        let mut renderer = LoggingRenderer::default();
        assert!(s.frame(&keys("r"), &mut renderer).unwrap().reset);
        assert!(s.terrain.field().samples().iter().all(|p| p.position.y == 0.0));
        // Held reset does not fire again.
        assert!(!s.frame(&keys("r"), &mut renderer).unwrap().reset);
    }
}
