//! Core engine types shared by terrain generation and collision.
//!
//! This crate provides the foundational types used across the workspace:
//! - Error taxonomy for terrain construction and generation
//! - The texture-provider boundary (opaque handles resolved by name)

pub mod error;
pub mod texture;

pub use error::*;
pub use texture::*;

// Re-export commonly used types
pub use glam::{Vec2, Vec3};
