//! Collision queries against generated terrain.

pub mod ground;
pub mod raycast;

pub use ground::*;
pub use raycast::*;
