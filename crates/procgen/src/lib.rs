//! Procedural terrain: a height field sculpted by noise, particle deposition,
//! smoothing and crater inversion, then triangulated for rendering.

pub mod deposition;
pub mod heightfield;
pub mod mesh;
pub mod noise_source;
pub mod normals;
pub mod pipeline;
pub mod smoothing;
pub mod terrain;
pub mod volcano;

pub use deposition::*;
pub use heightfield::*;
pub use mesh::*;
pub use noise_source::*;
pub use normals::*;
pub use pipeline::*;
pub use smoothing::*;
pub use terrain::*;
pub use volcano::*;
