//! Decoding of Mapbox Vector Tiles into [`geo`] geometries with typed attributes,
//! and clipping of those geometries to tile boundaries.

pub mod clip;
pub mod math;
mod types;
pub mod vector_tile;

pub use types::*;
