//! Vector Tile (MVT) support.
//!
//! Reads the Mapbox Vector Tile protobuf format and turns features into [`geo`] geometries
//! in Web Mercator metres. The write side exists for assembling tiles in memory.
//!
//! - [`VectorTile`]: the top-level container that holds multiple layers.
//! - [`VectorTileLayer`]: one layer with its key/value tables and features.
//! - [`VectorTileFeature`]: compact geometry commands plus tag indices.
//! - [`TileFeature`]: a decoded feature with geometry and properties.

mod feature;
mod geometry_type;
mod layer;
mod property_manager;
mod tile;
mod value;

pub use feature::{TileFeature, VectorTileFeature};
pub use geometry_type::GeomType;
pub use layer::VectorTileLayer;
pub use property_manager::PropertyManager;
pub use tile::VectorTile;
