//! Read access to PMTiles v3 archives.
//!
//! - [`PMTilesReader`] reads the header, the JSON metadata and tiles, walking the root and
//!   leaf directories with an LRU cache for leaves.
//! - [`LayerCatalog`] is the list of vector layers the metadata declares.
//! - [`ContainerRegistry`] opens archives from paths, URLs or blobs, picking the handler by
//!   file extension.
//! - [`testing`] assembles archives in memory.

mod container;
pub use container::*;

pub mod testing;

mod types;
pub use types::*;
