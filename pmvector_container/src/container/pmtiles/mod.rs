//! Reading PMTiles v3 archives.
//!
//! - [`PMTilesReader`] opens an archive from any [`DataReader`](pmvector_core::io::DataReader)
//!   and resolves tiles through the root and leaf directories.
//! - [`HeaderV3`], [`EntriesV3`] and [`LayerCatalog`] model the on-disk structures.

mod reader;
mod types;

pub use reader::PMTilesReader;
pub use types::*;
