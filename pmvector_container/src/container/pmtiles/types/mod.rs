mod entries_v3;
mod entry_v3;
mod header_v3;
mod metadata;
mod tile_compression;
mod tile_type;

pub use entries_v3::EntriesV3;
pub use entry_v3::EntryV3;
pub use header_v3::{HeaderV3, PMTILES_MAGIC};
pub use metadata::{LayerCatalog, LayerInfo};
pub use tile_compression::PMTilesCompression;
pub use tile_type::PMTilesType;
