//! # pmvector
//!
//! Opens PMTiles v3 archives of Mapbox Vector Tiles as datasets of vector layers.
//!
//! - [`identify`] recognizes an archive from its first 127 bytes.
//! - [`OpenOptions`] holds the validated open options `ZOOM_LEVEL`, `CLIP`, `ZOOM_LEVEL_AUTO`
//!   and `JSON_FIELD`.
//! - [`Dataset::open`] picks the zoom level and builds one [`Layer`] per declared vector layer.
//! - [`register_pmtiles`] publishes the driver in a [`DriverRegistry`].
//!
//! ## Usage Example
//!
//! ```rust
//! use futures::StreamExt;
//! use pmvector::{Dataset, OpenOptions};
//! use pmvector_container::{PMTilesReader, testing::ArchiveBuilder};
//! use pmvector_core::TileCoord;
//! use pmvector_geometry::vector_tile::{VectorTile, VectorTileLayer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut builder = ArchiveBuilder::new(0, 4).with_layer("roads", (0, 4), &[], Some("LineString"));
//!     builder.add_tile(&TileCoord::new(3, 1, 2)?, &VectorTile::new(vec![VectorTileLayer::new_standard("roads")]))?;
//!
//!     let reader = PMTilesReader::open_reader(builder.to_data_reader()?).await?;
//!     let dataset = Dataset::open(reader, OpenOptions::parse(&[("CLIP", "YES")])?).await?;
//!     assert_eq!(dataset.zoom_level(), 3);
//!
//!     let layer = dataset.layer("roads").unwrap();
//!     let features: Vec<_> = layer.features().collect().await;
//!     assert!(features.is_empty());
//!     Ok(())
//! }
//! ```

mod dataset;
pub use dataset::*;

mod error;
pub use error::*;

mod identify;
pub use identify::*;

mod layer;
pub use layer::*;

mod options;
pub use options::*;

mod registry;
pub use registry::*;
