//! In-memory PMTiles archives for tests in this and downstream crates.
//!
//! ```rust
//! use pmvector_container::testing::ArchiveBuilder;
//! use pmvector_geometry::vector_tile::{VectorTile, VectorTileLayer};
//! use pmvector_core::TileCoord;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut builder = ArchiveBuilder::new(0, 4).with_layer("roads", (0, 4), &[("kind", "String")], Some("LineString"));
//! builder.add_tile(&TileCoord::new(2, 1, 1)?, &VectorTile::new(vec![VectorTileLayer::new_standard("roads")]))?;
//! let archive = builder.build()?;
//! assert!(archive.starts_with(b"PMTiles\x03"));
//! # Ok(())
//! # }
//! ```

use crate::{EntriesV3, EntryV3, HeaderV3, PMTilesCompression, PMTilesType};
use anyhow::{Context, Result};
use pmvector_core::{
	Blob, ByteRange, HilbertIndex, TileCoord,
	compression::compress,
	io::{DataReader, DataReaderBlob},
};
use pmvector_geometry::vector_tile::VectorTile;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Assembles a complete archive: header, root directory, metadata, optional leaf
/// directories and tile data, in that order.
#[derive(Clone, Debug)]
pub struct ArchiveBuilder {
	min_zoom: u8,
	max_zoom: u8,
	tiles: BTreeMap<u64, Blob>,
	vector_layers: Vec<Value>,
	tilestats: Vec<Value>,
	metadata: Option<String>,
	tile_type: PMTilesType,
	tile_compression: PMTilesCompression,
	internal_compression: PMTilesCompression,
	leaf_size: Option<usize>,
}

impl ArchiveBuilder {
	/// An empty vector archive declaring the zoom range `min_zoom..=max_zoom`.
	#[must_use]
	pub fn new(min_zoom: u8, max_zoom: u8) -> Self {
		ArchiveBuilder {
			min_zoom,
			max_zoom,
			tiles: BTreeMap::new(),
			vector_layers: Vec::new(),
			tilestats: Vec::new(),
			metadata: None,
			tile_type: PMTilesType::MVT,
			tile_compression: PMTilesCompression::Gzip,
			internal_compression: PMTilesCompression::Gzip,
			leaf_size: None,
		}
	}

	/// Declares a layer in the `vector_layers` metadata, and in `tilestats` if `geometry` is given.
	#[must_use]
	pub fn with_layer(mut self, name: &str, zoom: (u8, u8), fields: &[(&str, &str)], geometry: Option<&str>) -> Self {
		let fields: Map<String, Value> = fields
			.iter()
			.map(|(key, kind)| ((*key).to_string(), Value::from(*kind)))
			.collect();
		self.vector_layers.push(json!({
			"id": name,
			"description": "",
			"minzoom": zoom.0,
			"maxzoom": zoom.1,
			"fields": fields,
		}));
		if let Some(geometry) = geometry {
			self.tilestats.push(json!({ "layer": name, "geometry": geometry }));
		}
		self
	}

	/// Replaces the generated metadata with `json`, verbatim. An empty string stores no metadata.
	#[must_use]
	pub fn with_metadata(mut self, json: &str) -> Self {
		self.metadata = Some(json.to_string());
		self
	}

	#[must_use]
	pub fn with_tile_type(mut self, tile_type: PMTilesType) -> Self {
		self.tile_type = tile_type;
		self
	}

	#[must_use]
	pub fn with_tile_compression(mut self, compression: PMTilesCompression) -> Self {
		self.tile_compression = compression;
		self
	}

	#[must_use]
	pub fn with_internal_compression(mut self, compression: PMTilesCompression) -> Self {
		self.internal_compression = compression;
		self
	}

	/// Moves all tile entries into leaf directories of at most `leaf_size` entries each.
	#[must_use]
	pub fn with_leaf_size(mut self, leaf_size: usize) -> Self {
		self.leaf_size = Some(leaf_size.max(1));
		self
	}

	pub fn add_tile(&mut self, coord: &TileCoord, tile: &VectorTile) -> Result<()> {
		self.add_raw_tile(coord, tile.to_blob()?)
	}

	/// Adds an uncompressed tile payload.
	pub fn add_raw_tile(&mut self, coord: &TileCoord, blob: Blob) -> Result<()> {
		self.tiles.insert(coord.get_tile_id()?, blob);
		Ok(())
	}

	fn metadata_json(&self) -> String {
		if let Some(metadata) = &self.metadata {
			return metadata.clone();
		}
		let mut metadata = json!({ "name": "test", "vector_layers": self.vector_layers });
		if !self.tilestats.is_empty() {
			metadata["tilestats"] = json!({ "layerCount": self.tilestats.len(), "layers": self.tilestats });
		}
		metadata.to_string()
	}

	pub fn build(&self) -> Result<Blob> {
		let tile_compression = self.tile_compression.as_value()?;
		let internal_compression = self.internal_compression.as_value()?;

		let mut tile_data: Vec<u8> = Vec::new();
		let mut entries: Vec<EntryV3> = Vec::new();
		for (tile_id, blob) in &self.tiles {
			let blob = compress(blob.clone(), tile_compression)?;
			entries.push(EntryV3::new(*tile_id, ByteRange::new(tile_data.len() as u64, blob.len()), 1));
			tile_data.extend_from_slice(blob.as_slice());
		}

		let mut leaves: Vec<u8> = Vec::new();
		let root = match self.leaf_size {
			None => EntriesV3::from_iter(entries.iter().copied()),
			Some(leaf_size) => {
				let mut root = EntriesV3::new();
				for chunk in entries.chunks(leaf_size) {
					let leaf = EntriesV3::from_iter(chunk.iter().copied()).to_blob()?;
					let leaf = compress(leaf, internal_compression)?;
					root.push(EntryV3::new(
						chunk[0].tile_id,
						ByteRange::new(leaves.len() as u64, leaf.len()),
						0,
					));
					leaves.extend_from_slice(leaf.as_slice());
				}
				root
			}
		};
		let root = compress(root.to_blob()?, internal_compression)?;

		let metadata = self.metadata_json();
		let metadata = if metadata.is_empty() {
			Blob::new_empty()
		} else {
			compress(Blob::from(metadata), internal_compression)?
		};

		let root_dir = ByteRange::new(HeaderV3::len(), root.len());
		let metadata_range = ByteRange::new(root_dir.offset + root_dir.length, metadata.len());
		let leaf_dirs = ByteRange::new(metadata_range.offset + metadata_range.length, leaves.len() as u64);
		let tile_data_range = ByteRange::new(leaf_dirs.offset + leaf_dirs.length, tile_data.len() as u64);

		let header = HeaderV3 {
			root_dir,
			metadata: metadata_range,
			leaf_dirs,
			tile_data: tile_data_range,
			addressed_tiles_count: entries.len() as u64,
			tile_entries_count: entries.len() as u64,
			tile_contents_count: entries.len() as u64,
			clustered: true,
			internal_compression: self.internal_compression,
			tile_compression: self.tile_compression,
			tile_type: self.tile_type,
			min_zoom: self.min_zoom,
			max_zoom: self.max_zoom,
			min_lon_e7: -1_800_000_000,
			min_lat_e7: -850_511_287,
			max_lon_e7: 1_800_000_000,
			max_lat_e7: 850_511_287,
			center_zoom: self.min_zoom,
			center_lon_e7: 0,
			center_lat_e7: 0,
		};

		let mut archive = header.serialize().context("failed to serialize header")?.into_vec();
		archive.extend_from_slice(root.as_slice());
		archive.extend_from_slice(metadata.as_slice());
		archive.extend_from_slice(&leaves);
		archive.extend_from_slice(&tile_data);
		Ok(Blob::from(archive))
	}

	/// The archive as an in-memory byte source named `memory.pmtiles`.
	pub fn to_data_reader(&self) -> Result<DataReader> {
		Ok(Box::new(DataReaderBlob::new("memory.pmtiles", self.build()?.into_vec())))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::PMTilesReader;

	#[tokio::test]
	async fn layout() -> Result<()> {
		let mut builder = ArchiveBuilder::new(1, 5)
			.with_layer("a", (1, 5), &[], Some("Polygon"))
			.with_internal_compression(PMTilesCompression::None)
			.with_leaf_size(2);
		for x in 0..4 {
			builder.add_raw_tile(&TileCoord::new(2, x, 0)?, Blob::from(vec![x as u8; 10]))?;
		}
		let blob = builder.build()?;
		let header = HeaderV3::deserialize(&blob.read_range(&ByteRange::new(0, 127))?)?;

		assert_eq!(header.root_dir.offset, 127);
		assert_eq!(header.tile_data.offset + header.tile_data.length, blob.len());
		assert!(header.leaf_dirs.length > 0);
		assert_eq!(header.tile_entries_count, 4);

		let root = EntriesV3::from_blob(&blob.read_range(&header.root_dir)?)?;
		assert_eq!(root.len(), 2);
		assert!(root.iter().all(|e| e.is_leaf_pointer()));

		let reader = PMTilesReader::open_reader(builder.to_data_reader()?).await?;
		let catalog = reader.layer_catalog()?;
		assert_eq!(catalog.layers[0].geometry, pmvector_geometry::GeometryKind::Polygon);
		Ok(())
	}
}
