//! Reading tiles and metadata from a PMTiles v3 archive.
//!
//! The reader loads the header, the metadata and the root directory when it is opened.
//! Leaf directories are fetched on demand and kept in an LRU cache, so archives behind
//! HTTP only transfer the parts of the index that are actually used.
//!
//! ## Usage Example
//! ```rust
//! use pmvector_container::{PMTilesReader, testing::ArchiveBuilder};
//! use pmvector_core::{TileCoord, io::DataReaderBlob};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let archive = ArchiveBuilder::new(0, 2).build()?;
//!     let reader = PMTilesReader::open_reader(Box::new(DataReaderBlob::from(archive))).await?;
//!
//!     println!("zoom range: {}..={}", reader.header().min_zoom, reader.header().max_zoom);
//!     assert!(reader.get_tile_data(&TileCoord::new(1, 1, 1)?).await?.is_none());
//!     Ok(())
//! }
//! ```

use super::types::{EntriesV3, HeaderV3, LayerCatalog};
use anyhow::{Context, Result, bail, ensure};
use log::{debug, trace};
use lru::LruCache;
use parking_lot::Mutex;
use pmvector_core::{
	Blob, ByteRange, Config, HilbertIndex, TileCompression, TileCoord,
	compression::decompress,
	io::{DataReader, DataReaderFile},
	tile_id_range,
};
use std::{fmt::Debug, num::NonZeroUsize, path::Path, sync::Arc};

/// Root directory plus at most two levels of leaf directories.
const MAX_DIRECTORY_DEPTH: usize = 3;

/// A read-only handle on a PMTiles v3 archive.
pub struct PMTilesReader {
	data_reader: DataReader,
	header: HeaderV3,
	internal_compression: TileCompression,
	tile_compression: TileCompression,
	metadata: Blob,
	root_entries: Arc<EntriesV3>,
	leaf_cache: Mutex<LruCache<ByteRange, Arc<EntriesV3>>>,
}

impl PMTilesReader {
	/// Opens the archive at `path`, which must be absolute.
	pub async fn open_path(path: &Path) -> Result<PMTilesReader> {
		PMTilesReader::open_reader(DataReaderFile::open(path)?).await
	}

	pub async fn open_reader(data_reader: DataReader) -> Result<PMTilesReader> {
		PMTilesReader::open_reader_with_config(data_reader, &Config::default()).await
	}

	/// Opens an archive, reading its header, metadata and root directory.
	pub async fn open_reader_with_config(data_reader: DataReader, config: &Config) -> Result<PMTilesReader> {
		debug!("opening PMTiles archive {}", data_reader.get_name());

		let header = data_reader
			.read_range(&ByteRange::new(0, HeaderV3::len()))
			.await
			.context("failed to read PMTiles header")?;
		let header = HeaderV3::deserialize(&header).context("failed to parse PMTiles header")?;
		trace!("header: {header:?}");

		let internal_compression = header
			.internal_compression
			.as_value()
			.context("archive declares an unknown internal compression")?;

		let tile_compression = header.tile_compression.as_value().unwrap_or_else(|_| {
			debug!("tile compression is unknown, assuming uncompressed tiles");
			TileCompression::Uncompressed
		});

		let metadata = if header.metadata.length > 0 {
			let blob = data_reader
				.read_range(&header.metadata)
				.await
				.context("failed to read metadata")?;
			decompress(blob, internal_compression).context("failed to decompress metadata")?
		} else {
			Blob::new_empty()
		};
		trace!("metadata: {} bytes", metadata.len());

		let root_bytes = data_reader
			.read_range(&header.root_dir)
			.await
			.context("failed to read root directory")?;
		let root_bytes = decompress(root_bytes, internal_compression).context("failed to decompress root directory")?;
		let root_entries = Arc::new(EntriesV3::from_blob(&root_bytes).context("failed to parse root directory")?);
		trace!("root directory: {} entries", root_entries.len());

		let cache_size = NonZeroUsize::new(config.leaf_cache_size).unwrap_or(NonZeroUsize::MIN);

		Ok(PMTilesReader {
			data_reader,
			header,
			internal_compression,
			tile_compression,
			metadata,
			root_entries,
			leaf_cache: Mutex::new(LruCache::new(cache_size)),
		})
	}

	#[must_use]
	pub fn header(&self) -> &HeaderV3 {
		&self.header
	}

	/// The decompressed metadata JSON. Empty if the archive has none.
	#[must_use]
	pub fn metadata(&self) -> &Blob {
		&self.metadata
	}

	#[must_use]
	pub fn tile_compression(&self) -> TileCompression {
		self.tile_compression
	}

	#[must_use]
	pub fn get_name(&self) -> &str {
		self.data_reader.get_name()
	}

	/// Parses the layer catalog from the metadata.
	pub fn layer_catalog(&self) -> Result<LayerCatalog> {
		ensure!(!self.metadata.is_empty(), "archive has no metadata");
		let json = self.metadata.as_str().context("metadata is not valid UTF-8")?;
		LayerCatalog::from_json(json, (self.header.min_zoom, self.header.max_zoom))
	}

	async fn read_leaf(&self, range: &ByteRange) -> Result<Arc<EntriesV3>> {
		let cached = self.leaf_cache.lock().get(range).cloned();
		if let Some(entries) = cached {
			return Ok(entries);
		}

		trace!("reading leaf directory {range:?}");
		let blob = self
			.data_reader
			.read_range(&range.get_shifted_forward(self.header.leaf_dirs.offset))
			.await
			.with_context(|| format!("failed to read leaf directory {range}"))?;
		let blob = decompress(blob, self.internal_compression).context("failed to decompress leaf directory")?;
		let entries = Arc::new(EntriesV3::from_blob(&blob).context("failed to parse leaf directory")?);

		self.leaf_cache.lock().put(*range, entries.clone());
		Ok(entries)
	}

	/// Locates a tile's bytes in the archive. Returns `None` if the archive has no such tile.
	pub async fn get_tile_range(&self, coord: &TileCoord) -> Result<Option<ByteRange>> {
		trace!("get_tile_range {coord:?}");

		let tile_id = coord.get_tile_id()?;
		let mut entries = self.root_entries.clone();

		for _depth in 0..MAX_DIRECTORY_DEPTH {
			let Some(entry) = entries.find_tile(tile_id) else {
				return Ok(None);
			};

			if entry.range.length == 0 {
				return Ok(None);
			}

			if !entry.is_leaf_pointer() {
				return Ok(Some(entry.range.get_shifted_forward(self.header.tile_data.offset)));
			}

			entries = self.read_leaf(&entry.range).await?;
		}

		bail!("directories are nested deeper than {MAX_DIRECTORY_DEPTH} levels at tile {coord}")
	}

	/// Reads and decompresses a tile.
	pub async fn get_tile_data(&self, coord: &TileCoord) -> Result<Option<Blob>> {
		let Some(range) = self.get_tile_range(coord).await? else {
			return Ok(None);
		};

		let blob = self
			.data_reader
			.read_range(&range)
			.await
			.with_context(|| format!("failed to read tile {coord}"))?;
		let blob = decompress(blob, self.tile_compression).with_context(|| format!("failed to decompress tile {coord}"))?;
		Ok(Some(blob))
	}

	/// Checks whether the directory holds any tile at `level`.
	///
	/// Only leaf directories whose span intersects the level's tile id range are visited.
	pub async fn has_tiles_at_level(&self, level: u8) -> Result<bool> {
		Ok(!self.tile_ids_at_level(level, 1).await?.is_empty())
	}

	/// Lists all tiles stored at `level`, in tile id order.
	pub async fn tiles_at_level(&self, level: u8) -> Result<Vec<TileCoord>> {
		self
			.tile_ids_at_level(level, usize::MAX)
			.await?
			.into_iter()
			.map(TileCoord::from_tile_id)
			.collect()
	}

	async fn tile_ids_at_level(&self, level: u8, limit: usize) -> Result<Vec<u64>> {
		let ids = tile_id_range(level)?;
		let mut found: Vec<u64> = Vec::new();
		let mut stack: Vec<(Arc<EntriesV3>, usize)> = vec![(self.root_entries.clone(), 1)];

		while let Some((entries, depth)) = stack.pop() {
			let mut leaves: Vec<ByteRange> = Vec::new();
			for entry in entries.entries_overlapping(&ids) {
				if entry.is_leaf_pointer() {
					leaves.push(entry.range);
					continue;
				}
				let first = entry.tile_id.max(ids.start);
				let last = (entry.tile_id + u64::from(entry.run_length)).min(ids.end);
				found.extend((first..last).take(limit - found.len()));
				if found.len() >= limit {
					trace!("level {level} has tiles, e.g. tile id {}", found[0]);
					return Ok(found);
				}
			}

			if leaves.is_empty() {
				continue;
			}
			ensure!(
				depth < MAX_DIRECTORY_DEPTH,
				"directories are nested deeper than {MAX_DIRECTORY_DEPTH} levels"
			);
			for range in leaves {
				stack.push((self.read_leaf(&range).await?, depth + 1));
			}
		}

		found.sort_unstable();
		trace!("level {level} has {} tiles", found.len());
		Ok(found)
	}
}

impl Debug for PMTilesReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PMTilesReader")
			.field("name", &self.get_name())
			.field("header", &self.header)
			.field("root_entries", &self.root_entries.len())
			.finish()
	}
}
