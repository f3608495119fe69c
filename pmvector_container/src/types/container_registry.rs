//! `ContainerRegistry` maps file extensions to archive openers.
//!
//! A location is first turned into a byte source by its scheme (`http(s)://` URL, local path
//! or in-memory blob). The opener registered for the location's extension then reads the archive.
//!
//! ```rust
//! use pmvector_container::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut registry = ContainerRegistry::new_empty();
//! register_pmtiles_container(&mut registry)?;
//! assert!(registry.supports_reader_extension(".PMTiles"));
//! # Ok(())
//! # }
//! ```

use crate::{DataLocation, PMTilesReader};
use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use pmvector_core::{Config, io::DataReader};
use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

/// Signature for async opener functions used by the registry.
type ReadFuture = Pin<Box<dyn Future<Output = Result<PMTilesReader>> + Send>>;
type ReadData = Box<dyn Fn(DataReader, Config) -> ReadFuture + Send + Sync + 'static>;

/// Registry of archive openers, keyed by file extension.
#[derive(Clone, Default)]
pub struct ContainerRegistry {
	config: Config,
	data_readers: HashMap<String, Arc<ReadData>>,
}

impl ContainerRegistry {
	#[must_use]
	pub fn new_empty() -> Self {
		Self::default()
	}

	/// Configuration handed to every opener.
	#[must_use]
	pub fn with_config(mut self, config: Config) -> Self {
		self.config = config;
		self
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Registers an async opener for `ext`.
	///
	/// Fails if the extension is empty or already taken, so two handlers never silently
	/// replace each other.
	pub fn register_reader_data<F, Fut>(&mut self, ext: &str, read_data: F) -> Result<()>
	where
		F: Fn(DataReader, Config) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<PMTilesReader>> + Send + 'static,
	{
		let ext = sanitize_extension(ext);
		if ext.is_empty() {
			bail!("cannot register a container handler for an empty extension");
		}
		if self.data_readers.contains_key(&ext) {
			bail!("a container handler for extension '{ext}' is already registered");
		}
		debug!("registering container handler for '.{ext}'");
		self
			.data_readers
			.insert(ext, Arc::new(Box::new(move |r, c| Box::pin(read_data(r, c)))));
		Ok(())
	}

	#[must_use]
	pub fn supports_reader_extension(&self, ext: &str) -> bool {
		self.data_readers.contains_key(&sanitize_extension(ext))
	}

	/// Registered extensions, sorted.
	#[must_use]
	pub fn extensions(&self) -> Vec<String> {
		let mut extensions: Vec<String> = self.data_readers.keys().cloned().collect();
		extensions.sort();
		extensions
	}

	pub async fn get_reader_from_str(&self, location: &str) -> Result<PMTilesReader> {
		self
			.get_reader(DataLocation::parse(location)?)
			.await
			.with_context(|| format!("Failed to get reader from string '{location}'"))
	}

	/// Opens the archive at `location` with the handler registered for its extension.
	pub async fn get_reader(&self, location: DataLocation) -> Result<PMTilesReader> {
		let extension = location.extension()?;
		let open = self
			.data_readers
			.get(&extension)
			.ok_or_else(|| anyhow!("file extension '{extension}' unknown"))?
			.clone();
		let reader = location.to_data_reader()?;
		open(reader, self.config.clone()).await
	}

	/// Opens an archive that has already been turned into a byte source.
	pub async fn get_reader_from_data(&self, extension: &str, reader: DataReader) -> Result<PMTilesReader> {
		let extension = sanitize_extension(extension);
		let open = self
			.data_readers
			.get(&extension)
			.ok_or_else(|| anyhow!("file extension '{extension}' unknown"))?
			.clone();
		open(reader, self.config.clone()).await
	}
}

/// Registers the PMTiles opener for the `pmtiles` extension.
pub fn register_pmtiles_container(registry: &mut ContainerRegistry) -> Result<()> {
	registry.register_reader_data("pmtiles", |reader, config| async move {
		PMTilesReader::open_reader_with_config(reader, &config).await
	})
}

fn sanitize_extension(ext: &str) -> String {
	ext.to_ascii_lowercase().trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::ArchiveBuilder;
	use pmvector_core::assert_wildcard;

	#[test]
	fn register_twice_fails() -> Result<()> {
		let mut registry = ContainerRegistry::new_empty();
		register_pmtiles_container(&mut registry)?;
		assert_eq!(
			register_pmtiles_container(&mut registry).unwrap_err().to_string(),
			"a container handler for extension 'pmtiles' is already registered"
		);
		assert_eq!(registry.extensions(), vec!["pmtiles"]);
		assert!(registry.register_reader_data("..", |r, c| async move {
			PMTilesReader::open_reader_with_config(r, &c).await
		})
		.is_err());
		Ok(())
	}

	#[tokio::test]
	async fn open_from_file_with_config() -> Result<()> {
		let mut registry = ContainerRegistry::new_empty().with_config(Config::default().with_leaf_cache_size(4));
		register_pmtiles_container(&mut registry)?;
		assert_eq!(registry.config().leaf_cache_size, 4);

		let file = assert_fs::NamedTempFile::new("tiles.PMTILES")?;
		std::fs::write(file.path(), ArchiveBuilder::new(0, 3).build()?.as_slice())?;

		let location = file.path().to_str().context("path is not UTF-8")?;
		let reader = registry.get_reader_from_str(location).await?;
		assert_eq!(reader.header().max_zoom, 3);
		Ok(())
	}

	#[tokio::test]
	async fn unknown_extension() -> Result<()> {
		let registry = ContainerRegistry::new_empty();
		let error = registry.get_reader_from_str("/tmp/tiles.mbtiles").await.unwrap_err();
		assert_wildcard!(format!("{error:#}"), "*file extension 'mbtiles' unknown*");

		let error = registry
			.get_reader_from_data("pmtiles", ArchiveBuilder::new(0, 1).to_data_reader()?)
			.await
			.unwrap_err();
		assert_eq!(error.to_string(), "file extension 'pmtiles' unknown");
		Ok(())
	}
}
