#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_fs::NamedTempFile;
use geo::Geometry;
use pmvector::{Dataset, DriverError, OpenOptions};
use pmvector_container::{PMTilesReader, testing::ArchiveBuilder};
use pmvector_core::TileCoord;
use pmvector_geometry::{
	GeoProperties,
	vector_tile::{VectorTile, VectorTileLayer},
};

/// A tile holding one feature per `(layer, geometry)` pair. Geometries are in tile coordinates.
pub fn tile(features: &[(&str, Geometry<f64>, GeoProperties)]) -> Result<VectorTile> {
	let mut layers: Vec<VectorTileLayer> = Vec::new();
	for (index, (name, geometry, properties)) in features.iter().enumerate() {
		if !layers.iter().any(|l| l.name == *name) {
			layers.push(VectorTileLayer::new_standard(name));
		}
		let layer = layers
			.iter_mut()
			.find(|l| l.name == *name)
			.context("layer was just added")?;
		layer.add_feature(Some(index as u64 + 1), geometry, properties)?;
	}
	Ok(VectorTile::new(layers))
}

pub async fn open(builder: &ArchiveBuilder, options: &[(&str, &str)]) -> Result<Dataset> {
	let reader = PMTilesReader::open_reader(builder.to_data_reader()?).await?;
	Dataset::open(reader, OpenOptions::parse(options)?).await
}

pub fn coord(level: u8, x: u32, y: u32) -> TileCoord {
	TileCoord::new(level, x, y).expect("valid tile coordinate")
}

/// The `DriverError` carried by `error`, wherever it sits in the chain.
pub fn driver_error(error: &anyhow::Error) -> &DriverError {
	error
		.downcast_ref::<DriverError>()
		.unwrap_or_else(|| panic!("expected a driver error, got: {error:#}"))
}

/// Writes the archive to a temporary `.pmtiles` file and returns it with its path.
pub fn write_file(builder: &ArchiveBuilder, name: &str) -> Result<(NamedTempFile, String)> {
	let file = NamedTempFile::new(name)?;
	std::fs::write(file.path(), builder.build()?.as_slice())?;
	let path = file.path().to_str().context("temp path is not UTF-8")?.to_string();
	Ok((file, path))
}
