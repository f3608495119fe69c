pub mod features;
pub mod info;

use anyhow::{Result, anyhow};
use pmvector::{Dataset, DriverRegistry};

/// Opens `filename` with the default drivers. `options` are `KEY=VALUE` strings.
pub async fn open_dataset(filename: &str, options: &[String]) -> Result<Dataset> {
	let pairs = options
		.iter()
		.map(|item| {
			item
				.split_once('=')
				.ok_or_else(|| anyhow!("option '{item}' is not of the form KEY=VALUE"))
		})
		.collect::<Result<Vec<(&str, &str)>>>()?;

	let (drivers, containers) = DriverRegistry::new_default()?;
	drivers.identify_and_open(&containers, filename, &pairs).await
}

#[cfg(test)]
pub mod test_archive {
	use anyhow::{Context, Result};
	use assert_fs::NamedTempFile;
	use geo::{Geometry, line_string, point};
	use pmvector_container::testing::ArchiveBuilder;
	use pmvector_core::TileCoord;
	use pmvector_geometry::{
		GeoProperties, GeoValue,
		vector_tile::{VectorTile, VectorTileLayer},
	};

	/// Writes a small archive with a `pois` and a `roads` layer to a temporary file.
	pub fn write() -> Result<(NamedTempFile, String)> {
		let mut builder = ArchiveBuilder::new(0, 3)
			.with_layer("pois", (0, 3), &[("name", "String"), ("rank", "Number")], Some("Point"))
			.with_layer("roads", (2, 3), &[("kind", "String")], Some("LineString"));

		let mut pois = VectorTileLayer::new_standard("pois");
		pois.add_feature(
			Some(1),
			&Geometry::Point(point!(x: 100.0, y: 200.0)),
			&GeoProperties::from(vec![("name", GeoValue::from("Cafe")), ("rank", GeoValue::Int(2))]),
		)?;
		let mut roads = VectorTileLayer::new_standard("roads");
		roads.add_feature(
			Some(2),
			&Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 4096.0, y: 4096.0)]),
			&GeoProperties::from(vec![("kind", GeoValue::from("path"))]),
		)?;
		builder.add_tile(&TileCoord::new(3, 4, 2)?, &VectorTile::new(vec![pois, roads]))?;

		let file = NamedTempFile::new("test.pmtiles")?;
		std::fs::write(file.path(), builder.build()?.as_slice())?;
		let path = file.path().to_str().context("temp path is not UTF-8")?.to_string();
		Ok((file, path))
	}
}
