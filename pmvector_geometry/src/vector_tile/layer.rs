//! A single layer of a vector tile.
//!
//! The encoding follows the MVT schema:
//!  * field 1: `name` (string)
//!  * field 2: repeated `feature` (embedded message)
//!  * field 3: repeated `keys` (string)
//!  * field 4: repeated `values` (embedded message)
//!  * field 5: `extent` (varint, default 4096)
//!  * field 15: `version` (varint, default 1)

use super::{
	feature::{TileFeature, VectorTileFeature},
	property_manager::PropertyManager,
	value::GeoValuePBF,
};
use crate::{GeoProperties, GeoValue, clip::clip_geometry};
use anyhow::{Context, Result, anyhow, ensure};
use byteorder::LE;
use geo::{Coord, Geometry, MapCoords};
use log::trace;
use pmvector_core::{
	Blob, TileCoord,
	io::{ValueReader, ValueWriter, ValueWriterBlob},
};

/// A vector tile layer: features plus the key/value tables their tags point into.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorTileLayer {
	/// Size of the tile's coordinate grid (default 4096).
	pub extent: u32,
	pub features: Vec<VectorTileFeature>,
	pub name: String,
	pub property_manager: PropertyManager,
	pub version: u32,
}

impl VectorTileLayer {
	#[must_use]
	pub fn new(name: String, extent: u32, version: u32) -> VectorTileLayer {
		VectorTileLayer {
			extent,
			features: vec![],
			name,
			property_manager: PropertyManager::default(),
			version,
		}
	}

	/// Layer with `extent = 4096` and `version = 2`.
	#[must_use]
	pub fn new_standard(name: &str) -> VectorTileLayer {
		VectorTileLayer::new(name.to_string(), 4096, 2)
	}

	pub fn read(reader: &mut dyn ValueReader<'_, LE>) -> Result<VectorTileLayer> {
		let mut extent = 4096;
		let mut features: Vec<VectorTileFeature> = Vec::new();
		let mut name = None;
		let mut property_manager = PropertyManager::default();
		let mut version = 1;

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, 2) => name = Some(reader.read_pbf_string().context("Failed to read layer name")?),
				(2, 2) => features.push(
					VectorTileFeature::read(
						reader
							.get_pbf_sub_reader()
							.context("Failed to get PBF sub-reader for feature")?
							.as_mut(),
					)
					.context("Failed to read VectorTileFeature")?,
				),
				(3, 2) => property_manager
					.key
					.push(reader.read_pbf_string().context("Failed to read property key")?),
				(4, 2) => property_manager.val.push(
					GeoValue::read(
						reader
							.get_pbf_sub_reader()
							.context("Failed to get PBF sub-reader for property value")?
							.as_mut(),
					)
					.context("Failed to read GeoValue")?,
				),
				(5, 0) => extent = u32::try_from(reader.read_varint().context("Failed to read extent")?)?,
				(15, 0) => version = u32::try_from(reader.read_varint().context("Failed to read version")?)?,
				(_, w) => reader.skip_pbf_value(w).context("Failed to skip unknown layer field")?,
			}
		}

		ensure!(extent > 0, "Layer extent must be positive");

		Ok(VectorTileLayer {
			extent,
			features,
			name: name.ok_or_else(|| anyhow!("Layer name is required"))?,
			property_manager,
			version,
		})
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		writer.write_pbf_key(1, 2)?;
		writer.write_pbf_string(&self.name)?;

		for feature in &self.features {
			writer.write_pbf_key(2, 2)?;
			writer.write_pbf_blob(&feature.to_blob().context("Failed to convert feature to blob")?)?;
		}

		for key in self.property_manager.key.iter() {
			writer.write_pbf_key(3, 2)?;
			writer.write_pbf_string(key)?;
		}

		for value in self.property_manager.val.iter() {
			writer.write_pbf_key(4, 2)?;
			writer.write_pbf_blob(&value.to_blob().context("Failed to convert property value to blob")?)?;
		}

		if self.extent != 4096 {
			writer.write_pbf_key(5, 0)?;
			writer.write_varint(u64::from(self.extent))?;
		}

		if self.version != 1 {
			writer.write_pbf_key(15, 0)?;
			writer.write_varint(u64::from(self.version))?;
		}

		Ok(writer.into_blob())
	}

	/// Appends a feature whose geometry is given in tile coordinates.
	pub fn add_feature(&mut self, id: Option<u64>, geometry: &Geometry<f64>, properties: &GeoProperties) -> Result<()> {
		let tag_ids = self.property_manager.encode_tag_ids(properties);
		self
			.features
			.push(VectorTileFeature::from_geometry(id, tag_ids, geometry)?);
		Ok(())
	}

	/// Decodes all features of the layer, which is assumed to be the tile at `coord`.
	///
	/// Geometries are converted to Web Mercator metres. With `clip` set, they are cut to the
	/// tile's square and features that end up empty are dropped.
	/// Any malformed feature fails the whole call.
	pub fn decode_features(&self, coord: &TileCoord, clip: bool) -> Result<Vec<TileFeature>> {
		let bbox = coord.as_mercator_bbox();
		let scale = bbox.width() / f64::from(self.extent);

		let mut result = Vec::with_capacity(self.features.len());
		for feature in &self.features {
			let geometry = feature
				.to_geometry()
				.with_context(|| format!("Failed to decode geometry of a feature in layer '{}' of tile {coord}", self.name))?;
			let geometry = geometry.map_coords(|c| Coord {
				x: bbox.x_min + c.x * scale,
				y: bbox.y_max - c.y * scale,
			});

			let geometry = if clip {
				match clip_geometry(geometry, &bbox) {
					Some(g) => g,
					None => {
						trace!("feature {:?} of layer '{}' lies outside of tile {coord}", feature.id, self.name);
						continue;
					}
				}
			} else {
				geometry
			};

			let properties = self
				.property_manager
				.decode_tag_ids(&feature.tag_ids)
				.with_context(|| format!("Failed to decode properties in layer '{}' of tile {coord}", self.name))?;

			result.push(TileFeature {
				id: feature.id,
				geometry,
				properties,
			});
		}
		Ok(result)
	}
}
