//! One vector layer of an opened dataset.
//!
//! A layer reads features lazily: every call to [`Layer::features_by_tile`] fetches the tiles
//! of the current zoom level that fall into the spatial filter (or all stored tiles of that level
//! without a filter), decodes this layer's part of each tile and yields the features tile by tile.
//! A tile that fails to load or decode yields one error and iteration continues with the next tile.

use anyhow::{Context, Result};
use futures::{
	StreamExt,
	future::ready,
	stream::{self, BoxStream},
};
use geo::{BoundingRect, Geometry};
use log::{debug, trace};
use pmvector_container::{LayerInfo, PMTilesReader};
use pmvector_core::{MercatorBBox, TileCoord};
use pmvector_geometry::{GeoProperties, GeoValue, GeometryKind, vector_tile::VectorTile};
use serde_json::{Map, Number, Value};
use std::{fmt, sync::Arc};

/// Filters covering at most this many tiles are resolved by direct lookups instead of a directory walk.
const MAX_DIRECT_LOOKUPS: u64 = 1024;

/// Name of the single attribute that holds all properties as JSON when `JSON_FIELD` is set.
pub const JSON_FIELD_NAME: &str = "json";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
	String,
	Real,
	Boolean,
}

impl FieldType {
	/// Maps the type names used in `vector_layers` metadata.
	#[must_use]
	pub fn from_declared(name: &str) -> FieldType {
		match name.to_ascii_lowercase().as_str() {
			"number" => FieldType::Real,
			"boolean" => FieldType::Boolean,
			_ => FieldType::String,
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			FieldType::String => "String",
			FieldType::Real => "Real",
			FieldType::Boolean => "Boolean",
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDefn {
	pub name: String,
	pub field_type: FieldType,
}

impl FieldDefn {
	#[must_use]
	pub fn new(name: &str, field_type: FieldType) -> FieldDefn {
		FieldDefn {
			name: name.to_string(),
			field_type,
		}
	}
}

/// A feature in Web Mercator metres, together with the tile it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
	pub fid: Option<u64>,
	pub tile: TileCoord,
	pub geometry: Geometry<f64>,
	pub attributes: GeoProperties,
}

/// All features of one layer found in one tile.
#[derive(Clone, Debug, PartialEq)]
pub struct TileFeatures {
	pub coord: TileCoord,
	pub features: Vec<Feature>,
}

/// Settings a layer takes over from the dataset.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LayerSettings {
	pub zoom_level: u8,
	pub clip: bool,
	pub json_field: bool,
	pub zoom_level_auto: bool,
	pub extent: MercatorBBox,
}

pub struct Layer {
	reader: Arc<PMTilesReader>,
	info: LayerInfo,
	schema: Vec<FieldDefn>,
	settings: LayerSettings,
	initial_zoom_level: u8,
	spatial_filter: Option<MercatorBBox>,
}

impl Layer {
	pub(crate) fn new(reader: Arc<PMTilesReader>, info: LayerInfo, settings: LayerSettings) -> Layer {
		let schema = if settings.json_field {
			vec![FieldDefn::new(JSON_FIELD_NAME, FieldType::String)]
		} else {
			info
				.fields
				.iter()
				.map(|(name, kind)| FieldDefn::new(name, FieldType::from_declared(kind)))
				.collect()
		};
		Layer {
			reader,
			info,
			schema,
			initial_zoom_level: settings.zoom_level,
			settings,
			spatial_filter: None,
		}
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.info.name
	}

	#[must_use]
	pub fn description(&self) -> Option<&str> {
		self.info.description.as_deref()
	}

	/// The geometry kind announced by the metadata. `Unknown` if the archive does not say.
	#[must_use]
	pub fn geometry_kind(&self) -> GeometryKind {
		self.info.geometry
	}

	#[must_use]
	pub fn schema(&self) -> &[FieldDefn] {
		&self.schema
	}

	/// The zoom level features are currently read from.
	#[must_use]
	pub fn zoom_level(&self) -> u8 {
		self.settings.zoom_level
	}

	/// The zoom range the metadata declares for this layer.
	#[must_use]
	pub fn zoom_range(&self) -> (u8, u8) {
		(self.info.min_zoom, self.info.max_zoom)
	}

	/// The archive's bounds in Web Mercator metres.
	#[must_use]
	pub fn extent(&self) -> MercatorBBox {
		self.settings.extent
	}

	#[must_use]
	pub fn clip(&self) -> bool {
		self.settings.clip
	}

	#[must_use]
	pub fn spatial_filter(&self) -> Option<&MercatorBBox> {
		self.spatial_filter.as_ref()
	}

	/// Restricts reading to features intersecting the rectangle, given in Web Mercator metres.
	///
	/// With `ZOOM_LEVEL_AUTO`, this also picks the zoom level whose tiles are closest in size to
	/// the rectangle.
	pub fn set_spatial_filter_rect(&mut self, x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<()> {
		let bbox = MercatorBBox::new(x_min, y_min, x_max, y_max).context("invalid spatial filter")?;
		self.spatial_filter = Some(bbox);

		if self.settings.zoom_level_auto {
			let zoom_level = auto_zoom_level(&bbox, self.zoom_range());
			if zoom_level != self.settings.zoom_level {
				debug!(
					"layer '{}': spatial filter {bbox:?} switches zoom level {} -> {zoom_level}",
					self.info.name, self.settings.zoom_level
				);
				self.settings.zoom_level = zoom_level;
			}
		}
		Ok(())
	}

	/// Removes the spatial filter. With `ZOOM_LEVEL_AUTO` the zoom level returns to the one chosen when opening.
	pub fn clear_spatial_filter(&mut self) {
		self.spatial_filter = None;
		if self.settings.zoom_level_auto {
			self.settings.zoom_level = self.initial_zoom_level;
		}
	}

	/// The tiles of the current zoom level that will be read.
	///
	/// A small filter is looked up tile by tile. A larger one only keeps the tiles the archive
	/// stores at that level, so the result never exceeds the archive's own tile count.
	pub async fn tile_coords(&self) -> Result<Vec<TileCoord>> {
		let level = self.settings.zoom_level;
		let range = match &self.spatial_filter {
			Some(filter) => match filter
				.intersected(&self.settings.extent)
				.and_then(|bbox| bbox.covering_range(level))
			{
				Some(range) if range.count() <= MAX_DIRECT_LOOKUPS => return Ok(range.iter().collect()),
				Some(range) => Some(range),
				None => return Ok(Vec::new()),
			},
			None => None,
		};

		let mut coords = self
			.reader
			.tiles_at_level(level)
			.await
			.with_context(|| format!("failed to list tiles at zoom level {level}"))?;
		if let Some(range) = range {
			coords.retain(|coord| range.contains(coord));
			trace!("layer '{}': {} stored tiles inside {range:?}", self.info.name, coords.len());
		}
		Ok(coords)
	}

	/// Streams the features of this layer, one item per tile that holds any.
	///
	/// Tiles missing from the archive or lacking this layer are skipped.
	pub fn features_by_tile(&self) -> BoxStream<'_, Result<TileFeatures>> {
		stream::once(self.tile_coords())
			.flat_map(|coords| match coords {
				Ok(coords) => stream::iter(coords).map(anyhow::Ok).boxed(),
				Err(error) => stream::once(ready(Err(error))).boxed(),
			})
			.then(move |coord| async move { self.read_tile(coord?).await })
			.filter_map(|result| ready(result.transpose()))
			.boxed()
	}

	/// Streams single features. A failing tile shows up as one `Err` item between the features
	/// of the other tiles.
	pub fn features(&self) -> BoxStream<'_, Result<Feature>> {
		self
			.features_by_tile()
			.flat_map(|result| {
				let items: Vec<Result<Feature>> = match result {
					Ok(tile) => tile.features.into_iter().map(Ok).collect(),
					Err(error) => vec![Err(error)],
				};
				stream::iter(items)
			})
			.boxed()
	}

	async fn read_tile(&self, coord: TileCoord) -> Result<Option<TileFeatures>> {
		trace!("layer '{}': reading tile {coord}", self.info.name);

		let Some(blob) = self.reader.get_tile_data(&coord).await? else {
			return Ok(None);
		};
		let tile = VectorTile::from_blob(&blob).with_context(|| format!("failed to decode tile {coord}"))?;
		let Some(layer) = tile.find_layer(&self.info.name) else {
			return Ok(None);
		};

		let features = layer
			.decode_features(&coord, self.settings.clip)
			.with_context(|| format!("failed to decode layer '{}' of tile {coord}", self.info.name))?
			.into_iter()
			.filter(|feature| self.passes_filter(&feature.geometry))
			.map(|feature| Feature {
				fid: feature.id,
				tile: coord,
				geometry: feature.geometry,
				attributes: if self.settings.json_field {
					flatten_to_json(&feature.properties)
				} else {
					feature.properties
				},
			})
			.collect::<Vec<_>>();

		if features.is_empty() {
			return Ok(None);
		}
		Ok(Some(TileFeatures { coord, features }))
	}

	fn passes_filter(&self, geometry: &Geometry<f64>) -> bool {
		let Some(filter) = &self.spatial_filter else {
			return true;
		};
		geometry.bounding_rect().is_some_and(|rect| {
			rect.min().x <= filter.x_max
				&& filter.x_min <= rect.max().x
				&& rect.min().y <= filter.y_max
				&& filter.y_min <= rect.max().y
		})
	}
}

impl fmt::Debug for Layer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Layer")
			.field("name", &self.info.name)
			.field("zoom_level", &self.settings.zoom_level)
			.field("schema", &self.schema)
			.field("spatial_filter", &self.spatial_filter)
			.finish()
	}
}

/// The zoom level at which one tile is closest in size to the larger side of `bbox`, clamped to `range`.
fn auto_zoom_level(bbox: &MercatorBBox, range: (u8, u8)) -> u8 {
	let size = bbox.width().max(bbox.height());
	if size <= 0.0 {
		return range.1;
	}
	let zoom = (TileCoord::tile_size_at(0) / size).log2().round();
	zoom.clamp(f64::from(range.0), f64::from(range.1)) as u8
}

/// Converts properties to a JSON object. Non-finite numbers become `null`.
#[must_use]
pub fn properties_to_json(properties: &GeoProperties) -> Map<String, Value> {
	properties
		.iter()
		.map(|(key, value)| (key.clone(), to_json_value(value)))
		.collect()
}

/// Collapses all properties into a single JSON object string.
fn flatten_to_json(properties: &GeoProperties) -> GeoProperties {
	let object = Value::Object(properties_to_json(properties));
	GeoProperties::from(vec![(JSON_FIELD_NAME, GeoValue::String(object.to_string()))])
}

fn to_json_value(value: &GeoValue) -> Value {
	match value {
		GeoValue::Bool(b) => Value::Bool(*b),
		GeoValue::Double(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
		GeoValue::Float(v) => Number::from_f64(f64::from(*v)).map_or(Value::Null, Value::Number),
		GeoValue::Int(v) => Value::from(*v),
		GeoValue::UInt(v) => Value::from(*v),
		GeoValue::Null => Value::Null,
		GeoValue::String(s) => Value::String(s.clone()),
	}
}
