//! The layer catalog stored in an archive's JSON metadata.
//!
//! Vector archives describe their layers in a TileJSON-like `vector_layers` array. Archives
//! produced by tippecanoe additionally carry `tilestats`, which names each layer's geometry type.

use anyhow::{Context, Result};
use pmvector_geometry::GeometryKind;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// One vector layer as declared in the metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerInfo {
	pub name: String,
	pub description: Option<String>,
	pub min_zoom: u8,
	pub max_zoom: u8,
	/// Declared attribute fields as `(name, type)`, sorted by name. Types are usually
	/// `String`, `Number` or `Boolean`.
	pub fields: Vec<(String, String)>,
	pub geometry: GeometryKind,
}

impl LayerInfo {
	#[must_use]
	pub fn covers_level(&self, level: u8) -> bool {
		self.min_zoom <= level && level <= self.max_zoom
	}
}

/// All layers declared in the metadata, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerCatalog {
	pub layers: Vec<LayerInfo>,
}

#[derive(Deserialize)]
struct RawMetadata {
	#[serde(default)]
	vector_layers: Vec<RawVectorLayer>,
	tilestats: Option<RawTileStats>,
}

#[derive(Deserialize)]
struct RawVectorLayer {
	id: String,
	description: Option<String>,
	minzoom: Option<f64>,
	maxzoom: Option<f64>,
	#[serde(default)]
	fields: BTreeMap<String, Value>,
}

#[derive(Deserialize)]
struct RawTileStats {
	#[serde(default)]
	layers: Vec<RawTileStatsLayer>,
}

#[derive(Deserialize)]
struct RawTileStatsLayer {
	layer: String,
	geometry: Option<String>,
}

impl LayerCatalog {
	/// Parses the metadata JSON. Layers without a zoom range inherit `default_zoom` (the
	/// archive's range), and declared ranges are clamped to it.
	pub fn from_json(json: &str, default_zoom: (u8, u8)) -> Result<LayerCatalog> {
		let raw: RawMetadata = serde_json::from_str(json).context("failed to parse archive metadata as JSON")?;

		let geometries: HashMap<String, GeometryKind> = raw
			.tilestats
			.map(|stats| {
				stats
					.layers
					.into_iter()
					.filter_map(|l| Some((l.layer, GeometryKind::from_name(&l.geometry?))))
					.collect()
			})
			.unwrap_or_default();

		let (min, max) = default_zoom;
		let to_level = |value: Option<f64>, default: u8| -> u8 {
			value.map_or(default, |v| v.round().clamp(f64::from(min), f64::from(max)) as u8)
		};

		let layers = raw
			.vector_layers
			.into_iter()
			.map(|layer| LayerInfo {
				geometry: geometries.get(&layer.id).copied().unwrap_or_default(),
				min_zoom: to_level(layer.minzoom, min),
				max_zoom: to_level(layer.maxzoom, max),
				fields: layer
					.fields
					.into_iter()
					.map(|(name, kind)| {
						let kind = kind.as_str().unwrap_or("String").to_string();
						(name, kind)
					})
					.collect(),
				description: layer.description.filter(|d| !d.is_empty()),
				name: layer.id,
			})
			.collect();

		Ok(LayerCatalog { layers })
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.layers.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &LayerInfo> {
		self.layers.iter()
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&LayerInfo> {
		self.layers.iter().find(|layer| layer.name == name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	const METADATA: &str = r#"{
		"name": "berlin",
		"vector_layers": [
			{"id": "water", "description": "", "minzoom": 0, "maxzoom": 14, "fields": {"kind": "String"}},
			{"id": "pois", "description": "Points of interest", "minzoom": 12, "fields": {"name": "String", "rank": "Number", "open": "Boolean"}},
			{"id": "streets", "maxzoom": 20.0}
		],
		"tilestats": {"layerCount": 2, "layers": [
			{"layer": "water", "geometry": "Polygon", "count": 12},
			{"layer": "pois", "geometry": "Point"}
		]}
	}"#;

	#[test]
	fn parse_catalog() -> Result<()> {
		let catalog = LayerCatalog::from_json(METADATA, (0, 14))?;
		assert_eq!(catalog.layers.len(), 3);

		let pois = catalog.get("pois").context("pois")?;
		assert_eq!(pois.description.as_deref(), Some("Points of interest"));
		assert_eq!((pois.min_zoom, pois.max_zoom), (12, 14));
		assert_eq!(
			pois.fields,
			vec![
				("name".to_string(), "String".to_string()),
				("open".to_string(), "Boolean".to_string()),
				("rank".to_string(), "Number".to_string()),
			]
		);
		assert_eq!(pois.geometry, GeometryKind::Point);
		assert!(pois.covers_level(13));
		assert!(!pois.covers_level(11));

		let water = catalog.get("water").context("water")?;
		assert_eq!(water.description, None);
		assert_eq!(water.geometry, GeometryKind::Polygon);

		let streets = catalog.get("streets").context("streets")?;
		assert_eq!((streets.min_zoom, streets.max_zoom), (0, 14));
		assert_eq!(streets.geometry, GeometryKind::Unknown);
		assert!(streets.fields.is_empty());
		Ok(())
	}

	#[test]
	fn missing_vector_layers() -> Result<()> {
		assert!(LayerCatalog::from_json(r#"{"name":"raster"}"#, (0, 4))?.is_empty());
		Ok(())
	}

	#[test]
	fn corrupt_metadata() {
		assert!(LayerCatalog::from_json("{\"vector_layers\": [", (0, 4)).is_err());
		assert!(LayerCatalog::from_json("[1,2,3]", (0, 4)).is_err());
		assert!(LayerCatalog::from_json(r#"{"vector_layers": [{"minzoom": 1}]}"#, (0, 4)).is_err());
	}
}
