//! Turning an opened archive plus open options into a dataset of vector layers.

use crate::{DriverError, Layer, OpenOptions, layer::LayerSettings};
use anyhow::{Context, Result, bail, ensure};
use log::debug;
use pmvector_container::{HeaderV3, LayerCatalog, PMTilesReader, PMTilesType};
use pmvector_core::MercatorBBox;
use std::{fmt, sync::Arc};

/// An opened PMTiles vector archive, exposed as one [`Layer`] per declared vector layer.
pub struct Dataset {
	reader: Arc<PMTilesReader>,
	options: OpenOptions,
	catalog: LayerCatalog,
	zoom_level: u8,
	layers: Vec<Layer>,
}

impl Dataset {
	/// Builds the dataset, failing with [`DriverError::Open`] if the archive cannot back one.
	///
	/// The zoom level is `ZOOM_LEVEL` if given, checked against the archive's range. Otherwise it
	/// is the highest level that holds any tile. Only layers whose declared range includes that
	/// level are exposed.
	pub async fn open(reader: PMTilesReader, options: OpenOptions) -> Result<Dataset> {
		let name = reader.get_name().to_string();
		debug!("opening dataset '{name}' with {options:?}");

		let header = reader.header();
		ensure!(
			header.tile_type == PMTilesType::MVT,
			DriverError::Open(format!("tile type is {}, only vector tiles (mvt) are supported", header.tile_type))
		);

		let catalog = reader
			.layer_catalog()
			.context(DriverError::Open("failed to read the layer catalog".into()))?;
		ensure!(
			!catalog.is_empty(),
			DriverError::Open("the metadata declares no vector layers".into())
		);

		let zoom_level = resolve_zoom_level(&reader, &options).await?;
		debug!("dataset '{name}' uses zoom level {zoom_level}");

		let settings = LayerSettings {
			zoom_level,
			clip: options.clip,
			json_field: options.json_field(),
			zoom_level_auto: options.zoom_level_auto,
			extent: archive_extent(header),
		};

		let reader = Arc::new(reader);
		let layers: Vec<Layer> = catalog
			.iter()
			.filter(|info| info.covers_level(zoom_level))
			.map(|info| Layer::new(reader.clone(), info.clone(), settings))
			.collect();
		ensure!(
			!layers.is_empty(),
			DriverError::Open(format!("no vector layer is visible at zoom level {zoom_level}"))
		);
		debug!(
			"dataset '{name}' has {} of {} layers at zoom level {zoom_level}",
			layers.len(),
			catalog.layers.len()
		);

		Ok(Dataset {
			reader,
			options,
			catalog,
			zoom_level,
			layers,
		})
	}

	#[must_use]
	pub fn name(&self) -> &str {
		self.reader.get_name()
	}

	#[must_use]
	pub fn header(&self) -> &HeaderV3 {
		self.reader.header()
	}

	#[must_use]
	pub fn options(&self) -> &OpenOptions {
		&self.options
	}

	/// All layers the metadata declares, including those not visible at the dataset's zoom level.
	#[must_use]
	pub fn catalog(&self) -> &LayerCatalog {
		&self.catalog
	}

	/// The zoom level resolved when opening.
	#[must_use]
	pub fn zoom_level(&self) -> u8 {
		self.zoom_level
	}

	#[must_use]
	pub fn layer_count(&self) -> usize {
		self.layers.len()
	}

	#[must_use]
	pub fn layers(&self) -> &[Layer] {
		&self.layers
	}

	pub fn layers_mut(&mut self) -> &mut [Layer] {
		&mut self.layers
	}

	#[must_use]
	pub fn layer(&self, name: &str) -> Option<&Layer> {
		self.layers.iter().find(|layer| layer.name() == name)
	}

	pub fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
		self.layers.iter_mut().find(|layer| layer.name() == name)
	}
}

impl fmt::Debug for Dataset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dataset")
			.field("name", &self.name())
			.field("zoom_level", &self.zoom_level)
			.field("layers", &self.layers)
			.finish()
	}
}

async fn resolve_zoom_level(reader: &PMTilesReader, options: &OpenOptions) -> Result<u8> {
	let (min_zoom, max_zoom) = (reader.header().min_zoom, reader.header().max_zoom);

	if let Some(zoom_level) = options.zoom_level {
		let level = u8::try_from(zoom_level)
			.ok()
			.filter(|level| (min_zoom..=max_zoom).contains(level));
		return level.ok_or_else(|| {
			DriverError::Open(format!(
				"ZOOM_LEVEL {zoom_level} is outside of the archive's zoom range [{min_zoom}, {max_zoom}]"
			))
			.into()
		});
	}

	for level in (min_zoom..=max_zoom).rev() {
		let has_tiles = reader
			.has_tiles_at_level(level)
			.await
			.context(DriverError::Open(format!("failed to scan zoom level {level}")))?;
		if has_tiles {
			return Ok(level);
		}
		debug!("zoom level {level} is empty");
	}

	bail!(DriverError::Open("the archive contains no tiles".into()))
}

fn archive_extent(header: &HeaderV3) -> MercatorBBox {
	let [west, south, east, north] = header.bounds();
	MercatorBBox::from_lon_lat(west, south, east, north)
		.ok()
		.and_then(|bbox| bbox.intersected(&MercatorBBox::world()))
		.unwrap_or_else(|| {
			debug!("archive bounds {:?} are unusable, assuming the whole world", header.bounds());
			MercatorBBox::world()
		})
}
