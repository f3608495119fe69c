//! `DriverRegistry` knows the available dataset drivers and opens inputs with the first one that
//! recognizes them.
//!
//! Registries are plain values, so tests and applications can build as many as they need.
//!
//! ```rust
//! use pmvector::{DriverRegistry, register_pmtiles};
//! use pmvector_container::ContainerRegistry;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut drivers = DriverRegistry::new_empty();
//! let mut containers = ContainerRegistry::new_empty();
//! register_pmtiles(&mut drivers, &mut containers)?;
//! register_pmtiles(&mut drivers, &mut containers)?;
//!
//! assert_eq!(drivers.names(), vec!["PMTiles"]);
//! assert!(containers.supports_reader_extension("pmtiles"));
//! # Ok(())
//! # }
//! ```

use crate::{
	Dataset, DriverError, OpenInfo, OpenOptions, OptionDefinition, identify::identify, option_definitions,
};
use anyhow::{Context, Result, anyhow, bail};
use futures::future::BoxFuture;
use log::debug;
use pmvector_container::{ContainerRegistry, DataLocation, register_pmtiles_container};
use std::fmt;

pub const PMTILES_DRIVER_NAME: &str = "PMTiles";

/// Recognizes an input from its probed header. Never fails and never reads.
pub type IdentifyFn = fn(&OpenInfo) -> bool;

/// Opens a recognized input. The container registry supplies the archive reader.
pub type OpenFn = fn(OpenInfo, OpenOptions, ContainerRegistry) -> BoxFuture<'static, Result<Dataset>>;

/// Everything generic tooling needs to know about a driver.
#[derive(Clone)]
pub struct DriverRecord {
	pub name: &'static str,
	pub long_name: &'static str,
	pub extensions: &'static str,
	pub help_topic: &'static str,
	pub options: Vec<OptionDefinition>,
	/// Reads vector features.
	pub vector: bool,
	/// Can read from any byte source, not only local files.
	pub virtual_io: bool,
	pub identify: IdentifyFn,
	pub open: OpenFn,
}

impl fmt::Debug for DriverRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DriverRecord")
			.field("name", &self.name)
			.field("long_name", &self.long_name)
			.field("extensions", &self.extensions)
			.field("help_topic", &self.help_topic)
			.field("vector", &self.vector)
			.field("virtual_io", &self.virtual_io)
			.finish()
	}
}

/// Registered drivers, in registration order.
#[derive(Clone, Debug, Default)]
pub struct DriverRegistry {
	drivers: Vec<DriverRecord>,
}

impl DriverRegistry {
	#[must_use]
	pub fn new_empty() -> Self {
		Self::default()
	}

	/// A registry with all drivers of this crate, plus the container registry they rely on.
	pub fn new_default() -> Result<(DriverRegistry, ContainerRegistry)> {
		let mut drivers = DriverRegistry::new_empty();
		let mut containers = ContainerRegistry::new_empty();
		register_pmtiles(&mut drivers, &mut containers)?;
		Ok((drivers, containers))
	}

	#[must_use]
	pub fn has_driver(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Adds `record`. Names are unique, so a second record with the same name is refused.
	pub fn register(&mut self, record: DriverRecord) -> Result<()> {
		if self.has_driver(record.name) {
			bail!("a driver named '{}' is already registered", record.name);
		}
		debug!("registering driver '{}' ({})", record.name, record.long_name);
		self.drivers.push(record);
		Ok(())
	}

	/// Looks up a driver by name, ignoring case.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&DriverRecord> {
		self.drivers.iter().find(|record| record.name.eq_ignore_ascii_case(name))
	}

	#[must_use]
	pub fn names(&self) -> Vec<&'static str> {
		self.drivers.iter().map(|record| record.name).collect()
	}

	/// The first driver that recognizes `info`.
	#[must_use]
	pub fn identify(&self, info: &OpenInfo) -> Option<&DriverRecord> {
		self.drivers.iter().find(|record| (record.identify)(info))
	}

	/// Opens `location` (a path or an `http(s)://` URL) with the first driver that recognizes it.
	///
	/// Options are validated after identification and before the archive is opened.
	pub async fn identify_and_open<K: AsRef<str>, V: AsRef<str>>(
		&self,
		containers: &ContainerRegistry,
		location: &str,
		options: &[(K, V)],
	) -> Result<Dataset> {
		let mut location = DataLocation::parse(location)?;
		location.resolve()?;
		let data_reader = location
			.to_data_reader()
			.with_context(|| format!("failed to open '{location}'"))?;

		let info = OpenInfo::probe(data_reader).await;
		let record = self
			.identify(&info)
			.ok_or_else(|| anyhow!("no registered driver recognizes '{location}'"))?;
		debug!("'{location}' is recognized by driver '{}'", record.name);

		let options = OpenOptions::parse(options)?;
		(record.open)(info, options, containers.clone()).await
	}
}

/// Registers the PMTiles driver, and the container handler it reads archives with.
///
/// Does nothing if a driver named "PMTiles" already exists. A container handler that is already
/// present is reused. If the container handler cannot be registered, no driver record is published.
pub fn register_pmtiles(drivers: &mut DriverRegistry, containers: &mut ContainerRegistry) -> Result<()> {
	register_after_companion(drivers, || {
		if containers.supports_reader_extension("pmtiles") {
			debug!("container handler for 'pmtiles' is already registered");
			return Ok(());
		}
		register_pmtiles_container(containers)
	})
}

fn register_after_companion(drivers: &mut DriverRegistry, companion: impl FnOnce() -> Result<()>) -> Result<()> {
	if drivers.has_driver(PMTILES_DRIVER_NAME) {
		debug!("driver '{PMTILES_DRIVER_NAME}' is already registered");
		return Ok(());
	}

	companion().context("failed to register the PMTiles container handler")?;

	drivers.register(DriverRecord {
		name: PMTILES_DRIVER_NAME,
		long_name: "ProtoMap Tiles",
		extensions: "pmtiles",
		help_topic: "drivers/vector/pmtiles.html",
		options: option_definitions(),
		vector: true,
		virtual_io: true,
		identify,
		open: open_pmtiles,
	})
}

fn open_pmtiles(info: OpenInfo, options: OpenOptions, containers: ContainerRegistry) -> BoxFuture<'static, Result<Dataset>> {
	Box::pin(open_pmtiles_dataset(info, options, containers))
}

async fn open_pmtiles_dataset(info: OpenInfo, options: OpenOptions, containers: ContainerRegistry) -> Result<Dataset> {
	if !identify(&info) {
		bail!(DriverError::IdentifyMismatch);
	}
	let name = info.name;
	let data_reader = info
		.data_reader
		.ok_or_else(|| DriverError::Open(format!("'{name}' has no data reader")))?;
	let reader = containers
		.get_reader_from_data("pmtiles", data_reader)
		.await
		.context(DriverError::Open(format!("failed to read archive '{name}'")))?;
	Dataset::open(reader, options).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use pmvector_core::{Blob, assert_wildcard};

	#[test]
	fn record_fields() -> Result<()> {
		let (drivers, _) = DriverRegistry::new_default()?;
		let record = drivers.get("pmtiles").context("driver is missing")?;
		assert_eq!(record.name, "PMTiles");
		assert_eq!(record.long_name, "ProtoMap Tiles");
		assert_eq!(record.extensions, "pmtiles");
		assert_eq!(record.help_topic, "drivers/vector/pmtiles.html");
		assert!(record.vector);
		assert!(record.virtual_io);
		assert_eq!(record.options, option_definitions());
		assert_wildcard!(format!("{record:?}"), "DriverRecord { name: \"PMTiles\", *virtual_io: true }");
		Ok(())
	}

	#[test]
	fn register_rejects_duplicate_names() -> Result<()> {
		let (mut drivers, _) = DriverRegistry::new_default()?;
		let record = drivers.get(PMTILES_DRIVER_NAME).context("driver is missing")?.clone();
		assert_eq!(
			drivers.register(record).unwrap_err().to_string(),
			"a driver named 'PMTiles' is already registered"
		);
		Ok(())
	}

	#[test]
	fn identify_picks_driver() -> Result<()> {
		let (drivers, _) = DriverRegistry::new_default()?;
		let mut header = b"PMTiles\x03".to_vec();
		header.resize(127, 0);

		let reader: pmvector_core::io::DataReader = Box::new(pmvector_core::io::DataReaderBlob::from(header.clone()));
		let info = OpenInfo::new("a.pmtiles", Blob::from(header), Some(reader));
		assert_eq!(drivers.identify(&info).map(|r| r.name), Some("PMTiles"));

		let info = OpenInfo::new("a.mbtiles", Blob::from("SQLite format 3"), None);
		assert!(drivers.identify(&info).is_none());
		Ok(())
	}

	#[test]
	fn companion_failure_publishes_no_driver() {
		let mut drivers = DriverRegistry::new_empty();
		let error = register_after_companion(&mut drivers, || bail!("no archive backend")).unwrap_err();
		assert_eq!(
			format!("{error:#}"),
			"failed to register the PMTiles container handler: no archive backend"
		);
		assert!(!drivers.has_driver(PMTILES_DRIVER_NAME));

		register_after_companion(&mut drivers, || Ok(())).unwrap();
		assert!(drivers.has_driver(PMTILES_DRIVER_NAME));
		// the companion step is skipped once the driver exists
		register_after_companion(&mut drivers, || bail!("must not run")).unwrap();
	}

	#[tokio::test]
	async fn open_checks_identification() -> Result<()> {
		let info = OpenInfo::new("a.txt", Blob::from("hello"), None);
		let error = open_pmtiles(info, OpenOptions::default(), ContainerRegistry::new_empty())
			.await
			.unwrap_err();
		assert_eq!(error.downcast_ref::<DriverError>(), Some(&DriverError::IdentifyMismatch));
		Ok(())
	}
}
