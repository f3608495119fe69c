mod common;

use anyhow::Result;
use common::{coord, driver_error, tile, write_file};
use geo::{Geometry, point};
use pmvector::{DriverError, DriverRegistry, OpenInfo, PMTILES_DRIVER_NAME, register_pmtiles};
use pmvector_container::{ContainerRegistry, register_pmtiles_container, testing::ArchiveBuilder};
use pmvector_core::{
	Blob, assert_wildcard,
	io::{DataReader, DataReaderBlob},
};
use pmvector_geometry::GeoProperties;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn archive() -> Result<ArchiveBuilder> {
	let mut builder = ArchiveBuilder::new(0, 2).with_layer("pois", (0, 2), &[], Some("Point"));
	builder.add_tile(
		&coord(2, 2, 1),
		&tile(&[("pois", Geometry::Point(point!(x: 5.0, y: 5.0)), GeoProperties::new())])?,
	)?;
	Ok(builder)
}

#[rstest]
#[case::full_header(b"PMTiles\x03".to_vec(), 127, true)]
#[case::header_and_more(b"PMTiles\x03".to_vec(), 4096, true)]
#[case::one_byte_short(b"PMTiles\x03".to_vec(), 126, false)]
#[case::version_2(b"PMTiles\x02".to_vec(), 127, false)]
#[case::other_format(b"SQLite format 3\x00".to_vec(), 127, false)]
fn identify_by_header(#[case] mut bytes: Vec<u8>, #[case] size: usize, #[case] expected: bool) -> Result<()> {
	let (drivers, _) = DriverRegistry::new_default()?;
	bytes.resize(size, 0);
	let reader: DataReader = Box::new(DataReaderBlob::from(bytes.clone()));
	let info = OpenInfo::new("input", Blob::from(bytes), Some(reader));
	assert_eq!(drivers.identify(&info).is_some(), expected);
	Ok(())
}

#[test]
fn registering_twice_keeps_one_record() -> Result<()> {
	let mut drivers = DriverRegistry::new_empty();
	let mut containers = ContainerRegistry::new_empty();
	register_pmtiles(&mut drivers, &mut containers)?;
	register_pmtiles(&mut drivers, &mut containers)?;
	assert_eq!(drivers.names(), vec![PMTILES_DRIVER_NAME]);
	assert_eq!(containers.extensions(), vec!["pmtiles"]);
	Ok(())
}

#[test]
fn shared_container_registry_is_reused() -> Result<()> {
	let mut containers = ContainerRegistry::new_empty();
	register_pmtiles_container(&mut containers)?;

	let mut first = DriverRegistry::new_empty();
	let mut second = DriverRegistry::new_empty();
	register_pmtiles(&mut first, &mut containers)?;
	register_pmtiles(&mut second, &mut containers)?;
	assert_eq!(first.names(), vec![PMTILES_DRIVER_NAME]);
	assert_eq!(second.names(), vec![PMTILES_DRIVER_NAME]);
	assert_eq!(containers.extensions(), vec!["pmtiles"]);
	Ok(())
}

#[tokio::test]
async fn open_file_through_registry() -> Result<()> {
	let (_file, path) = write_file(&archive()?, "places.pmtiles")?;
	let (drivers, containers) = DriverRegistry::new_default()?;

	let dataset = drivers.identify_and_open(&containers, &path, &[("ZOOM_LEVEL", "2")]).await?;
	assert_eq!(dataset.zoom_level(), 2);
	assert_eq!(dataset.layer_count(), 1);
	assert_wildcard!(dataset.name(), "*places.pmtiles");
	Ok(())
}

#[tokio::test]
async fn open_ignores_file_extension() -> Result<()> {
	let (_file, path) = write_file(&archive()?, "places.bin")?;
	let (drivers, containers) = DriverRegistry::new_default()?;
	let dataset = drivers.identify_and_open::<&str, &str>(&containers, &path, &[]).await?;
	assert_eq!(dataset.zoom_level(), 2);
	Ok(())
}

#[tokio::test]
async fn invalid_option_is_a_validation_error() -> Result<()> {
	let (_file, path) = write_file(&archive()?, "places.pmtiles")?;
	let (drivers, containers) = DriverRegistry::new_default()?;

	let error = drivers
		.identify_and_open(&containers, &path, &[("CLIP", "perhaps")])
		.await
		.unwrap_err();
	assert_eq!(
		driver_error(&error),
		&DriverError::Validation("CLIP: 'perhaps' is not a boolean".into())
	);
	assert!(driver_error(&error).is_validation());

	let error = drivers
		.identify_and_open(&containers, &path, &[("ZOOM_LEVEL", "7")])
		.await
		.unwrap_err();
	assert!(driver_error(&error).is_open());
	Ok(())
}

#[tokio::test]
async fn unrecognized_input() -> Result<()> {
	let file = assert_fs::NamedTempFile::new("notes.pmtiles")?;
	std::fs::write(file.path(), "just some text")?;
	let (drivers, containers) = DriverRegistry::new_default()?;

	let path = file.path().to_str().expect("UTF-8 path");
	let error = drivers
		.identify_and_open::<&str, &str>(&containers, path, &[])
		.await
		.unwrap_err();
	assert_wildcard!(error, "no registered driver recognizes '*notes.pmtiles'");
	Ok(())
}

#[tokio::test]
async fn record_open_requires_identification() -> Result<()> {
	let (drivers, containers) = DriverRegistry::new_default()?;
	let record = drivers.get(PMTILES_DRIVER_NAME).expect("driver");

	let info = OpenInfo::new("empty", Blob::new_empty(), None);
	let error = (record.open)(info, Default::default(), containers).await.unwrap_err();
	assert_eq!(driver_error(&error), &DriverError::IdentifyMismatch);
	Ok(())
}
