use super::{PMTilesCompression, PMTilesType};
use anyhow::{Result, ensure};
use pmvector_core::{
	Blob, ByteRange,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob},
};

/// Magic bytes at the start of every version 3 archive.
pub const PMTILES_MAGIC: &[u8; 8] = b"PMTiles\x03";

/// The fixed-size header at the start of an archive.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderV3 {
	pub root_dir: ByteRange,
	pub metadata: ByteRange,
	pub leaf_dirs: ByteRange,
	pub tile_data: ByteRange,
	pub addressed_tiles_count: u64,
	pub tile_entries_count: u64,
	pub tile_contents_count: u64,
	pub clustered: bool,
	pub internal_compression: PMTilesCompression,
	pub tile_compression: PMTilesCompression,
	pub tile_type: PMTilesType,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub min_lon_e7: i32,
	pub min_lat_e7: i32,
	pub max_lon_e7: i32,
	pub max_lat_e7: i32,
	pub center_zoom: u8,
	pub center_lon_e7: i32,
	pub center_lat_e7: i32,
}

impl HeaderV3 {
	pub fn serialize(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_slice(PMTILES_MAGIC)?;

		writer.write_range(&self.root_dir)?;
		writer.write_range(&self.metadata)?;
		writer.write_range(&self.leaf_dirs)?;
		writer.write_range(&self.tile_data)?;
		writer.write_u64(self.addressed_tiles_count)?;
		writer.write_u64(self.tile_entries_count)?;
		writer.write_u64(self.tile_contents_count)?;

		writer.write_u8(u8::from(self.clustered))?;
		writer.write_u8(self.internal_compression as u8)?;
		writer.write_u8(self.tile_compression as u8)?;
		writer.write_u8(self.tile_type as u8)?;
		writer.write_u8(self.min_zoom)?;
		writer.write_u8(self.max_zoom)?;
		writer.write_i32(self.min_lon_e7)?;
		writer.write_i32(self.min_lat_e7)?;
		writer.write_i32(self.max_lon_e7)?;
		writer.write_i32(self.max_lat_e7)?;
		writer.write_u8(self.center_zoom)?;
		writer.write_i32(self.center_lon_e7)?;
		writer.write_i32(self.center_lat_e7)?;

		Ok(writer.into_blob())
	}

	pub fn deserialize(blob: &Blob) -> Result<Self> {
		let buffer = blob.as_slice();

		ensure!(buffer.len() == 127, "pmtiles header must be 127 bytes, got {}", buffer.len());
		ensure!(&buffer[0..7] == b"PMTiles", "pmtiles magic number exception");
		ensure!(buffer[7] == 3, "pmtiles version: must be 3");

		let mut reader = ValueReaderSlice::new_le(buffer);
		reader.set_position(8)?;

		let header = Self {
			root_dir: reader.read_range()?,
			metadata: reader.read_range()?,
			leaf_dirs: reader.read_range()?,
			tile_data: reader.read_range()?,
			addressed_tiles_count: reader.read_u64()?,
			tile_entries_count: reader.read_u64()?,
			tile_contents_count: reader.read_u64()?,
			clustered: reader.read_u8()? == 1,
			internal_compression: PMTilesCompression::from_u8(reader.read_u8()?)?,
			tile_compression: PMTilesCompression::from_u8(reader.read_u8()?)?,
			tile_type: PMTilesType::from_u8(reader.read_u8()?)?,
			min_zoom: reader.read_u8()?,
			max_zoom: reader.read_u8()?,
			min_lon_e7: reader.read_i32()?,
			min_lat_e7: reader.read_i32()?,
			max_lon_e7: reader.read_i32()?,
			max_lat_e7: reader.read_i32()?,
			center_zoom: reader.read_u8()?,
			center_lon_e7: reader.read_i32()?,
			center_lat_e7: reader.read_i32()?,
		};

		ensure!(
			header.min_zoom <= header.max_zoom,
			"pmtiles header has min_zoom {} above max_zoom {}",
			header.min_zoom,
			header.max_zoom
		);

		Ok(header)
	}

	#[must_use]
	pub fn len() -> u64 {
		127
	}

	/// Bounds as `[west, south, east, north]` in degrees.
	#[must_use]
	pub fn bounds(&self) -> [f64; 4] {
		[
			f64::from(self.min_lon_e7) / 1e7,
			f64::from(self.min_lat_e7) / 1e7,
			f64::from(self.max_lon_e7) / 1e7,
			f64::from(self.max_lat_e7) / 1e7,
		]
	}

	/// Center as `[lon, lat, zoom]`.
	#[must_use]
	pub fn center(&self) -> [f64; 3] {
		[
			f64::from(self.center_lon_e7) / 1e7,
			f64::from(self.center_lat_e7) / 1e7,
			f64::from(self.center_zoom),
		]
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn example() -> HeaderV3 {
		HeaderV3 {
			root_dir: ByteRange::new(127, 2271),
			metadata: ByteRange::new(2398, 592),
			leaf_dirs: ByteRange::new(2990, 0),
			tile_data: ByteRange::new(2990, 25869006),
			addressed_tiles_count: 878,
			tile_entries_count: 878,
			tile_contents_count: 876,
			clustered: true,
			internal_compression: PMTilesCompression::Gzip,
			tile_compression: PMTilesCompression::Gzip,
			tile_type: PMTilesType::MVT,
			min_zoom: 0,
			max_zoom: 14,
			min_lon_e7: 130828300,
			min_lat_e7: 523344600,
			max_lon_e7: 137622450,
			max_lat_e7: 526783000,
			center_zoom: 7,
			center_lon_e7: 134225380,
			center_lat_e7: 525063800,
		}
	}

	#[test]
	fn serialize_then_deserialize() -> Result<()> {
		let header = example();
		let blob = header.serialize()?;
		assert_eq!(blob.len(), HeaderV3::len());
		assert!(blob.starts_with(PMTILES_MAGIC));
		assert_eq!(HeaderV3::deserialize(&blob)?, header);
		Ok(())
	}

	#[test]
	fn rejects_broken_headers() -> Result<()> {
		let blob = example().serialize()?;

		let mut wrong_version = blob.clone().into_vec();
		wrong_version[7] = 2;
		assert_eq!(
			HeaderV3::deserialize(&Blob::from(wrong_version)).unwrap_err().to_string(),
			"pmtiles version: must be 3"
		);

		let mut wrong_magic = blob.clone().into_vec();
		wrong_magic[0] = b'X';
		assert!(HeaderV3::deserialize(&Blob::from(wrong_magic)).is_err());

		assert!(HeaderV3::deserialize(&Blob::from(&blob.as_slice()[..100])).is_err());

		let mut inverted_zoom = blob.into_vec();
		inverted_zoom[100] = 9;
		inverted_zoom[101] = 3;
		assert!(HeaderV3::deserialize(&Blob::from(inverted_zoom)).is_err());
		Ok(())
	}

	#[test]
	fn bounds_and_center() {
		let header = example();
		assert_eq!(header.bounds(), [13.08283, 52.33446, 13.762245, 52.6783]);
		assert_eq!(header.center(), [13.422538, 52.506380, 7.0]);
	}
}
