//! Recognizing PMTiles v3 archives by their first bytes.

use log::{debug, trace};
use pmvector_container::PMTILES_MAGIC;
use pmvector_core::{
	Blob, ByteRange,
	io::DataReader,
};
use std::fmt::Debug;

/// Number of leading bytes read before identification. Equals the size of a v3 header.
pub const HEADER_PROBE_SIZE: u64 = 127;

/// A candidate input: its name, the probed header bytes, and the byte source if one could be opened.
pub struct OpenInfo {
	pub name: String,
	pub header: Blob,
	pub data_reader: Option<DataReader>,
}

impl OpenInfo {
	#[must_use]
	pub fn new(name: &str, header: Blob, data_reader: Option<DataReader>) -> OpenInfo {
		OpenInfo {
			name: name.to_string(),
			header,
			data_reader,
		}
	}

	/// Reads the first [`HEADER_PROBE_SIZE`] bytes of `data_reader`.
	///
	/// Sources shorter than that end up with an empty header, which no driver identifies.
	pub async fn probe(data_reader: DataReader) -> OpenInfo {
		let name = data_reader.get_name().to_string();
		let header = match data_reader.read_range(&ByteRange::new(0, HEADER_PROBE_SIZE)).await {
			Ok(header) => header,
			Err(error) => {
				debug!("could not probe header of '{name}': {error:#}");
				Blob::new_empty()
			}
		};
		trace!("probed {} header bytes of '{name}'", header.len());
		OpenInfo {
			name,
			header,
			data_reader: Some(data_reader),
		}
	}
}

impl Debug for OpenInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OpenInfo")
			.field("name", &self.name)
			.field("header", &self.header.len())
			.field("data_reader", &self.data_reader.is_some())
			.finish()
	}
}

/// Whether `info` looks like a PMTiles v3 archive.
///
/// Needs a full header and an open byte source. Only the probed header is inspected.
#[must_use]
pub fn identify(info: &OpenInfo) -> bool {
	info.header.len() >= HEADER_PROBE_SIZE && info.data_reader.is_some() && info.header.starts_with(PMTILES_MAGIC)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pmvector_core::io::DataReaderBlob;
	use rstest::rstest;

	fn header_info(bytes: Vec<u8>) -> OpenInfo {
		let reader: DataReader = Box::new(DataReaderBlob::from(bytes.clone()));
		OpenInfo::new("test.pmtiles", Blob::from(bytes), Some(reader))
	}

	fn padded(prefix: &[u8], len: usize) -> Vec<u8> {
		let mut bytes = prefix.to_vec();
		bytes.resize(len, 0xAB);
		bytes
	}

	#[rstest]
	#[case::exact(padded(b"PMTiles\x03", 127), true)]
	#[case::longer(padded(b"PMTiles\x03", 4096), true)]
	#[case::short(padded(b"PMTiles\x03", 126), false)]
	#[case::magic_only(b"PMTiles\x03".to_vec(), false)]
	#[case::wrong_version(padded(b"PMTiles\x02", 127), false)]
	#[case::wrong_magic(padded(b"MBTiles\x03", 127), false)]
	#[case::lower_case(padded(b"pmtiles\x03", 127), false)]
	#[case::empty(Vec::new(), false)]
	fn identify_header(#[case] bytes: Vec<u8>, #[case] expected: bool) {
		assert_eq!(identify(&header_info(bytes)), expected);
	}

	#[test]
	fn needs_data_reader() {
		let info = OpenInfo::new("stdin", Blob::from(padded(b"PMTiles\x03", 127)), None);
		assert!(!identify(&info));
	}

	#[tokio::test]
	async fn probe_reads_header() {
		let info = OpenInfo::probe(Box::new(DataReaderBlob::from(padded(b"PMTiles\x03", 300)))).await;
		assert_eq!(info.header.len(), HEADER_PROBE_SIZE);
		assert_eq!(info.name, "memory");
		assert!(identify(&info));
	}

	#[tokio::test]
	async fn probe_short_source() {
		let info = OpenInfo::probe(Box::new(DataReaderBlob::from(b"PMTiles\x03".to_vec()))).await;
		assert!(info.header.is_empty());
		assert!(info.data_reader.is_some());
		assert!(!identify(&info));
		assert_eq!(format!("{info:?}"), "OpenInfo { name: \"memory\", header: 0, data_reader: true }");
	}
}
