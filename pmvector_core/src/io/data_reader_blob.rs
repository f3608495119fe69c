//! Reading from an in-memory buffer.
//!
//! Used for archives that were already fetched into memory and for building test fixtures.

use super::DataReaderTrait;
use crate::{Blob, ByteRange};
use anyhow::{Result, ensure};
use async_trait::async_trait;

/// A data reader backed by a `Vec<u8>`.
#[derive(Debug)]
pub struct DataReaderBlob {
	name: String,
	data: Vec<u8>,
}

impl DataReaderBlob {
	/// Wraps `data` under a custom source name.
	#[must_use]
	pub fn new(name: &str, data: Vec<u8>) -> DataReaderBlob {
		DataReaderBlob {
			name: name.to_owned(),
			data,
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.data.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

#[async_trait]
impl DataReaderTrait for DataReaderBlob {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		let end = range.offset + range.length;
		ensure!(
			end <= self.data.len() as u64,
			"end of range ({range}) is outside blob ({})",
			self.data.len()
		);
		Ok(Blob::from(&self.data[range.as_range_usize()]))
	}

	async fn read_all(&self) -> Result<Blob> {
		Ok(Blob::from(&self.data))
	}

	fn get_name(&self) -> &str {
		&self.name
	}
}

impl From<Vec<u8>> for DataReaderBlob {
	fn from(data: Vec<u8>) -> Self {
		DataReaderBlob::new("memory", data)
	}
}

impl From<Blob> for DataReaderBlob {
	fn from(blob: Blob) -> Self {
		DataReaderBlob::new("memory", blob.into_vec())
	}
}
