//! Reading archives from the local file system.
//!
//! `DataReaderFile` checks that the path exists, is absolute and is a regular file before opening it.
//! Every range read seeks a cloned handle, so concurrent reads never disturb each other.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pmvector_core::{io::{DataReaderFile, DataReaderTrait}, ByteRange};
//! use anyhow::Result;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let reader = DataReaderFile::open(Path::new("/data/planet.pmtiles"))?;
//!     let header = reader.read_range(&ByteRange::new(0, 127)).await?;
//!     assert_eq!(header.len(), 127);
//!     Ok(())
//! }
//! ```

use super::DataReaderTrait;
use crate::{Blob, ByteRange};
use anyhow::{Context, Result, ensure};
use async_trait::async_trait;
use std::{
	fs::File,
	io::{Read, Seek, SeekFrom},
	path::Path,
};

/// A struct that provides reading capabilities from a file.
#[derive(Debug)]
pub struct DataReaderFile {
	name: String,
	file: File,
	size: u64,
}

impl DataReaderFile {
	/// Opens a file and creates a `DataReaderFile` instance.
	///
	/// # Arguments
	///
	/// * `path` - An absolute path to a regular file.
	///
	/// # Errors
	///
	/// Fails if the path does not exist, is relative, or is not a file.
	pub fn open(path: &Path) -> Result<Box<DataReaderFile>> {
		ensure!(path.exists(), "file {path:?} does not exist");
		ensure!(path.is_absolute(), "path {path:?} must be absolute");
		ensure!(path.is_file(), "path {path:?} must be a file");

		let path = path.canonicalize()?;
		let file = File::open(&path).with_context(|| format!("failed to open file {path:?}"))?;
		let size = file.metadata()?.len();

		Ok(Box::new(DataReaderFile {
			name: path.to_string_lossy().into_owned(),
			file,
			size,
		}))
	}

	/// Size of the file in bytes.
	#[must_use]
	pub fn size(&self) -> u64 {
		self.size
	}
}

#[async_trait]
impl DataReaderTrait for DataReaderFile {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		ensure!(
			range.offset + range.length <= self.size,
			"range {range} is outside file '{}' ({} bytes)",
			self.name,
			self.size
		);
		let mut buffer = vec![0; range.length as usize];
		let mut file = self
			.file
			.try_clone()
			.with_context(|| format!("failed to clone file '{}'", self.name))?;
		file
			.seek(SeekFrom::Start(range.offset))
			.with_context(|| format!("failed to seek to offset {} in file '{}'", range.offset, self.name))?;
		file.read_exact(&mut buffer).with_context(|| {
			format!(
				"failed to read {} bytes at offset {} in file '{}'",
				range.length, range.offset, self.name
			)
		})?;
		Ok(Blob::from(buffer))
	}

	async fn read_all(&self) -> Result<Blob> {
		self.read_range(&ByteRange::new(0, self.size)).await
	}

	fn get_name(&self) -> &str {
		&self.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::assert_wildcard;
	use assert_fs::{NamedTempFile, prelude::*};

	#[tokio::test]
	async fn open_checks_path() -> Result<()> {
		let temp_file = NamedTempFile::new("testfile.pmtiles")?;
		temp_file.write_binary(b"PMTiles\x03")?;
		assert!(DataReaderFile::open(temp_file.path()).is_ok());

		let missing = NamedTempFile::new("nonexistent.pmtiles")?;
		assert_wildcard!(
			DataReaderFile::open(missing.path()).unwrap_err(),
			"file * does not exist"
		);

		assert_wildcard!(
			DataReaderFile::open(Path::new(".")).unwrap_err(),
			"path * must be absolute"
		);
		Ok(())
	}

	#[tokio::test]
	async fn read_range() -> Result<()> {
		let temp_file = NamedTempFile::new("testfile.txt")?;
		temp_file.write_str("Hello, world!")?;

		let reader = DataReaderFile::open(temp_file.path())?;
		assert_eq!(reader.size(), 13);
		assert_eq!(reader.read_range(&ByteRange::new(4, 6)).await?.as_str()?, "o, wor");
		assert_eq!(reader.read_all().await?.as_str()?, "Hello, world!");
		assert!(reader.read_range(&ByteRange::new(10, 6)).await.is_err());
		Ok(())
	}

	#[tokio::test]
	async fn get_name() -> Result<()> {
		let temp_file = NamedTempFile::new("testfile.txt")?;
		temp_file.write_str("Hello, world!")?;

		let reader = DataReaderFile::open(temp_file.path())?;
		assert_wildcard!(reader.get_name(), "*testfile.txt");
		Ok(())
	}
}
