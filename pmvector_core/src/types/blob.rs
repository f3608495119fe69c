//! This module provides the [`Blob`] struct, a wrapper around [`Vec<u8>`] used for every payload that
//! travels between data readers, the archive container and the tile decoder.
//!
//! # Examples
//!
//! ```rust
//! use pmvector_core::Blob;
//!
//! let blob = Blob::from(&[0u8, 1, 2, 3, 4, 5]);
//! assert_eq!(blob.len(), 6);
//! assert_eq!(blob.range(2..5), &[2, 3, 4]);
//! ```

use super::ByteRange;
use anyhow::{Context, Result, ensure};
use std::fmt::Debug;
use std::ops::Range;

/// Owned byte buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob(Vec<u8>);

impl Blob {
	#[must_use]
	pub fn new_empty() -> Blob {
		Blob(Vec::new())
	}

	#[must_use]
	pub fn new_sized(length: usize) -> Blob {
		Blob(vec![0u8; length])
	}

	#[must_use]
	pub fn range(&self, range: Range<usize>) -> &[u8] {
		&self.0[range]
	}

	/// Copies the bytes covered by `range` into a new blob.
	///
	/// # Errors
	///
	/// Fails if `range` reaches beyond the end of the blob.
	pub fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		ensure!(
			range.offset + range.length <= self.len(),
			"read outside range: {range:?} exceeds blob length {}",
			self.len()
		);
		Ok(Blob::from(&self.0[range.as_range_usize()]))
	}

	#[must_use]
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_ref()
	}

	pub fn as_mut_slice(&mut self) -> &mut [u8] {
		self.0.as_mut()
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<u8> {
		self.0
	}

	/// Interprets the content as UTF-8.
	pub fn as_str(&self) -> Result<&str> {
		std::str::from_utf8(&self.0).context("blob content is not valid UTF-8")
	}

	#[must_use]
	pub fn as_hex(&self) -> String {
		self
			.0
			.iter()
			.map(|byte| format!("{byte:02x}"))
			.collect::<Vec<_>>()
			.join(" ")
	}

	#[must_use]
	pub fn len(&self) -> u64 {
		self.0.len() as u64
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns `true` if the blob starts with `prefix`.
	#[must_use]
	pub fn starts_with(&self, prefix: &[u8]) -> bool {
		self.0.starts_with(prefix)
	}
}

impl From<Vec<u8>> for Blob {
	fn from(item: Vec<u8>) -> Self {
		Blob(item)
	}
}

impl From<&Vec<u8>> for Blob {
	fn from(item: &Vec<u8>) -> Self {
		Blob(item.clone())
	}
}

impl From<&[u8]> for Blob {
	fn from(item: &[u8]) -> Self {
		Blob(item.to_vec())
	}
}

impl<const N: usize> From<&[u8; N]> for Blob {
	fn from(item: &[u8; N]) -> Self {
		Blob(item.to_vec())
	}
}

impl From<&str> for Blob {
	fn from(item: &str) -> Self {
		Blob(item.as_bytes().to_vec())
	}
}

impl From<String> for Blob {
	fn from(item: String) -> Self {
		Blob(item.into_bytes())
	}
}

impl Debug for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.0.len() > 32 {
			write!(f, "Blob({}): {} ...", self.0.len(), Blob::from(&self.0[0..32]).as_hex())
		} else {
			write!(f, "Blob({}): {}", self.0.len(), self.as_hex())
		}
	}
}

impl std::fmt::Display for Blob {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", String::from_utf8_lossy(&self.0))
	}
}

impl Default for Blob {
	fn default() -> Self {
		Self::new_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn slices_and_ranges() -> Result<()> {
		let blob = Blob::from(vec![0, 1, 2, 3, 4, 5, 6, 7]);
		assert_eq!(blob.len(), 8);
		assert_eq!(blob.range(2..5), &[2, 3, 4]);
		assert_eq!(blob.read_range(&ByteRange::new(6, 2))?.as_slice(), &[6, 7]);
		assert!(blob.read_range(&ByteRange::new(6, 3)).is_err());
		Ok(())
	}

	#[test]
	fn text_content() {
		let blob = Blob::from("Xylofön");
		assert_eq!(blob.as_str().unwrap(), "Xylofön");
		assert!(Blob::from(&[0xff, 0xfe]).as_str().is_err());
		assert_eq!(format!("{blob}"), "Xylofön");
	}

	#[test]
	fn debug_is_truncated() {
		assert_eq!(format!("{:?}", Blob::from(&[1, 2, 255])), "Blob(3): 01 02 ff");
		let long = Blob::new_sized(40);
		assert!(format!("{long:?}").starts_with("Blob(40): 00 00"));
		assert!(format!("{long:?}").ends_with(" ..."));
	}

	#[test]
	fn prefix() {
		let blob = Blob::from("PMTiles\x03rest");
		assert!(blob.starts_with(b"PMTiles"));
		assert!(!blob.starts_with(b"MBTiles"));
		assert!(Blob::new_empty().is_empty());
	}
}
