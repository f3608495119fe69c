//! A contiguous range of bytes, addressed by offset and length.
//!
//! ```rust
//! use pmvector_core::ByteRange;
//!
//! let range = ByteRange::new(23, 42);
//! assert_eq!(range.as_range_usize(), 23..65);
//! assert_eq!(range.get_shifted_forward(100).offset, 123);
//! ```

use std::fmt;
use std::ops::Range;

#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct ByteRange {
	pub offset: u64,
	pub length: u64,
}

impl ByteRange {
	#[must_use]
	pub fn new(offset: u64, length: u64) -> Self {
		Self { offset, length }
	}

	#[must_use]
	pub fn empty() -> Self {
		Self { offset: 0, length: 0 }
	}

	/// Returns a copy moved `offset` bytes towards the end of the source.
	#[must_use]
	pub fn get_shifted_forward(&self, offset: u64) -> Self {
		Self {
			offset: self.offset + offset,
			length: self.length,
		}
	}

	#[must_use]
	pub fn as_range_usize(&self) -> Range<usize> {
		Range {
			start: self.offset as usize,
			end: (self.offset + self.length) as usize,
		}
	}
}

impl fmt::Debug for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ByteRange[{},{}]", self.offset, self.length)
	}
}

impl fmt::Display for ByteRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..{}", self.offset, self.offset + self.length)
	}
}
