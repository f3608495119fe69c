//! This module provides the `ValueReaderSlice` struct for reading values from a byte slice.
//!
//! # Examples
//!
//! ```rust
//! use pmvector_core::io::{ValueReader, ValueReaderSlice};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let mut reader = ValueReaderSlice::new_le(&[0x01, 0x02, 0xAC, 0x02]);
//!     assert_eq!(reader.read_u8()?, 1);
//!     assert_eq!(reader.read_u8()?, 2);
//!     assert_eq!(reader.read_varint()?, 300);
//!     Ok(())
//! }
//! ```

use super::{SeekRead, ValueReader};
use anyhow::{Result, anyhow, bail};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::{io::Cursor, marker::PhantomData};

/// Reads values from a borrowed byte slice.
pub struct ValueReaderSlice<'a, E: ByteOrder> {
	_phantom: PhantomData<E>,
	cursor: Cursor<&'a [u8]>,
	len: u64,
}

impl<'a, E: ByteOrder> ValueReaderSlice<'a, E> {
	#[must_use]
	pub fn new(slice: &'a [u8]) -> ValueReaderSlice<'a, E> {
		ValueReaderSlice {
			_phantom: PhantomData,
			len: slice.len() as u64,
			cursor: Cursor::new(slice),
		}
	}
}

impl<'a> ValueReaderSlice<'a, LittleEndian> {
	#[must_use]
	pub fn new_le(slice: &'a [u8]) -> ValueReaderSlice<'a, LittleEndian> {
		ValueReaderSlice::new(slice)
	}
}

impl<'a> ValueReaderSlice<'a, BigEndian> {
	#[must_use]
	pub fn new_be(slice: &'a [u8]) -> ValueReaderSlice<'a, BigEndian> {
		ValueReaderSlice::new(slice)
	}
}

impl SeekRead for Cursor<&[u8]> {}

impl<'a, E: ByteOrder + 'a> ValueReader<'a, E> for ValueReaderSlice<'a, E> {
	fn get_reader(&mut self) -> &mut dyn SeekRead {
		&mut self.cursor
	}

	fn len(&self) -> u64 {
		self.len
	}

	fn position(&mut self) -> u64 {
		self.cursor.position()
	}

	fn set_position(&mut self, position: u64) -> Result<()> {
		if position > self.len {
			bail!("set position outside length")
		}
		self.cursor.set_position(position);
		Ok(())
	}

	fn get_sub_reader(&mut self, length: u64) -> Result<Box<dyn ValueReader<'a, E> + 'a>> {
		let start = self.cursor.position();
		let end = start + length;
		if end > self.len {
			bail!("Requested sub-reader length exceeds remaining data");
		}

		let slice: &'a [u8] = *self.cursor.get_ref();
		let sub_slice = slice
			.get(start as usize..end as usize)
			.ok_or_else(|| anyhow!("sub-reader range {start}..{end} out of bounds"))?;
		self.cursor.set_position(end);
		Ok(Box::new(ValueReaderSlice::<'a, E>::new(sub_slice)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn byte_order() -> Result<()> {
		let data = [0x01, 0x02, 0x03, 0x04];
		assert_eq!(ValueReaderSlice::new_le(&data).read_u32()?, 0x0403_0201);
		assert_eq!(ValueReaderSlice::new_be(&data).read_u32()?, 0x0102_0304);
		Ok(())
	}

	#[test]
	fn positions() -> Result<()> {
		let mut reader = ValueReaderSlice::new_le(&[1, 2, 3, 4]);
		reader.set_position(3)?;
		assert_eq!(reader.remaining(), 1);
		reader.set_position(4)?;
		assert!(!reader.has_remaining());
		assert!(reader.set_position(5).is_err());
		Ok(())
	}

	#[test]
	fn sub_reader() -> Result<()> {
		let mut reader = ValueReaderSlice::new_le(&[3, 7, 8, 9, 42]);
		let mut sub = reader.get_pbf_sub_reader()?;
		assert_eq!(sub.len(), 3);
		assert_eq!(sub.read_u8()?, 7);
		assert_eq!(sub.remaining(), 2);
		drop(sub);
		assert_eq!(reader.read_u8()?, 42);
		assert!(reader.get_sub_reader(1).is_err());
		Ok(())
	}
}
