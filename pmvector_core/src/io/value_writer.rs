// The `ValueWriter` trait is the write-side counterpart of `ValueReader`. It serializes headers,
// directories and protobuf messages when archives are assembled in memory.

use crate::{Blob, ByteRange};
use anyhow::Result;
use byteorder::{ByteOrder, WriteBytesExt};
use std::io::Write;

pub trait ValueWriter<E: ByteOrder> {
	fn get_writer(&mut self) -> &mut dyn Write;

	fn position(&mut self) -> Result<u64>;

	fn is_empty(&mut self) -> Result<bool> {
		Ok(self.position()? == 0)
	}

	fn write_varint(&mut self, mut value: u64) -> Result<()> {
		while value >= 0x80 {
			self.get_writer().write_all(&[((value & 0x7F) as u8) | 0x80])?;
			value >>= 7;
		}
		self.get_writer().write_all(&[value as u8])?;
		Ok(())
	}

	fn write_svarint(&mut self, value: i64) -> Result<()> {
		self.write_varint(((value << 1) ^ (value >> 63)) as u64)
	}

	fn write_u8(&mut self, value: u8) -> Result<()> {
		Ok(self.get_writer().write_u8(value)?)
	}

	fn write_i32(&mut self, value: i32) -> Result<()> {
		Ok(self.get_writer().write_i32::<E>(value)?)
	}

	fn write_f32(&mut self, value: f32) -> Result<()> {
		Ok(self.get_writer().write_f32::<E>(value)?)
	}

	fn write_f64(&mut self, value: f64) -> Result<()> {
		Ok(self.get_writer().write_f64::<E>(value)?)
	}

	fn write_u64(&mut self, value: u64) -> Result<()> {
		Ok(self.get_writer().write_u64::<E>(value)?)
	}

	fn write_slice(&mut self, buf: &[u8]) -> Result<()> {
		self.get_writer().write_all(buf)?;
		Ok(())
	}

	fn write_blob(&mut self, blob: &Blob) -> Result<()> {
		self.write_slice(blob.as_slice())
	}

	fn write_range(&mut self, range: &ByteRange) -> Result<()> {
		self.write_u64(range.offset)?;
		self.write_u64(range.length)
	}

	fn write_pbf_key(&mut self, field_number: u32, wire_type: u8) -> Result<()> {
		self.write_varint((u64::from(field_number) << 3) | u64::from(wire_type))
	}

	/// Writes a length-delimited protobuf payload.
	fn write_pbf_blob(&mut self, blob: &Blob) -> Result<()> {
		self.write_varint(blob.len())?;
		self.write_blob(blob)
	}

	fn write_pbf_string(&mut self, text: &str) -> Result<()> {
		self.write_varint(text.len() as u64)?;
		self.write_slice(text.as_bytes())
	}

	fn write_pbf_packed_uint32(&mut self, data: &[u32]) -> Result<()> {
		let mut inner = super::ValueWriterBlob::new_le();
		for value in data {
			inner.write_varint(u64::from(*value))?;
		}
		self.write_pbf_blob(&inner.into_blob())
	}
}

#[cfg(test)]
mod tests {
	use super::super::ValueWriterBlob;
	use super::*;

	#[test]
	fn varints() -> Result<()> {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_varint(300)?;
		writer.write_svarint(-75)?;
		assert_eq!(writer.into_blob().into_vec(), vec![0xAC, 0x02, 0x95, 0x01]);
		Ok(())
	}

	#[test]
	fn pbf() -> Result<()> {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_pbf_key(3, 2)?;
		writer.write_pbf_string("hi")?;
		writer.write_pbf_key(2, 2)?;
		writer.write_pbf_packed_uint32(&[1, 300])?;
		assert_eq!(
			writer.into_blob().into_vec(),
			vec![0x1A, 0x02, b'h', b'i', 0x12, 0x03, 0x01, 0xAC, 0x02]
		);
		Ok(())
	}

	#[test]
	fn fixed_width() -> Result<()> {
		let mut writer = ValueWriterBlob::new_le();
		assert!(writer.is_empty()?);
		writer.write_range(&ByteRange::new(1, 2))?;
		writer.write_i32(-1)?;
		assert_eq!(writer.position()?, 20);
		Ok(())
	}
}
