use crate::GeoValue;
use anyhow::{Context, Result, anyhow, bail};
use byteorder::LE;
use pmvector_core::{
	Blob,
	io::{ValueReader, ValueWriter, ValueWriterBlob},
};

/// Protobuf encoding of the MVT `Value` message.
pub trait GeoValuePBF<'a> {
	fn read(reader: &mut dyn ValueReader<'a, LE>) -> Result<GeoValue>;
	fn to_blob(&self) -> Result<Blob>;
}

impl<'a> GeoValuePBF<'a> for GeoValue {
	fn read(reader: &mut dyn ValueReader<'a, LE>) -> Result<GeoValue> {
		use GeoValue::*;
		let mut value: Option<GeoValue> = None;

		while reader.has_remaining() {
			value = Some(match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, 2) => String(reader.read_pbf_string().context("Failed to read string value")?),
				(2, 5) => Float(reader.read_f32().context("Failed to read f32 value")?),
				(3, 1) => Double(reader.read_f64().context("Failed to read f64 value")?),
				(4, 0) => Int(reader.read_varint().context("Failed to read int value")? as i64),
				(5, 0) => UInt(reader.read_varint().context("Failed to read uint value")?),
				(6, 0) => Int(reader.read_svarint().context("Failed to read sint value")?),
				(7, 0) => Bool(reader.read_varint().context("Failed to read bool value")? != 0),
				(f, w) => bail!("Unexpected combination of field number ({f}) and wire type ({w})"),
			});
		}

		value.ok_or_else(|| anyhow!("No value found"))
	}

	fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		match self {
			GeoValue::String(s) => {
				writer.write_pbf_key(1, 2)?;
				writer.write_pbf_string(s)?;
			}
			GeoValue::Float(f) => {
				writer.write_pbf_key(2, 5)?;
				writer.write_f32(*f)?;
			}
			GeoValue::Double(f) => {
				writer.write_pbf_key(3, 1)?;
				writer.write_f64(*f)?;
			}
			GeoValue::UInt(u) => {
				writer.write_pbf_key(5, 0)?;
				writer.write_varint(*u)?;
			}
			GeoValue::Int(s) => {
				writer.write_pbf_key(6, 0)?;
				writer.write_svarint(*s)?;
			}
			GeoValue::Bool(b) => {
				writer.write_pbf_key(7, 0)?;
				writer.write_varint(u64::from(*b))?;
			}
			GeoValue::Null => bail!("vector tiles cannot store null values"),
		}

		Ok(writer.into_blob())
	}
}
