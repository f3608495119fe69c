use anyhow::{Result, bail};
use pmvector_core::TileCompression;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PMTilesCompression {
	Unknown = 0x0,
	None = 0x1,
	Gzip = 0x2,
	Brotli = 0x3,
	Zstd = 0x4,
}

impl PMTilesCompression {
	pub fn from_u8(value: u8) -> Result<Self> {
		match value {
			0 => Ok(PMTilesCompression::Unknown),
			1 => Ok(PMTilesCompression::None),
			2 => Ok(PMTilesCompression::Gzip),
			3 => Ok(PMTilesCompression::Brotli),
			4 => Ok(PMTilesCompression::Zstd),
			_ => bail!("Unknown value {value} for PMTiles compression"),
		}
	}

	#[must_use]
	pub fn from_value(value: TileCompression) -> Self {
		match value {
			TileCompression::Uncompressed => PMTilesCompression::None,
			TileCompression::Gzip => PMTilesCompression::Gzip,
			TileCompression::Brotli => PMTilesCompression::Brotli,
			TileCompression::Zstd => PMTilesCompression::Zstd,
		}
	}

	pub fn as_value(&self) -> Result<TileCompression> {
		Ok(match self {
			PMTilesCompression::Unknown => bail!("unknown compression"),
			PMTilesCompression::None => TileCompression::Uncompressed,
			PMTilesCompression::Gzip => TileCompression::Gzip,
			PMTilesCompression::Brotli => TileCompression::Brotli,
			PMTilesCompression::Zstd => TileCompression::Zstd,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(1, PMTilesCompression::None, TileCompression::Uncompressed)]
	#[case(2, PMTilesCompression::Gzip, TileCompression::Gzip)]
	#[case(3, PMTilesCompression::Brotli, TileCompression::Brotli)]
	#[case(4, PMTilesCompression::Zstd, TileCompression::Zstd)]
	fn known_values(#[case] byte: u8, #[case] pm: PMTilesCompression, #[case] value: TileCompression) -> Result<()> {
		assert_eq!(PMTilesCompression::from_u8(byte)?, pm);
		assert_eq!(pm.as_value()?, value);
		assert_eq!(PMTilesCompression::from_value(value), pm);
		assert_eq!(pm as u8, byte);
		Ok(())
	}

	#[test]
	fn unknown_values() {
		assert_eq!(PMTilesCompression::from_u8(0).unwrap(), PMTilesCompression::Unknown);
		assert!(PMTilesCompression::Unknown.as_value().is_err());
		assert_eq!(
			PMTilesCompression::from_u8(5).unwrap_err().to_string(),
			"Unknown value 5 for PMTiles compression"
		);
	}
}
