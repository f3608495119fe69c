use anyhow::{Result, bail};
use std::fmt::Display;

#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PMTilesType {
	UNKNOWN = 0x0,
	MVT = 0x1,
	PNG = 0x2,
	JPEG = 0x3,
	WEBP = 0x4,
	AVIF = 0x5,
}

impl PMTilesType {
	pub fn from_u8(value: u8) -> Result<Self> {
		match value {
			0 => Ok(PMTilesType::UNKNOWN),
			1 => Ok(PMTilesType::MVT),
			2 => Ok(PMTilesType::PNG),
			3 => Ok(PMTilesType::JPEG),
			4 => Ok(PMTilesType::WEBP),
			5 => Ok(PMTilesType::AVIF),
			_ => bail!("Unknown value {value} for PMTiles type"),
		}
	}

	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			PMTilesType::UNKNOWN => "unknown",
			PMTilesType::MVT => "mvt",
			PMTilesType::PNG => "png",
			PMTilesType::JPEG => "jpeg",
			PMTilesType::WEBP => "webp",
			PMTilesType::AVIF => "avif",
		}
	}

	#[must_use]
	pub fn is_vector(&self) -> bool {
		*self == PMTilesType::MVT
	}
}

impl Display for PMTilesType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
