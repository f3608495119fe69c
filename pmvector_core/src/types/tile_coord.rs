//! Tile coordinates in the XYZ scheme used by PMTiles.

use super::MercatorBBox;
use anyhow::{Result, ensure};
use std::fmt;

/// Half the side length of the Web Mercator square, in metres.
pub const MERCATOR_HALF_EXTENT: f64 = 20_037_508.342_789_244;

/// Highest zoom level whose tile ids still fit into 64 bits.
pub const MAX_ZOOM_LEVEL: u8 = 31;

/// A tile address at one zoom level. `y` grows from north to south.
#[derive(Clone, Copy, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Creates a coordinate, checking that `x` and `y` exist at `level`.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_ZOOM_LEVEL, "level ({level}) must be <= {MAX_ZOOM_LEVEL}");
		let max = 1u64 << level;
		ensure!(
			u64::from(x) < max && u64::from(y) < max,
			"tile x/y ({x},{y}) outside zoom level {level}"
		);
		Ok(TileCoord { level, x, y })
	}

	/// Side length of one tile at `level`, in mercator metres.
	#[must_use]
	pub fn tile_size_at(level: u8) -> f64 {
		2.0 * MERCATOR_HALF_EXTENT / f64::from(1u32 << level)
	}

	/// The area this tile covers, in mercator metres.
	#[must_use]
	pub fn as_mercator_bbox(&self) -> MercatorBBox {
		let size = TileCoord::tile_size_at(self.level);
		let x_min = -MERCATOR_HALF_EXTENT + f64::from(self.x) * size;
		let y_max = MERCATOR_HALF_EXTENT - f64::from(self.y) * size;
		MercatorBBox {
			x_min,
			y_min: y_max - size,
			x_max: x_min + size,
			y_max,
		}
	}
}

impl fmt::Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl fmt::Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}
