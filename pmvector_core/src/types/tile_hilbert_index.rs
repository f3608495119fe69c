//! Conversion between [`TileCoord`] and the PMTiles tile id, which orders all tiles of a zoom level
//! along a Hilbert curve and stacks the zoom levels one after another.

use super::{MAX_ZOOM_LEVEL, TileCoord};
use anyhow::{Result, bail};
use std::ops::Range;

pub trait HilbertIndex {
	fn get_tile_id(&self) -> Result<u64>;
	fn from_tile_id(tile_id: u64) -> Result<Self>
	where
		Self: Sized;
}

impl HilbertIndex for TileCoord {
	fn get_tile_id(&self) -> Result<u64> {
		coord_to_index(self.x, self.y, self.level)
	}
	fn from_tile_id(tile_id: u64) -> Result<Self> {
		index_to_coord(tile_id)
	}
}

/// The tile ids used by all tiles of `level`.
pub fn tile_id_range(level: u8) -> Result<Range<u64>> {
	if level > MAX_ZOOM_LEVEL {
		bail!("tile zoom exceeds 64-bit limit");
	}
	let start = level_offset(level);
	Ok(start..start + (1u64 << (2 * u32::from(level))))
}

fn level_offset(level: u8) -> u64 {
	(0..u32::from(level)).map(|z| 1u64 << (z * 2)).sum()
}

fn coord_to_index(x: u32, y: u32, z: u8) -> Result<u64> {
	if z > MAX_ZOOM_LEVEL {
		bail!("tile zoom exceeds 64-bit limit");
	}

	let n = 1i64 << z;
	if i64::from(x) >= n || i64::from(y) >= n {
		bail!("tile x/y outside zoom level bounds");
	}

	let mut tx = i64::from(x);
	let mut ty = i64::from(y);
	let mut d: i64 = 0;
	let mut s: i64 = n / 2;
	while s > 0 {
		let rx = u8::from((tx & s) > 0);
		let ry = u8::from((ty & s) > 0);
		d += s * s * i64::from((3 * rx) ^ ry);
		rotate(s, &mut tx, &mut ty, rx, ry);
		s /= 2;
	}

	Ok(level_offset(z) + d as u64)
}

fn rotate(s: i64, tx: &mut i64, ty: &mut i64, rx: u8, ry: u8) {
	if ry == 0 {
		if rx == 1 {
			*tx = s - 1 - *tx;
			*ty = s - 1 - *ty;
		}
		std::mem::swap(tx, ty);
	}
}

fn index_to_coord(index: u64) -> Result<TileCoord> {
	let mut acc = 0u64;
	for level in 0..=MAX_ZOOM_LEVEL {
		let num_tiles = 1u64 << (2 * u32::from(level));
		if acc + num_tiles > index {
			let n = 1i64 << level;
			let mut t = index - acc;
			let mut tx: i64 = 0;
			let mut ty: i64 = 0;

			let mut s: i64 = 1;
			while s < n {
				let rx = ((t / 2) & 1) as u8;
				let ry = ((t ^ u64::from(rx)) & 1) as u8;
				rotate(s, &mut tx, &mut ty, rx, ry);
				if rx == 1 {
					tx += s;
				}
				if ry == 1 {
					ty += s;
				}
				t /= 4;
				s *= 2;
			}

			return TileCoord::new(level, tx as u32, ty as u32);
		}
		acc += num_tiles;
	}
	bail!("tile zoom exceeds 64-bit limit")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(0, 0, 0, 0)]
	#[case(1, 1, 1, 3)]
	#[case(2, 2, 2, 13)]
	#[case(3, 5, 3, 73)]
	#[case(3, 7, 7, 63)]
	#[case(31, 0, 0, 1_537_228_672_809_129_301)]
	fn known_tile_ids(#[case] level: u8, #[case] x: u32, #[case] y: u32, #[case] id: u64) -> Result<()> {
		let coord = TileCoord::new(level, x, y)?;
		assert_eq!(coord.get_tile_id()?, id);
		assert_eq!(TileCoord::from_tile_id(id)?, coord);
		Ok(())
	}

	#[test]
	fn out_of_bounds() {
		assert_eq!(
			coord_to_index(1, 0, 0).unwrap_err().to_string(),
			"tile x/y outside zoom level bounds"
		);
		assert_eq!(
			coord_to_index(1, 1, 32).unwrap_err().to_string(),
			"tile zoom exceeds 64-bit limit"
		);
	}

	#[test]
	fn ids_round_trip_across_levels() -> Result<()> {
		let mut f = 0f64;
		loop {
			let id = f as u64;
			let coord = TileCoord::from_tile_id(id)?;
			assert_eq!(coord.get_tile_id()?, id);
			if coord.level > 30 {
				break;
			}
			f = f * 1.1 + 1.0;
		}
		Ok(())
	}

	#[test]
	fn level_ranges() -> Result<()> {
		assert_eq!(tile_id_range(0)?, 0..1);
		assert_eq!(tile_id_range(1)?, 1..5);
		assert_eq!(tile_id_range(2)?, 5..21);
		assert_eq!(tile_id_range(3)?, 21..85);
		assert!(tile_id_range(32).is_err());
		Ok(())
	}
}
