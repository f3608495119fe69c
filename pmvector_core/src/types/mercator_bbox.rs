use super::{MERCATOR_HALF_EXTENT, TileCoord};
use anyhow::{Result, ensure};
use std::fmt;

const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;
const RADIUS: f64 = 6_378_137.0;

/// An axis-aligned rectangle in Web Mercator (EPSG:3857) metres.
///
/// Feature geometries, spatial filters and layer extents all use this projection.
///
/// # Examples
/// ```
/// use pmvector_core::MercatorBBox;
///
/// let bbox = MercatorBBox::new(-10.0, -5.0, 10.0, 5.0).unwrap();
/// assert_eq!(bbox.width(), 20.0);
/// assert!(MercatorBBox::new(10.0, 0.0, -10.0, 5.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq)]
pub struct MercatorBBox {
	pub x_min: f64,
	pub y_min: f64,
	pub x_max: f64,
	pub y_max: f64,
}

impl MercatorBBox {
	pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<MercatorBBox> {
		ensure!(
			x_min.is_finite() && y_min.is_finite() && x_max.is_finite() && y_max.is_finite(),
			"bbox coordinates must be finite"
		);
		ensure!(x_min <= x_max, "x_min ({x_min}) must be <= x_max ({x_max})");
		ensure!(y_min <= y_max, "y_min ({y_min}) must be <= y_max ({y_max})");
		Ok(MercatorBBox {
			x_min,
			y_min,
			x_max,
			y_max,
		})
	}

	/// The full extent of the Web Mercator square.
	#[must_use]
	pub fn world() -> MercatorBBox {
		MercatorBBox {
			x_min: -MERCATOR_HALF_EXTENT,
			y_min: -MERCATOR_HALF_EXTENT,
			x_max: MERCATOR_HALF_EXTENT,
			y_max: MERCATOR_HALF_EXTENT,
		}
	}

	/// Projects a WGS84 bounding box (west, south, east, north in degrees).
	/// Latitudes are clamped to the mercator limit.
	pub fn from_lon_lat(west: f64, south: f64, east: f64, north: f64) -> Result<MercatorBBox> {
		let (x_min, y_min) = lon_lat_to_mercator(west, south);
		let (x_max, y_max) = lon_lat_to_mercator(east, north);
		MercatorBBox::new(x_min, y_min, x_max, y_max)
	}

	#[must_use]
	pub fn width(&self) -> f64 {
		self.x_max - self.x_min
	}

	#[must_use]
	pub fn height(&self) -> f64 {
		self.y_max - self.y_min
	}

	#[must_use]
	pub fn intersects(&self, other: &MercatorBBox) -> bool {
		self.x_min <= other.x_max && other.x_min <= self.x_max && self.y_min <= other.y_max && other.y_min <= self.y_max
	}

	#[must_use]
	pub fn contains(&self, other: &MercatorBBox) -> bool {
		self.x_min <= other.x_min && self.x_max >= other.x_max && self.y_min <= other.y_min && self.y_max >= other.y_max
	}

	/// Returns the overlap of both boxes, or `None` if they are disjoint.
	#[must_use]
	pub fn intersected(&self, other: &MercatorBBox) -> Option<MercatorBBox> {
		if !self.intersects(other) {
			return None;
		}
		Some(MercatorBBox {
			x_min: self.x_min.max(other.x_min),
			y_min: self.y_min.max(other.y_min),
			x_max: self.x_max.min(other.x_max),
			y_max: self.y_max.min(other.y_max),
		})
	}

	/// The range of tiles of `level` touching this box, or `None` if it lies outside the world.
	#[must_use]
	pub fn covering_range(&self, level: u8) -> Option<TileRange> {
		let bbox = self.intersected(&MercatorBBox::world())?;

		let max = (1u64 << level) - 1;
		let size = TileCoord::tile_size_at(level);
		let to_index = |v: f64| ((v / size).floor().max(0.0) as u64).min(max) as u32;

		Some(TileRange {
			level,
			x_min: to_index(bbox.x_min + MERCATOR_HALF_EXTENT),
			y_min: to_index(MERCATOR_HALF_EXTENT - bbox.y_max),
			x_max: to_index(bbox.x_max + MERCATOR_HALF_EXTENT),
			y_max: to_index(MERCATOR_HALF_EXTENT - bbox.y_min),
		})
	}
}

/// An inclusive rectangle of tile indexes at one zoom level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRange {
	pub level: u8,
	pub x_min: u32,
	pub y_min: u32,
	pub x_max: u32,
	pub y_max: u32,
}

impl TileRange {
	/// Number of tiles in the range.
	#[must_use]
	pub fn count(&self) -> u64 {
		(u64::from(self.x_max - self.x_min) + 1) * (u64::from(self.y_max - self.y_min) + 1)
	}

	#[must_use]
	pub fn contains(&self, coord: &TileCoord) -> bool {
		coord.level == self.level
			&& (self.x_min..=self.x_max).contains(&coord.x)
			&& (self.y_min..=self.y_max).contains(&coord.y)
	}

	/// Iterates the tiles row by row without materializing them.
	pub fn iter(&self) -> impl Iterator<Item = TileCoord> + use<> {
		let TileRange {
			level,
			x_min,
			y_min,
			x_max,
			y_max,
		} = *self;
		(y_min..=y_max).flat_map(move |y| (x_min..=x_max).map(move |x| TileCoord { level, x, y }))
	}
}

/// Projects a WGS84 position to mercator metres.
#[must_use]
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
	let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
	let x = lon.to_radians() * RADIUS;
	let y = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln() * RADIUS;
	(x, y)
}

impl fmt::Debug for MercatorBBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"MercatorBBox[{}, {}, {}, {}]",
			self.x_min, self.y_min, self.x_max, self.y_max
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_relative_eq;

	#[test]
	fn projection() -> Result<()> {
		let (x, y) = lon_lat_to_mercator(180.0, 0.0);
		assert_relative_eq!(x, MERCATOR_HALF_EXTENT, epsilon = 1e-6);
		assert_relative_eq!(y, 0.0, epsilon = 1e-6);

		let bbox = MercatorBBox::from_lon_lat(-180.0, -90.0, 180.0, 90.0)?;
		assert_relative_eq!(bbox.y_max, MERCATOR_HALF_EXTENT, epsilon = 1e-3);
		assert_relative_eq!(bbox.y_min, -MERCATOR_HALF_EXTENT, epsilon = 1e-3);
		Ok(())
	}

	#[test]
	fn intersection() -> Result<()> {
		let a = MercatorBBox::new(0.0, 0.0, 10.0, 10.0)?;
		let b = MercatorBBox::new(5.0, 5.0, 20.0, 20.0)?;
		let c = MercatorBBox::new(11.0, 0.0, 12.0, 1.0)?;
		assert_eq!(a.intersected(&b), Some(MercatorBBox::new(5.0, 5.0, 10.0, 10.0)?));
		assert_eq!(a.intersected(&c), None);
		assert!(MercatorBBox::world().contains(&a));
		assert!(!a.contains(&b));
		Ok(())
	}

	#[test]
	fn covering_range_of_world() {
		let range = MercatorBBox::world().covering_range(1).expect("world range");
		assert_eq!(range.count(), 4);
		let tiles: Vec<TileCoord> = range.iter().collect();
		assert_eq!(tiles[0], TileCoord { level: 1, x: 0, y: 0 });
		assert_eq!(tiles[3], TileCoord { level: 1, x: 1, y: 1 });

		let range = MercatorBBox::world().covering_range(14).expect("world range");
		assert_eq!(range.count(), 1 << 28);
		assert_eq!(range.iter().take(3).count(), 3);
	}

	#[test]
	fn covering_range_of_small_box() -> Result<()> {
		// north-east quadrant, slightly off the equator
		let bbox = MercatorBBox::new(1000.0, 1000.0, 2000.0, 2000.0)?;
		let range = bbox.covering_range(1).expect("range");
		assert_eq!(range.iter().collect::<Vec<_>>(), vec![TileCoord { level: 1, x: 1, y: 0 }]);
		assert!(range.contains(&TileCoord { level: 1, x: 1, y: 0 }));
		assert!(!range.contains(&TileCoord { level: 1, x: 0, y: 0 }));
		assert!(!range.contains(&TileCoord { level: 2, x: 1, y: 0 }));
		assert_eq!(bbox.covering_range(0).map(|r| r.count()), Some(1));

		let outside = MercatorBBox::new(3e7, 3e7, 4e7, 4e7)?;
		assert_eq!(outside.covering_range(3), None);
		Ok(())
	}

	#[test]
	fn debug() -> Result<()> {
		assert_eq!(
			format!("{:?}", MercatorBBox::new(1.0, 2.0, 3.0, 4.0)?),
			"MercatorBBox[1, 2, 3, 4]"
		);
		Ok(())
	}
}
