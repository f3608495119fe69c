use crate::GeometryKind;

/// Geometry type as encoded on the wire.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GeomType {
	#[default]
	Unknown = 0,
	MultiPoint = 1,
	MultiLineString = 2,
	MultiPolygon = 3,
}

impl GeomType {
	#[must_use]
	pub fn as_u64(&self) -> u64 {
		*self as u64
	}
}

impl From<u64> for GeomType {
	fn from(value: u64) -> Self {
		match value {
			1 => GeomType::MultiPoint,
			2 => GeomType::MultiLineString,
			3 => GeomType::MultiPolygon,
			_ => GeomType::Unknown,
		}
	}
}

impl From<GeometryKind> for GeomType {
	fn from(kind: GeometryKind) -> Self {
		match kind {
			GeometryKind::Point | GeometryKind::MultiPoint => GeomType::MultiPoint,
			GeometryKind::LineString | GeometryKind::MultiLineString => GeomType::MultiLineString,
			GeometryKind::Polygon | GeometryKind::MultiPolygon => GeomType::MultiPolygon,
			GeometryKind::Unknown => GeomType::Unknown,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_values() {
		assert_eq!(GeomType::from(3), GeomType::MultiPolygon);
		assert_eq!(GeomType::from(9), GeomType::Unknown);
		assert_eq!(GeomType::MultiLineString.as_u64(), 2);
		assert_eq!(GeomType::from(GeometryKind::Point), GeomType::MultiPoint);
	}
}
