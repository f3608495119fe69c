use std::fmt::Display;

/// The kind of geometry a layer declares or a feature carries.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum GeometryKind {
	#[default]
	Unknown,
	Point,
	MultiPoint,
	LineString,
	MultiLineString,
	Polygon,
	MultiPolygon,
}

impl GeometryKind {
	/// Parses geometry names as written in TileJSON `tilestats` and similar metadata.
	#[must_use]
	pub fn from_name(name: &str) -> GeometryKind {
		match name.trim().to_ascii_lowercase().as_str() {
			"point" => GeometryKind::Point,
			"multipoint" => GeometryKind::MultiPoint,
			"linestring" | "line" => GeometryKind::LineString,
			"multilinestring" => GeometryKind::MultiLineString,
			"polygon" => GeometryKind::Polygon,
			"multipolygon" => GeometryKind::MultiPolygon,
			_ => GeometryKind::Unknown,
		}
	}

	/// Multi-part variant of this kind, used when features of one layer mix single and multi parts.
	#[must_use]
	pub fn to_multi(self) -> GeometryKind {
		match self {
			GeometryKind::Point | GeometryKind::MultiPoint => GeometryKind::MultiPoint,
			GeometryKind::LineString | GeometryKind::MultiLineString => GeometryKind::MultiLineString,
			GeometryKind::Polygon | GeometryKind::MultiPolygon => GeometryKind::MultiPolygon,
			GeometryKind::Unknown => GeometryKind::Unknown,
		}
	}

	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			GeometryKind::Unknown => "Unknown",
			GeometryKind::Point => "Point",
			GeometryKind::MultiPoint => "MultiPoint",
			GeometryKind::LineString => "LineString",
			GeometryKind::MultiLineString => "MultiLineString",
			GeometryKind::Polygon => "Polygon",
			GeometryKind::MultiPolygon => "MultiPolygon",
		}
	}
}

impl From<&geo::Geometry<f64>> for GeometryKind {
	fn from(geometry: &geo::Geometry<f64>) -> Self {
		match geometry {
			geo::Geometry::Point(_) => GeometryKind::Point,
			geo::Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
			geo::Geometry::LineString(_) | geo::Geometry::Line(_) => GeometryKind::LineString,
			geo::Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
			geo::Geometry::Polygon(_) | geo::Geometry::Rect(_) | geo::Geometry::Triangle(_) => GeometryKind::Polygon,
			geo::Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
			geo::Geometry::GeometryCollection(_) => GeometryKind::Unknown,
		}
	}
}

impl Display for GeometryKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
