//! Clipping of decoded feature geometries to a tile's boundary.
//!
//! Vector tiles usually carry a buffer around each tile, so features near the edge reach into
//! neighbouring tiles. Clipping cuts them back to the tile's own square.

use geo::{BooleanOps, BoundingRect, Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Rect};
use pmvector_core::MercatorBBox;

/// Clips `geometry` to `bbox`.
///
/// Returns `None` if nothing of the geometry lies inside the box. Points on the boundary are kept.
#[must_use]
pub fn clip_geometry(geometry: Geometry<f64>, bbox: &MercatorBBox) -> Option<Geometry<f64>> {
	let rect = Rect::new(
		Coord {
			x: bbox.x_min,
			y: bbox.y_min,
		},
		Coord {
			x: bbox.x_max,
			y: bbox.y_max,
		},
	);

	let bounds = geometry.bounding_rect()?;
	if rect_contains(&rect, &bounds.min()) && rect_contains(&rect, &bounds.max()) {
		return Some(geometry);
	}
	if bounds.max().x < rect.min().x
		|| bounds.min().x > rect.max().x
		|| bounds.max().y < rect.min().y
		|| bounds.min().y > rect.max().y
	{
		return None;
	}

	match geometry {
		Geometry::Point(point) => rect_contains(&rect, &point.0).then_some(Geometry::Point(point)),
		Geometry::MultiPoint(points) => {
			let points: Vec<Point<f64>> = points.into_iter().filter(|p| rect_contains(&rect, &p.0)).collect();
			match points.len() {
				0 => None,
				_ => Some(Geometry::MultiPoint(MultiPoint::new(points))),
			}
		}
		Geometry::LineString(line) => clip_lines(&rect, MultiLineString::new(vec![line]), false),
		Geometry::MultiLineString(lines) => clip_lines(&rect, lines, true),
		Geometry::Line(line) => clip_lines(&rect, MultiLineString::new(vec![LineString::from(line)]), false),
		Geometry::Polygon(polygon) => clip_polygons(&rect, &MultiPolygon::new(vec![polygon]), false),
		Geometry::MultiPolygon(polygons) => clip_polygons(&rect, &polygons, true),
		Geometry::Rect(r) => clip_polygons(&rect, &MultiPolygon::new(vec![r.to_polygon()]), false),
		Geometry::Triangle(t) => clip_polygons(&rect, &MultiPolygon::new(vec![t.to_polygon()]), false),
		Geometry::GeometryCollection(collection) => {
			let parts: Vec<Geometry<f64>> = collection
				.into_iter()
				.filter_map(|g| clip_geometry(g, bbox))
				.collect();
			(!parts.is_empty()).then(|| Geometry::GeometryCollection(parts.into()))
		}
	}
}

fn rect_contains(rect: &Rect<f64>, c: &Coord<f64>) -> bool {
	c.x >= rect.min().x && c.x <= rect.max().x && c.y >= rect.min().y && c.y <= rect.max().y
}

fn clip_lines(rect: &Rect<f64>, lines: MultiLineString<f64>, keep_multi: bool) -> Option<Geometry<f64>> {
	let mut clipped = rect.to_polygon().clip(&lines, false);
	clipped.0.retain(|line| line.0.len() >= 2);
	match clipped.0.len() {
		0 => None,
		1 if !keep_multi => clipped.0.pop().map(Geometry::LineString),
		_ => Some(Geometry::MultiLineString(clipped)),
	}
}

fn clip_polygons(rect: &Rect<f64>, polygons: &MultiPolygon<f64>, keep_multi: bool) -> Option<Geometry<f64>> {
	let mut clipped = rect.to_polygon().intersection(polygons);
	match clipped.0.len() {
		0 => None,
		1 if !keep_multi => clipped.0.pop().map(Geometry::Polygon),
		_ => Some(Geometry::MultiPolygon(clipped)),
	}
}
