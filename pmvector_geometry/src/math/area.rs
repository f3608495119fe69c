use geo::Coord;

/// Twice the signed area of a ring in tile coordinates (y pointing down).
///
/// Rings drawn clockwise on screen, which vector tiles use for exterior rings, yield positive values.
#[must_use]
pub fn area_ring(ring: &[Coord<f64>]) -> f64 {
	let Some(mut p2) = ring.last() else {
		return 0.0;
	};
	let mut sum = 0f64;
	for p1 in ring {
		sum += (p2.x - p1.x) * (p1.y + p2.y);
		p2 = p1;
	}
	sum
}
