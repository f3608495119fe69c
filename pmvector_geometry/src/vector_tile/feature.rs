use super::geometry_type::GeomType;
use crate::{GeoProperties, math::area_ring};
use anyhow::{Context, Result, bail, ensure};
use byteorder::LE;
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use log::trace;
use pmvector_core::{
	Blob,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob},
};

const CMD_MOVE_TO: u64 = 1;
const CMD_LINE_TO: u64 = 2;
const CMD_CLOSE_PATH: u64 = 7;

/// A decoded feature: geometry in Web Mercator metres plus its attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct TileFeature {
	pub id: Option<u64>,
	pub geometry: Geometry<f64>,
	pub properties: GeoProperties,
}

/// A feature as stored in a layer: geometry commands and tag indices.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorTileFeature {
	pub id: Option<u64>,
	pub tag_ids: Vec<u32>,
	pub geom_type: GeomType,
	pub geom_data: Blob,
}

impl Default for VectorTileFeature {
	fn default() -> Self {
		VectorTileFeature {
			id: None,
			tag_ids: Vec::new(),
			geom_type: GeomType::Unknown,
			geom_data: Blob::new_empty(),
		}
	}
}

impl VectorTileFeature {
	pub fn read(reader: &mut dyn ValueReader<'_, LE>) -> Result<VectorTileFeature> {
		let mut f = VectorTileFeature::default();

		while reader.has_remaining() {
			match reader.read_pbf_key().context("Failed to read PBF key")? {
				(1, 0) => f.id = Some(reader.read_varint().context("Failed to read feature ID")?),
				(2, 2) => f.tag_ids = reader.read_pbf_packed_uint32().context("Failed to read tag IDs")?,
				(3, 0) => f.geom_type = GeomType::from(reader.read_varint().context("Failed to read geometry type")?),
				(4, 2) => f.geom_data = reader.read_pbf_blob().context("Failed to read geometry data")?,
				(_, w) => reader.skip_pbf_value(w).context("Failed to skip unknown feature field")?,
			}
		}

		Ok(f)
	}

	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();

		if let Some(id) = self.id {
			writer.write_pbf_key(1, 0)?;
			writer.write_varint(id)?;
		}

		if !self.tag_ids.is_empty() {
			writer.write_pbf_key(2, 2)?;
			writer.write_pbf_packed_uint32(&self.tag_ids)?;
		}

		writer.write_pbf_key(3, 0)?;
		writer.write_varint(self.geom_type.as_u64())?;

		if !self.geom_data.is_empty() {
			writer.write_pbf_key(4, 2)?;
			writer.write_pbf_blob(&self.geom_data)?;
		}

		Ok(writer.into_blob())
	}

	/// Decodes the geometry commands into tile coordinates (`0..extent`, y pointing down).
	///
	/// Single-part geometries come back as `Point`, `LineString` or `Polygon`.
	pub fn to_geometry(&self) -> Result<Geometry<f64>> {
		let lines = self.decode_commands()?;

		match self.geom_type {
			GeomType::Unknown => bail!("Unknown geometry type"),

			GeomType::MultiPoint => {
				ensure!(!lines.is_empty(), "(Multi)Points must not be empty");
				let mut points: Vec<Point<f64>> = lines.into_iter().flatten().map(Point::from).collect();
				if points.len() == 1 {
					return Ok(Geometry::Point(points.remove(0)));
				}
				Ok(Geometry::MultiPoint(MultiPoint::new(points)))
			}

			GeomType::MultiLineString => {
				ensure!(!lines.is_empty(), "MultiLineStrings must have at least one entry");
				for line in &lines {
					ensure!(
						line.len() >= 2,
						"Each entry in MultiLineStrings must have at least two points"
					);
				}
				let mut lines: Vec<LineString<f64>> = lines.into_iter().map(LineString::new).collect();
				if lines.len() == 1 {
					return Ok(Geometry::LineString(lines.remove(0)));
				}
				Ok(Geometry::MultiLineString(MultiLineString::new(lines)))
			}

			GeomType::MultiPolygon => {
				ensure!(!lines.is_empty(), "Polygons must have at least one entry");
				let mut polygons: Vec<Polygon<f64>> = Vec::new();
				let mut exterior: Option<LineString<f64>> = None;
				let mut interiors: Vec<LineString<f64>> = Vec::new();

				for ring in lines {
					ensure!(
						ring.len() >= 4,
						"Each ring in Polygons must have at least four points (A,B,C,A)"
					);
					ensure!(
						ring[0] == ring[ring.len() - 1],
						"First and last point of the ring must be the same"
					);

					let area = area_ring(&ring);
					if area.abs() <= 1e-14 {
						trace!("skipping ring with zero area");
						continue;
					}

					if area > 0.0 || exterior.is_none() {
						if area < 0.0 {
							trace!("ring winding order reversed, treating first ring as exterior");
						}
						if let Some(previous) = exterior.take() {
							polygons.push(Polygon::new(previous, std::mem::take(&mut interiors)));
						}
						exterior = Some(LineString::new(ring));
					} else {
						interiors.push(LineString::new(ring));
					}
				}

				if let Some(previous) = exterior {
					polygons.push(Polygon::new(previous, interiors));
				}

				match polygons.len() {
					0 => bail!("Polygons must have at least one ring with an area"),
					1 => Ok(Geometry::Polygon(polygons.remove(0))),
					_ => Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons))),
				}
			}
		}
	}

	/// Splits the command stream into point sequences. Every `MoveTo` starts a new sequence.
	fn decode_commands(&self) -> Result<Vec<Vec<Coord<f64>>>> {
		let mut reader = ValueReaderSlice::new_le(self.geom_data.as_slice());

		let mut lines: Vec<Vec<Coord<f64>>> = Vec::new();
		let mut line: Vec<Coord<f64>> = Vec::new();
		let mut x: i64 = 0;
		let mut y: i64 = 0;

		while reader.has_remaining() {
			let value = reader
				.read_varint()
				.context("Failed to read varint for geometry command")?;
			let command = value & 0x7;
			let count = value >> 3;

			match command {
				CMD_MOVE_TO | CMD_LINE_TO => {
					for _ in 0..count {
						if command == CMD_MOVE_TO && !line.is_empty() {
							lines.push(std::mem::take(&mut line));
						}
						x = x
							.checked_add(reader.read_svarint().context("Failed to read x coordinate")?)
							.context("x coordinate overflow")?;
						y = y
							.checked_add(reader.read_svarint().context("Failed to read y coordinate")?)
							.context("y coordinate overflow")?;
						line.push(Coord {
							x: x as f64,
							y: y as f64,
						});
					}
				}
				CMD_CLOSE_PATH => {
					ensure!(!line.is_empty(), "ClosePath command found on an empty linestring");
					line.push(line[0]);
				}
				_ => bail!("Unknown command {command}"),
			}
		}

		if !line.is_empty() {
			lines.push(line);
		}

		Ok(lines)
	}

	/// Encodes a geometry given in tile coordinates. Coordinates are rounded to integers and
	/// polygon rings are re-oriented to the winding order vector tiles expect.
	pub fn from_geometry(id: Option<u64>, tag_ids: Vec<u32>, geometry: &Geometry<f64>) -> Result<VectorTileFeature> {
		let mut encoder = CommandEncoder::default();
		let geom_type = match geometry {
			Geometry::Point(p) => {
				encoder.points(&[p.0])?;
				GeomType::MultiPoint
			}
			Geometry::MultiPoint(mp) => {
				encoder.points(&mp.0.iter().map(|p| p.0).collect::<Vec<_>>())?;
				GeomType::MultiPoint
			}
			Geometry::LineString(ls) => {
				encoder.line(&ls.0, false)?;
				GeomType::MultiLineString
			}
			Geometry::MultiLineString(mls) => {
				for ls in mls {
					encoder.line(&ls.0, false)?;
				}
				GeomType::MultiLineString
			}
			Geometry::Polygon(polygon) => {
				encoder.polygon(polygon)?;
				GeomType::MultiPolygon
			}
			Geometry::MultiPolygon(mp) => {
				for polygon in mp {
					encoder.polygon(polygon)?;
				}
				GeomType::MultiPolygon
			}
			other => bail!("geometry {other:?} cannot be stored in a vector tile"),
		};

		Ok(VectorTileFeature {
			id,
			tag_ids,
			geom_type,
			geom_data: encoder.writer.into_blob(),
		})
	}
}

#[derive(Default)]
struct CommandEncoder {
	writer: ValueWriterBlob<LE>,
	x: i64,
	y: i64,
}

impl CommandEncoder {
	fn command(&mut self, id: u64, count: usize) -> Result<()> {
		self.writer.write_varint(((count as u64) << 3) | id)
	}

	fn position(&mut self, c: &Coord<f64>) -> Result<()> {
		let (x, y) = (c.x.round() as i64, c.y.round() as i64);
		self.writer.write_svarint(x - self.x)?;
		self.writer.write_svarint(y - self.y)?;
		self.x = x;
		self.y = y;
		Ok(())
	}

	fn points(&mut self, coords: &[Coord<f64>]) -> Result<()> {
		ensure!(!coords.is_empty(), "(Multi)Points must not be empty");
		self.command(CMD_MOVE_TO, coords.len())?;
		for c in coords {
			self.position(c)?;
		}
		Ok(())
	}

	fn line(&mut self, coords: &[Coord<f64>], close: bool) -> Result<()> {
		ensure!(coords.len() >= 2, "lines need at least two points");
		self.command(CMD_MOVE_TO, 1)?;
		self.position(&coords[0])?;
		self.command(CMD_LINE_TO, coords.len() - 1)?;
		for c in &coords[1..] {
			self.position(c)?;
		}
		if close {
			self.command(CMD_CLOSE_PATH, 1)?;
		}
		Ok(())
	}

	fn ring(&mut self, ring: &LineString<f64>, exterior: bool) -> Result<()> {
		let mut coords = ring.0.clone();
		if coords.len() > 1 && coords.first() == coords.last() {
			coords.pop();
		}
		ensure!(coords.len() >= 3, "rings need at least three distinct points");
		let mut closed = coords.clone();
		closed.push(coords[0]);
		if (area_ring(&closed) > 0.0) != exterior {
			coords.reverse();
		}
		self.line(&coords, true)
	}

	fn polygon(&mut self, polygon: &Polygon<f64>) -> Result<()> {
		self.ring(polygon.exterior(), true)?;
		for interior in polygon.interiors() {
			self.ring(interior, false)?;
		}
		Ok(())
	}
}
