use anyhow::{Context, Result, bail, ensure};
use clap::Args;
use futures::StreamExt;
use geo::{Coord, Geometry, LineString, Polygon};
use log::warn;
use pmvector::{Feature, Layer, properties_to_json};
use pmvector_core::MercatorBBox;
use serde_json::{Value, json};
use std::io::Write;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// PMTiles archive: a local path or an http(s) URL
	#[arg(required = true)]
	filename: String,

	/// only read this layer (repeatable). Default: all layers
	#[arg(long, short)]
	layer: Vec<String>,

	/// only read features inside this bounding box: "west,south,east,north" in degrees
	#[arg(long, short, value_name = "BBOX", allow_hyphen_values = true)]
	bbox: Option<String>,

	/// open option as KEY=VALUE, e.g. CLIP=NO (repeatable)
	#[arg(long = "option", short = 'o', value_name = "KEY=VALUE")]
	options: Vec<String>,

	/// stop after this many features
	#[arg(long)]
	limit: Option<usize>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	write_features(arguments, &mut std::io::stdout().lock()).await
}

async fn write_features(arguments: &Subcommand, out: &mut impl Write) -> Result<()> {
	let mut dataset = super::open_dataset(&arguments.filename, &arguments.options).await?;

	for name in &arguments.layer {
		ensure!(dataset.layer(name).is_some(), "layer '{name}' is not available");
	}

	if let Some(bbox) = &arguments.bbox {
		let bbox = parse_bbox(bbox)?;
		for layer in dataset.layers_mut() {
			layer.set_spatial_filter_rect(bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max)?;
		}
	}

	let mut remaining = arguments.limit.unwrap_or(usize::MAX);
	for layer in dataset.layers() {
		if !arguments.layer.is_empty() && !arguments.layer.iter().any(|name| name == layer.name()) {
			continue;
		}
		remaining = write_layer(layer, remaining, out).await?;
		if remaining == 0 {
			break;
		}
	}
	Ok(())
}

/// Writes up to `remaining` features and returns how many may still follow.
async fn write_layer(layer: &Layer, mut remaining: usize, out: &mut impl Write) -> Result<usize> {
	let mut features = layer.features();
	while remaining > 0 {
		let Some(result) = features.next().await else {
			break;
		};
		match result {
			Ok(feature) => {
				writeln!(out, "{}", feature_to_json(layer.name(), &feature))?;
				remaining -= 1;
			}
			Err(error) => warn!("skipping tile of layer '{}': {error:#}", layer.name()),
		}
	}
	Ok(remaining)
}

fn parse_bbox(text: &str) -> Result<MercatorBBox> {
	let values = text
		.split(',')
		.map(|value| value.trim().parse::<f64>())
		.collect::<Result<Vec<f64>, _>>()
		.with_context(|| format!("bbox '{text}' must be four comma separated numbers"))?;
	let [west, south, east, north] = values[..] else {
		bail!("bbox '{text}' must be four comma separated numbers");
	};
	MercatorBBox::from_lon_lat(west, south, east, north).with_context(|| format!("invalid bbox '{text}'"))
}

fn feature_to_json(layer: &str, feature: &Feature) -> Value {
	json!({
		"type": "Feature",
		"layer": layer,
		"tile": [feature.tile.level, feature.tile.x, feature.tile.y],
		"id": feature.fid,
		"geometry": geometry_to_json(&feature.geometry),
		"properties": properties_to_json(&feature.attributes),
	})
}

fn geometry_to_json(geometry: &Geometry<f64>) -> Value {
	fn position(c: Coord<f64>) -> Value {
		json!([c.x, c.y])
	}
	fn line(line: &LineString<f64>) -> Value {
		Value::Array(line.coords().copied().map(position).collect())
	}
	fn polygon(polygon: &Polygon<f64>) -> Value {
		Value::Array(std::iter::once(polygon.exterior()).chain(polygon.interiors()).map(line).collect())
	}

	match geometry {
		Geometry::Point(p) => json!({ "type": "Point", "coordinates": position(p.0) }),
		Geometry::MultiPoint(mp) => json!({
			"type": "MultiPoint",
			"coordinates": mp.iter().map(|p| position(p.0)).collect::<Vec<_>>(),
		}),
		Geometry::Line(l) => json!({ "type": "LineString", "coordinates": [position(l.start), position(l.end)] }),
		Geometry::LineString(l) => json!({ "type": "LineString", "coordinates": line(l) }),
		Geometry::MultiLineString(ml) => json!({
			"type": "MultiLineString",
			"coordinates": ml.iter().map(line).collect::<Vec<_>>(),
		}),
		Geometry::Polygon(p) => json!({ "type": "Polygon", "coordinates": polygon(p) }),
		Geometry::Rect(r) => json!({ "type": "Polygon", "coordinates": polygon(&r.to_polygon()) }),
		Geometry::Triangle(t) => json!({ "type": "Polygon", "coordinates": polygon(&t.to_polygon()) }),
		Geometry::MultiPolygon(mp) => json!({
			"type": "MultiPolygon",
			"coordinates": mp.iter().map(polygon).collect::<Vec<_>>(),
		}),
		Geometry::GeometryCollection(gc) => json!({
			"type": "GeometryCollection",
			"geometries": gc.iter().map(geometry_to_json).collect::<Vec<_>>(),
		}),
	}
}
