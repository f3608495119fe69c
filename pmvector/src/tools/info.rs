use anyhow::Result;
use clap::Args;
use itertools::Itertools;
use pmvector::{Dataset, DriverRegistry};
use std::io::Write;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// PMTiles archive: a local path or an http(s) URL
	#[arg(required = true)]
	filename: String,

	/// open option as KEY=VALUE, e.g. ZOOM_LEVEL=5 (repeatable)
	#[arg(long = "option", short = 'o', value_name = "KEY=VALUE")]
	options: Vec<String>,
}

#[tokio::main]
pub async fn run(arguments: &Subcommand) -> Result<()> {
	let dataset = super::open_dataset(&arguments.filename, &arguments.options).await?;
	write_info(&dataset, &mut std::io::stdout().lock())
}

fn write_info(dataset: &Dataset, out: &mut impl Write) -> Result<()> {
	let header = dataset.header();
	writeln!(out, "archive: {}", dataset.name())?;
	writeln!(
		out,
		"tile type: {}, tile compression: {}, clustered: {}",
		header.tile_type,
		header.tile_compression.as_value().map_or("unknown".to_string(), |c| c.to_string()),
		header.clustered
	)?;
	writeln!(
		out,
		"zoom levels: {}..={}, reading zoom level {}",
		header.min_zoom,
		header.max_zoom,
		dataset.zoom_level()
	)?;
	writeln!(out, "bounds: {:?}", header.bounds())?;
	writeln!(out, "center: {:?}", header.center())?;
	writeln!(out, "tiles: {}", header.addressed_tiles_count)?;

	for info in &dataset.catalog().layers {
		let visible = dataset.layer(&info.name).is_some();
		writeln!(
			out,
			"layer '{}': zoom {}..={}, geometry {}{}",
			info.name,
			info.min_zoom,
			info.max_zoom,
			info.geometry,
			if visible { "" } else { " (not visible)" }
		)?;
		if let Some(layer) = dataset.layer(&info.name) {
			let fields = layer
				.schema()
				.iter()
				.map(|field| format!("{}: {}", field.name, field.field_type))
				.join(", ");
			writeln!(out, "  fields: {fields}")?;
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{tests::run_command, tools::test_archive};
	use pmvector_core::assert_wildcard;

	#[test]
	fn info_command() -> Result<()> {
		let (_file, path) = test_archive::write()?;
		run_command(vec!["pmvector", "info", &path])?;
		run_command(vec!["pmvector", "-q", "info", "-o", "ZOOM_LEVEL=1", &path])?;
		assert!(run_command(vec!["pmvector", "info", "-o", "ZOOM_LEVEL=9", &path]).is_err());
		Ok(())
	}

	#[tokio::test]
	async fn info_output() -> Result<()> {
		let (_file, path) = test_archive::write()?;
		let dataset = crate::tools::open_dataset(&path, &[]).await?;
		let mut out: Vec<u8> = Vec::new();
		write_info(&dataset, &mut out)?;
		let text = String::from_utf8(out)?;

		assert_wildcard!(
			text,
			"archive: *test.pmtiles\ntile type: mvt, tile compression: gzip, clustered: true\nzoom levels: 0..=3, reading zoom level 3\n*layer 'pois': zoom 0..=3, geometry Point\n  fields: name: String, rank: Real\nlayer 'roads': zoom 2..=3, geometry LineString\n  fields: kind: String\n"
		);
		Ok(())
	}
}
