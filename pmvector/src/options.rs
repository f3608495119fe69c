//! Open options understood by the PMTiles driver.
//!
//! Options arrive as loosely typed `KEY=VALUE` strings. [`OpenOptions::parse`] turns them into a
//! validated record before any archive is touched.
//!
//! ```rust
//! use pmvector::OpenOptions;
//!
//! let options = OpenOptions::parse(&[("zoom_level", "3"), ("CLIP", "no")]).unwrap();
//! assert_eq!(options.zoom_level, Some(3));
//! assert!(!options.clip);
//! assert!(!options.json_field());
//! ```

use crate::DriverError;
use anyhow::Result;
use log::debug;
use std::fmt::{self, Display};

pub const ZOOM_LEVEL: &str = "ZOOM_LEVEL";
pub const CLIP: &str = "CLIP";
pub const ZOOM_LEVEL_AUTO: &str = "ZOOM_LEVEL_AUTO";
pub const JSON_FIELD: &str = "JSON_FIELD";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionKind {
	Integer,
	Boolean,
}

impl Display for OptionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			OptionKind::Integer => "integer",
			OptionKind::Boolean => "boolean",
		})
	}
}

/// Describes one open option for help and introspection tooling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionDefinition {
	pub name: &'static str,
	pub kind: OptionKind,
	pub description: &'static str,
	pub default: Option<&'static str>,
}

/// All options of the driver, in the order they are documented.
#[must_use]
pub fn option_definitions() -> Vec<OptionDefinition> {
	vec![
		OptionDefinition {
			name: ZOOM_LEVEL,
			kind: OptionKind::Integer,
			description: "Zoom level of full resolution. If not specified, maximum non-empty zoom level",
			default: None,
		},
		OptionDefinition {
			name: CLIP,
			kind: OptionKind::Boolean,
			description: "Whether to clip geometries to tile extent",
			default: Some("YES"),
		},
		OptionDefinition {
			name: ZOOM_LEVEL_AUTO,
			kind: OptionKind::Boolean,
			description: "Whether to auto-select the zoom level for vector layers according to spatial filter extent. Only for display purpose",
			default: Some("NO"),
		},
		OptionDefinition {
			name: JSON_FIELD,
			kind: OptionKind::Boolean,
			description: "For vector layers, whether to put all attributes as a serialized JSon dictionary",
			default: None,
		},
	]
}

/// Validated open options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenOptions {
	/// Pins the dataset to this zoom level. Checked against the archive's zoom range when opening.
	pub zoom_level: Option<u32>,
	pub clip: bool,
	pub zoom_level_auto: bool,
	/// `None` keeps the format default, which is to expose the declared fields.
	pub json_field: Option<bool>,
}

impl Default for OpenOptions {
	fn default() -> Self {
		OpenOptions {
			zoom_level: None,
			clip: true,
			zoom_level_auto: false,
			json_field: None,
		}
	}
}

impl OpenOptions {
	/// Parses `(key, value)` pairs. Keys are case-insensitive and unknown keys are ignored.
	///
	/// A malformed value fails with [`DriverError::Validation`]. Later pairs override earlier ones.
	pub fn parse<K: AsRef<str>, V: AsRef<str>>(pairs: &[(K, V)]) -> Result<OpenOptions> {
		let mut options = OpenOptions::default();
		for (key, value) in pairs {
			let (key, value) = (key.as_ref().trim(), value.as_ref());
			match key.to_ascii_uppercase().as_str() {
				ZOOM_LEVEL => options.zoom_level = Some(parse_zoom_level(value)?),
				CLIP => options.clip = parse_bool(CLIP, value)?,
				ZOOM_LEVEL_AUTO => options.zoom_level_auto = parse_bool(ZOOM_LEVEL_AUTO, value)?,
				JSON_FIELD => options.json_field = Some(parse_bool(JSON_FIELD, value)?),
				_ => debug!("ignoring unknown open option '{key}'"),
			}
		}
		Ok(options)
	}

	#[must_use]
	pub fn json_field(&self) -> bool {
		self.json_field.unwrap_or(false)
	}
}

fn parse_zoom_level(value: &str) -> Result<u32> {
	value.trim().parse::<u32>().map_err(|_| {
		DriverError::Validation(format!("{ZOOM_LEVEL}: '{value}' is not a non-negative integer zoom level")).into()
	})
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
	match value.trim().to_ascii_uppercase().as_str() {
		"YES" | "TRUE" | "ON" | "1" => Ok(true),
		"NO" | "FALSE" | "OFF" | "0" => Ok(false),
		_ => Err(DriverError::Validation(format!("{key}: '{value}' is not a boolean")).into()),
	}
}
