//! `DataLocation` names where an archive lives: a URL, a filesystem path or an in-memory blob.

use anyhow::{Context, Result, anyhow, bail};
use pmvector_core::{
	Blob,
	io::{DataReader, DataReaderBlob, DataReaderFile, DataReaderHttp},
};
use reqwest::Url;
use std::{
	fmt::Debug,
	path::{Path, PathBuf},
};

/// A location an archive can be read from.
///
/// ```
/// use pmvector_container::DataLocation;
/// let a = DataLocation::parse("https://example.org/x.pmtiles").unwrap();
/// let b = DataLocation::parse("./data/x.pmtiles").unwrap();
/// assert!(matches!(a, DataLocation::Url(_)));
/// assert!(matches!(b, DataLocation::Path(_)));
/// ```
#[derive(Clone, PartialEq)]
pub enum DataLocation {
	Url(Url),
	Path(PathBuf),
	Blob(Blob),
}

impl DataLocation {
	/// Parses a location. Anything that is a URL with a host becomes a `Url`, everything else a `Path`.
	pub fn parse(input: &str) -> Result<Self> {
		let input = input.trim();
		if input.is_empty() {
			bail!("empty location");
		}
		Ok(match Url::parse(input) {
			Ok(url) if url.has_host() => DataLocation::Url(url),
			_ => DataLocation::Path(PathBuf::from(input)),
		})
	}

	/// Makes relative paths absolute by joining them onto the current directory.
	pub fn resolve(&mut self) -> Result<()> {
		if let DataLocation::Path(path) = self {
			*path = absolute_path(path)?;
		}
		Ok(())
	}

	/// The last path segment, e.g. `planet.pmtiles`.
	pub fn filename(&self) -> Result<String> {
		let filename = match self {
			DataLocation::Url(url) => url
				.path_segments()
				.and_then(|mut segments| segments.next_back())
				.ok_or_else(|| anyhow!("URL '{url}' has no path"))?,
			DataLocation::Path(path) => path
				.file_name()
				.and_then(|name| name.to_str())
				.ok_or_else(|| anyhow!("path '{}' has no file name", path.display()))?,
			DataLocation::Blob(_) => bail!("Blob has no filename"),
		};
		Ok(filename.to_string())
	}

	/// The lower-cased last extension of the file name, without the dot.
	pub fn extension(&self) -> Result<String> {
		let filename = self.filename()?;
		match filename.rfind('.') {
			Some(pos) if pos + 1 < filename.len() => Ok(filename[pos + 1..].to_ascii_lowercase()),
			_ => bail!("'{filename}' has no file extension"),
		}
	}

	/// Opens a byte source for this location: HTTP range requests for URLs, a file for paths.
	pub fn to_data_reader(&self) -> Result<DataReader> {
		let reader: DataReader = match self {
			DataLocation::Url(url) => DataReaderHttp::from_url(url.clone())
				.with_context(|| format!("failed to create HTTP data reader for URL '{url}'"))?,
			DataLocation::Path(path) => DataReaderFile::open(&absolute_path(path)?)
				.with_context(|| format!("failed to open file '{}'", path.display()))?,
			DataLocation::Blob(blob) => Box::new(DataReaderBlob::from(blob.clone())),
		};
		Ok(reader)
	}
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
	if path.is_absolute() {
		return Ok(path.to_path_buf());
	}
	Ok(std::env::current_dir()
		.context("failed to get current directory")?
		.join(path))
}

impl std::fmt::Display for DataLocation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DataLocation::Url(url) => write!(f, "{url}"),
			DataLocation::Path(path) => write!(f, "{}", path.display()),
			DataLocation::Blob(blob) => write!(f, "<blob len={}>", blob.len()),
		}
	}
}

impl Debug for DataLocation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			DataLocation::Url(url) => write!(f, "Url({url})"),
			DataLocation::Path(path) => write!(f, "Path({})", path.display()),
			DataLocation::Blob(blob) => write!(f, "Blob(len={})", blob.len()),
		}
	}
}

impl From<PathBuf> for DataLocation {
	fn from(p: PathBuf) -> Self {
		DataLocation::Path(p)
	}
}

impl From<Url> for DataLocation {
	fn from(u: Url) -> Self {
		DataLocation::Url(u)
	}
}

impl From<Blob> for DataLocation {
	fn from(b: Blob) -> Self {
		DataLocation::Blob(b)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("https://example.org/tiles/planet.pmtiles", "Url(https://example.org/tiles/planet.pmtiles)")]
	#[case("/data/berlin.pmtiles", "Path(/data/berlin.pmtiles)")]
	#[case("berlin.PMTiles", "Path(berlin.PMTiles)")]
	#[case("file.pmtiles", "Path(file.pmtiles)")]
	fn parse(#[case] input: &str, #[case] debug: &str) -> Result<()> {
		assert_eq!(format!("{:?}", DataLocation::parse(input)?), debug);
		Ok(())
	}

	#[rstest]
	#[case("https://example.org/tiles/planet.pmtiles?key=1", "pmtiles")]
	#[case("/data/berlin.PMTiles", "pmtiles")]
	#[case("archive.tar.gz", "gz")]
	fn extension(#[case] input: &str, #[case] expected: &str) -> Result<()> {
		assert_eq!(DataLocation::parse(input)?.extension()?, expected);
		Ok(())
	}

	#[test]
	fn errors() {
		assert!(DataLocation::parse("  ").is_err());
		assert!(DataLocation::parse("/data/README").unwrap().extension().is_err());
		assert!(DataLocation::from(Blob::from("abc")).filename().is_err());
	}

	#[test]
	fn resolve_relative_paths() -> Result<()> {
		let mut location = DataLocation::parse("some/archive.pmtiles")?;
		location.resolve()?;
		match location {
			DataLocation::Path(path) => {
				assert!(path.is_absolute());
				assert!(path.ends_with("some/archive.pmtiles"));
			}
			other => panic!("unexpected {other:?}"),
		}
		Ok(())
	}

	#[tokio::test]
	async fn blob_reader() -> Result<()> {
		let reader = DataLocation::from(Blob::from("PMTiles")).to_data_reader()?;
		assert_eq!(reader.read_all().await?.as_slice(), b"PMTiles");
		Ok(())
	}
}
