//! Reading remote archives through HTTP range requests.
//!
//! Every `read_range` call issues one `GET` with a `Range` header and expects `206 Partial Content`.
//! Connection, timeout and body errors are retried with exponential backoff.
//!
//! # Examples
//!
//! ```rust,no_run
//! use pmvector_core::{io::{DataReaderHttp, DataReaderTrait}, ByteRange};
//! use anyhow::Result;
//! use reqwest::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let url = Url::parse("https://example.com/planet.pmtiles")?;
//!     let reader = DataReaderHttp::from_url(url)?;
//!     let header = reader.read_range(&ByteRange::new(0, 127)).await?;
//!     println!("read {} bytes", header.len());
//!     Ok(())
//! }
//! ```

use super::DataReaderTrait;
use crate::{Blob, ByteRange};
use anyhow::{Context, Result, anyhow, bail, ensure};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use reqwest::{Client, Response, StatusCode, Url};
use std::{sync::LazyLock, time::Duration};
use tokio::time::sleep;

const MAX_RETRIES: u32 = 3;

/// A struct that provides reading capabilities from an HTTP(S) endpoint.
#[derive(Debug)]
pub struct DataReaderHttp {
	client: Client,
	name: String,
	url: Url,
}

impl DataReaderHttp {
	/// Creates a `DataReaderHttp` from a URL.
	///
	/// # Errors
	///
	/// Fails if the scheme is neither `http` nor `https`, or if the HTTP client cannot be built.
	pub fn from_url(url: Url) -> Result<Box<DataReaderHttp>> {
		match url.scheme() {
			"http" | "https" => (),
			other => bail!("unsupported URL scheme '{other}' in '{url}', expected 'http' or 'https'"),
		}

		let client = Client::builder()
			.tcp_keepalive(Duration::from_secs(600))
			.build()
			.context("failed to build HTTP client")?;

		Ok(Box::new(DataReaderHttp {
			client,
			name: url.to_string(),
			url,
		}))
	}

	async fn fetch(&self, range: Option<&ByteRange>) -> Result<Blob> {
		for attempt in 0..=MAX_RETRIES {
			if attempt > 0 {
				let backoff = Duration::from_secs(1 << (attempt - 1));
				log::warn!(
					"retry attempt {attempt}/{MAX_RETRIES} reading from '{}', waiting {backoff:?}",
					self.url
				);
				sleep(backoff).await;
			}

			let mut request = self.client.get(self.url.clone());
			if let Some(range) = range {
				request = request.header("range", format!("bytes={}-{}", range.offset, range.offset + range.length - 1));
			}

			let response = match request.send().await {
				Ok(r) => r,
				Err(e) if is_retryable_error(&e) && attempt < MAX_RETRIES => {
					log::warn!("retryable error: {e}");
					continue;
				}
				Err(e) => return Err(e.into()),
			};

			match range {
				Some(range) => check_partial_response(&response, range)?,
				None => ensure!(
					response.status().is_success(),
					"HTTP request failed with status {}",
					response.status()
				),
			}

			match response.bytes().await {
				Ok(bytes) => return Ok(Blob::from(&*bytes)),
				Err(e) if is_retryable_error(&e) && attempt < MAX_RETRIES => {
					log::warn!("retryable error reading response body: {e}");
				}
				Err(e) => return Err(e.into()),
			}
		}

		bail!("request failed after {MAX_RETRIES} retries")
	}
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
	err.is_connect() || err.is_timeout() || err.is_body()
}

fn check_partial_response(response: &Response, range: &ByteRange) -> Result<()> {
	ensure!(
		response.status() == StatusCode::PARTIAL_CONTENT,
		"expected HTTP 206 (Partial Content), got {}",
		response.status()
	);

	let content_range = response
		.headers()
		.get("content-range")
		.ok_or_else(|| anyhow!("response is missing Content-Range header"))?
		.to_str()?;

	let (start, end) = parse_content_range(content_range)?;
	ensure!(
		start == range.offset,
		"Content-Range start mismatch: expected {}, got {start}",
		range.offset
	);
	let expected_end = range.offset + range.length - 1;
	ensure!(
		end == expected_end,
		"Content-Range end mismatch: expected {expected_end}, got {end}"
	);
	Ok(())
}

/// Parses `bytes <start>-<end>/<total>` into `(start, end)`.
fn parse_content_range(value: &str) -> Result<(u64, u64)> {
	static RE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
		RegexBuilder::new(r"^bytes (\d+)-(\d+)/(\d+|\*)$")
			.case_insensitive(true)
			.build()
			.unwrap()
	});

	let caps = RE_RANGE.captures(value.trim()).ok_or_else(|| {
		anyhow!("unexpected Content-Range format: '{value}', expected 'bytes <start>-<end>/<total>'")
	})?;
	Ok((caps[1].parse()?, caps[2].parse()?))
}

#[async_trait]
impl DataReaderTrait for DataReaderHttp {
	async fn read_range(&self, range: &ByteRange) -> Result<Blob> {
		if range.length == 0 {
			return Ok(Blob::new_empty());
		}
		self
			.fetch(Some(range))
			.await
			.with_context(|| format!("failed to read range {range} from '{}'", self.url))
	}

	async fn read_all(&self) -> Result<Blob> {
		self
			.fetch(None)
			.await
			.with_context(|| format!("failed to read all data from '{}'", self.url))
	}

	fn get_name(&self) -> &str {
		&self.name
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn from_url_checks_scheme() {
		assert!(DataReaderHttp::from_url(Url::parse("https://www.example.com").unwrap()).is_ok());
		assert_eq!(
			DataReaderHttp::from_url(Url::parse("ftp://www.example.com").unwrap())
				.unwrap_err()
				.to_string(),
			"unsupported URL scheme 'ftp' in 'ftp://www.example.com/', expected 'http' or 'https'"
		);
	}

	#[test]
	fn get_name() -> Result<()> {
		let url = "https://www.example.com/tiles.pmtiles";
		assert_eq!(DataReaderHttp::from_url(Url::parse(url)?)?.get_name(), url);
		Ok(())
	}

	#[rstest]
	#[case("bytes 0-126/1000", Some((0, 126)))]
	#[case("Bytes 12-20/*", Some((12, 20)))]
	#[case("bytes 12-/20", None)]
	#[case("items 0-1/2", None)]
	#[case("", None)]
	fn content_range(#[case] value: &str, #[case] expected: Option<(u64, u64)>) {
		assert_eq!(parse_content_range(value).ok(), expected);
	}
}
