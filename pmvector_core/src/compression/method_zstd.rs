use crate::Blob;
use anyhow::{Context, Result};
use std::io::Cursor;

pub fn compress_zstd(blob: &Blob) -> Result<Blob> {
	let compressed = zstd::encode_all(Cursor::new(blob.as_slice()), 19).context("Failed to compress data using Zstd")?;
	Ok(Blob::from(compressed))
}

pub fn decompress_zstd(blob: &Blob) -> Result<Blob> {
	let decompressed = zstd::decode_all(Cursor::new(blob.as_slice())).context("Failed to decompress data using Zstd")?;
	Ok(Blob::from(decompressed))
}
