//! Decompression (and, for assembling archives, compression) of directories, metadata and tiles.

mod method_brotli;
mod method_gzip;
mod method_zstd;

pub use method_brotli::*;
pub use method_gzip::*;
pub use method_zstd::*;

use crate::Blob;
use anyhow::Result;
use std::fmt::Display;

/// Compression methods an archive may use for its internal structures or its tiles.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TileCompression {
	Uncompressed,
	Gzip,
	Brotli,
	Zstd,
}

impl TileCompression {
	#[must_use]
	pub fn as_str(&self) -> &'static str {
		match self {
			TileCompression::Uncompressed => "none",
			TileCompression::Gzip => "gzip",
			TileCompression::Brotli => "brotli",
			TileCompression::Zstd => "zstd",
		}
	}
}

impl Display for TileCompression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Compresses `blob` with the given method.
pub fn compress(blob: Blob, compression: TileCompression) -> Result<Blob> {
	match compression {
		TileCompression::Uncompressed => Ok(blob),
		TileCompression::Gzip => compress_gzip(&blob),
		TileCompression::Brotli => compress_brotli(&blob),
		TileCompression::Zstd => compress_zstd(&blob),
	}
}

/// Decompresses `blob`, which was compressed with the given method.
pub fn decompress(blob: Blob, compression: TileCompression) -> Result<Blob> {
	match compression {
		TileCompression::Uncompressed => Ok(blob),
		TileCompression::Gzip => decompress_gzip(&blob),
		TileCompression::Brotli => decompress_brotli(&blob),
		TileCompression::Zstd => decompress_zstd(&blob),
	}
}

#[cfg(test)]
pub(crate) fn generate_test_data(size: usize) -> Blob {
	let mut data = Vec::with_capacity(size);
	let mut value: u32 = 0x1234_5678;
	for i in 0..size {
		value = value.wrapping_mul(1_103_515_245).wrapping_add(12345);
		data.push(if i % 3 == 0 { (value >> 16) as u8 } else { b'a' + (i % 7) as u8 });
	}
	Blob::from(data)
}
