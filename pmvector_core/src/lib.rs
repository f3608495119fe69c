//! Shared building blocks for reading PMTiles archives: byte blobs and ranges, tile coordinates,
//! asynchronous data readers, binary value readers and decompression.

pub mod compression;
pub use compression::TileCompression;

pub mod config;
pub use config::Config;

pub mod io;

pub mod macros;

pub mod types;
pub use types::*;
