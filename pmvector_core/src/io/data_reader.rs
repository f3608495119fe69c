//! This module defines the `DataReaderTrait`, the random-access byte source every archive is opened from.
//!
//! # Examples
//!
//! ```rust
//! use pmvector_core::{io::{DataReader, DataReaderBlob}, ByteRange};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let reader: DataReader = Box::new(DataReaderBlob::from(vec![1, 2, 3, 4, 5]));
//!     let partial_data = reader.read_range(&ByteRange::new(1, 3)).await?;
//!     assert_eq!(partial_data.as_slice(), &[2, 3, 4]);
//!     Ok(())
//! }
//! ```

use crate::{Blob, ByteRange};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// Type alias for a boxed dynamic implementation of the `DataReaderTrait`.
pub type DataReader = Box<dyn DataReaderTrait>;

/// A trait for reading byte ranges from a file, a buffer or a remote resource.
#[async_trait]
pub trait DataReaderTrait: Debug + Send + Sync {
	/// Reads a specific range of bytes from the data source.
	///
	/// # Arguments
	///
	/// * `range` - A `ByteRange` struct specifying the offset and length of the range to read.
	///
	/// # Returns
	///
	/// * A Result containing a Blob with the read data or an error.
	async fn read_range(&self, range: &ByteRange) -> Result<Blob>;

	/// Reads all the data from the data source.
	async fn read_all(&self) -> Result<Blob>;

	/// Gets the name of the data source.
	fn get_name(&self) -> &str;
}
