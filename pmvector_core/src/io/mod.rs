//! Asynchronous data readers for local files, memory and HTTP sources, plus synchronous value
//! readers and writers for the little-endian and protobuf encodings found inside archives.

mod data_reader;
mod data_reader_blob;
mod data_reader_file;
mod data_reader_http;
mod value_reader;
mod value_reader_slice;
mod value_writer;
mod value_writer_blob;

pub use data_reader::*;
pub use data_reader_blob::*;
pub use data_reader_file::*;
pub use data_reader_http::*;
pub use value_reader::*;
pub use value_reader_slice::*;
pub use value_writer::*;
pub use value_writer_blob::*;
