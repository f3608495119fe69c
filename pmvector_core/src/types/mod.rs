//! Contains types like blobs, byte ranges, tile coordinates and mercator bounding boxes.

mod blob;
pub use blob::*;

mod byte_range;
pub use byte_range::*;

mod mercator_bbox;
pub use mercator_bbox::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_hilbert_index;
pub use tile_hilbert_index::*;
