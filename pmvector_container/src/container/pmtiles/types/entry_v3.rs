use pmvector_core::ByteRange;

/// One directory entry. A `run_length` of 0 marks a pointer to a leaf directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryV3 {
	pub tile_id: u64,
	pub range: ByteRange,
	pub run_length: u32,
}

impl EntryV3 {
	#[must_use]
	pub fn new(tile_id: u64, range: ByteRange, run_length: u32) -> Self {
		Self {
			tile_id,
			range,
			run_length,
		}
	}

	#[must_use]
	pub fn is_leaf_pointer(&self) -> bool {
		self.run_length == 0
	}
}
