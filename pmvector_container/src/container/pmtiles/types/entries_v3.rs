use super::EntryV3;
use anyhow::{Context, Result, ensure};
use pmvector_core::{
	Blob, ByteRange,
	io::{ValueReader, ValueReaderSlice, ValueWriter, ValueWriterBlob},
};
use std::{cmp::Ordering, ops::Range, slice::Iter};

/// A decoded directory: entries sorted by tile id.
#[derive(Debug, Default, PartialEq)]
pub struct EntriesV3 {
	entries: Vec<EntryV3>,
}

impl EntriesV3 {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Decodes a directory: a varint count followed by columns of tile id deltas,
	/// run lengths, lengths and offsets.
	pub fn from_blob(data: &Blob) -> Result<Self> {
		let mut reader = ValueReaderSlice::new_le(data.as_slice());

		let num_entries = reader.read_varint().context("Failed to read number of entries")?;
		// every entry needs at least four bytes
		ensure!(
			num_entries <= reader.remaining() / 4 + 1,
			"directory claims {num_entries} entries but has only {} bytes",
			data.len()
		);
		let num_entries = num_entries as usize;

		let mut entries: Vec<EntryV3> = Vec::with_capacity(num_entries);
		let mut last_id: u64 = 0;
		for _ in 0..num_entries {
			last_id = last_id
				.checked_add(reader.read_varint().context("Failed to read tile id")?)
				.context("tile id overflow in directory")?;
			entries.push(EntryV3::new(last_id, ByteRange::empty(), 0));
		}

		for entry in &mut entries {
			entry.run_length = u32::try_from(reader.read_varint().context("Failed to read run length")?)?;
		}

		for entry in &mut entries {
			entry.range.length = reader.read_varint().context("Failed to read length")?;
		}

		for i in 0..num_entries {
			let value = reader.read_varint().context("Failed to read offset")?;
			entries[i].range.offset = if i > 0 && value == 0 {
				entries[i - 1]
					.range
					.offset
					.checked_add(entries[i - 1].range.length)
					.context("tile offset overflow in directory")?
			} else {
				ensure!(value > 0, "first directory entry must have an explicit offset");
				value - 1
			};
		}

		Ok(EntriesV3 { entries })
	}

	/// Encodes the entries in directory format, the inverse of [`EntriesV3::from_blob`].
	pub fn to_blob(&self) -> Result<Blob> {
		let mut writer = ValueWriterBlob::new_le();
		let entries = &self.entries;

		writer.write_varint(entries.len() as u64)?;

		let mut last_id: u64 = 0;
		for entry in entries {
			writer.write_varint(entry.tile_id - last_id)?;
			last_id = entry.tile_id;
		}

		for entry in entries {
			writer.write_varint(u64::from(entry.run_length))?;
		}

		for entry in entries {
			writer.write_varint(entry.range.length)?;
		}

		for (i, entry) in entries.iter().enumerate() {
			let offset = if i > 0 && entry.range.offset == entries[i - 1].range.offset + entries[i - 1].range.length {
				0
			} else {
				entry.range.offset + 1
			};
			writer.write_varint(offset)?;
		}

		Ok(writer.into_blob())
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Appends an entry. Entries must be pushed in ascending tile id order.
	pub fn push(&mut self, entry: EntryV3) {
		self.entries.push(entry);
	}

	pub fn iter(&self) -> Iter<'_, EntryV3> {
		self.entries.iter()
	}

	/// Finds the entry holding `tile_id`: either a tile run containing it or the leaf
	/// directory whose span it falls into.
	#[must_use]
	pub fn find_tile(&self, tile_id: u64) -> Option<EntryV3> {
		let mut m: i64 = 0;
		let mut n: i64 = self.entries.len() as i64 - 1;

		while m <= n {
			let k = (n + m) >> 1;
			let entry = self.entries[k as usize];
			match tile_id.cmp(&entry.tile_id) {
				Ordering::Greater => m = k + 1,
				Ordering::Less => n = k - 1,
				Ordering::Equal => return Some(entry),
			}
		}

		// at this point, m > n
		if n >= 0 {
			let entry = self.entries[n as usize];
			if entry.run_length == 0 || tile_id - entry.tile_id < u64::from(entry.run_length) {
				return Some(entry);
			}
		}

		None
	}

	/// Entries that may hold tiles with ids in `ids`.
	///
	/// A tile run matches if it overlaps `ids`. A leaf pointer spans up to the next entry's
	/// tile id and matches if that span overlaps `ids`.
	pub fn entries_overlapping(&self, ids: &Range<u64>) -> impl Iterator<Item = &EntryV3> + '_ {
		let ids = ids.clone();
		self.entries.iter().enumerate().filter(move |(i, entry)| {
			if entry.range.length == 0 {
				return false;
			}
			let end = if entry.is_leaf_pointer() {
				self.entries.get(i + 1).map_or(u64::MAX, |next| next.tile_id)
			} else {
				entry.tile_id + u64::from(entry.run_length)
			};
			entry.tile_id < ids.end && ids.start < end
		})
		.map(|(_, entry)| entry)
	}
}

impl FromIterator<EntryV3> for EntriesV3 {
	fn from_iter<T: IntoIterator<Item = EntryV3>>(iter: T) -> Self {
		EntriesV3 {
			entries: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	fn create_entries() -> EntriesV3 {
		EntriesV3::from_iter([
			EntryV3::new(1, ByteRange::new(100, 100), 0),
			EntryV3::new(2, ByteRange::new(200, 100), 1),
			EntryV3::new(3, ByteRange::new(300, 100), 0),
		])
	}

	fn create_filled_entries(num: u64) -> EntriesV3 {
		(0..num)
			.map(|i| EntryV3::new(i, ByteRange::new(i * 100, 100), 1))
			.collect()
	}

	#[test]
	fn serialize_entries() -> Result<()> {
		let entries = create_entries();
		let serialized = entries.to_blob()?;
		assert_eq!(serialized.as_hex(), "03 01 01 01 00 01 00 64 64 64 65 00 00");
		assert_eq!(EntriesV3::from_blob(&serialized)?, entries);
		Ok(())
	}

	#[test]
	fn find_tile() {
		let entries = create_entries();
		assert_eq!(entries.find_tile(2).map(|e| e.tile_id), Some(2));
		// entry 3 is a leaf pointer, so everything after it is routed there
		assert_eq!(entries.find_tile(1000).map(|e| e.tile_id), Some(3));
		assert_eq!(entries.find_tile(0), None);
	}

	#[test]
	fn find_tile_in_runs() {
		let entries = EntriesV3::from_iter([
			EntryV3::new(10, ByteRange::new(0, 10), 5),
			EntryV3::new(20, ByteRange::new(10, 10), 1),
		]);
		assert_eq!(entries.find_tile(14).map(|e| e.tile_id), Some(10));
		assert_eq!(entries.find_tile(15), None);
		assert_eq!(entries.find_tile(21), None);
	}

	#[test]
	fn large_directory() -> Result<()> {
		let entries = create_filled_entries(100_000);
		assert!(entries.find_tile(99_999).is_some());
		assert!(entries.find_tile(100_000).is_none());
		assert_eq!(EntriesV3::from_blob(&entries.to_blob()?)?, entries);
		Ok(())
	}

	#[test]
	fn empty_directory() -> Result<()> {
		let entries = create_filled_entries(0);
		assert!(entries.is_empty());
		assert_eq!(EntriesV3::from_blob(&entries.to_blob()?)?.len(), 0);
		Ok(())
	}

	#[test]
	fn corrupt_directories() {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_varint(10_000_000_001).unwrap();
		assert!(EntriesV3::from_blob(&writer.into_blob()).is_err());

		// truncated columns
		assert!(EntriesV3::from_blob(&Blob::from(&[0x02, 0x01, 0x01, 0x01])).is_err());
	}

	#[test]
	fn offset_overflow_is_an_error() -> Result<()> {
		let mut writer = ValueWriterBlob::new_le();
		writer.write_varint(2)?;
		for value in [0, 1, 1, 1, u64::MAX, 1, 2, 0] {
			writer.write_varint(value)?;
		}
		let error = EntriesV3::from_blob(&writer.into_blob()).unwrap_err();
		assert_eq!(error.to_string(), "tile offset overflow in directory");
		Ok(())
	}

	#[test]
	fn overlapping() {
		let entries = EntriesV3::from_iter([
			EntryV3::new(0, ByteRange::new(0, 10), 1),
			EntryV3::new(5, ByteRange::new(10, 10), 3),
			EntryV3::new(21, ByteRange::new(20, 10), 0),
			EntryV3::new(85, ByteRange::new(30, 10), 0),
		]);
		let ids = |range: Range<u64>| entries.entries_overlapping(&range).map(|e| e.tile_id).collect::<Vec<_>>();
		assert_eq!(ids(1..5), Vec::<u64>::new());
		assert_eq!(ids(1..6), vec![5]);
		assert_eq!(ids(7..21), vec![5]);
		assert_eq!(ids(8..22), vec![21]);
		assert_eq!(ids(100..200), vec![85]);
	}
}
