use crate::{GeoProperties, GeoValue};
use anyhow::{Context, Result, anyhow, ensure};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// An indexed list where each distinct entry is stored once.
#[derive(Clone, PartialEq)]
pub struct IndexedList<T>
where
	T: Clone + Eq + Hash,
{
	list: Vec<T>,
	map: HashMap<T, u32>,
}

impl<T> IndexedList<T>
where
	T: Clone + Debug + Eq + Hash,
{
	/// Adds `entry` unless present and returns its index.
	pub fn add(&mut self, entry: T) -> u32 {
		if let Some(index) = self.map.get(&entry) {
			return *index;
		}
		let index = self.list.len() as u32;
		self.map.insert(entry.clone(), index);
		self.list.push(entry);
		index
	}

	/// Appends `entry` without deduplication, as tables read from a tile must keep their indices.
	pub fn push(&mut self, entry: T) {
		let index = self.list.len() as u32;
		self.map.entry(entry.clone()).or_insert(index);
		self.list.push(entry);
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.list.iter()
	}

	pub fn get(&self, id: u32) -> Result<&T> {
		self.list.get(id as usize).ok_or_else(|| anyhow!("id '{id}' not found"))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.list.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}
}

impl<T: Clone + Eq + Hash> Default for IndexedList<T> {
	fn default() -> IndexedList<T> {
		IndexedList {
			list: Vec::new(),
			map: HashMap::new(),
		}
	}
}

impl<T> Debug for IndexedList<T>
where
	T: Clone + Debug + Eq + Hash,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.list).finish()
	}
}

/// The key and value tables of a layer, and the translation between tag ids and properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyManager {
	pub key: IndexedList<String>,
	pub val: IndexedList<GeoValue>,
}

impl PropertyManager {
	pub fn encode_tag_ids(&mut self, properties: &GeoProperties) -> Vec<u32> {
		let mut tag_ids: Vec<u32> = Vec::with_capacity(properties.len() * 2);
		for (key, val) in properties {
			if val.is_null() {
				continue;
			}
			tag_ids.push(self.key.add(key.clone()));
			tag_ids.push(self.val.add(val.clone()));
		}
		tag_ids
	}

	pub fn decode_tag_ids(&self, tag_ids: &[u32]) -> Result<GeoProperties> {
		ensure!(tag_ids.len() % 2 == 0, "Tag IDs must be even");

		tag_ids
			.chunks_exact(2)
			.map(|pair| {
				Ok((
					self.key.get(pair[0]).context("Failed to get property key")?.to_owned(),
					self.val.get(pair[1]).context("Failed to get property value")?.clone(),
				))
			})
			.collect()
	}
}
