//! Runtime configuration shared by the archive reader and the data source layer.

/// Tunables for opening archives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
	/// Maximum number of decoded leaf directories kept in memory per archive.
	pub leaf_cache_size: usize,
}

impl Config {
	#[must_use]
	pub fn with_leaf_cache_size(mut self, leaf_cache_size: usize) -> Self {
		self.leaf_cache_size = leaf_cache_size.max(1);
		self
	}
}

impl Default for Config {
	fn default() -> Self {
		Self { leaf_cache_size: 256 }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults() {
		assert_eq!(Config::default().leaf_cache_size, 256);
		assert_eq!(Config::default().with_leaf_cache_size(0).leaf_cache_size, 1);
		assert_eq!(Config::default().with_leaf_cache_size(16).leaf_cache_size, 16);
	}
}
