use std::{
	fmt::{Debug, Display},
	hash::{Hash, Hasher},
};

/// An attribute value as stored in a vector tile.
#[derive(Clone, Debug, PartialEq)]
pub enum GeoValue {
	Bool(bool),
	Double(f64),
	Float(f32),
	Int(i64),
	Null,
	String(String),
	UInt(u64),
}

impl GeoValue {
	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, GeoValue::Null)
	}

	/// Returns the value as `f64` if it is numeric.
	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			GeoValue::Double(v) => Some(*v),
			GeoValue::Float(v) => Some(f64::from(*v)),
			GeoValue::Int(v) => Some(*v as f64),
			GeoValue::UInt(v) => Some(*v as f64),
			_ => None,
		}
	}
}

// Floats compare by bit pattern, so identical values deduplicate in property tables.
impl Eq for GeoValue {}

impl Hash for GeoValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			GeoValue::Bool(v) => v.hash(state),
			GeoValue::Double(v) => v.to_bits().hash(state),
			GeoValue::Float(v) => v.to_bits().hash(state),
			GeoValue::Int(v) => v.hash(state),
			GeoValue::Null => {}
			GeoValue::String(v) => v.hash(state),
			GeoValue::UInt(v) => v.hash(state),
		}
	}
}

impl Display for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			GeoValue::Bool(v) => write!(f, "{v}"),
			GeoValue::Double(v) => write!(f, "{v}"),
			GeoValue::Float(v) => write!(f, "{v}"),
			GeoValue::Int(v) => write!(f, "{v}"),
			GeoValue::Null => write!(f, "null"),
			GeoValue::String(v) => write!(f, "{v}"),
			GeoValue::UInt(v) => write!(f, "{v}"),
		}
	}
}

impl From<&str> for GeoValue {
	fn from(value: &str) -> Self {
		GeoValue::String(value.to_string())
	}
}

impl From<String> for GeoValue {
	fn from(value: String) -> Self {
		GeoValue::String(value)
	}
}

impl From<bool> for GeoValue {
	fn from(value: bool) -> Self {
		GeoValue::Bool(value)
	}
}

impl From<i64> for GeoValue {
	fn from(value: i64) -> Self {
		GeoValue::Int(value)
	}
}

impl From<u64> for GeoValue {
	fn from(value: u64) -> Self {
		GeoValue::UInt(value)
	}
}

impl From<f32> for GeoValue {
	fn from(value: f32) -> Self {
		GeoValue::Float(value)
	}
}

impl From<f64> for GeoValue {
	fn from(value: f64) -> Self {
		GeoValue::Double(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn conversions() {
		assert_eq!(GeoValue::from("a"), GeoValue::String("a".into()));
		assert_eq!(GeoValue::from(true), GeoValue::Bool(true));
		assert_eq!(GeoValue::from(-3i64), GeoValue::Int(-3));
		assert_eq!(GeoValue::from(3u64), GeoValue::UInt(3));
		assert_eq!(GeoValue::from(1.5f32).as_f64(), Some(1.5));
		assert_eq!(GeoValue::from("x").as_f64(), None);
	}

	#[test]
	fn display() {
		assert_eq!(GeoValue::Double(2.5).to_string(), "2.5");
		assert_eq!(GeoValue::Null.to_string(), "null");
		assert_eq!(GeoValue::from("Berlin").to_string(), "Berlin");
	}

	#[test]
	fn hashing_deduplicates() {
		let set: HashSet<GeoValue> = [GeoValue::Double(1.0), GeoValue::Double(1.0), GeoValue::Float(1.0)]
			.into_iter()
			.collect();
		assert_eq!(set.len(), 2);
	}
}
