//! Error classification for opening archives through the driver layer.
//!
//! Every error returned by [`Dataset::open`](crate::Dataset::open) and
//! [`OpenOptions::parse`](crate::OpenOptions::parse) carries a [`DriverError`] somewhere in its
//! chain, either as the root cause or as context. Callers classify with
//! `error.downcast_ref::<DriverError>()`.

use std::fmt::{self, Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriverError {
	/// The input is not a PMTiles v3 archive.
	IdentifyMismatch,
	/// An open option has a malformed value.
	Validation(String),
	/// The archive cannot be turned into a dataset.
	Open(String),
}

impl DriverError {
	#[must_use]
	pub fn is_open(&self) -> bool {
		matches!(self, DriverError::Open(_))
	}

	#[must_use]
	pub fn is_validation(&self) -> bool {
		matches!(self, DriverError::Validation(_))
	}
}

impl Display for DriverError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DriverError::IdentifyMismatch => f.write_str("input is not a PMTiles v3 archive"),
			DriverError::Validation(message) => write!(f, "invalid open option: {message}"),
			DriverError::Open(message) => write!(f, "cannot open PMTiles dataset: {message}"),
		}
	}
}

impl std::error::Error for DriverError {}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::{Context, Result, anyhow};

	#[test]
	fn display() {
		assert_eq!(
			DriverError::Validation("CLIP: 'maybe' is not a boolean".into()).to_string(),
			"invalid open option: CLIP: 'maybe' is not a boolean"
		);
		assert_eq!(
			DriverError::Open("archive contains no tiles".into()).to_string(),
			"cannot open PMTiles dataset: archive contains no tiles"
		);
		assert_eq!(DriverError::IdentifyMismatch.to_string(), "input is not a PMTiles v3 archive");
	}

	#[test]
	fn downcast_through_context() {
		let result: Result<()> = Err(anyhow!("disk on fire")).context(DriverError::Open("failed to read header".into()));
		let error = result.unwrap_err();
		assert!(error.downcast_ref::<DriverError>().is_some_and(DriverError::is_open));
		assert_eq!(format!("{error:#}"), "cannot open PMTiles dataset: failed to read header: disk on fire");

		let error = anyhow::Error::from(DriverError::Validation("x".into()));
		assert!(error.downcast_ref::<DriverError>().is_some_and(DriverError::is_validation));
	}
}
