//! Testing and assertion macros

/// Asserts that the string representation of an expression matches a given wildcard pattern.
///
/// # Example
/// ```
/// use pmvector_core::assert_wildcard;
/// assert_wildcard!("zoom level 5 outside 0..=4", "zoom level * outside *");
/// ```
#[macro_export]
macro_rules! assert_wildcard {
	($expression:expr, $wildcard:expr) => {
		let expression = format!("{}", $expression);
		if !wildmatch::WildMatch::new($wildcard).matches(&expression) {
			panic!(
				"assertion failed: expression \"{expression:?}\" does not match wildcard \"{}\"",
				$wildcard
			)
		}
	};
}
