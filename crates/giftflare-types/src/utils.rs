//! Utility helpers shared across crates.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as Unix seconds.
///
/// Saturates to 0 if the clock reports a time before the epoch, which
/// keeps timestamp handling infallible for callers.
pub fn current_timestamp() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

/// Truncates an id for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer ids.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_long_ids_only() {
		assert_eq!(truncate_id("abc"), "abc");
		assert_eq!(truncate_id("abcdefgh"), "abcdefgh");
		assert_eq!(truncate_id("abcdefghij"), "abcdefgh..");
	}
}
