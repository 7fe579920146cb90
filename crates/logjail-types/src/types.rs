//! Common types used throughout the logjail engine.

use serde::{Deserialize, Serialize};

// Timestamp //
//***********//

/// A point on the caller-supplied logical clock, in seconds.
///
/// The engine never reads a wall clock: every timestamp is handed in by the
/// caller, which makes processing a pure, replayable function of its inputs.
/// Fractional seconds are legal (log sources commonly carry sub-second
/// precision).
#[derive(Clone, Copy, Debug, Default)]
pub struct Timestamp(pub f64);

impl Timestamp {
	/// Seconds elapsed from `earlier` to `self`. Negative if `earlier` is
	/// in the future relative to `self`.
	pub fn secs_since(&self, earlier: Timestamp) -> f64 {
		self.0 - earlier.0
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::cmp::PartialEq for Timestamp {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}

impl std::cmp::PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		self.0.partial_cmp(&other.0)
	}
}

impl From<f64> for Timestamp {
	fn from(secs: f64) -> Self {
		Timestamp(secs)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_f64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(f64::deserialize(deserializer)?))
	}
}


// vim: ts=4
