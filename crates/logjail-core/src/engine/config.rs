//! Jail Configuration
//!
//! Immutable per-jail settings: pattern lists, failure threshold, window
//! width, and ban duration. Validation happens at `Jail` construction.

/// How long a ban lasts once imposed.
///
/// A non-positive configured duration is normalized to `Permanent` at
/// construction: the alternative reading (a ban that expires immediately)
/// would make banning a no-op. The sentinel is explicit rather than being
/// inferred from a zero comparison at every expiry check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BanTime {
	/// Ban never expires on its own; only a manual unban lifts it
	Permanent,
	/// Ban expires once strictly more than this many seconds have passed
	Finite(f64),
}

impl BanTime {
	/// Normalize a configured duration in seconds into the sentinel form
	pub fn from_secs(secs: f64) -> Self {
		if secs > 0.0 {
			BanTime::Finite(secs)
		} else {
			BanTime::Permanent
		}
	}
}

/// Immutable configuration for one jail.
///
/// Pattern lists are ordered: ignore patterns are evaluated first and
/// short-circuit, failure patterns are tried top to bottom. Each failure
/// pattern must designate the identifier via a `host` named capture group
/// or, failing that, capture group 1.
#[derive(Debug, Clone)]
pub struct JailConfig {
	/// Diagnostic label for this jail (appears in log output)
	pub name: Box<str>,
	/// Ordered failure patterns; first match wins
	pub failure_patterns: Vec<Box<str>>,
	/// Ordered ignore patterns; any match makes the line a non-event
	pub ignore_patterns: Vec<Box<str>>,
	/// Failure count that triggers a ban (>= 1)
	pub max_retry: u32,
	/// Width of the sliding failure window, in seconds (>= 0)
	pub findtime_secs: f64,
	/// Ban duration
	pub bantime: BanTime,
	/// Upper bound on concurrently tracked identifiers (0 = default)
	pub max_tracked: usize,
}

/// Default number of identifiers tracked before least-recently-touched
/// entries are evicted
pub(crate) const DEFAULT_MAX_TRACKED: usize = 100_000;

impl JailConfig {
	/// Create a configuration with the given failure patterns and the
	/// stock defaults: 3 retries within 600 seconds, 600 second bans.
	pub fn new(name: impl Into<Box<str>>, failure_patterns: Vec<Box<str>>) -> Self {
		Self {
			name: name.into(),
			failure_patterns,
			ignore_patterns: Vec::new(),
			max_retry: 3,
			findtime_secs: 600.0,
			bantime: BanTime::Finite(600.0),
			max_tracked: 0,
		}
	}

	/// Set the ordered ignore pattern list
	pub fn with_ignore_patterns(mut self, patterns: Vec<Box<str>>) -> Self {
		self.ignore_patterns = patterns;
		self
	}

	/// Set the failure threshold
	pub fn with_max_retry(mut self, max_retry: u32) -> Self {
		self.max_retry = max_retry;
		self
	}

	/// Set the sliding window width in seconds
	pub fn with_findtime(mut self, secs: f64) -> Self {
		self.findtime_secs = secs;
		self
	}

	/// Set the ban duration in seconds; non-positive means permanent
	pub fn with_bantime(mut self, secs: f64) -> Self {
		self.bantime = BanTime::from_secs(secs);
		self
	}

	/// Set the tracked-identifier capacity bound
	pub fn with_max_tracked(mut self, max_tracked: usize) -> Self {
		self.max_tracked = max_tracked;
		self
	}

	/// Effective tracked-identifier capacity
	pub(crate) fn effective_max_tracked(&self) -> usize {
		if self.max_tracked == 0 {
			DEFAULT_MAX_TRACKED
		} else {
			self.max_tracked
		}
	}
}


// vim: ts=4
