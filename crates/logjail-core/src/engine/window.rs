//! Sliding Window Counter
//!
//! Per-identifier ordered failure timestamp history with age-based pruning.
//! All timestamps are caller-supplied; the counter never reads a wall clock,
//! so it is a pure, replayable function of its inputs. The identifier store
//! is capacity-bounded so a hostile log cannot grow state without bound.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use lru::LruCache;

use crate::prelude::*;

/// Keyed sliding-window failure counter.
///
/// Each identifier owns an oldest-first sequence of timestamps. After any
/// prune at time `now`, every retained timestamp `t` satisfies
/// `now - t <= findtime`. An identifier whose window empties is removed
/// entirely rather than retained as a zero-length entry.
#[derive(Debug)]
pub struct SlidingWindowCounter {
	findtime_secs: f64,
	windows: LruCache<Box<str>, VecDeque<Timestamp>>,
}

impl SlidingWindowCounter {
	/// Create a counter with the given window width and identifier capacity
	pub fn new(findtime_secs: f64, max_tracked: usize) -> Self {
		let cap = NonZeroUsize::new(max_tracked).unwrap_or(NonZeroUsize::MIN);

		Self { findtime_secs, windows: LruCache::new(cap) }
	}

	/// Record a failure for `identifier` at `now` and return the resulting
	/// in-window count.
	///
	/// The window is pruned before the new timestamp is appended, so a
	/// failure that has just aged out never contributes to the threshold
	/// check for this event.
	pub fn record(&mut self, identifier: &str, now: Timestamp) -> usize {
		self.prune(identifier, now);

		if let Some(window) = self.windows.get_mut(identifier) {
			window.push_back(now);
			window.len()
		} else {
			let mut window = VecDeque::with_capacity(1);
			window.push_back(now);
			self.windows.put(identifier.into(), window);
			1
		}
	}

	/// Drop entries older than the window width as of `now`.
	///
	/// Pruning at a later `now` is monotonic: it never un-prunes a
	/// previously pruned entry.
	pub fn prune(&mut self, identifier: &str, now: Timestamp) {
		let Some(window) = self.windows.get_mut(identifier) else {
			return;
		};

		while let Some(oldest) = window.front() {
			if now.secs_since(*oldest) > self.findtime_secs {
				window.pop_front();
			} else {
				break;
			}
		}

		if window.is_empty() {
			self.windows.pop(identifier);
		}
	}

	/// In-window failure count for `identifier` as of `now`, without
	/// mutating the stored history.
	pub fn count(&self, identifier: &str, now: Timestamp) -> usize {
		self.windows
			.peek(identifier)
			.map(|window| {
				window.iter().filter(|t| now.secs_since(**t) <= self.findtime_secs).count()
			})
			.unwrap_or(0)
	}

	/// Number of identifiers with a non-empty window
	pub fn len(&self) -> usize {
		self.windows.len()
	}

	/// Whether no identifier is currently tracked
	pub fn is_empty(&self) -> bool {
		self.windows.is_empty()
	}

	/// Drop one identifier's history. Returns whether anything was stored.
	pub fn forget(&mut self, identifier: &str) -> bool {
		self.windows.pop(identifier).is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_record_counts_within_window() {
		let mut counter = SlidingWindowCounter::new(60.0, 100);
		assert_eq!(counter.record("1.2.3.4", Timestamp(10.0)), 1);
		assert_eq!(counter.record("1.2.3.4", Timestamp(11.0)), 2);
		assert_eq!(counter.record("1.2.3.4", Timestamp(12.0)), 3);
	}

	#[test]
	fn test_prune_before_append() {
		// An entry that has just aged out must not count toward the new total
		let mut counter = SlidingWindowCounter::new(5.0, 100);
		assert_eq!(counter.record("1.2.3.4", Timestamp(0.0)), 1);
		assert_eq!(counter.record("1.2.3.4", Timestamp(10.0)), 1);
		assert_eq!(counter.record("1.2.3.4", Timestamp(11.0)), 2);
	}

	#[test]
	fn test_window_boundary_is_inclusive() {
		// Excluded iff now - t > findtime; equality is still in-window
		let mut counter = SlidingWindowCounter::new(10.0, 100);
		counter.record("a", Timestamp(0.0));
		assert_eq!(counter.count("a", Timestamp(10.0)), 1);
		assert_eq!(counter.count("a", Timestamp(10.1)), 0);
	}

	#[test]
	fn test_empty_window_removed() {
		let mut counter = SlidingWindowCounter::new(5.0, 100);
		counter.record("a", Timestamp(0.0));
		assert_eq!(counter.len(), 1);
		counter.prune("a", Timestamp(100.0));
		assert_eq!(counter.len(), 0);
		assert!(counter.is_empty());
	}

	#[test]
	fn test_zero_findtime_keeps_only_current_instant() {
		let mut counter = SlidingWindowCounter::new(0.0, 100);
		assert_eq!(counter.record("a", Timestamp(1.0)), 1);
		assert_eq!(counter.record("a", Timestamp(2.0)), 1);
		// Exact timestamp collision is the only way to accumulate
		assert_eq!(counter.record("a", Timestamp(2.0)), 2);
	}

	#[test]
	fn test_identifier_independence() {
		let mut counter = SlidingWindowCounter::new(60.0, 100);
		counter.record("a", Timestamp(0.0));
		counter.record("a", Timestamp(1.0));
		assert_eq!(counter.record("b", Timestamp(2.0)), 1);
		assert_eq!(counter.count("a", Timestamp(2.0)), 2);
	}

	#[test]
	fn test_count_does_not_mutate() {
		let mut counter = SlidingWindowCounter::new(5.0, 100);
		counter.record("a", Timestamp(0.0));
		// A count far in the future sees nothing but leaves history intact
		assert_eq!(counter.count("a", Timestamp(100.0)), 0);
		assert_eq!(counter.count("a", Timestamp(1.0)), 1);
	}

	#[test]
	fn test_forget() {
		let mut counter = SlidingWindowCounter::new(60.0, 100);
		counter.record("a", Timestamp(0.0));
		assert!(counter.forget("a"));
		assert!(!counter.forget("a"));
		assert_eq!(counter.count("a", Timestamp(0.0)), 0);
	}

	#[test]
	fn test_capacity_bound() {
		let mut counter = SlidingWindowCounter::new(60.0, 2);
		counter.record("a", Timestamp(0.0));
		counter.record("b", Timestamp(1.0));
		counter.record("c", Timestamp(2.0));
		// Least recently touched identifier was evicted
		assert_eq!(counter.len(), 2);
		assert_eq!(counter.count("a", Timestamp(2.0)), 0);
	}
}

// vim: ts=4
