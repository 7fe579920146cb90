//! Ban Registry
//!
//! Per-identifier ban state with lazy expiry sweeping. No background timer
//! exists: state is reconciled against the most recent `now` handed in by
//! the caller, so a long quiet period followed by one unrelated line still
//! surfaces pending unbans promptly.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use lru::LruCache;

use super::config::BanTime;
use crate::prelude::*;

/// State held for one banned identifier
#[derive(Debug, Clone)]
pub struct BanRecord {
	/// When the ban was issued
	pub banned_at: Timestamp,
}

/// Result of a ban attempt
#[derive(Debug, Clone, Default)]
pub struct BanOutcome {
	/// True iff this call newly banned the identifier
	pub newly_banned: bool,
	/// Identifier whose record was evicted by the capacity bound to make
	/// room; the caller must emit its unban transition
	pub evicted: Option<Box<str>>,
}

/// Keyed ban store for one jail.
///
/// A record exists only while the identifier is banned. With a finite
/// bantime, identifier `id` is expired at `now` iff
/// `now - banned_at > bantime`; equality still counts as banned. With
/// `BanTime::Permanent` only a manual unban removes the record.
#[derive(Debug)]
pub struct BanRegistry {
	bantime: BanTime,
	bans: LruCache<Box<str>, BanRecord>,
}

impl BanRegistry {
	/// Create a registry with the given ban duration and capacity bound
	pub fn new(bantime: BanTime, max_tracked: usize) -> Self {
		let cap = NonZeroUsize::new(max_tracked).unwrap_or(NonZeroUsize::MIN);

		Self { bantime, bans: LruCache::new(cap) }
	}

	/// Ban `identifier` as of `now`. `newly_banned` is true iff this call
	/// newly banned it; an already-banned identifier is a no-op and never
	/// has its `banned_at` refreshed. Inserting into a full store evicts
	/// the least recently touched record, which is surfaced in `evicted`
	/// so the caller can emit its unban transition rather than letting an
	/// active ban vanish silently.
	pub fn try_ban(&mut self, identifier: &str, now: Timestamp) -> BanOutcome {
		if self.bans.contains(identifier) {
			return BanOutcome::default();
		}
		let evicted = self
			.bans
			.push(identifier.into(), BanRecord { banned_at: now })
			.map(|(id, _)| id);
		BanOutcome { newly_banned: true, evicted }
	}

	/// Remove every ban that has expired as of `now` and return the
	/// affected identifiers in lexicographic order.
	pub fn sweep_expired(&mut self, now: Timestamp) -> Vec<Box<str>> {
		let mut expired: Vec<Box<str>> = self
			.bans
			.iter()
			.filter(|(_, record)| self.is_expired(record, now))
			.map(|(id, _)| id.clone())
			.collect();
		expired.sort_unstable();

		for id in &expired {
			self.bans.pop(id.as_ref());
		}

		expired
	}

	/// Whether `identifier` is banned as of `now`. Read-only: never sweeps.
	pub fn is_banned(&self, identifier: &str, now: Timestamp) -> bool {
		self.bans
			.peek(identifier)
			.is_some_and(|record| !self.is_expired(record, now))
	}

	/// Sweep at `now`, then return the surviving banned set
	pub fn banned_set(&mut self, now: Timestamp) -> BTreeSet<Box<str>> {
		self.sweep_expired(now);
		self.bans.iter().map(|(id, _)| id.clone()).collect()
	}

	/// Read-only access to one identifier's ban record
	pub fn ban_record(&self, identifier: &str) -> Option<BanRecord> {
		self.bans.peek(identifier).cloned()
	}

	/// Manually lift a ban. Returns whether a record was removed.
	pub fn unban(&mut self, identifier: &str) -> bool {
		self.bans.pop(identifier).is_some()
	}

	/// Number of ban records currently stored (expired-but-unswept included)
	pub fn len(&self) -> usize {
		self.bans.len()
	}

	/// Whether no ban record is stored
	pub fn is_empty(&self) -> bool {
		self.bans.is_empty()
	}

	fn is_expired(&self, record: &BanRecord, now: Timestamp) -> bool {
		match self.bantime {
			BanTime::Permanent => false,
			BanTime::Finite(secs) => now.secs_since(record.banned_at) > secs,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_try_ban_is_idempotent() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		assert!(registry.try_ban("1.2.3.4", Timestamp(0.0)).newly_banned);
		assert!(!registry.try_ban("1.2.3.4", Timestamp(1.0)).newly_banned);
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_capacity_eviction_is_surfaced() {
		let mut registry = BanRegistry::new(BanTime::Permanent, 2);
		assert!(registry.try_ban("1.1.1.1", Timestamp(0.0)).evicted.is_none());
		assert!(registry.try_ban("2.2.2.2", Timestamp(1.0)).evicted.is_none());

		let outcome = registry.try_ban("3.3.3.3", Timestamp(2.0));
		assert!(outcome.newly_banned);
		assert_eq!(outcome.evicted.as_deref(), Some("1.1.1.1"));
		assert!(!registry.is_banned("1.1.1.1", Timestamp(2.0)));
		assert!(registry.is_banned("2.2.2.2", Timestamp(2.0)));
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn test_try_ban_never_refreshes_banned_at() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("1.2.3.4", Timestamp(0.0));
		registry.try_ban("1.2.3.4", Timestamp(5.0));
		// Had the second call refreshed banned_at, this would still be banned
		assert!(!registry.is_banned("1.2.3.4", Timestamp(10.5)));
	}

	#[test]
	fn test_expiry_is_strict() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("1.2.3.4", Timestamp(2.0));
		assert!(registry.is_banned("1.2.3.4", Timestamp(11.9)));
		// Equality still counts as banned
		assert!(registry.is_banned("1.2.3.4", Timestamp(12.0)));
		assert!(!registry.is_banned("1.2.3.4", Timestamp(12.1)));
	}

	#[test]
	fn test_permanent_ban_never_expires() {
		let mut registry = BanRegistry::new(BanTime::Permanent, 100);
		registry.try_ban("1.2.3.4", Timestamp(0.0));
		assert!(registry.is_banned("1.2.3.4", Timestamp(1.0e9)));
		assert!(registry.sweep_expired(Timestamp(1.0e9)).is_empty());
	}

	#[test]
	fn test_sweep_removes_expired_in_lexicographic_order() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("b.b.b.b", Timestamp(0.0));
		registry.try_ban("a.a.a.a", Timestamp(0.0));
		registry.try_ban("c.c.c.c", Timestamp(8.0));

		let unbanned = registry.sweep_expired(Timestamp(11.0));
		assert_eq!(unbanned, vec![Box::from("a.a.a.a"), Box::from("b.b.b.b")]);
		assert!(registry.is_banned("c.c.c.c", Timestamp(11.0)));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_sweep_is_empty_when_nothing_expired() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("1.2.3.4", Timestamp(0.0));
		assert!(registry.sweep_expired(Timestamp(5.0)).is_empty());
	}

	#[test]
	fn test_banned_set_sweeps_first() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("old", Timestamp(0.0));
		registry.try_ban("new", Timestamp(20.0));
		let set = registry.banned_set(Timestamp(25.0));
		assert_eq!(set.len(), 1);
		assert!(set.contains("new"));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_ban_record_exposes_banned_at() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("1.2.3.4", Timestamp(3.5));
		let record = registry.ban_record("1.2.3.4").unwrap();
		assert_eq!(record.banned_at, Timestamp(3.5));
		assert!(registry.ban_record("5.6.7.8").is_none());
	}

	#[test]
	fn test_manual_unban() {
		let mut registry = BanRegistry::new(BanTime::Permanent, 100);
		registry.try_ban("1.2.3.4", Timestamp(0.0));
		assert!(registry.unban("1.2.3.4"));
		assert!(!registry.unban("1.2.3.4"));
		assert!(!registry.is_banned("1.2.3.4", Timestamp(0.0)));
	}

	#[test]
	fn test_rebanned_after_expiry_gets_fresh_record() {
		let mut registry = BanRegistry::new(BanTime::Finite(10.0), 100);
		registry.try_ban("1.2.3.4", Timestamp(0.0));
		registry.sweep_expired(Timestamp(20.0));
		assert!(registry.try_ban("1.2.3.4", Timestamp(20.0)).newly_banned);
		assert!(registry.is_banned("1.2.3.4", Timestamp(30.0)));
	}
}

// vim: ts=4
