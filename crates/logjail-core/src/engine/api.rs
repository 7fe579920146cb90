//! Engine Internal API
//!
//! Dispatch trait, transition event types, and statistics for the jail engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::prelude::*;

/// Kind of a ban state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BanEventKind {
	/// Identifier crossed the failure threshold and was blocked
	Ban,
	/// A previously issued block lapsed or was lifted
	Unban,
}

/// One entry of the append-only transition log.
///
/// Exactly one event is recorded per actual state transition; no-op checks
/// (repeated failures while banned, sweeps that find nothing stale) never
/// produce entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanEvent {
	/// Transition kind
	pub kind: BanEventKind,
	/// Identifier the transition applies to
	pub identifier: Box<str>,
	/// Logical time at which the transition happened
	pub at: Timestamp,
}

/// Outcome of processing a single line
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
	/// Identifiers newly banned by this call (usually 0 or 1)
	pub banned: Vec<Box<str>>,
	/// Identifiers unbanned by this call's expiry sweep
	pub unbanned: Vec<Box<str>>,
}

/// Aggregate outcome of processing a batch of lines at one logical time
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
	/// Identifiers newly banned while processing the batch
	pub banned: BTreeSet<Box<str>>,
	/// Identifiers unbanned while processing the batch
	pub unbanned: BTreeSet<Box<str>>,
}

/// Statistics about a jail's state
#[derive(Debug, Clone, Default, Serialize)]
pub struct JailStats {
	/// Number of identifiers with a non-empty failure window
	pub tracked_identifiers: usize,
	/// Ban records currently stored (expired-but-unswept records included)
	pub active_bans: usize,
	/// Total matched, non-ignored failures recorded
	pub total_failures: u64,
	/// Total bans issued
	pub total_bans_issued: u64,
	/// Total unbans (expiry sweeps and manual)
	pub total_unbans: u64,
	/// Lines skipped because identifier extraction faulted
	pub match_errors: u64,
}

/// External action dispatcher notified of ban/unban transitions.
///
/// Callbacks fire exactly once per transition, synchronously, before the
/// triggering engine call returns. The engine's state lock is released
/// before dispatch, so a callback may re-enter the jail's query API.
pub trait ActionDispatch: Send + Sync {
	/// An identifier crossed the failure threshold and must be blocked
	fn on_ban(&self, identifier: &str, at: Timestamp);

	/// A block on an identifier lapsed or was lifted
	fn on_unban(&self, identifier: &str, at: Timestamp);
}


// vim: ts=4
