//! Jail Orchestrator
//!
//! Feeds lines through the pattern matcher, maintains the per-identifier
//! sliding windows and ban registry as a unit, and emits ban/unban
//! notifications. Every processing call first sweeps the registry for bans
//! that have expired as of the call's timestamp, so unban transitions
//! surface on the next call even when its line is unrelated.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::api::{
	ActionDispatch, BanEvent, BanEventKind, BatchOutcome, JailStats, ProcessOutcome,
};
use super::config::JailConfig;
use super::error::ConfigError;
use super::matcher::{MatchOutcome, PatternMatcher};
use super::registry::BanRegistry;
use super::window::SlidingWindowCounter;
use crate::prelude::*;

/// Longest prefix of an offending line that makes it into log output
const MAX_LOGGED_LINE: usize = 120;

/// Mutable jail state, guarded as a unit.
///
/// Windows and bans are mutated together and must never be observed
/// half-updated, hence the single lock around both.
struct JailState {
	windows: SlidingWindowCounter,
	bans: BanRegistry,
	events: Vec<BanEvent>,
}

/// One jail: an independent intrusion-decision engine instance.
///
/// The engine is synchronous and owns no clock: all time advancement comes
/// from the `now` argument of each call, which makes processing a pure,
/// replayable function of (state, input, timestamp). Distinct jails share
/// no state and may run fully in parallel.
pub struct Jail {
	config: JailConfig,
	matcher: PatternMatcher,
	state: Mutex<JailState>,
	dispatcher: RwLock<Option<Arc<dyn ActionDispatch>>>,
	total_failures: AtomicU64,
	total_bans: AtomicU64,
	total_unbans: AtomicU64,
	match_errors: AtomicU64,
}

impl Jail {
	/// Build a jail from its configuration.
	///
	/// All patterns are compiled here; any malformed pattern, capture-less
	/// failure pattern, `max_retry` of 0, or invalid findtime is rejected
	/// now rather than on first use.
	pub fn new(config: JailConfig) -> Result<Self, ConfigError> {
		if config.max_retry < 1 {
			return Err(ConfigError::InvalidMaxRetry { value: config.max_retry });
		}
		if !config.findtime_secs.is_finite() || config.findtime_secs < 0.0 {
			return Err(ConfigError::InvalidFindtime { value: config.findtime_secs });
		}

		let matcher = PatternMatcher::build(&config.failure_patterns, &config.ignore_patterns)?;
		let max_tracked = config.effective_max_tracked();

		Ok(Self {
			matcher,
			state: Mutex::new(JailState {
				windows: SlidingWindowCounter::new(config.findtime_secs, max_tracked),
				bans: BanRegistry::new(config.bantime, max_tracked),
				events: Vec::new(),
			}),
			dispatcher: RwLock::new(None),
			total_failures: AtomicU64::new(0),
			total_bans: AtomicU64::new(0),
			total_unbans: AtomicU64::new(0),
			match_errors: AtomicU64::new(0),
			config,
		})
	}

	/// Build a jail with an action dispatcher installed
	pub fn with_dispatcher(
		config: JailConfig,
		dispatcher: Arc<dyn ActionDispatch>,
	) -> Result<Self, ConfigError> {
		let jail = Self::new(config)?;
		*jail.dispatcher.write() = Some(dispatcher);
		Ok(jail)
	}

	/// Install or replace the action dispatcher
	pub fn set_dispatcher(&self, dispatcher: Arc<dyn ActionDispatch>) {
		*self.dispatcher.write() = Some(dispatcher);
	}

	/// This jail's immutable configuration
	pub fn config(&self) -> &JailConfig {
		&self.config
	}

	/// Process one log line at logical time `now`.
	///
	/// First sweeps expired bans (collecting unbans), then matches the line:
	/// on ignore or no-match nothing further happens; on a failure match the
	/// identifier's window is recorded and, if the in-window count reaches
	/// `max_retry`, a ban is issued. Never raises for arbitrary input.
	pub fn process_line(&self, line: &str, now: Timestamp) -> ProcessOutcome {
		let mut outcome = ProcessOutcome::default();
		let mut transitions = Vec::new();

		{
			let mut state = self.state.lock();
			outcome.unbanned = self.sweep_locked(&mut state, now, &mut transitions);

			match self.matcher.match_line(line) {
				MatchOutcome::Ignored | MatchOutcome::NoMatch => {}
				MatchOutcome::Faulted => {
					self.match_errors.fetch_add(1, Ordering::Relaxed);
					warn!(
						"[{}] pattern matched without an identifier, line skipped: {}",
						self.config.name,
						clip(line)
					);
				}
				MatchOutcome::Failure(identifier) => {
					self.total_failures.fetch_add(1, Ordering::Relaxed);
					let count = state.windows.record(&identifier, now);

					if count >= self.config.max_retry as usize {
						let result = state.bans.try_ban(&identifier, now);
						if result.newly_banned {
							debug!(
								"[{}] banned {} ({} failures in window)",
								self.config.name, identifier, count
							);
							self.total_bans.fetch_add(1, Ordering::Relaxed);
							state.events.push(BanEvent {
								kind: BanEventKind::Ban,
								identifier: identifier.clone(),
								at: now,
							});
							transitions.push((BanEventKind::Ban, identifier.clone()));
							outcome.banned.push(identifier);
						}
						if let Some(evicted) = result.evicted {
							warn!(
								"[{}] ban store at capacity, dropping oldest ban for {}",
								self.config.name, evicted
							);
							self.total_unbans.fetch_add(1, Ordering::Relaxed);
							state.events.push(BanEvent {
								kind: BanEventKind::Unban,
								identifier: evicted.clone(),
								at: now,
							});
							transitions.push((BanEventKind::Unban, evicted.clone()));
							outcome.unbanned.push(evicted);
						}
					}
				}
			}
		}

		self.dispatch(&transitions, now);
		outcome
	}

	/// Process a batch of lines, all arriving at the same logical time.
	///
	/// Newly banned and unbanned identifiers are aggregated into sets. A
	/// fault on one line never aborts processing of the rest.
	pub fn process_lines<I, S>(&self, lines: I, now: Timestamp) -> BatchOutcome
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut batch = BatchOutcome::default();
		for line in lines {
			let outcome = self.process_line(line.as_ref(), now);
			batch.banned.extend(outcome.banned);
			batch.unbanned.extend(outcome.unbanned);
		}
		batch
	}

	/// Sweep expired bans at `now` and return the surviving banned set
	pub fn get_banned(&self, now: Timestamp) -> BTreeSet<Box<str>> {
		let mut transitions = Vec::new();
		let banned = {
			let mut state = self.state.lock();
			self.sweep_locked(&mut state, now, &mut transitions);
			state.bans.banned_set(now)
		};
		self.dispatch(&transitions, now);
		banned
	}

	/// Whether `identifier` is banned as of `now`. Read-only: performs no
	/// sweep and emits nothing.
	pub fn is_banned(&self, identifier: &str, now: Timestamp) -> bool {
		self.state.lock().bans.is_banned(identifier, now)
	}

	/// Manually lift a ban. The failure window is left intact; a fresh
	/// failure afterward is evaluated against whatever entries remain.
	/// Returns whether a ban was actually removed.
	pub fn unban(&self, identifier: &str, now: Timestamp) -> bool {
		let mut transitions = Vec::new();
		let removed = {
			let mut state = self.state.lock();
			let removed = state.bans.unban(identifier);
			if removed {
				debug!("[{}] unbanned {} (manual)", self.config.name, identifier);
				self.total_unbans.fetch_add(1, Ordering::Relaxed);
				state.events.push(BanEvent {
					kind: BanEventKind::Unban,
					identifier: identifier.into(),
					at: now,
				});
				transitions.push((BanEventKind::Unban, identifier.into()));
			}
			removed
		};
		self.dispatch(&transitions, now);
		removed
	}

	/// Drop all state for one identifier: failure history and, if present,
	/// the ban (emitting the unban transition). Returns whether any state
	/// existed.
	pub fn reset(&self, identifier: &str, now: Timestamp) -> bool {
		let mut transitions = Vec::new();
		let existed = {
			let mut state = self.state.lock();
			let had_window = state.windows.forget(identifier);
			let had_ban = state.bans.unban(identifier);
			if had_ban {
				debug!("[{}] unbanned {} (reset)", self.config.name, identifier);
				self.total_unbans.fetch_add(1, Ordering::Relaxed);
				state.events.push(BanEvent {
					kind: BanEventKind::Unban,
					identifier: identifier.into(),
					at: now,
				});
				transitions.push((BanEventKind::Unban, identifier.into()));
			}
			had_window || had_ban
		};
		self.dispatch(&transitions, now);
		existed
	}

	/// Snapshot of the append-only transition log
	pub fn events(&self) -> Vec<BanEvent> {
		self.state.lock().events.clone()
	}

	/// Move the accumulated transition log out, preserving order
	pub fn drain_events(&self) -> Vec<BanEvent> {
		std::mem::take(&mut self.state.lock().events)
	}

	/// Current statistics
	pub fn stats(&self) -> JailStats {
		let state = self.state.lock();
		JailStats {
			tracked_identifiers: state.windows.len(),
			active_bans: state.bans.len(),
			total_failures: self.total_failures.load(Ordering::Relaxed),
			total_bans_issued: self.total_bans.load(Ordering::Relaxed),
			total_unbans: self.total_unbans.load(Ordering::Relaxed),
			match_errors: self.match_errors.load(Ordering::Relaxed),
		}
	}

	/// Run the expiry sweep under the state lock, recording one unban event
	/// per lapsed ban. Returns the unbanned identifiers in order.
	fn sweep_locked(
		&self,
		state: &mut JailState,
		now: Timestamp,
		transitions: &mut Vec<(BanEventKind, Box<str>)>,
	) -> Vec<Box<str>> {
		let unbanned = state.bans.sweep_expired(now);
		for identifier in &unbanned {
			debug!("[{}] unbanned {} (ban expired)", self.config.name, identifier);
			self.total_unbans.fetch_add(1, Ordering::Relaxed);
			state.events.push(BanEvent {
				kind: BanEventKind::Unban,
				identifier: identifier.clone(),
				at: now,
			});
			transitions.push((BanEventKind::Unban, identifier.clone()));
		}
		unbanned
	}

	/// Fire dispatcher callbacks for collected transitions. Called with the
	/// state lock released so a callback may re-enter the query API.
	fn dispatch(&self, transitions: &[(BanEventKind, Box<str>)], at: Timestamp) {
		if transitions.is_empty() {
			return;
		}
		let dispatcher = self.dispatcher.read().clone();
		let Some(dispatcher) = dispatcher else {
			return;
		};
		for (kind, identifier) in transitions {
			match kind {
				BanEventKind::Ban => dispatcher.on_ban(identifier, at),
				BanEventKind::Unban => dispatcher.on_unban(identifier, at),
			}
		}
	}
}

/// Clip a line to a loggable prefix on a char boundary
fn clip(line: &str) -> &str {
	match line.char_indices().nth(MAX_LOGGED_LINE) {
		Some((idx, _)) => &line[..idx],
		None => line,
	}
}


// vim: ts=4
