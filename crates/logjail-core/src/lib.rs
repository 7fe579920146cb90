//! Intrusion-decision engine for log-driven blocking.
//!
//! This crate decides when a remote identifier (typically a source address)
//! has exceeded a tolerable failure rate and must be blocked, and when that
//! block should lapse. It consumes (line, timestamp) pairs and emits ban and
//! unban decisions; firewall execution, log tailing, configuration parsing
//! and the control protocol are external collaborators.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod prelude;

// Re-export commonly used types
pub use engine::{
	ActionDispatch, BanEvent, BanEventKind, BanTime, BatchOutcome, ConfigError, Jail, JailConfig,
	JailStats, ProcessOutcome,
};

// vim: ts=4
