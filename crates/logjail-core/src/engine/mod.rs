//! Intrusion-Decision Engine
//!
//! Stateful per-identifier sliding-window failure aggregation under an
//! externally driven logical clock, with idempotent ban/unban transitions and
//! pattern-based extraction of identifiers from unstructured log lines.

mod api;
mod config;
mod error;
mod jail;
mod matcher;
mod registry;
mod window;

pub use api::{
	ActionDispatch, BanEvent, BanEventKind, BatchOutcome, JailStats, ProcessOutcome,
};
pub use config::{BanTime, JailConfig};
pub use error::ConfigError;
pub use jail::Jail;
pub use matcher::{MatchOutcome, PatternMatcher};
pub use registry::{BanOutcome, BanRecord, BanRegistry};
pub use window::SlidingWindowCounter;

// vim: ts=4
