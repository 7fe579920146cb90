//! Shared types and core utilities for the logjail intrusion-decision engine.
//!
//! This crate contains the foundational vocabulary shared between the engine
//! crate and future collaborator crates (log tailers, firewall actors, control
//! daemons). Keeping it separate lets those crates compile in parallel with
//! the engine and agree on timestamps and error handling without depending on
//! engine internals.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod error;
pub mod prelude;
pub mod types;

// vim: ts=4
