//! Shared error type for the logjail crates.

pub type LjResult<T> = std::result::Result<T, Error>;

/// Top-level error for engine consumers.
///
/// Construction-time misconfiguration is the only fatal failure mode of the
/// engine; runtime line processing never raises. Specific configuration
/// failures are reported by the engine crate and convert into `Config` here.
#[derive(Debug)]
pub enum Error {
	/// Invalid configuration supplied at construction
	Config(Box<str>),
	/// Internal invariant violation
	Internal(Box<str>),
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::Config(msg) => write!(f, "Configuration error: {}", msg),
			Error::Internal(msg) => write!(f, "Internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

// vim: ts=4
