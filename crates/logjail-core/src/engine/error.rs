//! Engine Error Types
//!
//! Construction-time configuration errors. Line processing itself never
//! fails: pattern-evaluation faults on individual lines are diagnostics,
//! not errors (see `Jail`).

use logjail_types::error::Error;

/// Fatal misconfiguration detected at jail construction
#[derive(Debug)]
pub enum ConfigError {
	/// A pattern failed to compile
	InvalidPattern {
		/// The offending pattern source
		pattern: Box<str>,
		/// Compiler diagnostic
		reason: Box<str>,
	},
	/// A failure pattern has no `host` group and no capture group 1
	MissingIdentifierCapture {
		/// The offending pattern source
		pattern: Box<str>,
	},
	/// `max_retry` must be at least 1
	InvalidMaxRetry {
		/// The rejected value
		value: u32,
	},
	/// `findtime` must be finite and non-negative
	InvalidFindtime {
		/// The rejected value
		value: f64,
	},
	/// At least one failure pattern is required
	NoFailurePatterns,
}

impl std::fmt::Display for ConfigError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ConfigError::InvalidPattern { pattern, reason } => {
				write!(f, "Invalid pattern '{}': {}", pattern, reason)
			}
			ConfigError::MissingIdentifierCapture { pattern } => {
				write!(
					f,
					"Failure pattern '{}' lacks an identifier capture (named group 'host' or group 1)",
					pattern
				)
			}
			ConfigError::InvalidMaxRetry { value } => {
				write!(f, "max_retry must be >= 1, got {}", value)
			}
			ConfigError::InvalidFindtime { value } => {
				write!(f, "findtime must be finite and >= 0, got {}", value)
			}
			ConfigError::NoFailurePatterns => {
				write!(f, "At least one failure pattern is required")
			}
		}
	}
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
	fn from(err: ConfigError) -> Self {
		Error::Config(err.to_string().into())
	}
}

// vim: ts=4
