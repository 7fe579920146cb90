//! Pattern Matcher
//!
//! Tests a line against ordered ignore and failure patterns and extracts the
//! identifier (typically a source address) on a failure match. Ignore
//! patterns always win over failure patterns. Patterns are compiled once at
//! jail construction; a malformed pattern is rejected there, never at match
//! time.

use regex::Regex;

use super::error::ConfigError;

/// Where a failure pattern's identifier comes from
#[derive(Debug, Clone, Copy)]
enum IdentifierCapture {
	/// Named capture group `host` (the preferred convention)
	Host,
	/// Positional capture group 1
	First,
}

/// One compiled failure pattern with its identifier capture point
#[derive(Debug)]
struct FailurePattern {
	regex: Regex,
	capture: IdentifierCapture,
}

impl FailurePattern {
	fn compile(pattern: &str) -> Result<Self, ConfigError> {
		let regex = compile(pattern)?;

		let capture = if regex.capture_names().flatten().any(|name| name == "host") {
			IdentifierCapture::Host
		} else if regex.captures_len() > 1 {
			IdentifierCapture::First
		} else {
			return Err(ConfigError::MissingIdentifierCapture { pattern: pattern.into() });
		};

		Ok(Self { regex, capture })
	}

	/// Extract the identifier if this pattern matches the line.
	///
	/// `Ok(None)` means no syntactic match; `Err(())` means the pattern
	/// matched but produced no usable identifier (empty or absent capture).
	fn extract(&self, line: &str) -> Result<Option<Box<str>>, ()> {
		let Some(caps) = self.regex.captures(line) else {
			return Ok(None);
		};

		let matched = match self.capture {
			IdentifierCapture::Host => caps.name("host"),
			IdentifierCapture::First => caps.get(1),
		};

		match matched {
			Some(m) if !m.as_str().is_empty() => Ok(Some(m.as_str().into())),
			_ => Err(()),
		}
	}
}

/// Result of testing one line against a jail's pattern set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
	/// An ignore pattern matched; the line is a non-event
	Ignored,
	/// No pattern matched
	NoMatch,
	/// A failure pattern matched and produced this identifier
	Failure(Box<str>),
	/// A failure pattern matched syntactically but yielded no identifier;
	/// the line is skipped and the fault surfaces as a diagnostic
	Faulted,
}

/// Compiled, ordered pattern set for one jail.
///
/// Evaluation is a flat top-to-bottom scan: all ignore patterns first
/// (short-circuiting), then failure patterns until one produces an
/// identifier. Identical line and pattern set always produce the identical
/// result.
#[derive(Debug)]
pub struct PatternMatcher {
	ignore: Vec<Regex>,
	failure: Vec<FailurePattern>,
}

impl PatternMatcher {
	/// Compile ordered failure and ignore pattern lists.
	///
	/// Every failure pattern must carry an identifier capture: a named group
	/// `host` or, failing that, capture group 1. Ignore patterns are pure
	/// predicates and need no groups.
	pub fn build(
		failure_patterns: &[Box<str>],
		ignore_patterns: &[Box<str>],
	) -> Result<Self, ConfigError> {
		if failure_patterns.is_empty() {
			return Err(ConfigError::NoFailurePatterns);
		}

		let ignore =
			ignore_patterns.iter().map(|p| compile(p)).collect::<Result<Vec<_>, _>>()?;
		let failure = failure_patterns
			.iter()
			.map(|p| FailurePattern::compile(p))
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self { ignore, failure })
	}

	/// Test a line against the pattern set
	pub fn match_line(&self, line: &str) -> MatchOutcome {
		// Ignore always wins, regardless of failure patterns
		if self.ignore.iter().any(|re| re.is_match(line)) {
			return MatchOutcome::Ignored;
		}

		let mut faulted = false;
		for pattern in &self.failure {
			match pattern.extract(line) {
				Ok(Some(identifier)) => return MatchOutcome::Failure(identifier),
				Ok(None) => {}
				Err(()) => faulted = true,
			}
		}

		if faulted {
			MatchOutcome::Faulted
		} else {
			MatchOutcome::NoMatch
		}
	}
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
	Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
		pattern: pattern.into(),
		reason: e.to_string().into(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matcher(failure: &[&str], ignore: &[&str]) -> PatternMatcher {
		let failure: Vec<Box<str>> = failure.iter().map(|p| (*p).into()).collect();
		let ignore: Vec<Box<str>> = ignore.iter().map(|p| (*p).into()).collect();
		PatternMatcher::build(&failure, &ignore).unwrap()
	}

	#[test]
	fn test_failure_match_extracts_first_group() {
		let m = matcher(&[r"Failed password .* from (\S+)"], &[]);
		let outcome = m.match_line("Failed password for root from 1.2.3.4 port 22");
		assert_eq!(outcome, MatchOutcome::Failure("1.2.3.4".into()));
	}

	#[test]
	fn test_failure_match_prefers_host_group() {
		let m = matcher(&[r"from (?<user>\S+)@(?<host>\S+)"], &[]);
		let outcome = m.match_line("auth failure from root@10.0.0.7");
		assert_eq!(outcome, MatchOutcome::Failure("10.0.0.7".into()));
	}

	#[test]
	fn test_no_match() {
		let m = matcher(&[r"Failed password from (\S+)"], &[]);
		assert_eq!(m.match_line("Accepted password from 1.2.3.4"), MatchOutcome::NoMatch);
	}

	#[test]
	fn test_ignore_wins_over_failure() {
		let m = matcher(&[r"Failed password from (\S+)"], &[r"from 192\.168\."]);
		let outcome = m.match_line("Failed password from 192.168.1.10");
		assert_eq!(outcome, MatchOutcome::Ignored);
	}

	#[test]
	fn test_failure_patterns_tried_in_order() {
		let m = matcher(&[r"login error: (\S+)", r"error: \S+ (\S+)"], &[]);
		// Both patterns match; the first wins
		assert_eq!(
			m.match_line("login error: 5.6.7.8 extra"),
			MatchOutcome::Failure("5.6.7.8".into())
		);
		// Only the second matches
		assert_eq!(
			m.match_line("fatal error: x 9.9.9.9"),
			MatchOutcome::Failure("9.9.9.9".into())
		);
	}

	#[test]
	fn test_match_without_subject_faults() {
		// Optional capture: the pattern can match without producing a subject
		let m = matcher(&[r"Failed login(?: from (\S+))?"], &[]);
		assert_eq!(m.match_line("Failed login"), MatchOutcome::Faulted);
		assert_eq!(
			m.match_line("Failed login from 1.2.3.4"),
			MatchOutcome::Failure("1.2.3.4".into())
		);
	}

	#[test]
	fn test_later_pattern_recovers_from_faulting_one() {
		let m = matcher(&[r"Failed login( from \z)?", r"Failed login from (\S+)"], &[]);
		assert_eq!(
			m.match_line("Failed login from 1.2.3.4"),
			MatchOutcome::Failure("1.2.3.4".into())
		);
	}

	#[test]
	fn test_malformed_pattern_rejected_at_build() {
		let failure: Vec<Box<str>> = vec![r"unclosed (group".into()];
		let err = PatternMatcher::build(&failure, &[]).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidPattern { .. }));
	}

	#[test]
	fn test_captureless_failure_pattern_rejected() {
		let failure: Vec<Box<str>> = vec![r"Failed password".into()];
		let err = PatternMatcher::build(&failure, &[]).unwrap_err();
		assert!(matches!(err, ConfigError::MissingIdentifierCapture { .. }));
	}

	#[test]
	fn test_empty_failure_list_rejected() {
		let err = PatternMatcher::build(&[], &[]).unwrap_err();
		assert!(matches!(err, ConfigError::NoFailurePatterns));
	}

	#[test]
	fn test_deterministic() {
		let m = matcher(&[r"Failed password from (\S+)"], &[]);
		let line = "Failed password from 1.2.3.4";
		assert_eq!(m.match_line(line), m.match_line(line));
	}
}

// vim: ts=4
