#![forbid(unsafe_code)]

//! Tour error model.
//!
//! Only one failure is surfaced by the tour: a step's `before` hook failing.
//! Everything else is a defined no-op:
//!
//! - an out-of-range `go_to`, or `next`/`previous` with no active step, is
//!   ignored (a `debug` trace is emitted);
//! - a measurement that returns `None` keeps the previous spot.
//!
//! Nothing is retried.

use std::fmt;

/// Error returned by a `before` hook.
pub type HookError = Box<dyn std::error::Error>;

/// Errors surfaced by tour transitions.
#[derive(Debug)]
pub enum TourError {
    /// The target step's `before` hook failed; the tour stayed where it was.
    BeforeHook { index: usize, source: HookError },
}

/// Standard result type for tour operations.
pub type Result<T> = std::result::Result<T, TourError>;

impl TourError {
    /// Index of the step whose transition failed.
    pub fn index(&self) -> usize {
        match self {
            Self::BeforeHook { index, .. } => *index,
        }
    }

    /// Error type label for tracing.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::BeforeHook { .. } => "before_hook",
        }
    }
}

impl fmt::Display for TourError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeHook { index, source } => {
                write!(f, "before hook of step {index} failed: {source}")
            }
        }
    }
}

impl std::error::Error for TourError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BeforeHook { source, .. } => Some(source.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_names_the_step() {
        let err = TourError::BeforeHook {
            index: 2,
            source: "network down".into(),
        };
        assert_eq!(err.to_string(), "before hook of step 2 failed: network down");
        assert_eq!(err.index(), 2);
        assert_eq!(err.error_type(), "before_hook");
    }

    #[test]
    fn source_is_the_hook_error() {
        let err = TourError::BeforeHook {
            index: 0,
            source: "nope".into(),
        };
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("nope"));
    }
}
