//! Error types for Understudy Core
//!
//! Two families, matching when a problem is detected:
//! - [`ConfigError`]: raised synchronously while a double is requested or configured
//! - [`Failure`]: test failures raised by a dispatched call or by verification

use understudy_blueprint::BlueprintError;

/// Invalid argument given while requesting or configuring a double
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Blueprint compilation or method check failed
    #[error(transparent)]
    Blueprint(#[from] BlueprintError),

    /// Count selector is neither an integer, a comparator string, a constraint nor a callback
    #[error("invalid count selector: {0}")]
    InvalidCount(String),

    /// Call index is zero, negative or an empty set
    #[error("invalid call index: {0}")]
    InvalidCallIndex(String),

    /// More expected arguments than the method declares
    #[error("'{method}' declares {arity} parameter(s) but {given} expected argument(s) were given")]
    TooManyArguments {
        /// Configured method
        method: String,
        /// Declared parameters
        arity: usize,
        /// Expected arguments supplied
        given: usize,
    },

    /// Pass-through requested for a method without a real body
    #[error("{target}::{method} has no real implementation to pass through to")]
    NoRealBody {
        /// Target type name
        target: String,
        /// Configured method
        method: String,
    },

    /// Method selection was empty
    #[error("no methods selected")]
    EmptySelection,

    /// Double was already torn down
    #[error("double of {0} is closed")]
    Closed(String),

    /// Type-level double already exists with another kind or configuration
    #[error("{target} already has a type-level double with a different kind or configuration")]
    ConflictingClass {
        /// Target type name
        target: String,
    },
}

impl ConfigError {
    /// Create invalid count error
    #[inline]
    #[must_use]
    pub fn invalid_count(message: impl Into<String>) -> Self {
        Self::InvalidCount(message.into())
    }

    /// Create invalid call index error
    #[inline]
    #[must_use]
    pub fn invalid_call_index(message: impl Into<String>) -> Self {
        Self::InvalidCallIndex(message.into())
    }
}

/// Test failure detected by a double
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    /// Positional argument did not match at dispatch time
    #[error("{target}::{method} call #{ordinal}: expected {expected}, got {actual}")]
    ArgumentMismatch {
        /// Target type name
        target: String,
        /// Called method
        method: String,
        /// Ordinal of the offending call
        ordinal: u32,
        /// Description of the expectation
        expected: String,
        /// Description of what was passed
        actual: String,
    },

    /// Argument callback rejected the call
    #[error("{target}::{method} call #{ordinal}: arguments rejected: {message}")]
    ArgumentRejected {
        /// Target type name
        target: String,
        /// Called method
        method: String,
        /// Ordinal of the offending call
        ordinal: u32,
        /// Message from the callback
        message: String,
    },

    /// Declared call count not met
    #[error("{target}::{method} expected to be called {expected} time(s), called {actual} time(s)")]
    CountMismatch {
        /// Target type name
        target: String,
        /// Configured method
        method: String,
        /// Description of the expected count
        expected: String,
        /// Recorded count
        actual: usize,
    },

    /// Count callback rejected the recorded calls
    #[error("{target}::{method} call count rejected: {message}")]
    CountRejected {
        /// Target type name
        target: String,
        /// Configured method
        method: String,
        /// Message from the callback
        message: String,
    },

    /// Public method called without any declared expectation
    #[error("unexpected call to {target}::{method} ({calls} call(s) without any declared expectation)")]
    UnexpectedCall {
        /// Target type name
        target: String,
        /// Called method
        method: String,
        /// Number of calls recorded
        calls: usize,
    },

    /// Method is not part of the target
    #[error("method '{method}' does not exist on {target}")]
    UnknownMethod {
        /// Target type name
        target: String,
        /// Called method
        method: String,
    },

    /// Pass-through reached a method without a real body
    #[error("{target}::{method} has no real implementation")]
    NoRealBody {
        /// Target type name
        target: String,
        /// Called method
        method: String,
    },

    /// Method has used up every call ordinal
    #[error("{target}::{method} cannot record more calls")]
    CallLimit {
        /// Target type name
        target: String,
        /// Called method
        method: String,
    },

    /// Double was already torn down
    #[error("double of {target} is closed, cannot call '{method}'")]
    Closed {
        /// Target type name
        target: String,
        /// Called method
        method: String,
    },

    /// Teardown of a single double found failures
    #[error("verification of {target} failed with {count} failure(s)", count = .failures.len())]
    Verification {
        /// Target type name
        target: String,
        /// Every failure found
        failures: Vec<Failure>,
    },

    /// Typed adapter could not convert a value
    #[error("{target}::{method}: {message}")]
    Conversion {
        /// Target type name
        target: String,
        /// Called method
        method: String,
        /// Conversion error
        message: String,
    },

    /// Error raised by a stub, callback or real body
    #[error("{0}")]
    Raised(String),
}

impl Failure {
    /// Create raised failure
    #[inline]
    #[must_use]
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised(message.into())
    }

    /// Create no-real-body failure
    #[inline]
    #[must_use]
    pub fn no_real_body(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self::NoRealBody {
            target: target.into(),
            method: method.into(),
        }
    }

    /// Check if this failure was found at verification time
    #[inline]
    #[must_use]
    pub fn is_verification(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. }
                | Self::CountRejected { .. }
                | Self::UnexpectedCall { .. }
                | Self::Verification { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_from_blueprint() {
        let err: ConfigError = BlueprintError::unknown_method("Mailer", "fly").into();
        assert_eq!(err.to_string(), "method 'fly' does not exist on Mailer");
    }

    #[test]
    fn argument_mismatch_display() {
        let failure = Failure::ArgumentMismatch {
            target: "Mailer".to_string(),
            method: "send".to_string(),
            ordinal: 2,
            expected: "\"a\"".to_string(),
            actual: "\"b\"".to_string(),
        };
        assert_eq!(failure.to_string(), "Mailer::send call #2: expected \"a\", got \"b\"");
    }

    #[test]
    fn verification_display_counts_failures() {
        let failure = Failure::Verification {
            target: "Mailer".to_string(),
            failures: vec![Failure::raised("a"), Failure::raised("b")],
        };
        assert!(failure.to_string().contains("2 failure(s)"));
        assert!(failure.is_verification());
    }

    #[test]
    fn raised_is_not_verification() {
        assert!(!Failure::raised("boom").is_verification());
    }
}
