//! Failure reporting
//!
//! Every failure a double detects is handed to the session's [`Reporter`]:
//! dispatch-time failures as the call fails, verification failures when
//! the double is closed. They surface even when the code under test
//! swallows the error or the caller drops the verification report.

use crate::error::Failure;
use std::cell::RefCell;
use std::rc::Rc;

/// Sink for every failure a double detects, at dispatch or verification
pub trait Reporter {
    /// Record one failure
    fn report(&self, failure: &Failure);
}

/// Reporter emitting `tracing` error events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, failure: &Failure) {
        let phase = if failure.is_verification() {
            "verification"
        } else {
            "dispatch"
        };
        tracing::error!(phase, failure = %failure, "double failure");
    }
}

/// Reporter keeping every failure for later inspection
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    failures: Rc<RefCell<Vec<Failure>>>,
}

impl CollectingReporter {
    /// Create empty reporter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        self.failures.borrow().clone()
    }

    /// Number of failures reported so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.borrow().len()
    }

    /// Check if nothing was reported
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.borrow().is_empty()
    }

    /// Drain reported failures
    pub fn take(&self) -> Vec<Failure> {
        std::mem::take(&mut *self.failures.borrow_mut())
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, failure: &Failure) {
        self.failures.borrow_mut().push(failure.clone());
    }
}
