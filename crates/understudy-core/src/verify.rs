//! Verification engine
//!
//! Runs once per double at teardown. Every count binding is checked against
//! the calls its selector governs, and on strict mocks every public method
//! called without ever being declared is listed. All failures are gathered;
//! verification never stops at the first one. Reporting them is left to
//! the double's close path.

use crate::double::DoubleCore;
use crate::error::Failure;
use crate::invocation::Call;
use crate::selector::{CallSelector, CountExpectation, CountOutcome};
use std::fmt;
use understudy_blueprint::DoubleKind;

/// Collect every verification failure of one double
pub(crate) fn verify_double(core: &DoubleCore) -> Vec<Failure> {
    let blueprint = core.spec.blueprint();
    let strict = core.spec.kind() == DoubleKind::StrictMock;

    // Snapshot first; count callbacks may call back into the double.
    let mut checks: Vec<(String, CallSelector, CountExpectation, Vec<Call>)> = Vec::new();
    let mut unexpected = Vec::new();
    {
        let table = core.table.borrow();
        let log = core.log.borrow();
        for signature in blueprint.intercepted() {
            let method = signature.name();
            let calls = log.calls(method);

            if !table.is_declared(method) {
                if strict && signature.visibility().is_public() && !calls.is_empty() {
                    unexpected.push(Failure::UnexpectedCall {
                        target: core.target_name().to_string(),
                        method: method.to_string(),
                        calls: calls.len(),
                    });
                }
                continue;
            }

            for binding in table.bindings(method) {
                if let Some(count) = &binding.count {
                    let governed = calls
                        .iter()
                        .filter(|call| binding.selector.governs(call.ordinal()))
                        .cloned()
                        .collect();
                    checks.push((method.to_string(), binding.selector.clone(), count.clone(), governed));
                }
            }
        }
    }

    let mut failures = Vec::new();
    for (method, selector, count, governed) in checks {
        match count.check(&governed) {
            CountOutcome::Pass => {}
            CountOutcome::Mismatch => failures.push(Failure::CountMismatch {
                target: core.target_name().to_string(),
                method,
                expected: describe(&count, &selector),
                actual: governed.len(),
            }),
            CountOutcome::Rejected(message) => failures.push(Failure::CountRejected {
                target: core.target_name().to_string(),
                method,
                message,
            }),
        }
    }
    failures.extend(unexpected);

    if failures.is_empty() {
        tracing::info!(double = %core.id, target_type = core.target_name(), "double verified");
    } else {
        tracing::warn!(
            double = %core.id,
            target_type = core.target_name(),
            failures = failures.len(),
            "double failed verification"
        );
    }
    failures
}

fn describe(count: &CountExpectation, selector: &CallSelector) -> String {
    match selector {
        CallSelector::All => count.describe(),
        _ => format!("{} among {selector}", count.describe()),
    }
}

/// Outcome of verifying one or more doubles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationReport {
    failures: Vec<Failure>,
}

impl VerificationReport {
    /// Create report from collected failures
    #[inline]
    #[must_use]
    pub fn new(failures: Vec<Failure>) -> Self {
        Self { failures }
    }

    /// Check if nothing failed
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every failure, in double creation order
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Number of failures
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Check if the report lists no failures
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Append another report's failures
    pub fn extend(&mut self, other: Self) {
        self.failures.extend(other.failures);
    }

    /// Convert into `Ok(())` or the report itself
    ///
    /// # Errors
    /// Returns the report when any failure was found
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Panic listing every failure, if any
    ///
    /// # Panics
    /// When the report is not a success
    #[track_caller]
    pub fn assert_success(&self) {
        assert!(self.is_success(), "{self}");
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            return f.write_str("all expectations met");
        }
        write!(f, "{} expectation failure(s):", self.failures.len())?;
        for (n, failure) in self.failures.iter().enumerate() {
            write!(f, "\n  {}. {failure}", n + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for VerificationReport {}

impl From<Vec<Failure>> for VerificationReport {
    fn from(failures: Vec<Failure>) -> Self {
        Self::new(failures)
    }
}
