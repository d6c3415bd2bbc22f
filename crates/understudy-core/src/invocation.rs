//! Invocation history
//!
//! Every intercepted call is appended to the double's [`InvocationLog`]
//! before its binding is resolved. Ordinals are per method, start at 1
//! and are never reused: once a method has used up every ordinal, further
//! calls are refused rather than recorded.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One recorded call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    ordinal: u32,
    args: Vec<Value>,
}

impl Call {
    /// Create call record
    #[inline]
    #[must_use]
    pub fn new(ordinal: u32, args: Vec<Value>) -> Self {
        Self { ordinal, args }
    }

    /// 1-based position among calls to the same method
    #[inline]
    #[must_use]
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Positional arguments
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// Calls recorded per method
#[derive(Debug, Default)]
pub(crate) struct InvocationLog {
    calls: HashMap<String, Vec<Call>>,
}

impl InvocationLog {
    /// Append a call and return its ordinal, or `None` once the method has
    /// no ordinal left
    pub(crate) fn record(&mut self, method: &str, args: Vec<Value>) -> Option<u32> {
        let calls = self.calls.entry(method.to_string()).or_default();
        let ordinal = match calls.last() {
            Some(last) => last.ordinal().checked_add(1)?,
            None => 1,
        };
        calls.push(Call::new(ordinal, args));
        Some(ordinal)
    }

    /// Calls recorded for `method`
    pub(crate) fn calls(&self, method: &str) -> &[Call] {
        self.calls.get(method).map_or(&[], Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn seed(&mut self, method: &str, call: Call) {
        self.calls.entry(method.to_string()).or_default().push(call);
    }

    /// Number of calls recorded for `method`
    #[inline]
    pub(crate) fn count(&self, method: &str) -> usize {
        self.calls(method).len()
    }
}
