//! Value constraints
//!
//! [`Constraint`] is the predicate contract accepted wherever an argument or
//! a call count may be checked by something other than plain equality.
//! Host frameworks can implement it for their own matcher objects; the
//! constructors below cover the common cases.

use serde_json::Value;
use std::fmt;

/// Predicate over a dynamic value
pub trait Constraint: fmt::Debug {
    /// Check if `actual` satisfies the constraint
    fn matches(&self, actual: &Value) -> bool;

    /// Human-readable description used in failure messages
    fn describe(&self) -> String;
}

/// Equal to a fixed value
#[derive(Debug, Clone, PartialEq)]
pub struct EqualTo(Value);

impl Constraint for EqualTo {
    fn matches(&self, actual: &Value) -> bool {
        *actual == self.0
    }

    fn describe(&self) -> String {
        format!("equal to {}", self.0)
    }
}

/// Negation of another constraint
#[derive(Debug)]
pub struct Not(Box<dyn Constraint>);

impl Constraint for Not {
    fn matches(&self, actual: &Value) -> bool {
        !self.0.matches(actual)
    }

    fn describe(&self) -> String {
        format!("not {}", self.0.describe())
    }
}

/// Matches every value
#[derive(Debug, Clone, Copy, Default)]
pub struct Anything;

impl Constraint for Anything {
    fn matches(&self, _actual: &Value) -> bool {
        true
    }

    fn describe(&self) -> String {
        "anything".to_string()
    }
}

/// Numeric bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    limit: f64,
    above: bool,
}

impl Constraint for Bound {
    fn matches(&self, actual: &Value) -> bool {
        match actual.as_f64() {
            Some(n) if self.above => n > self.limit,
            Some(n) => n < self.limit,
            None => false,
        }
    }

    fn describe(&self) -> String {
        let op = if self.above { "greater than" } else { "less than" };
        format!("{op} {}", self.limit)
    }
}

/// Matches values of one JSON type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsType(&'static str);

impl Constraint for IsType {
    fn matches(&self, actual: &Value) -> bool {
        type_name(actual) == self.0
    }

    fn describe(&self) -> String {
        format!("of type {}", self.0)
    }
}

/// Arbitrary predicate with a description
pub struct Predicate {
    description: String,
    check: Box<dyn Fn(&Value) -> bool>,
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Constraint for Predicate {
    fn matches(&self, actual: &Value) -> bool {
        (self.check)(actual)
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Value equal to `expected`
#[must_use]
pub fn equal_to(expected: impl Into<Value>) -> EqualTo {
    EqualTo(expected.into())
}

/// Value not satisfying `inner`
#[must_use]
pub fn not(inner: impl Constraint + 'static) -> Not {
    Not(Box::new(inner))
}

/// Any value
#[must_use]
pub fn anything() -> Anything {
    Anything
}

/// Number strictly greater than `limit`
#[must_use]
pub fn greater_than(limit: f64) -> Bound {
    Bound { limit, above: true }
}

/// Number strictly less than `limit`
#[must_use]
pub fn less_than(limit: f64) -> Bound {
    Bound { limit, above: false }
}

/// Value of JSON type `name` (`null`, `bool`, `number`, `string`, `array`, `object`)
#[must_use]
pub fn is_type(name: &'static str) -> IsType {
    IsType(name)
}

/// Custom predicate
#[must_use]
pub fn predicate(description: impl Into<String>, check: impl Fn(&Value) -> bool + 'static) -> Predicate {
    Predicate {
        description: description.into(),
        check: Box::new(check),
    }
}

/// JSON type name of a value
#[must_use]
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
