//! Argument matchers
//!
//! Checked synchronously when a governed call is dispatched, so a mismatch
//! fails at the call site rather than at teardown.

use crate::constraint::Constraint;
use crate::error::Failure;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Expectation on one positional argument
#[derive(Clone)]
pub enum Arg {
    /// Compared by equality
    Equals(Value),

    /// Checked by a constraint
    Satisfies(Rc<dyn Constraint>),
}

impl Arg {
    /// Argument checked by a constraint
    #[must_use]
    pub fn satisfies(constraint: impl Constraint + 'static) -> Self {
        Self::Satisfies(Rc::new(constraint))
    }

    fn matches(&self, actual: &Value) -> bool {
        match self {
            Self::Equals(expected) => expected == actual,
            Self::Satisfies(constraint) => constraint.matches(actual),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Equals(expected) => expected.to_string(),
            Self::Satisfies(constraint) => constraint.describe(),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg({})", self.describe())
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Equals(value)
    }
}

macro_rules! impl_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Self::Equals(Value::from(value))
                }
            }
        )*
    };
}

impl_arg_from!(&str, String, bool, i32, i64, u32, u64, f64);

type ArgsCallback = Rc<dyn Fn(&[Value]) -> Result<(), Failure>>;

/// Expectation on the whole argument list of a call
#[derive(Clone)]
pub enum ArgsMatcher {
    /// Only zero-argument calls match
    NoArgs,

    /// Each expected position must match; extra trailing arguments are not checked
    Positional(Vec<Arg>),

    /// Callback receives the arguments and performs its own checks
    Inspect(ArgsCallback),
}

impl ArgsMatcher {
    /// Matcher accepting only zero-argument calls
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::NoArgs
    }

    /// Matcher delegating to a callback
    #[must_use]
    pub fn inspect(callback: impl Fn(&[Value]) -> Result<(), Failure> + 'static) -> Self {
        Self::Inspect(Rc::new(callback))
    }

    /// Number of positions this matcher expects, if positional
    #[must_use]
    pub fn expected_len(&self) -> Option<usize> {
        match self {
            Self::NoArgs => Some(0),
            Self::Positional(args) => Some(args.len()),
            Self::Inspect(_) => None,
        }
    }

    /// Check actual arguments of call `ordinal`
    ///
    /// # Errors
    /// Returns [`Failure::ArgumentMismatch`] or [`Failure::ArgumentRejected`]
    pub(crate) fn check(
        &self,
        target: &str,
        method: &str,
        ordinal: u32,
        actual: &[Value],
    ) -> Result<(), Failure> {
        let mismatch = |expected: String, actual: String| Failure::ArgumentMismatch {
            target: target.to_string(),
            method: method.to_string(),
            ordinal,
            expected,
            actual,
        };

        match self {
            Self::NoArgs if actual.is_empty() => Ok(()),
            Self::NoArgs => Err(mismatch("no arguments".to_string(), describe_args(actual))),
            Self::Positional(expected) => {
                for (position, arg) in expected.iter().enumerate() {
                    match actual.get(position) {
                        Some(value) if arg.matches(value) => {}
                        Some(value) => {
                            return Err(mismatch(
                                format!("argument {} {}", position + 1, arg.describe()),
                                value.to_string(),
                            ))
                        }
                        None => {
                            return Err(mismatch(
                                format!("argument {} {}", position + 1, arg.describe()),
                                format!("{} argument(s)", actual.len()),
                            ))
                        }
                    }
                }
                Ok(())
            }
            Self::Inspect(callback) => callback(actual).map_err(|failure| Failure::ArgumentRejected {
                target: target.to_string(),
                method: method.to_string(),
                ordinal,
                message: failure.to_string(),
            }),
        }
    }
}

fn describe_args(args: &[Value]) -> String {
    let parts: Vec<_> = args.iter().map(Value::to_string).collect();
    format!("({})", parts.join(", "))
}

impl fmt::Debug for ArgsMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoArgs => f.write_str("NoArgs"),
            Self::Positional(args) => f.debug_tuple("Positional").field(args).finish(),
            Self::Inspect(_) => f.write_str("Inspect(..)"),
        }
    }
}

impl From<()> for ArgsMatcher {
    fn from((): ()) -> Self {
        Self::none()
    }
}

impl<T: Into<Arg>> From<Vec<T>> for ArgsMatcher {
    fn from(args: Vec<T>) -> Self {
        Self::Positional(args.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Arg>, const N: usize> From<[T; N]> for ArgsMatcher {
    fn from(args: [T; N]) -> Self {
        Self::Positional(args.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{equal_to, greater_than};
    use serde_json::json;

    fn check(matcher: &ArgsMatcher, actual: &[Value]) -> Result<(), Failure> {
        matcher.check("Mailer", "send", 1, actual)
    }

    #[test]
    fn no_args_matches_empty_only() {
        let m = ArgsMatcher::from(());
        assert!(check(&m, &[]).is_ok());
        assert!(check(&m, &[json!(1)]).is_err());
    }

    #[test]
    fn positional_equality() {
        let m = ArgsMatcher::from(["a", "b"]);
        assert!(check(&m, &[json!("a"), json!("b")]).is_ok());

        let err = check(&m, &[json!("a"), json!("c")]).unwrap_err();
        assert!(matches!(err, Failure::ArgumentMismatch { ordinal: 1, .. }));
        assert!(err.to_string().contains("argument 2"));
    }

    #[test]
    fn positional_ignores_trailing_arguments() {
        let m = ArgsMatcher::from([1]);
        assert!(check(&m, &[json!(1), json!(false)]).is_ok());
    }

    #[test]
    fn positional_missing_argument_fails() {
        let m = ArgsMatcher::from(["a", "b"]);
        assert!(check(&m, &[json!("a")]).is_err());
    }

    #[test]
    fn positional_with_constraints() {
        let m = ArgsMatcher::from(vec![Arg::satisfies(equal_to("a")), Arg::satisfies(greater_than(1.0))]);
        assert!(check(&m, &[json!("a"), json!(2)]).is_ok());
        assert!(check(&m, &[json!("a"), json!(0)]).is_err());
    }

    #[test]
    fn inspect_callback_rejection() {
        let m = ArgsMatcher::inspect(|args| {
            if args.len() == 2 {
                Ok(())
            } else {
                Err(Failure::raised("two arguments please"))
            }
        });
        assert!(check(&m, &[json!(1), json!(2)]).is_ok());

        let err = check(&m, &[]).unwrap_err();
        assert!(matches!(err, Failure::ArgumentRejected { .. }));
        assert!(err.to_string().contains("two arguments please"));
    }

    #[test]
    fn expected_len() {
        assert_eq!(ArgsMatcher::none().expected_len(), Some(0));
        assert_eq!(ArgsMatcher::from(["a"]).expected_len(), Some(1));
        assert_eq!(ArgsMatcher::inspect(|_| Ok(())).expected_len(), None);
    }
}
