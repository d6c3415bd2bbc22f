//! Actions and the action executor
//!
//! An [`Action`] is what a resolved call does. The executor applies it to
//! the call's arguments and, for pass-through, to the double's real body.

use crate::error::Failure;
use crate::target::RealBody;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use understudy_blueprint::MethodSignature;

type ReplyCallback = Rc<dyn Fn(&[Value]) -> Result<Value, Failure>>;

/// Behavior executed when a call resolves
#[derive(Clone)]
pub enum Action {
    /// Return the value unchanged
    Literal(Value),

    /// Compute the return value from the arguments
    Callback(ReplyCallback),

    /// Return the method's zero value
    Dummy,

    /// Run the real implementation
    PassThrough,

    /// Return the argument at this 0-based position (`null` when absent)
    Argument(usize),

    /// Return the value paired with the first equal argument list
    ValueMap(Vec<(Vec<Value>, Value)>),

    /// Fail the call with a raised error
    Raise(String),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Dummy => f.write_str("Dummy"),
            Self::PassThrough => f.write_str("PassThrough"),
            Self::Argument(index) => f.debug_tuple("Argument").field(index).finish(),
            Self::ValueMap(map) => f.debug_tuple("ValueMap").field(map).finish(),
            Self::Raise(message) => f.debug_tuple("Raise").field(message).finish(),
        }
    }
}

/// Stubbed reply, convertible from plain values
///
/// ```rust,ignore
/// double.method("fetch")?.stub("cached")?;
/// double.method("sum")?.stub(Reply::callback(|args| Ok(json!(args.len()))))?;
/// double.method("echo")?.stub(Reply::argument(0))?;
/// ```
#[derive(Debug, Clone)]
pub struct Reply(Action);

impl Reply {
    /// Return a fixed value
    #[must_use]
    pub fn value(value: impl Into<Value>) -> Self {
        Self(Action::Literal(value.into()))
    }

    /// Compute the value from the call's arguments
    #[must_use]
    pub fn callback(callback: impl Fn(&[Value]) -> Result<Value, Failure> + 'static) -> Self {
        Self(Action::Callback(Rc::new(callback)))
    }

    /// Return the argument at `index` (0-based)
    #[must_use]
    pub fn argument(index: usize) -> Self {
        Self(Action::Argument(index))
    }

    /// Return values keyed by argument lists
    #[must_use]
    pub fn value_map(entries: impl IntoIterator<Item = (Vec<Value>, Value)>) -> Self {
        Self(Action::ValueMap(entries.into_iter().collect()))
    }

    /// Fail every governed call with `message`
    #[must_use]
    pub fn raise(message: impl Into<String>) -> Self {
        Self(Action::Raise(message.into()))
    }

    pub(crate) fn into_action(self) -> Action {
        self.0
    }
}

macro_rules! impl_reply_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Reply {
                fn from(value: $ty) -> Self {
                    Self::value(value)
                }
            }
        )*
    };
}

impl_reply_from!(Value, &str, String, bool, i32, i64, u32, u64, f64);

/// Execute a resolved action for one call
pub(crate) fn execute(
    action: &Action,
    target: &str,
    signature: &MethodSignature,
    args: &[Value],
    body: &RefCell<Box<dyn RealBody>>,
) -> Result<Value, Failure> {
    match action {
        Action::Literal(value) => Ok(value.clone()),
        Action::Callback(callback) => callback(args),
        Action::Dummy => Ok(signature.returns().zero()),
        Action::PassThrough => pass_through(target, signature, args, body),
        Action::Argument(index) => Ok(args.get(*index).cloned().unwrap_or(Value::Null)),
        Action::ValueMap(entries) => Ok(entries
            .iter()
            .find(|(key, _)| key.as_slice() == args)
            .map_or_else(|| signature.returns().zero(), |(_, value)| value.clone())),
        Action::Raise(message) => Err(Failure::raised(message.clone())),
    }
}

/// Run the real implementation, if there is one
pub(crate) fn pass_through(
    target: &str,
    signature: &MethodSignature,
    args: &[Value],
    body: &RefCell<Box<dyn RealBody>>,
) -> Result<Value, Failure> {
    let mut body = body.try_borrow_mut().map_err(|_| {
        Failure::raised(format!(
            "{target}::{} re-entered the real implementation",
            signature.name()
        ))
    })?;
    if !body.has_body(signature) {
        return Err(Failure::no_real_body(target, signature.name()));
    }
    body.invoke(signature.name(), args)
}
