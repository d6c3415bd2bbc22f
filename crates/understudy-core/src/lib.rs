//! Understudy Core - runtime test doubles
//!
//! Programs stand-ins for a target type, routes every call on them through
//! a dispatcher, and verifies declared call counts when the test ends:
//! - Expectation store and fluent builder (`count`, `args`, `stub`, `dummy`, `mock`)
//! - Invocation dispatcher with per-method call ordinals
//! - Action executor (literal, callback, zero value, pass-through, canned replies)
//! - Verification engine collecting every mismatch of a session
//!
//! # Example
//!
//! ```rust,ignore
//! use understudy_core::prelude::*;
//! use serde_json::json;
//!
//! let session = Session::new();
//! let repo = session.mock::<UserRepo>().instance()?;
//!
//! repo.method("find")?
//!     .count(2)?
//!     .args_on([1], 1)?
//!     .stub_on(json!({"name": "ann"}), 1)?
//!     .stub_on(Value::Null, 2)?;
//!
//! assert_eq!(repo.call("find", [json!(1)])?, json!({"name": "ann"}));
//! assert_eq!(repo.call("find", [json!(2)])?, Value::Null);
//!
//! session.verify().assert_success();
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod adapter;
pub mod constraint;

mod action;
mod dispatch;
mod double;
mod error;
mod expectation;
mod invocation;
mod matcher;
mod report;
mod selector;
mod session;
mod target;
mod verify;

pub use action::{Action, Reply};
pub use constraint::Constraint;
pub use double::{Double, DoubleId, Scope};
pub use error::{ConfigError, Failure};
pub use expectation::{Expectation, ExpectationCollection};
pub use invocation::Call;
pub use matcher::{Arg, ArgsMatcher};
pub use report::{CollectingReporter, Reporter, TracingReporter};
pub use selector::{CallSelector, Comparator, CountExpectation, IntoCallSelector, IntoCountExpectation};
pub use session::{DoubleRequest, Session};
pub use target::Target;
pub use verify::VerificationReport;

pub use understudy_blueprint::{
    Blueprint, BlueprintCache, BlueprintError, DoubleConfig, DoubleKind, MethodSignature, ReturnKind,
    TypeShape, Value, Visibility, CONTROL_METHOD,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing tests with doubles
    pub use crate::constraint::{anything, equal_to, greater_than, is_type, less_than, not, predicate};
    pub use crate::{
        Arg, ArgsMatcher, CallSelector, ConfigError, CountExpectation, Double, DoubleConfig, DoubleKind,
        Failure, MethodSignature, Reply, ReturnKind, Session, Target, TypeShape, Value, VerificationReport,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
