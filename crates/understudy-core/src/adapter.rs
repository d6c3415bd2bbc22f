//! Typed adapters
//!
//! [`intercept!`](crate::intercept) generates a struct that implements one of
//! your traits by forwarding every method to a [`Double`]. Arguments and
//! results cross the double as JSON values; any failure panics, which is how
//! a Rust test fails.
//!
//! ```rust,ignore
//! trait Mailer {
//!     fn send(&self, to: String, body: String) -> bool;
//!     fn flush(&self);
//! }
//!
//! understudy_core::intercept! {
//!     struct MailerDouble: Mailer {
//!         fn send(&self, to: String, body: String) -> bool;
//!         fn flush(&self);
//!     }
//! }
//!
//! let mailer = MailerDouble::new(session.mock::<MailerShape>().hollow()?);
//! mailer.double().method("send")?.count(1)?.stub(true)?;
//! assert!(mailer.send("ops".into(), "disk full".into()));
//! ```

use crate::double::Double;
use crate::error::Failure;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Serialize one argument for `method`
///
/// # Panics
/// If the argument cannot be represented as JSON
#[track_caller]
pub fn encode<A: Serialize + ?Sized>(double: &Double, method: &str, arg: &A) -> Value {
    serde_json::to_value(arg).unwrap_or_else(|err| {
        fail(&Failure::Conversion {
            target: double.target_name().to_string(),
            method: method.to_string(),
            message: format!("cannot encode argument: {err}"),
        })
    })
}

/// Dispatch `method` and decode its result
///
/// # Panics
/// On any failure raised by the call, or if the result does not decode into `R`
#[track_caller]
pub fn relay<R: DeserializeOwned>(double: &Double, method: &str, args: Vec<Value>) -> R {
    let value = double.call(method, args).unwrap_or_else(|failure| fail(&failure));
    serde_json::from_value(value).unwrap_or_else(|err| {
        fail(&Failure::Conversion {
            target: double.target_name().to_string(),
            method: method.to_string(),
            message: format!("cannot decode result: {err}"),
        })
    })
}

#[track_caller]
fn fail(failure: &Failure) -> ! {
    panic!("{failure}")
}

/// Generate a trait implementation that forwards to a [`Double`](crate::Double)
///
/// Each listed method must match the trait's signature; argument types must
/// implement `Serialize` and return types `DeserializeOwned`.
#[macro_export]
macro_rules! intercept {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $trait_:path {
            $(
                fn $method:ident(&self $(, $arg:ident: $ty:ty)*) $(-> $ret:ty)?;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name($crate::Double);

        impl $name {
            /// Wrap a double
            #[must_use]
            $vis fn new(double: $crate::Double) -> Self {
                Self(double)
            }

            /// Double receiving the calls
            #[must_use]
            $vis fn double(&self) -> &$crate::Double {
                &self.0
            }
        }

        impl $trait_ for $name {
            $(
                fn $method(&self $(, $arg: $ty)*) $(-> $ret)? {
                    let args: ::std::vec::Vec<$crate::Value> = ::std::vec![
                        $($crate::adapter::encode(&self.0, stringify!($method), &$arg)),*
                    ];
                    $crate::adapter::relay(&self.0, stringify!($method), args)
                }
            )*
        }
    };
}
