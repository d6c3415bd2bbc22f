//! Understudy Blueprints
//!
//! Describes the call surface of a target type and compiles it into a
//! [`Blueprint`]: the method table every double of that type dispatches
//! through.
//!
//! # Core Concepts
//!
//! - [`TypeShape`]: method signatures declared by a target type
//! - [`Blueprint`]: compiled slot table (intercepted, direct, control)
//! - [`BlueprintCache`]: process-wide cache, one blueprint per target type
//! - [`DoubleConfig`]: the configuration bag accepted when requesting a double
//! - [`DoubleSpec`]: blueprint + kind + configuration, fixed per double
//!
//! # Example
//!
//! ```rust,ignore
//! use understudy_blueprint::{Blueprint, DoubleConfig, MethodSignature, TypeShape};
//!
//! let shape = TypeShape::new("Mailer")
//!     .with_method(MethodSignature::public("send", 2))
//!     .with_method(MethodSignature::protected("connect", 0));
//!
//! let blueprint = Blueprint::compile(shape, &DoubleConfig::default())?;
//! assert!(blueprint.configurable("send").is_ok());
//! assert!(blueprint.configurable("connect").is_err());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod blueprint;
mod cache;
mod config;
mod error;
mod shape;

pub use blueprint::{Blueprint, Slot, CONTROL_METHOD};
pub use cache::BlueprintCache;
pub use config::{DoubleConfig, DoubleKind, DoubleSpec};
pub use error::BlueprintError;
pub use shape::{MethodSignature, ReturnKind, TypeShape, Visibility};

/// Dynamic argument and return value carried through a double
pub use serde_json::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
