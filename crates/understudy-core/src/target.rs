//! Target types and their real bodies
//!
//! A [`Target`] describes its call surface and knows how to run its own
//! methods by name. Doubles keep a genuine instance (or the type itself,
//! for type-level doubles) behind [`RealBody`] so pass-through actions can
//! reach the un-intercepted implementation.

use crate::error::Failure;
use serde_json::Value;
use std::marker::PhantomData;
use understudy_blueprint::{MethodSignature, TypeShape};

/// Type that can be doubled
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Greeter;
///
/// impl Target for Greeter {
///     fn shape() -> TypeShape {
///         TypeShape::new("Greeter").with_method(MethodSignature::public("greet", 1))
///     }
///
///     fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, Failure> {
///         match method {
///             "greet" => Ok(json!(format!("hello {}", args[0]))),
///             _ => Err(Failure::raised(format!("no method {method}"))),
///         }
///     }
/// }
/// ```
pub trait Target: 'static {
    /// Call surface of the type
    fn shape() -> TypeShape;

    /// Run an instance method on the genuine object
    ///
    /// # Errors
    /// Whatever the real method raises
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, Failure>;

    /// Run a type-level method
    ///
    /// # Errors
    /// Defaults to [`Failure::NoRealBody`]
    fn invoke_static(method: &str, args: &[Value]) -> Result<Value, Failure> {
        let _ = args;
        Err(Failure::no_real_body(Self::shape().name(), method))
    }
}

/// Real implementation reachable from a double
pub(crate) trait RealBody {
    /// Check if `signature` can be run for real
    fn has_body(&self, signature: &MethodSignature) -> bool;

    /// Run the method
    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, Failure>;
}

/// Genuine instance held by an instance double
pub(crate) struct Genuine<T>(pub(crate) T);

impl<T: Target> RealBody for Genuine<T> {
    fn has_body(&self, signature: &MethodSignature) -> bool {
        !signature.is_abstract()
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, Failure> {
        self.0.invoke(method, args)
    }
}

/// Type-level body of a class double
pub(crate) struct StaticBody<T>(PhantomData<T>);

impl<T> StaticBody<T> {
    pub(crate) fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Target> RealBody for StaticBody<T> {
    fn has_body(&self, signature: &MethodSignature) -> bool {
        signature.is_static() && !signature.is_abstract()
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, Failure> {
        T::invoke_static(method, args)
    }
}

/// No real body at all
pub(crate) struct Hollow;

impl RealBody for Hollow {
    fn has_body(&self, _signature: &MethodSignature) -> bool {
        false
    }

    fn invoke(&mut self, method: &str, _args: &[Value]) -> Result<Value, Failure> {
        Err(Failure::raised(format!("'{method}' has no real implementation")))
    }
}
