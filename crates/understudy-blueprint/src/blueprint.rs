//! Blueprint compiler
//!
//! Turns a [`TypeShape`] into the slot table a double dispatches through.
//! Every intercepted slot forwards `(method, args)` to the dispatcher; direct
//! slots run the real body untouched; the control slot is reserved for the
//! double's own teardown hook.

use crate::config::DoubleConfig;
use crate::error::BlueprintError;
use crate::shape::{MethodSignature, TypeShape};
use indexmap::IndexMap;

/// Reserved name of the teardown control method present on every double
pub const CONTROL_METHOD: &str = "__understudy_close";

/// How a method call on a double is handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Forwarded to the dispatcher, recorded and configurable
    Intercepted(MethodSignature),

    /// Non-public method left to the real body
    Direct(MethodSignature),

    /// Internal teardown hook
    Control,
}

/// Compiled double type for one target shape
#[derive(Debug, Clone)]
pub struct Blueprint {
    target: String,
    allow_protected: bool,
    slots: IndexMap<String, Slot>,
}

impl Blueprint {
    /// Compile a shape under the given configuration
    ///
    /// # Errors
    /// - [`BlueprintError::DuplicateMethod`] if a method name appears twice
    /// - [`BlueprintError::ReservedMethod`] if the shape uses [`CONTROL_METHOD`]
    pub fn compile(shape: TypeShape, config: &DoubleConfig) -> Result<Self, BlueprintError> {
        let allow_protected = config.allow_protected_methods;
        let mut slots = IndexMap::with_capacity(shape.methods().len() + 1);

        for sig in shape.methods() {
            if sig.name() == CONTROL_METHOD {
                return Err(BlueprintError::ReservedMethod {
                    target: shape.name().to_string(),
                    method: CONTROL_METHOD.to_string(),
                });
            }
            if slots.contains_key(sig.name()) {
                return Err(BlueprintError::DuplicateMethod {
                    target: shape.name().to_string(),
                    method: sig.name().to_string(),
                });
            }

            let slot = if sig.visibility().is_public() || allow_protected {
                Slot::Intercepted(sig.clone())
            } else {
                Slot::Direct(sig.clone())
            };
            slots.insert(sig.name().to_string(), slot);
        }
        slots.insert(CONTROL_METHOD.to_string(), Slot::Control);

        tracing::debug!(
            target_type = shape.name(),
            methods = slots.len() - 1,
            allow_protected,
            "compiled blueprint"
        );

        Ok(Self {
            target: shape.name().to_string(),
            allow_protected,
            slots,
        })
    }

    /// Target type name
    #[inline]
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target
    }

    /// Whether non-public methods were compiled as intercepted
    #[inline]
    #[must_use]
    pub fn allows_protected(&self) -> bool {
        self.allow_protected
    }

    /// Look up the slot for a call
    #[inline]
    #[must_use]
    pub fn slot(&self, method: &str) -> Option<&Slot> {
        self.slots.get(method)
    }

    /// Check that a method may be configured, returning its signature
    ///
    /// # Errors
    /// - [`BlueprintError::ControlMethod`] for the internal control method
    /// - [`BlueprintError::UnknownMethod`] if the target has no such method
    /// - [`BlueprintError::ProtectedMethod`] for non-public methods when not allowed
    pub fn configurable(&self, method: &str) -> Result<&MethodSignature, BlueprintError> {
        match self.slots.get(method) {
            Some(Slot::Intercepted(sig)) => Ok(sig),
            Some(Slot::Direct(_)) => Err(BlueprintError::protected_method(&self.target, method)),
            Some(Slot::Control) => Err(BlueprintError::ControlMethod(method.to_string())),
            None => Err(BlueprintError::unknown_method(&self.target, method)),
        }
    }

    /// Intercepted signatures, in declaration order
    pub fn intercepted(&self) -> impl Iterator<Item = &MethodSignature> {
        self.slots.values().filter_map(|slot| match slot {
            Slot::Intercepted(sig) => Some(sig),
            _ => None,
        })
    }

    /// Number of target methods (control slot excluded)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - 1
    }

    /// Check if the target declares no methods
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
