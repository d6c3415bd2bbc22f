//! Error types for blueprint compilation and configuration

/// Errors raised while compiling a blueprint or checking a method for configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlueprintError {
    /// Method is not declared on the target type
    #[error("method '{method}' does not exist on {target}")]
    UnknownMethod {
        /// Target type name
        target: String,
        /// Requested method
        method: String,
    },

    /// Method is non-public and protected methods are not allowed
    #[error("method '{method}' of {target} is not public (set allow_protected_methods to configure it)")]
    ProtectedMethod {
        /// Target type name
        target: String,
        /// Requested method
        method: String,
    },

    /// Internal control method can never be configured
    #[error("'{0}' is an internal control method and cannot be configured")]
    ControlMethod(String),

    /// Target declares the same method twice
    #[error("method '{method}' is declared twice on {target}")]
    DuplicateMethod {
        /// Target type name
        target: String,
        /// Duplicated method
        method: String,
    },

    /// Target declares a method with the reserved control name
    #[error("{target} declares reserved method name '{method}'")]
    ReservedMethod {
        /// Target type name
        target: String,
        /// Reserved name
        method: String,
    },

    /// Configuration bag rejected
    #[error("invalid double configuration: {0}")]
    InvalidConfig(String),
}

impl BlueprintError {
    /// Create unknown method error
    #[inline]
    #[must_use]
    pub fn unknown_method(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            target: target.into(),
            method: method.into(),
        }
    }

    /// Create protected method error
    #[inline]
    #[must_use]
    pub fn protected_method(target: impl Into<String>, method: impl Into<String>) -> Self {
        Self::ProtectedMethod {
            target: target.into(),
            method: method.into(),
        }
    }
}
