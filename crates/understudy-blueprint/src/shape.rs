//! Target type shapes
//!
//! A [`TypeShape`] is the static description of a target type's call
//! surface: which methods exist, who may call them, how many parameters
//! they declare and what kind of value they return.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Method visibility on the target type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Callable by anyone
    #[default]
    Public,

    /// Callable by the type and its subtypes
    Protected,

    /// Callable by the type only
    Private,
}

impl Visibility {
    /// Check if visibility is public
    #[inline]
    #[must_use]
    pub fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Kind of value a method returns
///
/// Used to produce the zero value a dummy action yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// May return absence of value (the default)
    #[default]
    Nullable,

    /// Returns nothing
    Unit,

    /// Boolean
    Bool,

    /// Integer
    Int,

    /// Floating point
    Float,

    /// String
    Str,

    /// Ordered list
    List,

    /// Key/value map
    Map,
}

impl ReturnKind {
    /// Zero value for this kind
    #[must_use]
    pub fn zero(self) -> Value {
        match self {
            Self::Nullable | Self::Unit => Value::Null,
            Self::Bool => Value::Bool(false),
            Self::Int => Value::from(0),
            Self::Float => Value::from(0.0),
            Self::Str => Value::String(String::new()),
            Self::List => Value::Array(Vec::new()),
            Self::Map => Value::Object(serde_json::Map::new()),
        }
    }
}

/// Signature of one target method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    name: String,
    visibility: Visibility,
    arity: usize,
    returns: ReturnKind,
    is_static: bool,
    is_abstract: bool,
}

impl MethodSignature {
    /// Create signature with explicit visibility
    #[must_use]
    pub fn new(name: impl Into<String>, visibility: Visibility, arity: usize) -> Self {
        Self {
            name: name.into(),
            visibility,
            arity,
            returns: ReturnKind::default(),
            is_static: false,
            is_abstract: false,
        }
    }

    /// Public method declaring `arity` parameters
    #[inline]
    #[must_use]
    pub fn public(name: impl Into<String>, arity: usize) -> Self {
        Self::new(name, Visibility::Public, arity)
    }

    /// Protected method declaring `arity` parameters
    #[inline]
    #[must_use]
    pub fn protected(name: impl Into<String>, arity: usize) -> Self {
        Self::new(name, Visibility::Protected, arity)
    }

    /// Private method declaring `arity` parameters
    #[inline]
    #[must_use]
    pub fn private(name: impl Into<String>, arity: usize) -> Self {
        Self::new(name, Visibility::Private, arity)
    }

    /// Set return kind
    #[inline]
    #[must_use]
    pub fn returning(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    /// Mark as a type-level (static) method
    #[inline]
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as having no real implementation
    #[inline]
    #[must_use]
    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Method name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared visibility
    #[inline]
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Maximum number of declared parameters
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Return kind
    #[inline]
    #[must_use]
    pub fn returns(&self) -> ReturnKind {
        self.returns
    }

    /// Whether the method is type-level
    #[inline]
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the method lacks a real body
    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }
}

/// Call surface of a target type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeShape {
    name: String,
    methods: Vec<MethodSignature>,
}

impl TypeShape {
    /// Create shape with no methods
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    /// Add method signature
    #[must_use]
    pub fn with_method(mut self, signature: MethodSignature) -> Self {
        self.methods.push(signature);
        self
    }

    /// Target type name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared methods, in declaration order
    #[inline]
    #[must_use]
    pub fn methods(&self) -> &[MethodSignature] {
        &self.methods
    }
}
