//! Double configuration
//!
//! [`DoubleConfig`] is the configuration bag accepted when a double is
//! requested. [`DoubleKind`] and [`DoubleSpec`] are fixed when the double is
//! created and never change afterwards.

use crate::blueprint::Blueprint;
use crate::error::BlueprintError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Options recognized when requesting a double
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoubleConfig {
    /// Permit configuring (and intercepting) non-public methods
    pub allow_protected_methods: bool,
    /// Treat calls to never-configured public methods as failures
    pub test_unexpected_methods: bool,
}

impl DoubleConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With protected method configuration allowed or not
    #[inline]
    #[must_use]
    pub fn with_allow_protected_methods(mut self, allow: bool) -> Self {
        self.allow_protected_methods = allow;
        self
    }

    /// With unexpected method detection on or off
    #[inline]
    #[must_use]
    pub fn with_test_unexpected_methods(mut self, test: bool) -> Self {
        self.test_unexpected_methods = test;
        self
    }

    /// Parse a configuration bag
    ///
    /// `null` yields the defaults. Unknown options and mistyped values are rejected.
    ///
    /// # Errors
    /// Returns [`BlueprintError::InvalidConfig`] if the bag cannot be parsed
    pub fn from_value(bag: Value) -> Result<Self, BlueprintError> {
        if bag.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(bag).map_err(|e| BlueprintError::InvalidConfig(e.to_string()))
    }
}

impl Default for DoubleConfig {
    fn default() -> Self {
        Self {
            allow_protected_methods: false,
            test_unexpected_methods: true,
        }
    }
}

/// Behavior family of a double
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleKind {
    /// Mock that fails on calls to methods nobody configured
    StrictMock,

    /// Mock that lets unconfigured methods run their real body
    PermissiveMock,

    /// All methods inert unless configured
    Dummy,
}

impl DoubleKind {
    /// Kind of a mock requested under `config`
    #[inline]
    #[must_use]
    pub fn mock(config: &DoubleConfig) -> Self {
        if config.test_unexpected_methods {
            Self::StrictMock
        } else {
            Self::PermissiveMock
        }
    }

    /// Check if this is one of the mock kinds
    #[inline]
    #[must_use]
    pub fn is_mock(self) -> bool {
        matches!(self, Self::StrictMock | Self::PermissiveMock)
    }
}

impl std::fmt::Display for DoubleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::StrictMock => "strict-mock",
            Self::PermissiveMock => "permissive-mock",
            Self::Dummy => "dummy",
        };
        f.write_str(name)
    }
}

/// Immutable description of one double
#[derive(Debug, Clone)]
pub struct DoubleSpec {
    blueprint: Arc<Blueprint>,
    kind: DoubleKind,
    config: DoubleConfig,
}

impl DoubleSpec {
    /// Create spec
    #[inline]
    #[must_use]
    pub fn new(blueprint: Arc<Blueprint>, kind: DoubleKind, config: DoubleConfig) -> Self {
        Self {
            blueprint,
            kind,
            config,
        }
    }

    /// Compiled blueprint
    #[inline]
    #[must_use]
    pub fn blueprint(&self) -> &Blueprint {
        &self.blueprint
    }

    /// Double kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DoubleKind {
        self.kind
    }

    /// Configuration the double was created with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DoubleConfig {
        &self.config
    }

    /// Target type name
    #[inline]
    #[must_use]
    pub fn target_name(&self) -> &str {
        self.blueprint.target_name()
    }
}
