//! Double instances
//!
//! A [`Double`] is a cheap, clonable handle on one synthesized stand-in. It
//! owns the double's expectation table, invocation log and real body.
//! Instance doubles and type-level doubles share this type and differ only
//! in [`Scope`] and in which real body pass-through reaches.

use crate::dispatch;
use crate::error::{ConfigError, Failure};
use crate::expectation::{Expectation, ExpectationCollection, ExpectationTable};
use crate::invocation::{Call, InvocationLog};
use crate::report::Reporter;
use crate::target::RealBody;
use crate::verify::{self, VerificationReport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use ulid::Ulid;
use understudy_blueprint::{DoubleConfig, DoubleKind, DoubleSpec, MethodSignature};

/// Unique double identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DoubleId(pub Ulid);

impl DoubleId {
    /// Generate new double ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for DoubleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DoubleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a double stands in for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One object of the target type
    Instance,

    /// The target type itself (type-level calls)
    Type,
}

/// State shared by every handle on one double
pub(crate) struct DoubleCore {
    pub(crate) id: DoubleId,
    pub(crate) spec: DoubleSpec,
    pub(crate) scope: Scope,
    pub(crate) table: RefCell<ExpectationTable>,
    pub(crate) log: RefCell<InvocationLog>,
    pub(crate) body: RefCell<Box<dyn RealBody>>,
    pub(crate) reporter: Rc<dyn Reporter>,
    outcome: RefCell<Option<Vec<Failure>>>,
    closed: Cell<bool>,
}

impl DoubleCore {
    pub(crate) fn new(
        spec: DoubleSpec,
        scope: Scope,
        body: Box<dyn RealBody>,
        reporter: Rc<dyn Reporter>,
    ) -> Self {
        Self {
            id: DoubleId::new(),
            spec,
            scope,
            table: RefCell::new(ExpectationTable::default()),
            log: RefCell::new(InvocationLog::default()),
            body: RefCell::new(body),
            reporter,
            outcome: RefCell::new(None),
            closed: Cell::new(false),
        }
    }

    #[inline]
    pub(crate) fn target_name(&self) -> &str {
        self.spec.target_name()
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn ensure_open(&self) -> Result<(), ConfigError> {
        if self.is_closed() {
            Err(ConfigError::Closed(self.target_name().to_string()))
        } else {
            Ok(())
        }
    }

    /// Check if pass-through can reach a real body for `signature`
    pub(crate) fn has_body(&self, signature: &MethodSignature) -> bool {
        self.body
            .try_borrow()
            .map_or(true, |body| body.has_body(signature))
    }

    /// Verify once, report every failure and become inert; later calls return
    /// the same failures without reporting them again
    pub(crate) fn close(&self) -> Vec<Failure> {
        if let Some(failures) = self.outcome.borrow().as_ref() {
            return failures.clone();
        }
        let failures = verify::verify_double(self);
        self.closed.set(true);
        *self.outcome.borrow_mut() = Some(failures.clone());
        for failure in &failures {
            self.reporter.report(failure);
        }

        tracing::debug!(
            double = %self.id,
            target_type = self.target_name(),
            failures = failures.len(),
            "double closed"
        );
        failures
    }
}

/// Handle on a synthesized double
///
/// ```rust,ignore
/// let session = Session::new();
/// let double = session.mock::<Mailer>().instance()?;
///
/// double.method("send")?.count(1)?.stub(true)?;
/// assert_eq!(double.call("send", [json!("hi")])?, json!(true));
///
/// session.verify().assert_success();
/// ```
#[derive(Clone)]
pub struct Double {
    core: Rc<DoubleCore>,
}

impl Double {
    pub(crate) fn from_core(core: Rc<DoubleCore>) -> Self {
        Self { core }
    }

    pub(crate) fn core(&self) -> Rc<DoubleCore> {
        Rc::clone(&self.core)
    }

    /// Unique identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> DoubleId {
        self.core.id
    }

    /// Target type name
    #[inline]
    #[must_use]
    pub fn target_name(&self) -> &str {
        self.core.target_name()
    }

    /// Kind fixed at creation
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DoubleKind {
        self.core.spec.kind()
    }

    /// Configuration fixed at creation
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DoubleConfig {
        self.core.spec.config()
    }

    /// Instance or type-level
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.core.scope
    }

    /// Select one method for configuration
    ///
    /// # Errors
    /// - [`ConfigError::Blueprint`] for unknown, non-public (unless allowed) or control methods
    /// - [`ConfigError::Closed`] after teardown
    pub fn method(&self, name: &str) -> Result<Expectation, ConfigError> {
        self.core.ensure_open()?;
        let signature = self.core.spec.blueprint().configurable(name)?.clone();
        Ok(Expectation::new(Rc::clone(&self.core), signature))
    }

    /// Select several methods; every chained call applies to all of them
    ///
    /// # Errors
    /// As [`Double::method`], plus [`ConfigError::EmptySelection`]. No method is
    /// declared unless every name is valid.
    pub fn methods<I, S>(&self, names: I) -> Result<ExpectationCollection, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.core.ensure_open()?;
        let blueprint = self.core.spec.blueprint();
        let signatures = names
            .into_iter()
            .map(|name| blueprint.configurable(name.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        if signatures.is_empty() {
            return Err(ConfigError::EmptySelection);
        }

        let expectations = signatures
            .into_iter()
            .map(|signature| Expectation::new(Rc::clone(&self.core), signature))
            .collect();
        Ok(ExpectationCollection::new(expectations))
    }

    /// Call a method through the double
    ///
    /// # Errors
    /// Argument mismatches, unexpected calls and anything the resolved action raises
    pub fn call(&self, method: &str, args: impl IntoIterator<Item = Value>) -> Result<Value, Failure> {
        dispatch::dispatch(&self.core, method, args.into_iter().collect())
    }

    /// Calls recorded for `method`
    #[must_use]
    pub fn calls(&self, method: &str) -> Vec<Call> {
        self.core.log.borrow().calls(method).to_vec()
    }

    /// Number of calls recorded for `method`
    #[must_use]
    pub fn call_count(&self, method: &str) -> usize {
        self.core.log.borrow().count(method)
    }

    /// Run this double's verification now and make it inert
    ///
    /// Verification happens once; closing again returns the same report.
    #[must_use]
    pub fn close(&self) -> VerificationReport {
        VerificationReport::new(self.core.close())
    }

    /// Check if the double was torn down
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }
}

impl std::fmt::Debug for Double {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Double")
            .field("id", &self.core.id)
            .field("target", &self.target_name())
            .field("kind", &self.kind())
            .field("scope", &self.scope())
            .finish()
    }
}
