//! Test session façade
//!
//! A [`Session`] is the entry point a test talks to. It requests doubles,
//! keeps every double it created, and verifies all of them at the end of
//! the test. Sessions are confined to the thread running the test.

use crate::double::{Double, DoubleCore, Scope};
use crate::error::ConfigError;
use crate::report::{Reporter, TracingReporter};
use crate::target::{Genuine, Hollow, RealBody, StaticBody, Target};
use crate::verify::VerificationReport;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use understudy_blueprint::{BlueprintCache, DoubleConfig, DoubleKind, DoubleSpec};

/// Scope owning every double created during one test
///
/// Dropping a session that still has open doubles verifies them and panics
/// with the report if anything failed.
///
/// ```rust,ignore
/// let session = Session::new();
/// let repo = session.dummy::<Repo>().instance()?;
/// repo.method("find")?.count(1)?.stub(json!({"id": 7}))?;
///
/// service_under_test(&repo);
///
/// session.verify().assert_success();
/// ```
pub struct Session {
    reporter: Rc<dyn Reporter>,
    doubles: RefCell<Vec<Rc<DoubleCore>>>,
    classes: RefCell<HashMap<TypeId, Rc<DoubleCore>>>,
}

impl Session {
    /// Create session reporting through `tracing`
    #[must_use]
    pub fn new() -> Self {
        Self::with_reporter(TracingReporter)
    }

    /// Create session with a custom reporter
    #[must_use]
    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self {
            reporter: Rc::new(reporter),
            doubles: RefCell::new(Vec::new()),
            classes: RefCell::new(HashMap::new()),
        }
    }

    /// Request a mock of `T`
    #[must_use]
    pub fn mock<T: Target>(&self) -> DoubleRequest<'_, T> {
        DoubleRequest::new(self, Request::Mock)
    }

    /// Request a dummy of `T`
    #[must_use]
    pub fn dummy<T: Target>(&self) -> DoubleRequest<'_, T> {
        DoubleRequest::new(self, Request::Dummy)
    }

    /// Number of doubles created so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.doubles.borrow().len()
    }

    /// Check if no double was created
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doubles.borrow().is_empty()
    }

    /// Verify every double, in creation order
    ///
    /// Each double is verified once; verifying again returns the same report.
    #[must_use]
    pub fn verify(&self) -> VerificationReport {
        // Clone the handles so count callbacks may request new doubles.
        let doubles: Vec<_> = self.doubles.borrow().iter().map(Rc::clone).collect();
        let failures = doubles.iter().flat_map(|core| core.close()).collect();
        VerificationReport::new(failures)
    }

    fn register(&self, core: DoubleCore) -> Double {
        let core = Rc::new(core);
        tracing::debug!(
            double = %core.id,
            target_type = core.target_name(),
            kind = %core.spec.kind(),
            scope = ?core.scope,
            protected = core.spec.blueprint().allows_protected(),
            "double created"
        );
        self.doubles.borrow_mut().push(Rc::clone(&core));
        Double::from_core(core)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("doubles", &self.len()).finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let open: Vec<_> = self
            .doubles
            .borrow()
            .iter()
            .filter(|core| !core.is_closed())
            .map(Rc::clone)
            .collect();
        let report = VerificationReport::new(open.iter().flat_map(|core| core.close()).collect());
        assert!(report.is_success(), "{report}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Mock,
    Dummy,
}

/// Pending request for a double of `T`
///
/// Configure it, then finish with [`instance`](Self::instance),
/// [`instance_with`](Self::instance_with), [`hollow`](Self::hollow) or
/// [`class`](Self::class).
#[must_use = "a double request does nothing until finished"]
pub struct DoubleRequest<'s, T> {
    session: &'s Session,
    request: Request,
    config: DoubleConfig,
    _target: PhantomData<fn() -> T>,
}

impl<'s, T: Target> DoubleRequest<'s, T> {
    fn new(session: &'s Session, request: Request) -> Self {
        Self {
            session,
            request,
            config: DoubleConfig::default(),
            _target: PhantomData,
        }
    }

    /// Replace the whole configuration bag
    pub fn with_config(mut self, config: DoubleConfig) -> Self {
        self.config = config;
        self
    }

    /// Allow configuring non-public methods
    pub fn allow_protected_methods(mut self, allow: bool) -> Self {
        self.config = self.config.with_allow_protected_methods(allow);
        self
    }

    /// Fail calls to public methods that were never declared (mocks only)
    pub fn test_unexpected_methods(mut self, test: bool) -> Self {
        self.config = self.config.with_test_unexpected_methods(test);
        self
    }

    /// Kind the double will have
    #[must_use]
    pub fn kind(&self) -> DoubleKind {
        match self.request {
            Request::Mock => DoubleKind::mock(&self.config),
            Request::Dummy => DoubleKind::Dummy,
        }
    }

    /// Create an instance double around `T::default()`
    ///
    /// # Errors
    /// [`ConfigError::Blueprint`] if `T`'s shape does not compile
    pub fn instance(self) -> Result<Double, ConfigError>
    where
        T: Default,
    {
        self.instance_with(T::default())
    }

    /// Create an instance double around `genuine`, the target of pass-through
    ///
    /// # Errors
    /// [`ConfigError::Blueprint`] if `T`'s shape does not compile
    pub fn instance_with(self, genuine: T) -> Result<Double, ConfigError> {
        self.build(Scope::Instance, Box::new(Genuine(genuine)))
    }

    /// Create an instance double with no real implementation behind it
    ///
    /// # Errors
    /// [`ConfigError::Blueprint`] if `T`'s shape does not compile
    pub fn hollow(self) -> Result<Double, ConfigError> {
        self.build(Scope::Instance, Box::new(Hollow))
    }

    /// Get the type-level double of `T`, creating it on first request
    ///
    /// # Errors
    /// - [`ConfigError::ConflictingClass`] if it exists with another kind or configuration
    /// - [`ConfigError::Blueprint`] if `T`'s shape does not compile
    pub fn class(self) -> Result<Double, ConfigError> {
        let key = TypeId::of::<T>();
        let existing = self.session.classes.borrow().get(&key).map(Rc::clone);
        if let Some(core) = existing {
            if core.spec.kind() != self.kind() || core.spec.config() != &self.config {
                return Err(ConfigError::ConflictingClass {
                    target: core.target_name().to_string(),
                });
            }
            return Ok(Double::from_core(core));
        }

        let session = self.session;
        let double = self.build(Scope::Type, Box::new(StaticBody::<T>::new()))?;
        session.classes.borrow_mut().insert(key, double.core());
        Ok(double)
    }

    fn build(self, scope: Scope, body: Box<dyn RealBody>) -> Result<Double, ConfigError> {
        let kind = self.kind();
        let blueprint = BlueprintCache::global().get_or_compile::<T>(&self.config, T::shape)?;
        let spec = DoubleSpec::new(blueprint, kind, self.config);
        let core = DoubleCore::new(spec, scope, body, Rc::clone(&self.session.reporter));
        Ok(self.session.register(core))
    }
}
