//! Expectation store and builder
//!
//! Each double owns an [`ExpectationTable`] mapping method names to an
//! ordered list of bindings. [`Expectation`] and [`ExpectationCollection`]
//! are the fluent handles that edit it.
//!
//! A chained call augments the most recent binding with the same call
//! selector whose targeted part is still empty, otherwise it appends a new
//! binding. Later action bindings win over earlier ones on shared ordinals.

use crate::action::{Action, Reply};
use crate::double::DoubleCore;
use crate::error::ConfigError;
use crate::matcher::ArgsMatcher;
use crate::selector::{CallSelector, CountExpectation, IntoCallSelector, IntoCountExpectation};
use std::collections::HashMap;
use std::rc::Rc;
use understudy_blueprint::MethodSignature;

/// Declared rule for a subset of a method's calls
#[derive(Debug, Clone, Default)]
pub(crate) struct Binding {
    pub(crate) selector: CallSelector,
    pub(crate) matcher: Option<ArgsMatcher>,
    pub(crate) count: Option<CountExpectation>,
    pub(crate) action: Option<Action>,
}

/// Piece of a binding set by one builder call
#[derive(Debug, Clone)]
pub(crate) enum Part {
    Count(CountExpectation),
    Matcher(ArgsMatcher),
    Action(Action),
}

impl Part {
    fn name(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Matcher(_) => "args",
            Self::Action(_) => "action",
        }
    }
}

impl Binding {
    fn is_free_for(&self, part: &Part) -> bool {
        match part {
            Part::Count(_) => self.count.is_none(),
            Part::Matcher(_) => self.matcher.is_none(),
            Part::Action(_) => self.action.is_none(),
        }
    }

    fn set(&mut self, part: Part) {
        match part {
            Part::Count(count) => self.count = Some(count),
            Part::Matcher(matcher) => self.matcher = Some(matcher),
            Part::Action(action) => self.action = Some(action),
        }
    }
}

/// Per-double method → bindings table
#[derive(Debug, Default)]
pub(crate) struct ExpectationTable {
    methods: HashMap<String, Vec<Binding>>,
}

impl ExpectationTable {
    /// Mark a method as selected for configuration
    pub(crate) fn declare(&mut self, method: &str) {
        self.methods.entry(method.to_string()).or_default();
    }

    /// Check if a method was ever selected
    #[inline]
    pub(crate) fn is_declared(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Add a part to the method's bindings
    ///
    /// Returns `true` when a new action overlaps an earlier action's ordinals.
    pub(crate) fn bind(&mut self, method: &str, selector: CallSelector, part: Part) -> bool {
        let bindings = self.methods.entry(method.to_string()).or_default();

        let overlaps = matches!(part, Part::Action(_))
            && bindings
                .iter()
                .any(|b| b.action.is_some() && b.selector.overlaps(&selector));

        match bindings
            .iter_mut()
            .rev()
            .find(|b| b.selector == selector && b.is_free_for(&part))
        {
            Some(binding) => binding.set(part),
            None => {
                let mut binding = Binding {
                    selector,
                    ..Binding::default()
                };
                binding.set(part);
                bindings.push(binding);
            }
        }
        overlaps
    }

    /// Bindings declared for a method, in declaration order
    pub(crate) fn bindings(&self, method: &str) -> &[Binding] {
        self.methods.get(method).map_or(&[], Vec::as_slice)
    }

    /// Action of the most recent binding governing `ordinal`
    pub(crate) fn action_for(&self, method: &str, ordinal: u32) -> Option<Action> {
        self.bindings(method)
            .iter()
            .rev()
            .filter(|b| b.selector.governs(ordinal))
            .find_map(|b| b.action.clone())
    }

    /// Every argument matcher governing `ordinal`, in declaration order
    pub(crate) fn matchers_for(&self, method: &str, ordinal: u32) -> Vec<ArgsMatcher> {
        self.bindings(method)
            .iter()
            .filter(|b| b.selector.governs(ordinal))
            .filter_map(|b| b.matcher.clone())
            .collect()
    }
}

/// Fluent handle configuring one method of a double
///
/// Every call returns the handle again so chains read naturally with `?`:
///
/// ```rust,ignore
/// double
///     .method("send")?
///     .count(2)?
///     .args_on(["a", "b"], 1)?
///     .stub_on("first", 1)?
///     .stub_on("second", 2)?;
/// ```
#[derive(Clone)]
pub struct Expectation {
    core: Rc<DoubleCore>,
    signature: MethodSignature,
}

impl Expectation {
    pub(crate) fn new(core: Rc<DoubleCore>, signature: MethodSignature) -> Self {
        core.table.borrow_mut().declare(signature.name());
        Self { core, signature }
    }

    /// Configured method name
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        self.signature.name()
    }

    /// Expect a number of calls, checked at verification
    ///
    /// # Errors
    /// [`ConfigError::InvalidCount`] for malformed selectors
    pub fn count(self, count: impl IntoCountExpectation) -> Result<Self, ConfigError> {
        self.count_on(count, CallSelector::All)
    }

    /// Expect a number of calls among the selected ordinals
    ///
    /// # Errors
    /// [`ConfigError::InvalidCount`] or [`ConfigError::InvalidCallIndex`]
    pub fn count_on(
        self,
        count: impl IntoCountExpectation,
        calls: impl IntoCallSelector,
    ) -> Result<Self, ConfigError> {
        let part = Part::Count(count.into_count_expectation()?);
        self.apply(calls.into_call_selector()?, part)
    }

    /// Check the arguments of every call as it happens
    ///
    /// # Errors
    /// [`ConfigError::TooManyArguments`] if more positions than the method declares
    pub fn args(self, expected: impl Into<ArgsMatcher>) -> Result<Self, ConfigError> {
        self.args_on(expected, CallSelector::All)
    }

    /// Check the arguments of the selected calls as they happen
    ///
    /// # Errors
    /// [`ConfigError::TooManyArguments`] or [`ConfigError::InvalidCallIndex`]
    pub fn args_on(
        self,
        expected: impl Into<ArgsMatcher>,
        calls: impl IntoCallSelector,
    ) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, Part::Matcher(expected.into()))
    }

    /// Return `reply` from every call
    ///
    /// # Errors
    /// [`ConfigError::Closed`] if the double was torn down
    pub fn stub(self, reply: impl Into<Reply>) -> Result<Self, ConfigError> {
        self.stub_on(reply, CallSelector::All)
    }

    /// Return `reply` from the selected calls
    ///
    /// # Errors
    /// [`ConfigError::InvalidCallIndex`] for invalid selections
    pub fn stub_on(self, reply: impl Into<Reply>, calls: impl IntoCallSelector) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, Part::Action(reply.into().into_action()))
    }

    /// Return the zero value from every call
    ///
    /// # Errors
    /// [`ConfigError::Closed`] if the double was torn down
    pub fn dummy(self) -> Result<Self, ConfigError> {
        self.dummy_on(CallSelector::All)
    }

    /// Return the zero value from the selected calls
    ///
    /// # Errors
    /// [`ConfigError::InvalidCallIndex`] for invalid selections
    pub fn dummy_on(self, calls: impl IntoCallSelector) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, Part::Action(Action::Dummy))
    }

    /// Run the real implementation on every call
    ///
    /// # Errors
    /// [`ConfigError::NoRealBody`] if the method has no real implementation
    pub fn mock(self) -> Result<Self, ConfigError> {
        self.mock_on(CallSelector::All)
    }

    /// Run the real implementation on the selected calls
    ///
    /// # Errors
    /// [`ConfigError::NoRealBody`] or [`ConfigError::InvalidCallIndex`]
    pub fn mock_on(self, calls: impl IntoCallSelector) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, Part::Action(Action::PassThrough))
    }

    fn validate(&self, part: &Part) -> Result<(), ConfigError> {
        self.core.ensure_open()?;
        match part {
            Part::Matcher(matcher) => match matcher.expected_len() {
                Some(given) if given > self.signature.arity() => Err(ConfigError::TooManyArguments {
                    method: self.method().to_string(),
                    arity: self.signature.arity(),
                    given,
                }),
                _ => Ok(()),
            },
            Part::Action(Action::PassThrough) if !self.core.has_body(&self.signature) => {
                Err(ConfigError::NoRealBody {
                    target: self.core.target_name().to_string(),
                    method: self.method().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn bind(&self, selector: CallSelector, part: Part) {
        let kind = part.name();
        tracing::debug!(
            double = %self.core.id,
            target_type = self.core.target_name(),
            method = self.method(),
            selector = %selector,
            part = kind,
            "binding declared"
        );

        let overlaps = self
            .core
            .table
            .borrow_mut()
            .bind(self.method(), selector.clone(), part);
        if overlaps {
            tracing::warn!(
                target_type = self.core.target_name(),
                method = self.method(),
                selector = %selector,
                "action overlaps an earlier action; the latest declaration wins"
            );
        }
    }

    fn apply(self, selector: CallSelector, part: Part) -> Result<Self, ConfigError> {
        self.validate(&part)?;
        self.bind(selector, part);
        Ok(self)
    }
}

impl std::fmt::Debug for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Expectation")
            .field("target", &self.core.target_name())
            .field("method", &self.method())
            .finish()
    }
}

/// Fluent handle fanning every call out to several methods
///
/// Inputs are validated against every method before any of them is edited.
#[derive(Debug, Clone)]
pub struct ExpectationCollection {
    expectations: Vec<Expectation>,
}

impl ExpectationCollection {
    pub(crate) fn new(expectations: Vec<Expectation>) -> Self {
        Self { expectations }
    }

    /// Selected method handles
    #[inline]
    #[must_use]
    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    /// Handle for one selected method
    #[must_use]
    pub fn get(&self, method: &str) -> Option<&Expectation> {
        self.expectations.iter().find(|e| e.method() == method)
    }

    /// Number of selected methods
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.expectations.len()
    }

    /// Check if no method is selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expectations.is_empty()
    }

    /// See [`Expectation::count`]
    ///
    /// # Errors
    /// As [`Expectation::count`]
    pub fn count(self, count: impl IntoCountExpectation) -> Result<Self, ConfigError> {
        self.count_on(count, CallSelector::All)
    }

    /// See [`Expectation::count_on`]
    ///
    /// # Errors
    /// As [`Expectation::count_on`]
    pub fn count_on(
        self,
        count: impl IntoCountExpectation,
        calls: impl IntoCallSelector,
    ) -> Result<Self, ConfigError> {
        let part = Part::Count(count.into_count_expectation()?);
        self.apply(calls.into_call_selector()?, &part)
    }

    /// See [`Expectation::args`]
    ///
    /// # Errors
    /// As [`Expectation::args`]
    pub fn args(self, expected: impl Into<ArgsMatcher>) -> Result<Self, ConfigError> {
        self.args_on(expected, CallSelector::All)
    }

    /// See [`Expectation::args_on`]
    ///
    /// # Errors
    /// As [`Expectation::args_on`]
    pub fn args_on(
        self,
        expected: impl Into<ArgsMatcher>,
        calls: impl IntoCallSelector,
    ) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, &Part::Matcher(expected.into()))
    }

    /// See [`Expectation::stub`]
    ///
    /// # Errors
    /// As [`Expectation::stub`]
    pub fn stub(self, reply: impl Into<Reply>) -> Result<Self, ConfigError> {
        self.stub_on(reply, CallSelector::All)
    }

    /// See [`Expectation::stub_on`]
    ///
    /// # Errors
    /// As [`Expectation::stub_on`]
    pub fn stub_on(self, reply: impl Into<Reply>, calls: impl IntoCallSelector) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, &Part::Action(reply.into().into_action()))
    }

    /// See [`Expectation::dummy`]
    ///
    /// # Errors
    /// As [`Expectation::dummy`]
    pub fn dummy(self) -> Result<Self, ConfigError> {
        self.dummy_on(CallSelector::All)
    }

    /// See [`Expectation::dummy_on`]
    ///
    /// # Errors
    /// As [`Expectation::dummy_on`]
    pub fn dummy_on(self, calls: impl IntoCallSelector) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, &Part::Action(Action::Dummy))
    }

    /// See [`Expectation::mock`]
    ///
    /// # Errors
    /// As [`Expectation::mock`]
    pub fn mock(self) -> Result<Self, ConfigError> {
        self.mock_on(CallSelector::All)
    }

    /// See [`Expectation::mock_on`]
    ///
    /// # Errors
    /// As [`Expectation::mock_on`]
    pub fn mock_on(self, calls: impl IntoCallSelector) -> Result<Self, ConfigError> {
        let selector = calls.into_call_selector()?;
        self.apply(selector, &Part::Action(Action::PassThrough))
    }

    fn apply(self, selector: CallSelector, part: &Part) -> Result<Self, ConfigError> {
        for expectation in &self.expectations {
            expectation.validate(part)?;
        }
        for expectation in &self.expectations {
            expectation.bind(selector.clone(), part.clone());
        }
        Ok(self)
    }
}
