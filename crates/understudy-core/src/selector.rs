//! Call and count selectors
//!
//! - [`CallSelector`]: which ordinal calls of a method a binding governs
//! - [`CountExpectation`]: how many calls a method is expected to receive

use crate::constraint::Constraint;
use crate::error::{ConfigError, Failure};
use crate::invocation::Call;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Ordinal calls governed by a binding
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallSelector {
    /// Every call
    #[default]
    All,

    /// One ordinal (1-based)
    Single(u32),

    /// Several ordinals (1-based)
    Set(BTreeSet<u32>),
}

impl CallSelector {
    /// Check if the selector covers `ordinal`
    #[must_use]
    pub fn governs(&self, ordinal: u32) -> bool {
        match self {
            Self::All => true,
            Self::Single(n) => *n == ordinal,
            Self::Set(set) => set.contains(&ordinal),
        }
    }

    /// Check if two selectors cover at least one common ordinal
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::All, _) | (_, Self::All) => true,
            (Self::Single(n), other) | (other, Self::Single(n)) => other.governs(*n),
            (Self::Set(a), Self::Set(b)) => !a.is_disjoint(b),
        }
    }

    fn validated(self) -> Result<Self, ConfigError> {
        match self {
            Self::All => Ok(Self::All),
            Self::Single(0) => Err(zero_index()),
            Self::Single(n) => Ok(Self::Single(n)),
            Self::Set(set) => from_set(set),
        }
    }
}

impl fmt::Display for CallSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all calls"),
            Self::Single(n) => write!(f, "call #{n}"),
            Self::Set(set) => {
                let list: Vec<_> = set.iter().map(|n| format!("#{n}")).collect();
                write!(f, "calls {}", list.join(", "))
            }
        }
    }
}

fn zero_index() -> ConfigError {
    ConfigError::invalid_call_index("0 (call indices start at 1)")
}

fn from_set(set: BTreeSet<u32>) -> Result<CallSelector, ConfigError> {
    if set.contains(&0) {
        return Err(zero_index());
    }
    let mut iter = set.iter();
    match (iter.next(), iter.next()) {
        (None, _) => Err(ConfigError::invalid_call_index("empty call index list")),
        (Some(&n), None) => Ok(CallSelector::Single(n)),
        _ => Ok(CallSelector::Set(set)),
    }
}

fn ordinal<T>(value: T) -> Result<u32, ConfigError>
where
    T: Copy + fmt::Display,
    u32: TryFrom<T>,
{
    u32::try_from(value)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| ConfigError::invalid_call_index(format!("{value} (call indices start at 1)")))
}

fn ordinals<T>(values: impl IntoIterator<Item = T>) -> Result<CallSelector, ConfigError>
where
    T: Copy + fmt::Display,
    u32: TryFrom<T>,
{
    let set = values
        .into_iter()
        .map(ordinal)
        .collect::<Result<BTreeSet<_>, _>>()?;
    from_set(set)
}

/// Conversion into a validated [`CallSelector`]
pub trait IntoCallSelector {
    /// Convert, rejecting zero, negative and empty selections
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCallIndex`] for invalid selections
    fn into_call_selector(self) -> Result<CallSelector, ConfigError>;
}

impl IntoCallSelector for CallSelector {
    fn into_call_selector(self) -> Result<CallSelector, ConfigError> {
        self.validated()
    }
}

macro_rules! impl_call_selector {
    ($($int:ty),* $(,)?) => {
        $(
            impl IntoCallSelector for $int {
                fn into_call_selector(self) -> Result<CallSelector, ConfigError> {
                    ordinal(self).map(CallSelector::Single)
                }
            }
        )*
    };
}

impl_call_selector!(i32, i64, u32, u64, usize);

impl<T, const N: usize> IntoCallSelector for [T; N]
where
    T: Copy + fmt::Display,
    u32: TryFrom<T>,
{
    fn into_call_selector(self) -> Result<CallSelector, ConfigError> {
        ordinals(self)
    }
}

impl<T> IntoCallSelector for Vec<T>
where
    T: Copy + fmt::Display,
    u32: TryFrom<T>,
{
    fn into_call_selector(self) -> Result<CallSelector, ConfigError> {
        ordinals(self)
    }
}

impl<T> IntoCallSelector for &[T]
where
    T: Copy + fmt::Display,
    u32: TryFrom<T>,
{
    fn into_call_selector(self) -> Result<CallSelector, ConfigError> {
        ordinals(self.iter().copied())
    }
}

/// Comparator of a bounded count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
}

impl Comparator {
    /// Apply `actual <op> bound`
    #[inline]
    #[must_use]
    pub fn apply(self, actual: usize, bound: usize) -> bool {
        match self {
            Self::Greater => actual > bound,
            Self::GreaterOrEqual => actual >= bound,
            Self::Less => actual < bound,
            Self::LessOrEqual => actual <= bound,
        }
    }

    /// Comparator token
    #[inline]
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
        }
    }
}

type CountCallback = Rc<dyn Fn(&[Call]) -> Result<(), Failure>>;

/// Expected number of calls to a method
#[derive(Clone)]
pub enum CountExpectation {
    /// Exactly `n` calls
    Exact(usize),

    /// Calls compared against a bound
    Bounded(Comparator, usize),

    /// Call count (as a number) satisfies a constraint
    Satisfies(Rc<dyn Constraint>),

    /// Callback inspects the recorded calls
    Inspect(CountCallback),
}

/// Result of checking a count expectation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CountOutcome {
    Pass,
    Mismatch,
    Rejected(String),
}

impl CountExpectation {
    /// Count checked by a constraint
    #[must_use]
    pub fn satisfies(constraint: impl Constraint + 'static) -> Self {
        Self::Satisfies(Rc::new(constraint))
    }

    /// Count checked by a callback over the recorded calls
    #[must_use]
    pub fn inspect(callback: impl Fn(&[Call]) -> Result<(), Failure> + 'static) -> Self {
        Self::Inspect(Rc::new(callback))
    }

    /// Parse `"3"`, `">2"`, `">=3"`, `"<4"` or `"<=3"`
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCount`] for anything else
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim();
        let (comparator, rest) = [
            (Comparator::GreaterOrEqual, ">="),
            (Comparator::LessOrEqual, "<="),
            (Comparator::Greater, ">"),
            (Comparator::Less, "<"),
        ]
        .into_iter()
        .find_map(|(cmp, token)| trimmed.strip_prefix(token).map(|rest| (Some(cmp), rest)))
        .unwrap_or((None, trimmed));

        let rest = rest.trim();
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ConfigError::invalid_count(format!("'{text}'")));
        }
        let bound: usize = rest
            .parse()
            .map_err(|_| ConfigError::invalid_count(format!("'{text}'")))?;

        Ok(match comparator {
            Some(cmp) => Self::Bounded(cmp, bound),
            None => Self::Exact(bound),
        })
    }

    /// Human-readable description
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exact(n) => n.to_string(),
            Self::Bounded(cmp, n) => format!("{}{n}", cmp.token()),
            Self::Satisfies(constraint) => constraint.describe(),
            Self::Inspect(_) => "a custom check".to_string(),
        }
    }

    pub(crate) fn check(&self, calls: &[Call]) -> CountOutcome {
        let actual = calls.len();
        let passed = match self {
            Self::Exact(n) => actual == *n,
            Self::Bounded(cmp, n) => cmp.apply(actual, *n),
            Self::Satisfies(constraint) => constraint.matches(&Value::from(actual)),
            Self::Inspect(callback) => {
                return match callback(calls) {
                    Ok(()) => CountOutcome::Pass,
                    Err(failure) => CountOutcome::Rejected(failure.to_string()),
                }
            }
        };
        if passed {
            CountOutcome::Pass
        } else {
            CountOutcome::Mismatch
        }
    }
}

impl fmt::Debug for CountExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountExpectation({})", self.describe())
    }
}

/// Conversion into a [`CountExpectation`]
pub trait IntoCountExpectation {
    /// Convert, rejecting malformed selectors
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidCount`] for malformed selectors
    fn into_count_expectation(self) -> Result<CountExpectation, ConfigError>;
}

impl IntoCountExpectation for CountExpectation {
    fn into_count_expectation(self) -> Result<CountExpectation, ConfigError> {
        Ok(self)
    }
}

impl IntoCountExpectation for &str {
    fn into_count_expectation(self) -> Result<CountExpectation, ConfigError> {
        CountExpectation::parse(self)
    }
}

impl IntoCountExpectation for String {
    fn into_count_expectation(self) -> Result<CountExpectation, ConfigError> {
        CountExpectation::parse(&self)
    }
}

macro_rules! impl_count_expectation {
    ($($int:ty),* $(,)?) => {
        $(
            impl IntoCountExpectation for $int {
                fn into_count_expectation(self) -> Result<CountExpectation, ConfigError> {
                    usize::try_from(self).map(CountExpectation::Exact).map_err(|_| {
                        ConfigError::invalid_count(format!("{self} (counts cannot be negative)"))
                    })
                }
            }
        )*
    };
}

impl_count_expectation!(i32, i64, u32, u64, usize);
