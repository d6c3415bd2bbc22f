//! Testing utilities for the Understudy workspace
//!
//! Shared target fixtures, session helpers and tracing setup.

#![allow(missing_docs)]

use serde_json::{json, Value};
use understudy_blueprint::{MethodSignature, ReturnKind, TypeShape};
use understudy_core::{CollectingReporter, Failure, Session, Target};

/// Install a test-friendly tracing subscriber honouring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Session whose dispatch-time failures can be inspected
pub fn collecting_session() -> (Session, CollectingReporter) {
    init_tracing();
    let reporter = CollectingReporter::new();
    (Session::with_reporter(reporter.clone()), reporter)
}

fn unknown(method: &str) -> Failure {
    Failure::raised(format!("no real method {method}"))
}

/// Plain target: `foo` and `bar` return their own names, `arg` returns
/// `"bar"`, `protect` is protected.
///
/// `foo` and `bar` accept up to two arguments so argument expectations can
/// be exercised on them. Return types are nullable, so dummies yield `null`.
#[derive(Debug, Default, Clone)]
pub struct StandardSubject;

impl Target for StandardSubject {
    fn shape() -> TypeShape {
        TypeShape::new("StandardSubject")
            .with_method(MethodSignature::public("foo", 2))
            .with_method(MethodSignature::public("bar", 2))
            .with_method(MethodSignature::public("arg", 2))
            .with_method(MethodSignature::protected("protect", 0))
    }

    fn invoke(&mut self, method: &str, _args: &[Value]) -> Result<Value, Failure> {
        match method {
            "foo" => Ok(json!("foo")),
            "bar" | "arg" => Ok(json!("bar")),
            "protect" => Ok(json!("protect")),
            _ => Err(unknown(method)),
        }
    }
}

/// Stateful target for pass-through: deposits accumulate in `balance`
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    pub balance: i64,
}

impl Ledger {
    pub fn with_balance(balance: i64) -> Self {
        Self { balance }
    }
}

impl Target for Ledger {
    fn shape() -> TypeShape {
        TypeShape::new("Ledger")
            .with_method(MethodSignature::public("deposit", 1).returning(ReturnKind::Int))
            .with_method(MethodSignature::public("balance", 0).returning(ReturnKind::Int))
            .with_method(MethodSignature::public("audit", 0).returning(ReturnKind::Bool).abstract_method())
            .with_method(MethodSignature::public("currency", 0).returning(ReturnKind::Str).static_method())
            .with_method(MethodSignature::private("reconcile", 0).returning(ReturnKind::Int))
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, Failure> {
        match method {
            "deposit" => {
                let amount = args
                    .first()
                    .and_then(Value::as_i64)
                    .ok_or_else(|| Failure::raised("deposit needs an integer amount"))?;
                self.balance += amount;
                Ok(json!(self.balance))
            }
            "balance" => Ok(json!(self.balance)),
            "reconcile" => Ok(json!(0)),
            _ => Err(unknown(method)),
        }
    }

    fn invoke_static(method: &str, _args: &[Value]) -> Result<Value, Failure> {
        match method {
            "currency" => Ok(json!("EUR")),
            _ => Err(Failure::no_real_body("Ledger", method)),
        }
    }
}

/// Type-level helpers meant to be doubled with `class()`
#[derive(Debug, Default, Clone)]
pub struct Replies;

impl Target for Replies {
    fn shape() -> TypeShape {
        TypeShape::new("Replies")
            .with_method(MethodSignature::public("return_value", 1).static_method())
            .with_method(MethodSignature::public("return_self", 0).static_method())
    }

    fn invoke(&mut self, method: &str, _args: &[Value]) -> Result<Value, Failure> {
        Err(unknown(method))
    }

    fn invoke_static(method: &str, args: &[Value]) -> Result<Value, Failure> {
        match method {
            "return_value" => Ok(args.first().cloned().unwrap_or(Value::Null)),
            "return_self" => Ok(json!("Replies")),
            _ => Err(unknown(method)),
        }
    }
}
