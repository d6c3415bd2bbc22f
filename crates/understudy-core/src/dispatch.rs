//! Invocation dispatcher
//!
//! Every call on a double lands in [`dispatch`]. Intercepted calls are
//! recorded first, then checked against every argument matcher governing
//! their ordinal, then resolved to an action and executed. Table and log
//! borrows are released before the action runs so callbacks and real
//! bodies may call back into the same double.

use crate::action::{self, Action};
use crate::double::DoubleCore;
use crate::error::Failure;
use serde_json::Value;
use understudy_blueprint::{DoubleKind, MethodSignature, Slot};

/// Route one call through a double
pub(crate) fn dispatch(core: &DoubleCore, method: &str, args: Vec<Value>) -> Result<Value, Failure> {
    let signature = match core.spec.blueprint().slot(method) {
        None => {
            return Err(report(
                core,
                Failure::UnknownMethod {
                    target: core.target_name().to_string(),
                    method: method.to_string(),
                },
            ))
        }
        Some(Slot::Control) => return close(core),
        Some(_) if core.is_closed() => {
            return Err(Failure::Closed {
                target: core.target_name().to_string(),
                method: method.to_string(),
            })
        }
        Some(Slot::Direct(signature)) => {
            return action::pass_through(core.target_name(), signature, &args, &core.body)
        }
        Some(Slot::Intercepted(signature)) => signature,
    };

    let recorded = core.log.borrow_mut().record(method, args.clone());
    let ordinal = recorded.ok_or_else(|| {
        report(
            core,
            Failure::CallLimit {
                target: core.target_name().to_string(),
                method: method.to_string(),
            },
        )
    })?;
    tracing::debug!(
        double = %core.id,
        target_type = core.target_name(),
        method,
        ordinal,
        args = args.len(),
        "dispatching call"
    );

    let (matchers, bound, declared) = {
        let table = core.table.borrow();
        (
            table.matchers_for(method, ordinal),
            table.action_for(method, ordinal),
            table.is_declared(method),
        )
    };

    for matcher in &matchers {
        matcher
            .check(core.target_name(), method, ordinal, &args)
            .map_err(|failure| report(core, failure))?;
    }

    let action = match bound {
        Some(action) => action,
        None => default_action(core, signature, declared)?,
    };
    action::execute(&action, core.target_name(), signature, &args, &core.body)
}

/// Action for a call no binding governs
fn default_action(core: &DoubleCore, signature: &MethodSignature, declared: bool) -> Result<Action, Failure> {
    match core.spec.kind() {
        DoubleKind::StrictMock if !declared => Err(report(
            core,
            Failure::UnexpectedCall {
                target: core.target_name().to_string(),
                method: signature.name().to_string(),
                calls: core.log.borrow().count(signature.name()),
            },
        )),
        kind if kind.is_mock() && core.has_body(signature) => Ok(Action::PassThrough),
        _ => Ok(Action::Dummy),
    }
}

/// Handle the control method: verify now and make the double inert
fn close(core: &DoubleCore) -> Result<Value, Failure> {
    let failures = core.close();
    if failures.is_empty() {
        Ok(Value::Null)
    } else {
        Err(Failure::Verification {
            target: core.target_name().to_string(),
            failures,
        })
    }
}

fn report(core: &DoubleCore, failure: Failure) -> Failure {
    core.reporter.report(&failure);
    failure
}
