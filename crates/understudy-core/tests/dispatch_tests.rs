//! Dispatcher properties: ordinals, resolution and method isolation

use proptest::prelude::*;
use serde_json::json;
use understudy_core::prelude::*;
use understudy_test_utils::{Ledger, StandardSubject};

proptest! {
    #[test]
    fn prop_ordinals_are_dense_per_method(
        calls in proptest::collection::vec(prop_oneof![Just("foo"), Just("bar"), Just("arg")], 0..40)
    ) {
        let session = Session::new();
        let double = session.dummy::<StandardSubject>().instance().unwrap();

        for method in &calls {
            double.call(method, [json!(*method)]).unwrap();
        }

        for method in ["foo", "bar", "arg"] {
            let recorded = double.calls(method);
            let expected = calls.iter().filter(|m| **m == method).count();
            prop_assert_eq!(recorded.len(), expected);
            for (i, call) in recorded.iter().enumerate() {
                prop_assert_eq!(call.ordinal() as usize, i + 1);
                prop_assert_eq!(call.args(), &[json!(method)][..]);
            }
        }
    }

    #[test]
    fn prop_stub_on_governs_exactly_selected_calls(
        selected in proptest::collection::btree_set(1u32..12, 1..6),
        total in 1usize..15
    ) {
        let session = Session::new();
        let double = session.dummy::<StandardSubject>().instance().unwrap();
        let ordinals: Vec<u32> = selected.iter().copied().collect();
        double.method("foo").unwrap().stub_on("stubbed", ordinals).unwrap();

        for n in 1..=total {
            let value = double.call("foo", []).unwrap();
            let ordinal = u32::try_from(n).unwrap();
            if selected.contains(&ordinal) {
                prop_assert_eq!(value, json!("stubbed"));
            } else {
                prop_assert_eq!(value, Value::Null);
            }
        }
    }

    #[test]
    fn prop_exact_count_verifies_iff_equal(expected in 0usize..6, made in 0usize..6) {
        let session = Session::new();
        let double = session.mock::<StandardSubject>().instance().unwrap();
        double.method("foo").unwrap().count(expected).unwrap();

        for _ in 0..made {
            double.call("foo", []).unwrap();
        }
        prop_assert_eq!(session.verify().is_success(), expected == made);
    }
}

#[test]
fn test_configuring_one_method_leaves_others_alone() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().instance()?;
    double.method("foo")?.count(1)?.args(["x"])?.stub("stubbed")?;

    assert_eq!(double.call("bar", [json!("anything")])?, Value::Null);
    assert_eq!(double.call("foo", [json!("x")])?, json!("stubbed"));
    assert_eq!(double.call_count("bar"), 1);

    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_unknown_method_at_call_time() {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().instance().unwrap();

    assert_eq!(
        double.call("missing", []).unwrap_err(),
        Failure::UnknownMethod {
            target: "StandardSubject".to_string(),
            method: "missing".to_string(),
        }
    );
}

#[test]
fn test_zero_values_follow_return_kind() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new();
    let ledger = session.dummy::<Ledger>().instance()?;

    assert_eq!(ledger.call("deposit", [json!(10)])?, json!(0));
    assert_eq!(ledger.call("audit", [])?, json!(false));
    Ok(())
}

#[test]
fn test_pass_through_keeps_genuine_state() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new();
    let ledger = session
        .mock::<Ledger>()
        .test_unexpected_methods(false)
        .instance_with(Ledger::with_balance(100))?;
    ledger.method("deposit")?.stub_on(Reply::value(-1), 2)?;

    assert_eq!(ledger.call("deposit", [json!(5)])?, json!(105));
    assert_eq!(ledger.call("deposit", [json!(5)])?, json!(-1));
    assert_eq!(ledger.call("deposit", [json!(5)])?, json!(110));
    assert_eq!(ledger.call("balance", [])?, json!(110));
    // abstract method: nothing to pass through to
    assert_eq!(ledger.call("audit", [])?, json!(false));
    Ok(())
}

#[test]
fn test_private_methods_bypass_the_dispatcher() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new();
    let ledger = session.dummy::<Ledger>().instance()?;

    assert_eq!(ledger.call("reconcile", [])?, json!(0));
    assert_eq!(ledger.call_count("reconcile"), 0);
    assert!(ledger.method("reconcile").is_err());
    Ok(())
}

#[test]
fn test_real_body_errors_propagate() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new();
    let ledger = session.dummy::<Ledger>().instance()?;
    ledger.method("deposit")?.mock()?;

    assert_eq!(
        ledger.call("deposit", [json!("ten")]).unwrap_err(),
        Failure::raised("deposit needs an integer amount")
    );
    Ok(())
}
