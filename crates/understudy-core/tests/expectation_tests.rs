//! Expectation builder tests
//!
//! Method selection, counts, stubs, dummies, pass-through and argument
//! expectations on a single double.

use pretty_assertions::assert_eq;
use serde_json::json;
use understudy_core::constraint::equal_to;
use understudy_core::prelude::*;
use understudy_core::{BlueprintError, CONTROL_METHOD};
use understudy_test_utils::{init_tracing, StandardSubject};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn mock(session: &Session) -> Double {
    init_tracing();
    session.mock::<StandardSubject>().instance().unwrap()
}

// ---- method selection ----

#[test]
fn test_undefined_method_rejected() {
    let session = Session::new();
    let double = mock(&session);

    let err = double.method("undefined_method").unwrap_err();
    assert_eq!(
        err,
        ConfigError::Blueprint(BlueprintError::unknown_method("StandardSubject", "undefined_method"))
    );
}

#[test]
fn test_protected_method_rejected_by_default() {
    let session = Session::new();
    let double = session
        .mock::<StandardSubject>()
        .allow_protected_methods(false)
        .instance()
        .unwrap();

    assert!(matches!(
        double.method("protect"),
        Err(ConfigError::Blueprint(BlueprintError::ProtectedMethod { .. }))
    ));
}

#[test]
fn test_protected_method_allowed_when_configured() -> TestResult {
    let session = Session::new();
    let double = session
        .mock::<StandardSubject>()
        .allow_protected_methods(true)
        .instance()?;

    let expectation = double.method("protect")?.stub("stubbed")?;
    assert_eq!(expectation.method(), "protect");
    assert_eq!(double.call("protect", [])?, json!("stubbed"));
    Ok(())
}

#[test]
fn test_control_method_not_configurable() {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().instance().unwrap();

    assert!(matches!(
        double.method(CONTROL_METHOD),
        Err(ConfigError::Blueprint(BlueprintError::ControlMethod(_)))
    ));
}

#[test]
fn test_selecting_several_methods_returns_collection() -> TestResult {
    let session = Session::new();
    let double = mock(&session);

    let collection = double.methods(["foo", "bar"])?.stub("same")?;
    assert_eq!(collection.len(), 2);
    assert_eq!(double.call("foo", [])?, json!("same"));
    assert_eq!(double.call("bar", [])?, json!("same"));
    Ok(())
}

#[test]
fn test_unexpected_methods_pass_through_when_not_tested() -> TestResult {
    let session = Session::new();
    let double = session
        .mock::<StandardSubject>()
        .test_unexpected_methods(false)
        .instance()?;

    assert_eq!(double.kind(), DoubleKind::PermissiveMock);
    assert_eq!(double.call("foo", [])?, json!("foo"));
    Ok(())
}

#[test]
fn test_config_bag_from_json() -> TestResult {
    let session = Session::new();
    let config = DoubleConfig::from_value(json!({"test_unexpected_methods": false}))?;
    let double = session.mock::<StandardSubject>().with_config(config).instance()?;

    assert_eq!(double.config(), &config);
    assert_eq!(double.call("bar", [])?, json!("bar"));
    Ok(())
}

// ---- count ----

#[test]
fn test_count_zero() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.count(0)?;

    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_count_forms_accept_three_calls() -> TestResult {
    let forms: Vec<CountExpectation> = vec![
        CountExpectation::Exact(3),
        CountExpectation::parse("3")?,
        CountExpectation::parse(">2")?,
        CountExpectation::parse(">=3")?,
        CountExpectation::parse("<4")?,
        CountExpectation::parse("<=3")?,
        CountExpectation::satisfies(equal_to(3)),
        CountExpectation::inspect(|calls| {
            if calls.len() == 3 {
                Ok(())
            } else {
                Err(Failure::raised(format!("expected 3 calls, saw {}", calls.len())))
            }
        }),
    ];

    for form in forms {
        let session = Session::new();
        let double = mock(&session);
        double.method("foo")?.count(form.clone())?;

        for _ in 0..3 {
            assert_eq!(double.call("foo", [])?, json!("foo"));
        }
        assert!(session.verify().is_success(), "count {form:?} rejected three calls");
    }
    Ok(())
}

#[test]
fn test_count_from_strings_and_integers() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.count("3")?;
    double.method("bar")?.count(2)?;

    for _ in 0..3 {
        double.call("foo", [])?;
    }
    double.call("bar", [])?;
    double.call("bar", [])?;

    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_declaring_one_method_does_not_cancel_another_count() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?;
    double.method("bar")?.count(1)?;

    double.call("bar", [])?;

    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_invalid_count_rejected() {
    let session = Session::new();
    let double = mock(&session);

    for bad in ["", "abc", ">=", "=>3", "3.5"] {
        let err = double.method("foo").unwrap().count(bad).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCount(_)), "'{bad}' accepted");
    }
    assert!(matches!(
        double.method("foo").unwrap().count(-1),
        Err(ConfigError::InvalidCount(_))
    ));
}

#[test]
fn test_declared_method_is_not_counted_automatically() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?;

    assert_eq!(double.call("foo", [])?, json!("foo"));
    session.verify().assert_success();
    Ok(())
}

// ---- stub ----

#[test]
fn test_stub_with_value() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.stub("bar")?;

    assert_eq!(double.call("foo", [])?, json!("bar"));
    Ok(())
}

#[test]
fn test_stub_with_value_from_class_double() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    let replies = session.mock::<understudy_test_utils::Replies>().class()?;
    replies.method("return_value")?.stub("bar")?;

    double.method("foo")?.stub(replies.call("return_value", [json!("ignored")])?)?;
    assert_eq!(double.call("foo", [])?, json!("bar"));
    Ok(())
}

#[test]
fn test_stub_with_callback() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double
        .method("foo")?
        .stub(Reply::callback(|args| Ok(json!(format!("bar/{}", args.len())))))?;

    assert_eq!(double.call("foo", [json!(1), json!(2)])?, json!("bar/2"));
    Ok(())
}

#[test]
fn test_stub_on_second_call() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.stub_on("bar", 2)?;

    assert_eq!(double.call("foo", [])?, json!("foo"));
    assert_eq!(double.call("foo", [])?, json!("bar"));
    Ok(())
}

#[test]
fn test_stub_on_several_calls() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.stub_on("bar", [2, 3])?;

    assert_eq!(double.call("foo", [])?, json!("foo"));
    assert_eq!(double.call("foo", [])?, json!("bar"));
    assert_eq!(double.call("foo", [])?, json!("bar"));
    assert_eq!(double.call("foo", [])?, json!("foo"));
    Ok(())
}

#[test]
fn test_stub_on_call_zero_rejected() {
    let session = Session::new();
    let double = mock(&session);

    let err = double.method("foo").unwrap().stub_on("bar", 0).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidCallIndex(_)));
    assert!(matches!(
        double.method("foo").unwrap().stub_on("bar", Vec::<u32>::new()),
        Err(ConfigError::InvalidCallIndex(_))
    ));
}

#[test]
fn test_canned_replies() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.stub(Reply::argument(1))?;
    double.method("bar")?.stub(Reply::value_map([
        (vec![json!("en")], json!("hello")),
        (vec![json!("fr")], json!("bonjour")),
    ]))?;
    double.method("arg")?.stub(Reply::raise("boom"))?;

    assert_eq!(double.call("foo", [json!("a"), json!("b")])?, json!("b"));
    assert_eq!(double.call("bar", [json!("fr")])?, json!("bonjour"));
    assert_eq!(double.call("bar", [json!("de")])?, Value::Null);
    assert_eq!(double.call("arg", [json!(1)]).unwrap_err(), Failure::raised("boom"));
    Ok(())
}

#[test]
fn test_later_stub_wins_on_overlap() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.stub("first")?.stub_on("second", 2)?;

    assert_eq!(double.call("foo", [])?, json!("first"));
    assert_eq!(double.call("foo", [])?, json!("second"));
    assert_eq!(double.call("foo", [])?, json!("first"));
    Ok(())
}

// ---- dummy ----

#[test]
fn test_dummy() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.dummy()?;

    assert_eq!(double.call("foo", [])?, Value::Null);
    Ok(())
}

#[test]
fn test_dummy_on_second_call() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.dummy_on(2)?;

    assert_eq!(double.call("foo", [])?, json!("foo"));
    assert_eq!(double.call("foo", [])?, Value::Null);
    Ok(())
}

#[test]
fn test_dummy_on_several_calls() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.dummy_on([2, 3])?;

    assert_eq!(double.call("foo", [])?, json!("foo"));
    assert_eq!(double.call("foo", [])?, Value::Null);
    assert_eq!(double.call("foo", [])?, Value::Null);
    Ok(())
}

#[test]
fn test_dummy_on_call_zero_rejected() {
    let session = Session::new();
    let double = mock(&session);
    assert!(matches!(
        double.method("foo").unwrap().dummy_on(0),
        Err(ConfigError::InvalidCallIndex(_))
    ));
}

// ---- mock ----

#[test]
fn test_mock_on_dummy_double() -> TestResult {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().instance()?;
    double.method("foo")?.mock()?;

    assert_eq!(double.call("foo", [])?, json!("foo"));
    Ok(())
}

#[test]
fn test_mock_on_second_call() -> TestResult {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().instance()?;
    double.method("foo")?.mock_on(2)?;

    assert_eq!(double.call("foo", [])?, Value::Null);
    assert_eq!(double.call("foo", [])?, json!("foo"));
    Ok(())
}

#[test]
fn test_mock_on_several_calls() -> TestResult {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().instance()?;
    double.method("foo")?.mock_on([2, 3])?;

    assert_eq!(double.call("foo", [])?, Value::Null);
    assert_eq!(double.call("foo", [])?, json!("foo"));
    assert_eq!(double.call("foo", [])?, json!("foo"));
    Ok(())
}

#[test]
fn test_mock_on_call_zero_rejected() {
    let session = Session::new();
    let double = mock(&session);
    assert!(matches!(
        double.method("foo").unwrap().mock_on(0),
        Err(ConfigError::InvalidCallIndex(_))
    ));
}

#[test]
fn test_mock_on_hollow_double_rejected() {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().hollow().unwrap();
    assert!(matches!(
        double.method("foo").unwrap().mock(),
        Err(ConfigError::NoRealBody { .. })
    ));
}

// ---- arguments ----

#[test]
fn test_args_with_values() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.args(["arg_1", "arg_2"])?;

    double.call("foo", [json!("arg_1"), json!("arg_2")])?;
    Ok(())
}

#[test]
fn test_declaring_one_method_does_not_cancel_another_args() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?;
    double.method("bar")?.args(["arg_1", "arg_2"])?;

    double.call("bar", [json!("arg_1"), json!("arg_2")])?;
    assert!(double.call("bar", [json!("arg_1")]).is_err());
    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_args_none() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.args(())?;

    double.call("foo", [])?;
    assert!(double.call("foo", [json!(1)]).is_err());
    Ok(())
}

#[test]
fn test_args_with_constraints() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double
        .method("foo")?
        .args([Arg::satisfies(equal_to("arg_1")), Arg::satisfies(equal_to("arg_2"))])?;

    double.call("foo", [json!("arg_1"), json!("arg_2")])?;
    Ok(())
}

#[test]
fn test_args_with_callback() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.args(ArgsMatcher::inspect(|args| {
        if args == [json!("arg_1"), json!("arg_2")] {
            Ok(())
        } else {
            Err(Failure::raised(format!("unexpected {args:?}")))
        }
    }))?;

    double.call("foo", [json!("arg_1"), json!("arg_2")])?;
    let err = double.call("foo", [json!("arg_2")]).unwrap_err();
    assert!(matches!(err, Failure::ArgumentRejected { ordinal: 2, .. }));
    Ok(())
}

#[test]
fn test_args_on_second_call() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.args_on(["arg_1", "arg_2"], 2)?;

    double.call("foo", [])?;
    double.call("foo", [json!("arg_1"), json!("arg_2")])?;
    Ok(())
}

#[test]
fn test_args_on_several_calls() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.args_on(["arg_1", "arg_2"], [2, 3])?;

    double.call("foo", [])?;
    double.call("foo", [json!("arg_1"), json!("arg_2")])?;
    double.call("foo", [json!("arg_1"), json!("arg_2")])?;
    Ok(())
}

#[test]
fn test_args_ignore_trailing_arguments() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("arg")?.args([1])?.count(1)?;

    assert_eq!(double.call("arg", [json!(1), json!(false)])?, json!("bar"));
    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_args_beyond_arity_rejected() {
    let session = Session::new();
    let double = mock(&session);

    let err = double.method("foo").unwrap().args(["a", "b", "c"]).unwrap_err();
    assert_eq!(
        err,
        ConfigError::TooManyArguments {
            method: "foo".to_string(),
            arity: 2,
            given: 3,
        }
    );
}

#[test]
fn test_args_on_call_zero_rejected() {
    let session = Session::new();
    let double = mock(&session);
    assert!(matches!(
        double.method("foo").unwrap().args_on(["arg_1", "arg_2"], 0),
        Err(ConfigError::InvalidCallIndex(_))
    ));
}

#[test]
fn test_args_mismatch_fails_the_call_immediately() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.method("foo")?.args(["arg_1"])?;

    let err = double.call("foo", [json!("other")]).unwrap_err();
    assert_eq!(
        err,
        Failure::ArgumentMismatch {
            target: "StandardSubject".to_string(),
            method: "foo".to_string(),
            ordinal: 1,
            expected: "argument 1 \"arg_1\"".to_string(),
            actual: "\"other\"".to_string(),
        }
    );
    Ok(())
}

// ---- chains ----

#[test]
fn test_chain() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double
        .method("foo")?
        .count(2)?
        .args_on(["arg_1", "arg_2"], 1)?
        .args_on(["arg_3", "arg_4"], 2)?
        .stub_on("return_1", 1)?
        .stub_on("return_2", 2)?;

    assert_eq!(double.call("foo", [json!("arg_1"), json!("arg_2")])?, json!("return_1"));
    assert_eq!(double.call("foo", [json!("arg_3"), json!("arg_4")])?, json!("return_2"));
    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_collection_chain_applies_to_every_method() -> TestResult {
    let session = Session::new();
    let double = mock(&session);
    double.methods(["foo", "bar"])?.count(1)?.args(["x"])?.dummy()?;

    assert_eq!(double.call("foo", [json!("x")])?, Value::Null);
    assert_eq!(double.call("bar", [json!("x")])?, Value::Null);
    session.verify().assert_success();
    Ok(())
}

#[test]
fn test_collection_validates_before_editing() {
    let session = Session::new();
    let double = session.dummy::<StandardSubject>().hollow().unwrap();
    let collection = double.methods(["foo", "bar"]).unwrap();

    assert!(collection.mock().is_err());
    assert_eq!(double.call("foo", []).unwrap(), Value::Null);
}
