//! Integration tests for callback and deferred scenarios.

mod common;

use std::time::Duration;

use common::{callback_controller, person, person_id, promise_controller, proxy, run};
use maddox::prelude::*;
use serde_json::{Value, json};

const PROXY: &str = "StatelessEs6Proxy";

fn mocked(scenario: Scenario, proxy: &Object) -> maddox::Result<Scenario> {
    scenario
        .mock_this_function(PROXY, "getFirstName", proxy)?
        .mock_this_function(PROXY, "getMiddleName", proxy)?
        .mock_this_function(PROXY, "getLastName", proxy)
}

fn answered(scenario: Scenario, id: &str, person: &Value) -> maddox::Result<Scenario> {
    scenario
        .should_be_called_with(PROXY, "getFirstName", args![id])?
        .does_return_with_promise(PROXY, "getFirstName", person["firstName"].clone())?
        .should_be_called_with(PROXY, "getMiddleName", args![id])?
        .does_return_with_callback(PROXY, "getMiddleName", args![Value::Null, person["middleName"].clone()])?
        .should_be_called_with(PROXY, "getLastName", args![id])?
        .does_return(PROXY, "getLastName", person["lastName"].clone())
}

/// Test a callback scenario completes with the callback's arguments.
#[test]
fn callback_scenario_completes() {
    common::init();
    let proxy = proxy();
    let id = person_id();
    let person = person();

    let scenario = mocked(Scenario::from_callback(), &proxy)
        .and_then(|s| s.with_entry_point(&callback_controller(&proxy), "getPersonWithCallback"))
        .and_then(|s| s.with_input_params(args![id.as_str()]))
        .and_then(|s| answered(s, &id, &person))
        .unwrap();

    let outcome = run(scenario).unwrap();
    assert_eq!(outcome.to_value(), json!([null, person]));
}

/// Test a deferred scenario resolves with the chained result.
#[test]
fn promise_scenario_resolves() {
    let proxy = proxy();
    let id = person_id();
    let person = person();

    let scenario = mocked(Scenario::from_promise(), &proxy)
        .and_then(|s| s.with_entry_point(&promise_controller(&proxy), "getPersonWithPromise"))
        .and_then(|s| s.with_input_params(args![id.as_str()]))
        .and_then(|s| answered(s, &id, &person))
        .unwrap();

    match run(scenario).unwrap() {
        Outcome::Resolved(value) => assert_eq!(value.to_value(), person),
        other => panic!("expected a resolved outcome, got {other:?}"),
    }
}

/// Test a rejection from a collaborator rejects the entry point.
#[test]
fn promise_scenario_rejects() {
    let proxy = proxy();
    let id = person_id();

    let scenario = mocked(Scenario::from_promise(), &proxy)
        .and_then(|s| s.with_entry_point(&promise_controller(&proxy), "getPersonWithPromise"))
        .and_then(|s| s.with_input_params(args![id.as_str()]))
        .and_then(|s| s.should_be_called_with(PROXY, "getFirstName", args![id.as_str()]))
        .and_then(|s| s.does_return_with_promise(PROXY, "getFirstName", "Ada"))
        .and_then(|s| s.does_error_with_callback(PROXY, "getMiddleName", args!["lookup failed"]))
        .unwrap();

    match run(scenario).unwrap() {
        Outcome::Rejected(error) => assert_eq!(error.as_str(), Some("lookup failed")),
        other => panic!("expected a rejected outcome, got {other:?}"),
    }
}

/// Test the basic deferred scenario: `Svc.getX(7)` resolving to `"a"`.
#[test]
fn deferred_value_is_chained() {
    let svc = Object::new("Svc").with_method("getX", |_| Ok(Dynamic::undefined()));
    let s = svc.clone();
    let controller = Object::new("Controller").with_method("load", move |args| {
        let pending = s.call("getX", args)?;
        Ok(Deferred::new(async move {
            let x = pending.settle().await;
            x.map(|x| Dynamic::from(format!("{}!", x.as_str().unwrap_or_default())))
        })
        .into())
    });

    let scenario = Scenario::from_promise()
        .mock_this_function("Svc", "getX", &svc)
        .and_then(|s| s.with_entry_point(&controller, "load"))
        .and_then(|s| s.with_input_params(args![7]))
        .and_then(|s| s.should_be_called_with("Svc", "getX", args![7]))
        .and_then(|s| s.does_return_with_promise("Svc", "getX", "a"))
        .unwrap();

    assert_eq!(run(scenario).unwrap().to_value(), json!("a!"));
}

/// Test a callback-style response without a callback argument.
#[test]
fn callback_response_needs_callback_argument() {
    let svc = Object::new("Svc").with_method("getX", |_| Ok(Dynamic::undefined()));
    let s = svc.clone();
    let controller = Object::new("Controller").with_method("load", move |mut args| {
        let done = args.pop();
        let outcome = s.call("getX", vec![Dynamic::from(7), Dynamic::from("not a function")]);
        if let Some(done) = done.as_ref().and_then(Dynamic::as_callback) {
            match outcome {
                Ok(value) => done.invoke(vec![Dynamic::from(Value::Null), value]),
                Err(error) => done.invoke(vec![error]),
            }
        }
        Ok(Dynamic::undefined())
    });

    let scenario = Scenario::from_callback()
        .mock_this_function("Svc", "getX", &svc)
        .and_then(|s| s.with_entry_point(&controller, "load"))
        .and_then(|s| s.does_return_with_callback("Svc", "getX", args![Value::Null, "a"]))
        .unwrap();

    let err = run(scenario).unwrap_err();
    assert_eq!(err.code().as_u16(), 3000);
    assert_eq!(
        err.to_string(),
        "Maddox Runtime Error (3000): When using 'doesReturnWithCallback' or 'doesErrorWithCallback' for Svc.getX the last parameter in the function must be the callback function."
    );
}

/// Test an always-callback response answers every later call.
#[test]
fn always_callback_answers_repeated_calls() {
    let proxy = proxy();
    let p = proxy.clone();
    let controller = Object::new("Batch").with_method("middleNames", move |args| {
        let p = p.clone();
        let done = args
            .last()
            .and_then(Dynamic::as_callback)
            .cloned()
            .ok_or_else(|| Dynamic::from("no callback"))?;
        tokio::task::spawn_local(async move {
            let mut names = Vec::new();
            for id in 0..3 {
                match common::call_with_callback(&p, "getMiddleName", args![id]).await {
                    Ok(name) => names.push(name),
                    Err(error) => return done.invoke(vec![error]),
                }
            }
            done.invoke(vec![Dynamic::from(Value::Null), Dynamic::List(names)]);
        });
        Ok(Dynamic::undefined())
    });

    let scenario = Scenario::from_callback()
        .mock_this_function(PROXY, "getMiddleName", &proxy)
        .and_then(|s| s.with_entry_point(&controller, "middleNames"))
        .and_then(|s| s.should_be_called_with(PROXY, "getMiddleName", args![0]))
        .and_then(|s| s.does_return_with_callback(PROXY, "getMiddleName", args![Value::Null, "first"]))
        .and_then(|s| {
            s.does_always_return_with_callback(PROXY, "getMiddleName", args![Value::Null, "later"])
        })
        .unwrap();

    let outcome = run(scenario).unwrap();
    assert_eq!(outcome.to_value(), json!([null, ["first", "later", "later"]]));
}

/// Test a second completion is a call-count failure.
#[test]
fn completing_twice_is_a_count_mismatch() {
    let controller = Object::new("Twice").with_method("run", |args| {
        if let Some(done) = args.last().and_then(Dynamic::as_callback) {
            done.invoke(vec![Dynamic::from(Value::Null)]);
            done.invoke(vec![Dynamic::from(Value::Null)]);
        }
        Ok(Dynamic::undefined())
    });

    let scenario = Scenario::from_callback()
        .with_entry_point(&controller, "run")
        .unwrap();
    let err = run(scenario).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Maddox Runtime Error (3002): Expected the mock Twice.run callback to be called 1 time(s), but it was actually called 2 time(s)."
    );
}

/// Test an entry point that never completes.
#[test]
fn never_completing_is_reported() {
    let silent = Object::new("Silent").with_method("run", |_| Ok(Dynamic::undefined()));
    let err = run(Scenario::from_callback().with_entry_point(&silent, "run").unwrap()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Maddox Runtime Error (3006): The entry point Silent.run finished without signalling completion."
    );
}

/// Test a pending deferred hits the configured timeout.
#[test]
fn pending_forever_times_out() {
    let hanging = Object::new("Hanging").with_method("run", |_| {
        Ok(Deferred::new(futures::future::pending::<CallResult>()).into())
    });
    let scenario = Scenario::from_promise()
        .with_config(MaddoxConfig::new().timeout(Duration::from_millis(50)))
        .with_entry_point(&hanging, "run")
        .unwrap();

    let err = run(scenario).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ScenarioTimeout);
    assert_eq!(
        err.to_string(),
        "Maddox Runtime Error (3005): The scenario did not complete within 50 ms."
    );
}

/// Test a mismatch found at completion is the single reported failure.
#[test]
fn first_mismatch_wins() {
    let proxy = proxy();
    let id = person_id();
    let person = person();

    let scenario = mocked(Scenario::from_promise(), &proxy)
        .and_then(|s| s.with_entry_point(&promise_controller(&proxy), "getPersonWithPromise"))
        .and_then(|s| s.with_input_params(args![id.as_str()]))
        .and_then(|s| s.should_be_called_with(PROXY, "getFirstName", args!["someone-else"]))
        .and_then(|s| s.does_return_with_promise(PROXY, "getFirstName", "Ada"))
        .and_then(|s| s.should_be_called_with(PROXY, "getMiddleName", args!["someone-else"]))
        .and_then(|s| s.does_return_with_callback(PROXY, "getMiddleName", args![Value::Null, "Q"]))
        .and_then(|s| s.should_be_called_with(PROXY, "getLastName", args![id.as_str()]))
        .and_then(|s| s.does_return(PROXY, "getLastName", person["lastName"].clone()))
        .unwrap();

    let err = run(scenario).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Maddox Comparison Error (3003): Failed expectation for the first param in mock StatelessEs6Proxy.getFirstName, the first time the mock was called ::::: expected '{id}' to deeply equal 'someone-else'"
        )
    );
    assert_eq!(
        err.debug(),
        Some(&json!({"actual": id, "expected": "someone-else"}))
    );
}

/// Test arity is checked when the call is made.
#[test]
fn wrong_arity_is_reported() {
    let svc = Object::new("Svc").with_method("getX", |_| Ok(Dynamic::undefined()));
    let s = svc.clone();
    let controller = Object::new("Controller").with_method("load", move |_| {
        let value = s.call("getX", args![1, 2, 3])?;
        Ok(Deferred::resolve_next_turn(value).into())
    });

    let scenario = Scenario::from_promise()
        .mock_this_function("Svc", "getX", &svc)
        .and_then(|s| s.with_entry_point(&controller, "load"))
        .and_then(|s| s.should_be_called_with("Svc", "getX", args![1, 2]))
        .and_then(|s| s.does_return("Svc", "getX", "x"))
        .unwrap();

    let err = run(scenario).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Maddox Runtime Error (3004): Expected the first call to Svc.getX to have 2 param(s), but it was actually called with 3 param(s)."
    );
}
