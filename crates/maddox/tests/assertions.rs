//! Integration tests for the assertion helpers and empty constants.

mod common;

use common::{empty_actual_controller, proxy};
use maddox::prelude::*;
use serde_json::json;

const PROXY: &str = "StatelessEs6Proxy";

const MISSING_MOCK: &str = "Maddox Scenario Build Error (2000): You must declare the mock StatelessEs6Proxy.someNotMockedFunction, using 'mockThisFunction' before declaring return values.";

/// Test an empty result still reaches the registration check.
#[test]
fn empty_result_on_unregistered_mock() -> AssertionResult {
    match Scenario::from_promise().does_return(PROXY, "someNotMockedFunction", EMPTY_RESULT) {
        Ok(_) => should_be_unreachable(),
        Err(err) => should_equal(err.to_string(), MISSING_MOCK),
    }
}

/// Test an empty result is accepted as callback data.
#[test]
fn empty_result_as_callback_data() -> AssertionResult {
    let proxy = proxy();
    let configured = Scenario::from_callback()
        .mock_this_function(PROXY, "getFirstName", &proxy)?
        .does_return_with_callback(PROXY, "someNotMockedFunction", EMPTY_RESULT);
    match configured {
        Ok(_) => should_be_unreachable(),
        Err(err) => should_equal(err.to_string(), MISSING_MOCK),
    }
}

/// Test empty parameters match a call made without arguments.
#[test]
fn empty_parameters_match_no_arguments() -> AssertionResult {
    let proxy = proxy();
    let outcome = Scenario::from_synchronous()
        .mock_this_function(PROXY, "dummyFunction", &proxy)?
        .with_entry_point(&empty_actual_controller(&proxy, 1), "run")?
        .should_be_called_with(PROXY, "dummyFunction", EMPTY_PARAMETERS)?
        .does_return(PROXY, "dummyFunction", EMPTY_RESULT)?
        .test_without_callback()?;

    should_equal(outcome.to_value(), 1)?;
    should_be_truthy(outcome.to_value())
}

/// Test scenario errors propagate through assertion-returning tests.
#[test]
fn scenario_errors_convert() {
    fn configure() -> AssertionResult {
        Scenario::from_promise().should_be_called_with(PROXY, "getFirstName", "not a list")?;
        should_be_unreachable()
    }

    match configure() {
        Err(AssertionError::Scenario(err)) => {
            assert_eq!(err.code(), ErrorCode::ShouldBeCalledWithParamsArray);
        }
        other => panic!("expected a scenario error, got {other:?}"),
    }
}

/// Test an unexpected maddox error is surfaced instead of a diff.
#[test]
fn unexpected_maddox_error_passes_through() {
    let err = Scenario::from_callback()
        .test_without_callback()
        .unwrap_err()
        .to_string();

    let failure = should_equal(err.as_str(), MISSING_MOCK).unwrap_err();
    assert!(matches!(failure, AssertionError::PassThrough(_)));
    assert_eq!(failure.to_string(), err);
    assert!(failure.debug().is_none());
}

/// Test failures carry the compared values.
#[test]
fn failure_debug_payload() {
    let failure = Assertion::new(json!({"firstName": "Ada"}))
        .message("person")
        .equals(json!({"firstName": "Grace"}))
        .unwrap_err();
    assert_eq!(
        failure.to_string(),
        "person: expected { firstName: 'Ada' } to deeply equal { firstName: 'Grace' }"
    );
    assert_eq!(
        failure.debug(),
        Some(&json!({"actual": {"firstName": "Ada"}, "expected": {"firstName": "Grace"}}))
    );
}

/// Test the unreachable marker after a call that should have failed.
#[test]
fn unreachable_marker_fails() {
    let failure = should_be_unreachable().unwrap_err();
    assert_eq!(
        failure.to_string(),
        "It should be impossible to reach this code.: expected false to deeply equal true"
    );
    assert!(should_be_falsy(EMPTY_PARAMETERS).is_err());
    assert!(should_be_falsy(json!(null)).is_ok());
}
