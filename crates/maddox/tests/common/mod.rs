//! Shared fixtures for scenario integration tests.
//!
//! The fixtures mimic a small service: a stateless proxy with three lookups
//! of different completion styles, and controllers that assemble a person
//! from them for each entry-point style.

#![allow(dead_code)]

use std::cell::RefCell;

use futures::channel::oneshot;
use maddox::logging::init_logging;
use maddox::prelude::*;
use rand::Rng;
use serde_json::{Value, json};

/// Install a test log subscriber once per binary.
pub fn init() {
    let _ = init_logging(&LoggingConfig::new().level("maddox=debug"));
}

/// A random person id, so tests do not depend on a fixed literal.
pub fn person_id() -> String {
    format!("person-{}", rand::rng().random_range(1000..10_000))
}

/// A person with random names.
pub fn person() -> Value {
    const FIRST: [&str; 4] = ["Ada", "Grace", "Alan", "Edsger"];
    const LAST: [&str; 4] = ["Lovelace", "Hopper", "Turing", "Dijkstra"];
    let mut rng = rand::rng();
    json!({
        "firstName": FIRST[rng.random_range(0..FIRST.len())],
        "middleName": "Q",
        "lastName": LAST[rng.random_range(0..LAST.len())],
    })
}

/// The collaborator mocked in most scenarios.
///
/// Its real methods return recognisable values so tests can check that the
/// originals are back after a scenario.
pub fn proxy() -> Object {
    Object::new("StatelessEs6Proxy")
        .with_method("getFirstName", |_| Ok(Dynamic::from("real-first")))
        .with_method("getMiddleName", |_| Ok(Dynamic::from("real-middle")))
        .with_method("getLastName", |_| Ok(Dynamic::from("real-last")))
        .with_method("dummyFunction", |_| Ok(Dynamic::undefined()))
}

/// Call a callback-style method and wait for its error-first callback.
pub async fn call_with_callback(object: &Object, method: &str, mut args: Vec<Dynamic>) -> CallResult {
    let (tx, rx) = oneshot::channel::<Vec<Dynamic>>();
    let tx = RefCell::new(Some(tx));
    args.push(Dynamic::function(move |callback_args| {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(callback_args);
        }
    }));
    object.call(method, args)?;

    let callback_args = rx
        .await
        .map_err(|_| Dynamic::from("callback was never invoked"))?;
    let mut callback_args = callback_args.into_iter();
    let error = callback_args.next().unwrap_or_else(Dynamic::undefined);
    if !matches!(error, Dynamic::Value(Value::Null)) {
        return Err(error);
    }
    Ok(callback_args.next().unwrap_or_else(Dynamic::undefined))
}

/// First name by deferred, middle name by callback, last name synchronously.
pub async fn lookup(proxy: &Object, person_id: Value) -> CallResult {
    let first = proxy
        .call("getFirstName", args![person_id.clone()])?
        .settle()
        .await?;
    let middle = call_with_callback(proxy, "getMiddleName", args![person_id.clone()]).await?;
    let last = proxy.call("getLastName", args![person_id])?;
    Ok(json!({
        "firstName": first.to_value(),
        "middleName": middle.to_value(),
        "lastName": last.to_value(),
    })
    .into())
}

/// HTTP handler: `getPerson(req, res)` answers `res.status(..).send(..)`.
pub fn http_controller(proxy: &Object) -> Object {
    let proxy = proxy.clone();
    Object::new("PersonController").with_method("getPerson", move |args| {
        let mut args = args.into_iter();
        let req = args.next().unwrap_or_else(Dynamic::undefined);
        let res = args
            .next()
            .and_then(|res| res.as_object().cloned())
            .ok_or_else(|| Dynamic::from("no response object"))?;
        let person_id = req.to_value()["params"]["personId"].clone();
        let proxy = proxy.clone();

        Ok(Deferred::new(async move {
            let (status, body) = match lookup(&proxy, person_id).await {
                Ok(person) => (200, person),
                Err(error) => (404, error),
            };
            let chained = res.call("status", args![status])?;
            let chained = chained
                .as_object()
                .cloned()
                .ok_or_else(|| Dynamic::from("status did not chain"))?;
            chained.call("send", vec![body])
        })
        .into())
    })
}

/// Callback style: `getPersonWithCallback(personId, done)`.
pub fn callback_controller(proxy: &Object) -> Object {
    let proxy = proxy.clone();
    Object::new("PersonController").with_method("getPersonWithCallback", move |args| {
        let mut args = args.into_iter();
        let person_id = args.next().unwrap_or_else(Dynamic::undefined).to_value();
        let done = args
            .next()
            .and_then(|done| done.as_callback().cloned())
            .ok_or_else(|| Dynamic::from("no callback"))?;
        let proxy = proxy.clone();

        tokio::task::spawn_local(async move {
            match lookup(&proxy, person_id).await {
                Ok(person) => done.invoke(vec![Dynamic::from(Value::Null), person]),
                Err(error) => done.invoke(vec![error]),
            }
        });
        Ok(Dynamic::undefined())
    })
}

/// Deferred style: `getPersonWithPromise(personId)`.
pub fn promise_controller(proxy: &Object) -> Object {
    let proxy = proxy.clone();
    Object::new("PersonController").with_method("getPersonWithPromise", move |args| {
        let person_id = args
            .into_iter()
            .next()
            .unwrap_or_else(Dynamic::undefined)
            .to_value();
        let proxy = proxy.clone();
        Ok(Deferred::new(async move { lookup(&proxy, person_id).await }).into())
    })
}

/// Synchronous style: `getFullName(personId)` joins first and last name.
pub fn sync_controller(proxy: &Object) -> Object {
    let proxy = proxy.clone();
    Object::new("PersonController").with_method("getFullName", move |args| {
        let person_id = args.into_iter().next().unwrap_or_else(Dynamic::undefined);
        let first = proxy.call("getFirstName", vec![person_id.clone()])?;
        let last = proxy.call("getLastName", vec![person_id])?;
        Ok(Dynamic::from(format!(
            "{} {}",
            first.as_str().unwrap_or_default(),
            last.as_str().unwrap_or_default()
        )))
    })
}

/// Calls `dummyFunction` with no arguments, `times` times.
pub fn empty_actual_controller(proxy: &Object, times: usize) -> Object {
    let proxy = proxy.clone();
    Object::new("EmptyController").with_method("run", move |_| {
        for _ in 0..times {
            proxy.call("dummyFunction", Vec::new())?;
        }
        Ok(Dynamic::from(times as u64))
    })
}

/// Run a scenario through `test` and return what `done` received.
pub fn run(scenario: Scenario) -> maddox::Result<Outcome> {
    let mut received = None;
    let phase = scenario
        .test(|result| received = Some(result))
        .expect("scenario should pass its pre-run checks");
    let result = received.expect("done should be called");
    assert_eq!(phase == Phase::Verified, result.is_ok());
    result
}
