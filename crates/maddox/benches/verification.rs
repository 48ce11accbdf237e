//! Benchmarks for comparison, verification and full scenario runs.
//!
//! Run with: `cargo bench --bench verification`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use maddox::compare::{Comparator, DeepEqual, deep_equal, verify};
use maddox::mock::{CallLedger, MockPair, ResponseSpec};
use maddox::prelude::*;
use serde_json::{Value, json};

fn person(i: usize) -> Value {
    json!({
        "personId": i,
        "name": {"first": "Ada", "last": "Lovelace"},
        "addresses": [{"city": "London", "zip": "W1"}, {"city": "Paris", "zip": "75001"}],
        "tags": ["a", "b", "c"],
    })
}

fn bench_deep_equal(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_equal");

    for size in [1usize, 10, 100] {
        let left = Value::Array((0..size).map(person).collect());
        let right = left.clone();
        group.bench_with_input(BenchmarkId::new("equal", size), &size, |b, _| {
            b.iter(|| deep_equal(black_box(&left), black_box(&right)));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_render");
    let actual = person(1);
    let expected = person(2);

    for threshold in [0usize, 40] {
        let comparator = DeepEqual::new().with_truncate_threshold(threshold);
        group.bench_with_input(BenchmarkId::new("threshold", threshold), &threshold, |b, _| {
            b.iter(|| comparator.diff(black_box(&actual), black_box(&expected)));
        });
    }

    group.finish();
}

fn ledger_with_calls(calls: usize) -> CallLedger {
    let pair = MockPair::new("Svc", "getX");
    let mut ledger = CallLedger::new();
    ledger.track(pair.clone());
    for i in 0..calls {
        let params = vec![Dynamic::from(person(i))];
        ledger.record_expected_params(&pair, params.clone());
        ledger.record_response(&pair, ResponseSpec::Immediate(Dynamic::undefined()));
        ledger.record_actual(&pair, params);
    }
    ledger
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    let comparator = DeepEqual::new();
    let responses = CallLedger::new();

    for calls in [1usize, 10, 100] {
        let ledger = ledger_with_calls(calls);
        group.bench_with_input(BenchmarkId::new("calls", calls), &calls, |b, _| {
            b.iter(|| verify(black_box(&ledger), &responses, &comparator));
        });
    }

    group.finish();
}

fn bench_scenario(c: &mut Criterion) {
    let svc = Object::new("Svc").with_method("getX", |_| Ok(Dynamic::undefined()));
    let s = svc.clone();
    let controller = Object::new("Controller").with_method("load", move |args| {
        let pending = s.call("getX", args)?;
        Ok(Deferred::new(pending.settle()).into())
    });

    c.bench_function("deferred_scenario", |b| {
        b.iter(|| {
            let scenario = Scenario::from_promise()
                .mock_this_function("Svc", "getX", &svc)
                .and_then(|s| s.with_entry_point(&controller, "load"))
                .and_then(|s| s.with_input_params(args![7]))
                .and_then(|s| s.should_be_called_with("Svc", "getX", args![7]))
                .and_then(|s| s.does_return_with_promise("Svc", "getX", "a"));
            let mut outcome = None;
            if let Ok(scenario) = scenario {
                let _ = scenario.test(|result| outcome = Some(result));
            }
            black_box(outcome)
        });
    });
}

criterion_group!(benches, bench_deep_equal, bench_render, bench_verify, bench_scenario);
criterion_main!(benches);
