//! Scenario execution.
//!
//! A run owns a current-thread runtime and a `LocalSet`. The entry point is
//! spawned onto the set with interceptors installed; the set is driven until
//! every task it spawned has finished or the timeout elapses. Deferred
//! replies and callback deliveries all live on that one set, so a scenario
//! never needs `Send` values.
//!
//! Failures are latched: the first one raised by an interceptor or by the
//! verification pass is what the run reports, whatever happens afterwards.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::runtime::Builder;
use tokio::task::LocalSet;
use tracing::{debug, info, warn};

use super::{EntryPoint, Outcome, Phase, ScenarioKind};
use crate::compare::{Comparator, verify};
use crate::dynamic::Dynamic;
use crate::error::{MaddoxError, Result};
use crate::http::response::response_object;
use crate::http::{HTTP_RESPONSE_MOCK, HttpResponseSpec};
use crate::mock::dispatch::{deliver, plan_reply};
use crate::mock::{CallLedger, MockPair, MockRegistry};
use crate::object::Method;

/// Everything a validated scenario hands over for execution.
pub(crate) struct RunPlan {
    pub(crate) kind: ScenarioKind,
    pub(crate) registry: MockRegistry,
    pub(crate) ledger: CallLedger,
    pub(crate) entry: EntryPoint,
    pub(crate) args: Vec<Dynamic>,
    pub(crate) response: Option<HttpResponseSpec>,
    pub(crate) comparator: Rc<dyn Comparator>,
    pub(crate) timeout: Duration,
}

struct RunState {
    calls: CallLedger,
    responses: CallLedger,
    failure: Option<MaddoxError>,
    terminal: Option<Outcome>,
    extra_terminals: usize,
    thrown: Option<Dynamic>,
}

struct Shared {
    phase: Cell<Phase>,
    state: RefCell<RunState>,
    comparator: Rc<dyn Comparator>,
}

impl Shared {
    fn set_phase(&self, phase: Phase) {
        let previous = self.phase.replace(phase);
        info!(from = ?previous, to = ?phase, "scenario phase");
    }

    fn latch(&self, err: MaddoxError) {
        let mut state = self.state.borrow_mut();
        if state.failure.is_none() {
            warn!(code = err.code().as_u16(), "{err}");
            state.failure = Some(err);
        } else {
            debug!(code = err.code().as_u16(), "later failure ignored");
        }
    }

    /// The terminal event fired: keep the first outcome and verify.
    fn complete(&self, outcome: Outcome) {
        let mut state = self.state.borrow_mut();
        if state.terminal.is_some() {
            state.extra_terminals += 1;
            warn!(extra = state.extra_terminals, "terminal event fired again");
            return;
        }
        debug!(?outcome, "terminal event");
        state.terminal = Some(outcome);
        if state.failure.is_some() {
            return;
        }
        if let Err(err) = verify(&state.calls, &state.responses, self.comparator.as_ref()) {
            warn!(code = err.code().as_u16(), "{err}");
            state.failure = Some(err);
        }
    }

    fn entry_threw(&self, thrown: Dynamic) {
        let mut state = self.state.borrow_mut();
        if state.terminal.is_none() && state.thrown.is_none() {
            debug!(thrown = ?thrown, "entry point threw");
            state.thrown = Some(thrown);
        }
    }
}

fn interceptor(shared: &Rc<Shared>, pair: MockPair) -> Method {
    let shared = Rc::clone(shared);
    Rc::new(move |args: Vec<Dynamic>| {
        let planned = plan_reply(&mut shared.state.borrow_mut().calls, &pair, args);
        match planned {
            Ok(reply) => deliver(reply),
            Err(err) => {
                let thrown = Dynamic::from(err.to_string());
                shared.latch(err);
                Err(thrown)
            }
        }
    })
}

fn response_mock(shared: &Rc<Shared>, spec: &HttpResponseSpec, finisher: String) -> Dynamic {
    let shared = Rc::clone(shared);
    let methods = spec.method_names();
    let chained: Vec<String> = methods
        .iter()
        .filter(|method| spec.returns_self(method))
        .cloned()
        .collect();

    let res = response_object(&methods, move |res, method, args| {
        let pair = MockPair::new(HTTP_RESPONSE_MOCK, method);
        shared.state.borrow_mut().responses.record_actual(&pair, args.clone());
        debug!(%pair, "response method called");

        if method == finisher {
            shared.complete(Outcome::Finished {
                method: method.to_string(),
                args,
            });
            Ok(Dynamic::undefined())
        } else if chained.iter().any(|m| m == method) {
            Ok(Dynamic::Object(res.clone()))
        } else {
            Ok(Dynamic::undefined())
        }
    });
    Dynamic::Object(res)
}

fn completion_callback(shared: &Rc<Shared>) -> Dynamic {
    let shared = Rc::clone(shared);
    Dynamic::function(move |args| shared.complete(Outcome::CalledBack(args)))
}

async fn drive(shared: Rc<Shared>, kind: ScenarioKind, entry: EntryPoint, args: Vec<Dynamic>) {
    debug!(entry = %entry.label(), args = args.len(), "invoking entry point");
    let returned = entry.object().call(entry.method(), args);

    match (kind, returned) {
        (ScenarioKind::FromSynchronous, Ok(value)) => shared.complete(Outcome::Returned(value)),
        (ScenarioKind::FromSynchronous, Err(thrown)) => shared.complete(Outcome::Threw(thrown)),
        (ScenarioKind::FromPromise, Ok(value)) => match value.settle().await {
            Ok(resolved) => shared.complete(Outcome::Resolved(resolved)),
            Err(rejected) => shared.complete(Outcome::Rejected(rejected)),
        },
        (ScenarioKind::HttpRequest | ScenarioKind::FromCallback, Ok(value)) => {
            if let Err(thrown) = value.settle().await {
                shared.entry_threw(thrown);
            }
        }
        (_, Err(thrown)) => shared.entry_threw(thrown),
    }
}

/// How a run ended.
pub(crate) struct Report {
    pub(crate) phase: Phase,
    pub(crate) result: Result<Outcome>,
}

/// Run a validated scenario to its result.
///
/// Failing to set the run up counts as a failed run.
pub(crate) fn run(plan: RunPlan) -> Report {
    execute(plan).unwrap_or_else(|err| Report {
        phase: Phase::Failed,
        result: Err(err),
    })
}

fn execute(plan: RunPlan) -> Result<Report> {
    let RunPlan {
        kind,
        registry,
        ledger,
        entry,
        mut args,
        response,
        comparator,
        timeout,
    } = plan;

    let runtime = Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(MaddoxError::scheduler_unavailable)?;

    let responses = response
        .as_ref()
        .map(|spec| spec.expected().clone())
        .unwrap_or_default();
    let shared = Rc::new(Shared {
        phase: Cell::new(Phase::Building),
        state: RefCell::new(RunState {
            calls: ledger,
            responses,
            failure: None,
            terminal: None,
            extra_terminals: 0,
            thrown: None,
        }),
        comparator,
    });

    let entry_label = entry.label();
    let terminal_label = match (&response, kind) {
        (Some(spec), _) => {
            let finisher = spec.require_finisher()?.to_string();
            let label = format!("{HTTP_RESPONSE_MOCK}.{finisher}");
            args.push(response_mock(&shared, spec, finisher));
            label
        }
        (None, ScenarioKind::FromCallback) => {
            args.push(completion_callback(&shared));
            format!("{entry_label} callback")
        }
        (None, _) => entry_label.clone(),
    };

    let guard = registry.install(|target| interceptor(&shared, target.pair().clone()));
    shared.set_phase(Phase::Executing);

    let local = LocalSet::new();
    local.spawn_local(drive(Rc::clone(&shared), kind, entry, args));
    let drained = runtime.block_on(async move { tokio::time::timeout(timeout, local).await });
    drop(guard);
    drop(runtime);

    let timed_out = drained.is_err();
    if timed_out {
        debug!(timeout_ms = %timeout.as_millis(), "scenario timed out");
    }

    let result = conclude(&shared, timed_out, timeout, &entry_label, &terminal_label);
    shared.set_phase(if result.is_ok() {
        Phase::Verified
    } else {
        Phase::Failed
    });
    Ok(Report {
        phase: shared.phase.get(),
        result,
    })
}

fn conclude(
    shared: &Shared,
    timed_out: bool,
    timeout: Duration,
    entry_label: &str,
    terminal_label: &str,
) -> Result<Outcome> {
    let mut state = shared.state.borrow_mut();
    if let Some(failure) = state.failure.take() {
        return Err(failure);
    }

    if let Some(outcome) = state.terminal.take() {
        if state.extra_terminals > 0 {
            return Err(MaddoxError::called_wrong_number_of_times(
                terminal_label,
                1,
                1 + state.extra_terminals,
            ));
        }
        return Ok(outcome);
    }

    if let Some(thrown) = &state.thrown {
        return Err(MaddoxError::entry_point_threw(entry_label, &thrown.to_value()));
    }
    if timed_out {
        return Err(MaddoxError::scenario_timeout(timeout.as_millis()));
    }
    verify(&state.calls, &state.responses, shared.comparator.as_ref())?;
    Err(MaddoxError::missing_completion(entry_label))
}
