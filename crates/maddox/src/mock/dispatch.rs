//! Reply selection for intercepted calls.
//!
//! Planning and delivering are separate steps: planning needs the ledger
//! mutably, delivering may run production code (callbacks) that re-enters
//! other interceptors, so the ledger borrow must be released in between.

use tracing::debug;

use super::{CallLedger, MockPair, ResponseSpec};
use crate::dynamic::{CallResult, Callback, Deferred, Dynamic};
use crate::error::{MaddoxError, Result};

/// What an intercepted call does once the ledger has been updated.
#[derive(Debug)]
pub(crate) enum Reply {
    /// Return synchronously.
    Return(Dynamic),
    /// Throw synchronously.
    Throw(Dynamic),
    /// Invoke `callback` with `args` on a later turn, return undefined.
    Invoke(Callback, Vec<Dynamic>),
}

/// Record the call and decide how it completes.
///
/// Checks run in this order:
/// 1. an expectation exists for this call index (3001)
/// 2. a callback-style response has a trailing callback to invoke (3000)
/// 3. the arity matches the declared params (3004)
///
/// The call is recorded before the arity check so verification still sees
/// it if the error is ignored by production code.
pub(crate) fn plan_reply(
    ledger: &mut CallLedger,
    pair: &MockPair,
    mut args: Vec<Dynamic>,
) -> Result<Reply> {
    let index = ledger.total_actual(pair);
    let expected = ledger.expectation_at(pair, index)?;
    let Some(response) = expected.response else {
        return Err(MaddoxError::missing_mocked_data(&pair.to_string(), index));
    };

    let callback = if response.is_callback_style() {
        match args.last().and_then(Dynamic::as_callback).cloned() {
            Some(callback) => {
                args.pop();
                Some(callback)
            }
            None => return Err(MaddoxError::missing_callback(&pair.to_string())),
        }
    } else {
        None
    };

    let actual_len = args.len();
    ledger.record_actual(pair, args);
    debug!(%pair, index, style = response.style(), "intercepted call");

    if let Some(expected_params) = &expected.expected_params {
        if expected_params.len() != actual_len {
            return Err(MaddoxError::wrong_number_of_params(
                &pair.to_string(),
                index,
                expected_params.len(),
                actual_len,
            ));
        }
    }

    let reply = match (response, callback) {
        (ResponseSpec::Immediate(value), _) => Reply::Return(value),
        (ResponseSpec::ImmediateError(error), _) => Reply::Throw(error),
        (ResponseSpec::Deferred(value), _) => {
            Reply::Return(Deferred::resolve_next_turn(value).into())
        }
        (ResponseSpec::DeferredError(error), _) => {
            Reply::Return(Deferred::reject_next_turn(error).into())
        }
        (
            ResponseSpec::CallbackStyle(callback_args)
            | ResponseSpec::CallbackStyleError(callback_args)
            | ResponseSpec::AlwaysCallbackStyle(callback_args),
            Some(callback),
        ) => Reply::Invoke(callback, callback_args),
        (_, None) => return Err(MaddoxError::missing_callback(&pair.to_string())),
    };
    Ok(reply)
}

/// Carry out a planned reply.
///
/// Must run inside a `LocalSet`: callback replies are spawned onto it.
pub(crate) fn deliver(reply: Reply) -> CallResult {
    match reply {
        Reply::Return(value) => Ok(value),
        Reply::Throw(error) => Err(error),
        Reply::Invoke(callback, args) => {
            tokio::task::spawn_local(async move {
                tokio::task::yield_now().await;
                callback.invoke(args);
            });
            Ok(Dynamic::undefined())
        }
    }
}
