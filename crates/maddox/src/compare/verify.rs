//! The verification pass.
//!
//! Runs once per scenario, at the terminal event. The first failure wins:
//!
//! 1. parameters of every mocked call, pair by pair in registration order
//! 2. call counts of every mocked pair
//! 3. parameters of every call on the HTTP response mock
//! 4. call counts of response methods that had parameters declared
//!
//! Within one call the arity check precedes the value comparison.

use serde_json::json;
use tracing::debug;

use super::Comparator;
use crate::error::{MaddoxError, Result};
use crate::mock::{CallLedger, PairLedger};

/// Verify recorded calls against their expectations.
///
/// `responses` holds the calls made on the HTTP response mock; pass an
/// empty ledger for other scenario kinds.
///
/// # Errors
///
/// The first of `WrongNumberOfParams` (3004), `ComparisonShouldEqual`
/// (3003) or `MockCalledWrongNumberOfTimes` (3002) found, in the order
/// described in the module docs.
pub fn verify(
    calls: &CallLedger,
    responses: &CallLedger,
    comparator: &dyn Comparator,
) -> Result<()> {
    for (pair, ledger) in calls.iter() {
        let label = pair.to_string();
        check_params(ledger, &label, &label, comparator)?;
    }
    for (pair, ledger) in calls.iter() {
        check_count(ledger, &pair.to_string())?;
    }

    for (pair, ledger) in responses.iter() {
        let label = pair.to_string();
        let comparison_label = format!("{label} (i.e. res.{})", pair.method_name());
        check_params(ledger, &comparison_label, &label, comparator)?;
    }
    for (pair, ledger) in responses.iter() {
        if ledger.total_expected() > 0 {
            check_count(ledger, &pair.to_string())?;
        }
    }

    debug!("verification passed");
    Ok(())
}

fn check_params(
    ledger: &PairLedger,
    comparison_label: &str,
    label: &str,
    comparator: &dyn Comparator,
) -> Result<()> {
    for call in ledger.actual() {
        let Some(expected) = ledger
            .expected()
            .get(call.index)
            .and_then(|record| record.expected_params.as_ref())
        else {
            continue;
        };

        if expected.len() != call.actual_params.len() {
            return Err(MaddoxError::wrong_number_of_params(
                label,
                call.index,
                expected.len(),
                call.actual_params.len(),
            ));
        }

        for (param_index, (actual, wanted)) in call.actual_params.iter().zip(expected).enumerate() {
            let actual = actual.to_value();
            let wanted = wanted.to_value();
            if !comparator.equals(&actual, &wanted) {
                let diff = comparator.diff(&actual, &wanted);
                return Err(
                    MaddoxError::comparison(comparison_label, param_index, call.index, &diff)
                        .with_debug(json!({ "actual": actual, "expected": wanted })),
                );
            }
        }
    }
    Ok(())
}

fn check_count(ledger: &PairLedger, label: &str) -> Result<()> {
    let expected = ledger.total_expected();
    let actual = ledger.total_actual();
    if actual == expected || (ledger.accepts_extra_calls() && actual > expected) {
        return Ok(());
    }
    Err(MaddoxError::called_wrong_number_of_times(label, expected, actual))
}
