//! Per-pair ledgers of expected and actual calls.
//!
//! The expected side is one dense sequence of [`ExpectedCall`] records per
//! pair, filled by two independent cursors: `shouldBeCalledWith` sets the
//! parameters of the next record, the `does*` family sets its response.
//! Either cursor appends a fresh record when it runs past the end, so the
//! two kinds of statement can be interleaved in any order.

use std::collections::HashMap;

use tracing::trace;

use super::{MockPair, ResponseSpec};
use crate::dynamic::Dynamic;
use crate::error::{MaddoxError, Result};

/// One configured invocation of a mocked method.
#[derive(Debug, Clone)]
pub struct ExpectedCall {
    /// Zero-based position among calls to the same pair.
    pub index: usize,
    /// Parameters the call must receive, if declared.
    pub expected_params: Option<Vec<Dynamic>>,
    /// How the call completes, if declared.
    pub response: Option<ResponseSpec>,
}

impl ExpectedCall {
    const fn empty(index: usize) -> Self {
        Self {
            index,
            expected_params: None,
            response: None,
        }
    }
}

/// One observed invocation of a mocked method.
#[derive(Debug, Clone)]
pub struct ActualCall {
    /// Count of earlier calls to the same pair.
    pub index: usize,
    /// The arguments as received, minus a trailing callback for
    /// callback-style responses.
    pub actual_params: Vec<Dynamic>,
}

/// Ledger for a single pair.
#[derive(Debug, Clone, Default)]
pub struct PairLedger {
    expected: Vec<ExpectedCall>,
    params_cursor: usize,
    response_cursor: usize,
    always: Option<(usize, Vec<Dynamic>)>,
    actual: Vec<ActualCall>,
}

impl PairLedger {
    fn slot(&mut self, index: usize) -> &mut ExpectedCall {
        while self.expected.len() <= index {
            let next = self.expected.len();
            self.expected.push(ExpectedCall::empty(next));
        }
        &mut self.expected[index]
    }

    /// Set the parameters of the next record. Returns its index.
    pub fn record_expected_params(&mut self, params: Vec<Dynamic>) -> usize {
        let index = self.params_cursor;
        self.slot(index).expected_params = Some(params);
        self.params_cursor += 1;
        index
    }

    /// Set the response of the next record. Returns its index.
    ///
    /// An [`ResponseSpec::AlwaysCallbackStyle`] response does not occupy a
    /// record: it covers the current index and every later one that has no
    /// response of its own.
    pub fn record_response(&mut self, response: ResponseSpec) -> usize {
        let index = self.response_cursor;
        if let ResponseSpec::AlwaysCallbackStyle(args) = response {
            self.always = Some((index, args));
            return index;
        }
        self.slot(index).response = Some(response);
        self.response_cursor += 1;
        index
    }

    /// Append an actual call. Returns its index.
    pub fn record_actual(&mut self, params: Vec<Dynamic>) -> usize {
        let index = self.actual.len();
        self.actual.push(ActualCall {
            index,
            actual_params: params,
        });
        index
    }

    /// The record that answers call `index`, with any always-callback
    /// coverage applied. `None` when no response exists for it.
    #[must_use]
    pub fn resolve(&self, index: usize) -> Option<ExpectedCall> {
        let record = self.expected.get(index);
        if let Some(found) = record.filter(|r| r.response.is_some()) {
            return Some(found.clone());
        }
        let (from, args) = self.always.as_ref().filter(|(from, _)| index >= *from)?;
        trace!(index, from, "always-callback response covers call");
        Some(ExpectedCall {
            index,
            expected_params: record.and_then(|r| r.expected_params.clone()),
            response: Some(ResponseSpec::AlwaysCallbackStyle(args.clone())),
        })
    }

    /// The expected records, in index order.
    #[must_use]
    pub fn expected(&self) -> &[ExpectedCall] {
        &self.expected
    }

    /// The actual calls, in arrival order.
    #[must_use]
    pub fn actual(&self) -> &[ActualCall] {
        &self.actual
    }

    /// Number of expected records.
    #[must_use]
    pub fn total_expected(&self) -> usize {
        self.expected.len()
    }

    /// Number of actual calls.
    #[must_use]
    pub fn total_actual(&self) -> usize {
        self.actual.len()
    }

    /// Whether more calls than records are acceptable.
    #[must_use]
    pub const fn accepts_extra_calls(&self) -> bool {
        self.always.is_some()
    }
}

/// Ledgers for every pair in a scenario, kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct CallLedger {
    order: Vec<MockPair>,
    pairs: HashMap<MockPair, PairLedger>,
}

impl CallLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a pair. Tracking twice is a no-op.
    pub fn track(&mut self, pair: MockPair) {
        self.entry(&pair);
    }

    fn entry(&mut self, pair: &MockPair) -> &mut PairLedger {
        if !self.pairs.contains_key(pair) {
            self.order.push(pair.clone());
        }
        self.pairs.entry(pair.clone()).or_default()
    }

    /// Whether the pair is tracked.
    #[must_use]
    pub fn contains(&self, pair: &MockPair) -> bool {
        self.pairs.contains_key(pair)
    }

    /// The ledger for one pair.
    #[must_use]
    pub fn pair(&self, pair: &MockPair) -> Option<&PairLedger> {
        self.pairs.get(pair)
    }

    /// Every tracked pair with its ledger, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&MockPair, &PairLedger)> {
        self.order
            .iter()
            .filter_map(|pair| self.pairs.get(pair).map(|ledger| (pair, ledger)))
    }

    /// See [`PairLedger::record_expected_params`].
    pub fn record_expected_params(&mut self, pair: &MockPair, params: Vec<Dynamic>) -> usize {
        self.entry(pair).record_expected_params(params)
    }

    /// See [`PairLedger::record_response`].
    pub fn record_response(&mut self, pair: &MockPair, response: ResponseSpec) -> usize {
        self.entry(pair).record_response(response)
    }

    /// See [`PairLedger::record_actual`].
    pub fn record_actual(&mut self, pair: &MockPair, params: Vec<Dynamic>) -> usize {
        self.entry(pair).record_actual(params)
    }

    /// The expectation answering call `index` of `pair`.
    ///
    /// # Errors
    ///
    /// `MissingMockedData` (3001) when no response was configured for it.
    pub fn expectation_at(&self, pair: &MockPair, index: usize) -> Result<ExpectedCall> {
        self.pairs
            .get(pair)
            .and_then(|ledger| ledger.resolve(index))
            .ok_or_else(|| MaddoxError::missing_mocked_data(&pair.to_string(), index))
    }

    /// Expected record count for `pair`.
    #[must_use]
    pub fn total_expected(&self, pair: &MockPair) -> usize {
        self.pairs.get(pair).map_or(0, PairLedger::total_expected)
    }

    /// Actual call count for `pair`.
    #[must_use]
    pub fn total_actual(&self, pair: &MockPair) -> usize {
        self.pairs.get(pair).map_or(0, PairLedger::total_actual)
    }
}
