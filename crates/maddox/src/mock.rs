//! Mock registration, call ledgers and response dispatch.
//!
//! This module holds the moving parts a [`Scenario`](crate::Scenario) uses
//! to intercept collaborator methods:
//!
//! - [`MockRegistry`]: which `(mockName, methodName)` pairs are mocked, and
//!   the scoped installation of interceptors over the owning objects
//! - [`CallLedger`]: per pair, the ordered expected calls and the actual calls
//! - [`ResponseSpec`]: how one configured call completes
//!
//! # Example
//!
//! ```rust
//! use maddox::mock::{CallLedger, MockPair, ResponseSpec};
//!
//! let pair = MockPair::new("Svc", "getX");
//! let mut ledger = CallLedger::new();
//! ledger.track(pair.clone());
//! ledger.record_expected_params(&pair, maddox::args![7]);
//! ledger.record_response(&pair, ResponseSpec::Immediate("a".into()));
//!
//! assert_eq!(ledger.total_expected(&pair), 1);
//! assert!(ledger.expectation_at(&pair, 0).is_ok());
//! ```

pub(crate) mod dispatch;
pub mod ledger;
pub mod registry;
pub mod response;

use std::fmt;

pub use ledger::{ActualCall, CallLedger, ExpectedCall, PairLedger};
pub use registry::{InstallGuard, MockRegistry, MockTarget};
pub use response::ResponseSpec;

/// Identifies one mocked method: `(mockName, methodName)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockPair {
    mock_name: String,
    method_name: String,
}

impl MockPair {
    /// Create a pair.
    pub fn new(mock_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            mock_name: mock_name.into(),
            method_name: method_name.into(),
        }
    }

    /// The mock key chosen by the test author.
    #[must_use]
    pub fn mock_name(&self) -> &str {
        &self.mock_name
    }

    /// The intercepted method.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }
}

impl fmt::Display for MockPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.mock_name, self.method_name)
    }
}
