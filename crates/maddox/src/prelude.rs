//! Convenient re-exports for writing scenarios.
//!
//! ```rust
//! use maddox::prelude::*;
//!
//! let scenario = Scenario::from_promise();
//! assert_eq!(scenario.kind(), ScenarioKind::FromPromise);
//! ```

pub use crate::args;
pub use crate::compare::{
    Assertion, AssertionError, AssertionResult, Comparator, DeepEqual, should_be_falsy, should_be_truthy,
    should_be_unreachable, should_equal,
};
pub use crate::config::{LogFormat, LoggingConfig, MaddoxConfig};
pub use crate::dynamic::{CallResult, Callback, Deferred, Dynamic, EMPTY_PARAMETERS, EMPTY_RESULT};
pub use crate::error::{ErrorCode, MaddoxError, Result};
pub use crate::http::HttpRequest;
pub use crate::logging::init_logging;
pub use crate::object::{Interceptable, Object};
pub use crate::scenario::{Outcome, Phase, Scenario, ScenarioKind};
