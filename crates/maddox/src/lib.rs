//! maddox: scenario-based mocking and verification for unit tests
//!
//! A [`Scenario`] drives one entry point of the code under test while its
//! collaborators are replaced by interceptors. Every intercepted call is
//! answered from a script declared up front and recorded; when the entry
//! point reaches its terminal event the recorded calls are checked against
//! the declared expectations and the first mismatch is reported as a
//! [`MaddoxError`] with a stable numeric [`ErrorCode`].
//!
//! # Features
//!
//! - **Four scenario kinds**: HTTP request handlers, callback-style,
//!   deferred-returning and synchronous entry points
//! - **Seven response styles**: synchronous, deferred or callback, as
//!   success or error, plus a sticky callback response
//! - **Ordered call ledgers** checked for parameters, arity and call counts
//! - **Assertion helpers** returning a `Result`, plus the `EMPTY_PARAMETERS`
//!   and `EMPTY_RESULT` constants
//! - **Chai-style diffs** with truncation of large values
//! - **Configuration** from TOML files and `MADDOX_*` environment variables
//!
//! # Example
//!
//! ```rust
//! use maddox::prelude::*;
//!
//! let repo = Object::new("Repo").with_method("find", |_| Ok(Dynamic::undefined()));
//! let r = repo.clone();
//! let service = Object::new("Service").with_method("name", move |args| r.call("find", args));
//!
//! let outcome = Scenario::from_synchronous()
//!     .mock_this_function("Repo", "find", &repo)?
//!     .with_entry_point(&service, "name")?
//!     .with_input_params(args![1])?
//!     .should_be_called_with("Repo", "find", args![1])?
//!     .does_return("Repo", "find", "Ada")?
//!     .test_without_callback()?;
//!
//! assert_eq!(outcome.to_value(), serde_json::json!("Ada"));
//! # Ok::<(), MaddoxError>(())
//! ```

pub mod compare;
pub mod config;
mod dynamic;
pub mod error;
pub mod http;
pub mod logging;
pub mod mock;
mod object;
pub mod prelude;
pub mod scenario;

pub use compare::{Comparator, DeepEqual};
pub use config::MaddoxConfig;
pub use dynamic::{CallResult, Callback, Deferred, Dynamic, EMPTY_PARAMETERS, EMPTY_RESULT};
pub use error::{ErrorClass, ErrorCode, ErrorKind, MaddoxError, Result};
pub use http::HttpRequest;
pub use object::{Interceptable, Method, Object, WeakObject};
pub use scenario::{Outcome, Phase, Scenario, ScenarioKind};
