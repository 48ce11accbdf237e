//! HTTP-style scenarios.
//!
//! In an HTTP scenario the entry point is a request handler: it receives the
//! configured request values followed by a response mock, and the scenario
//! ends when the handler calls the declared response finisher
//! (`res.send(..)`, `res.json(..)`, ...).

pub mod request;
pub mod response;

pub use request::HttpRequest;
pub use response::{HTTP_RESPONSE_MOCK, HttpResponseSpec, RESPONSE_FINISHERS, is_finisher};
