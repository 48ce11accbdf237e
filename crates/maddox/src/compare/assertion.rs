//! Assertion helpers for test bodies.
//!
//! These return a [`Result`] instead of panicking, so a test can propagate
//! them with `?` alongside scenario errors:
//!
//! ```rust
//! use maddox::compare::{AssertionResult, should_be_truthy, should_equal};
//! use serde_json::json;
//!
//! fn check() -> AssertionResult {
//!     should_equal(json!({"a": 1}), json!({"a": 1.0}))?;
//!     should_be_truthy("non-empty")?;
//!     Ok(())
//! }
//! # check().unwrap();
//! ```
//!
//! Failures read like the verification messages and carry the same
//! `{actual, expected}` debug payload unless it is switched off.

use serde_json::{Value, json};
use thiserror::Error;

use super::{Comparator, DeepEqual};
use crate::dynamic::Dynamic;
use crate::error::{ErrorClass, MaddoxError};

const UNREACHABLE: &str = "It should be impossible to reach this code.";

/// A failed assertion.
#[derive(Debug, Clone, Error)]
pub enum AssertionError {
    /// The values did not satisfy the assertion.
    #[error("{message}")]
    Failed {
        /// The rendered failure.
        message: String,
        /// Structured `{actual, expected}` payload.
        debug: Option<Value>,
    },

    /// `actual` was itself a rendered build or runtime error, surfaced as is.
    #[error("{0}")]
    PassThrough(String),

    /// A scenario error propagated through an assertion-returning test.
    #[error(transparent)]
    Scenario(#[from] MaddoxError),
}

impl AssertionError {
    /// The structured debug payload, if any.
    #[must_use]
    pub fn debug(&self) -> Option<&Value> {
        match self {
            Self::Failed { debug, .. } => debug.as_ref(),
            Self::PassThrough(_) => None,
            Self::Scenario(err) => err.debug(),
        }
    }
}

/// What every assertion returns.
pub type AssertionResult = Result<(), AssertionError>;

/// One assertion about `actual`, with an optional message prefix.
#[derive(Debug, Clone)]
pub struct Assertion {
    actual: Value,
    message: Option<String>,
    debug: bool,
    comparator: DeepEqual,
}

impl Assertion {
    /// Start an assertion about `actual`.
    pub fn new(actual: impl Into<Dynamic>) -> Self {
        Self {
            actual: actual.into().to_value(),
            message: None,
            debug: true,
            comparator: DeepEqual::new(),
        }
    }

    /// Prefix failures with `message`.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Leave the debug payload off failures.
    #[must_use]
    pub const fn without_debug(mut self) -> Self {
        self.debug = false;
        self
    }

    /// `actual` deeply equals `expected`.
    ///
    /// # Errors
    ///
    /// [`AssertionError::PassThrough`] when the values differ and `actual`
    /// is a rendered maddox build or runtime error, otherwise
    /// [`AssertionError::Failed`].
    pub fn equals(self, expected: impl Into<Dynamic>) -> AssertionResult {
        let expected = expected.into().to_value();
        if self.comparator.equals(&self.actual, &expected) {
            return Ok(());
        }
        if let Some(rendered) = maddox_error_text(&self.actual) {
            return Err(AssertionError::PassThrough(rendered.to_string()));
        }
        let diff = self.comparator.diff(&self.actual, &expected);
        Err(self.fail(&diff, expected))
    }

    /// `actual` is truthy.
    ///
    /// # Errors
    ///
    /// [`AssertionError::Failed`] when it is not.
    pub fn is_truthy(self) -> AssertionResult {
        if truthy(&self.actual) {
            return Ok(());
        }
        let text = format!("expected {} to be truthy", self.comparator.render(&self.actual));
        Err(self.fail(&text, Value::from("Some Truthy Value.")))
    }

    /// `actual` is falsy.
    ///
    /// # Errors
    ///
    /// [`AssertionError::Failed`] when it is not.
    #[doc(alias = "is_falsey")]
    pub fn is_falsy(self) -> AssertionResult {
        if !truthy(&self.actual) {
            return Ok(());
        }
        let text = format!("expected {} to be falsy", self.comparator.render(&self.actual));
        Err(self.fail(&text, Value::from("Some Falsey Value.")))
    }

    fn fail(self, text: &str, expected: Value) -> AssertionError {
        let message = match &self.message {
            Some(prefix) => format!("{prefix}: {text}"),
            None => text.to_string(),
        };
        let debug = self
            .debug
            .then(|| json!({"actual": self.actual, "expected": expected}));
        AssertionError::Failed { message, debug }
    }
}

/// Assert `actual` deeply equals `expected`.
///
/// # Errors
///
/// See [`Assertion::equals`].
pub fn should_equal(actual: impl Into<Dynamic>, expected: impl Into<Dynamic>) -> AssertionResult {
    Assertion::new(actual).equals(expected)
}

/// Assert `value` is truthy: anything except `null`, `false`, `0` and `""`.
///
/// # Errors
///
/// See [`Assertion::is_truthy`].
pub fn should_be_truthy(value: impl Into<Dynamic>) -> AssertionResult {
    Assertion::new(value).is_truthy()
}

/// Assert `value` is falsy.
///
/// # Errors
///
/// See [`Assertion::is_falsy`].
#[doc(alias = "should_be_falsey")]
pub fn should_be_falsy(value: impl Into<Dynamic>) -> AssertionResult {
    Assertion::new(value).is_falsy()
}

/// Always fails. Put it after a call that is expected to fail.
///
/// # Errors
///
/// Always, without a debug payload.
pub fn should_be_unreachable() -> AssertionResult {
    Assertion::new(false)
        .message(UNREACHABLE)
        .without_debug()
        .equals(true)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn maddox_error_text(value: &Value) -> Option<&str> {
    let text = value.as_str()?;
    [ErrorClass::ScenarioBuild, ErrorClass::Runtime]
        .iter()
        .any(|class| text.starts_with(&class.to_string()))
        .then_some(text)
}
