//! Dynamically typed values that cross mock boundaries.
//!
//! Production code under test talks to its collaborators through
//! [`Object`] method tables, passing and returning [`Dynamic`] values. A
//! `Dynamic` is either plain JSON-like data or one of the three things data
//! cannot express: an invocable [`Callback`], an [`Object`] (used for
//! chaining, e.g. `res.status(200).send(..)`) or a [`Deferred`] result.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use serde_json::Value;

use crate::object::Object;

/// Outcome of invoking a method: `Ok` is a return value, `Err` is a thrown value.
pub type CallResult = Result<Dynamic, Dynamic>;

/// An empty parameter list, for calls that take no arguments.
pub const EMPTY_PARAMETERS: Dynamic = Dynamic::List(Vec::new());

/// An empty result. Array-shaped, so it is also valid callback data.
pub const EMPTY_RESULT: Dynamic = Dynamic::List(Vec::new());

/// A value passed to or returned from an intercepted method.
#[derive(Clone)]
pub enum Dynamic {
    /// Plain data. `Null` doubles as "undefined".
    Value(Value),
    /// A positional list that may hold non-data members.
    List(Vec<Dynamic>),
    /// An invocable argument.
    Callback(Callback),
    /// An object with named methods.
    Object(Object),
    /// A future result.
    Deferred(Deferred),
}

impl Dynamic {
    /// The "undefined" value.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Value(Value::Null)
    }

    /// Wrap a closure as a callback value.
    pub fn function(f: impl Fn(Vec<Self>) + 'static) -> Self {
        Self::Callback(Callback::new(f))
    }

    /// Borrow the plain data, if this is data.
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Borrow a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Borrow the object, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Borrow the callback, if this is one.
    #[must_use]
    pub const fn as_callback(&self) -> Option<&Callback> {
        match self {
            Self::Callback(callback) => Some(callback),
            _ => None,
        }
    }

    /// Whether this value is array-shaped.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::List(_) | Self::Value(Value::Array(_)))
    }

    /// Split an array-shaped value into its members.
    ///
    /// Returns `None` for anything that is not array-shaped.
    #[must_use]
    pub fn into_list(self) -> Option<Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            Self::Value(Value::Array(items)) => Some(items.into_iter().map(Self::Value).collect()),
            _ => None,
        }
    }

    /// Lower to plain data for comparison and rendering.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Callback(_) => Value::String("[Function]".to_string()),
            Self::Object(object) => Value::String(format!("[Object {}]", object.name())),
            Self::Deferred(_) => Value::String("[Deferred]".to_string()),
        }
    }

    /// Wait for this value to settle.
    ///
    /// Non-deferred values settle immediately as `Ok(self)`.
    pub async fn settle(self) -> CallResult {
        match self {
            Self::Deferred(deferred) => deferred.await,
            other => Ok(other),
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Callback(_) => f.write_str("[Function]"),
            Self::Object(object) => write!(f, "[Object {}]", object.name()),
            Self::Deferred(_) => f.write_str("[Deferred]"),
        }
    }
}

impl From<Value> for Dynamic {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<&String> for Dynamic {
    fn from(value: &String) -> Self {
        Self::Value(Value::String(value.clone()))
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i32> for Dynamic {
    fn from(value: i32) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<i64> for Dynamic {
    fn from(value: i64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<u64> for Dynamic {
    fn from(value: u64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<f64> for Dynamic {
    fn from(value: f64) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<()> for Dynamic {
    fn from((): ()) -> Self {
        Self::undefined()
    }
}

impl From<Vec<Self>> for Dynamic {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<Callback> for Dynamic {
    fn from(callback: Callback) -> Self {
        Self::Callback(callback)
    }
}

impl From<Object> for Dynamic {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl From<&Object> for Dynamic {
    fn from(object: &Object) -> Self {
        Self::Object(object.clone())
    }
}

impl From<Deferred> for Dynamic {
    fn from(deferred: Deferred) -> Self {
        Self::Deferred(deferred)
    }
}

/// An invocable argument, error-first by convention.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(Vec<Dynamic>)>);

impl Callback {
    /// Wrap a closure.
    pub fn new(f: impl Fn(Vec<Dynamic>) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke with the given arguments.
    pub fn invoke(&self, args: Vec<Dynamic>) {
        (self.0)(args);
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Function]")
    }
}

/// A shareable future result, the analogue of a promise.
///
/// Cloning a `Deferred` yields another handle to the same settlement.
#[derive(Clone)]
pub struct Deferred(Shared<LocalBoxFuture<'static, CallResult>>);

impl Deferred {
    /// Wrap any local future.
    pub fn new(future: impl Future<Output = CallResult> + 'static) -> Self {
        Self(future.boxed_local().shared())
    }

    /// Resolve with `value` after yielding once to the scheduler.
    pub fn resolve_next_turn(value: impl Into<Dynamic>) -> Self {
        let value = value.into();
        Self::new(async move {
            tokio::task::yield_now().await;
            Ok(value)
        })
    }

    /// Reject with `error` after yielding once to the scheduler.
    pub fn reject_next_turn(error: impl Into<Dynamic>) -> Self {
        let error = error.into();
        Self::new(async move {
            tokio::task::yield_now().await;
            Err(error)
        })
    }

    /// Whether the result is already available.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.0.peek().is_some()
    }
}

impl IntoFuture for Deferred {
    type Output = CallResult;
    type IntoFuture = Shared<LocalBoxFuture<'static, CallResult>>;

    fn into_future(self) -> Self::IntoFuture {
        self.0
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// Build a `Vec<Dynamic>` argument list.
///
/// ```rust
/// use maddox::args;
///
/// let args = args![7, "seven", true];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Dynamic>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Dynamic::from($arg)),+]
    };
}
