//! Request values handed to HTTP entry points.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dynamic::Dynamic;

/// A request-shaped value with `params`, `query` and `body`.
///
/// ```rust
/// use maddox::http::HttpRequest;
///
/// let req = HttpRequest::new()
///     .param("personId", "abc123")
///     .query("homeState", "MN");
/// assert_eq!(req.params["personId"], "abc123");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequest {
    /// Route parameters.
    pub params: Map<String, Value>,
    /// Query string parameters.
    pub query: Map<String, Value>,
    /// Request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HttpRequest {
    /// Create an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Parse a request from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error when `value` is not request-shaped.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// The request as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("params".to_string(), Value::Object(self.params.clone()));
        object.insert("query".to_string(), Value::Object(self.query.clone()));
        if let Some(body) = &self.body {
            object.insert("body".to_string(), body.clone());
        }
        Value::Object(object)
    }
}

impl From<HttpRequest> for Dynamic {
    fn from(request: HttpRequest) -> Self {
        Self::Value(request.to_value())
    }
}

impl From<&HttpRequest> for Dynamic {
    fn from(request: &HttpRequest) -> Self {
        Self::Value(request.to_value())
    }
}
