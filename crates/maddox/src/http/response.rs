//! The HTTP response mock.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde_json::json;

use crate::dynamic::{CallResult, Dynamic};
use crate::error::{ErrorCode, MaddoxError, Result};
use crate::mock::{CallLedger, MockPair};
use crate::object::Object;

/// Mock name used in labels for the response object.
pub const HTTP_RESPONSE_MOCK: &str = "HttpResponseMock";

/// Response methods that end the handler's work.
pub const RESPONSE_FINISHERS: [&str; 8] = [
    "send",
    "json",
    "jsonp",
    "redirect",
    "sendFile",
    "render",
    "sendStatus",
    "end",
];

/// Whether `method` is a response finisher.
#[must_use]
pub fn is_finisher(method: &str) -> bool {
    RESPONSE_FINISHERS.contains(&method)
}

/// The `ExactlyOneResponseFinisher` error with the finisher list attached.
#[must_use]
pub fn finisher_error() -> MaddoxError {
    MaddoxError::from_code(ErrorCode::ExactlyOneResponseFinisher)
        .with_debug(json!({ "responseFinishers": RESPONSE_FINISHERS }))
}

/// Declared expectations for the response mock.
#[derive(Debug, Clone, Default)]
pub struct HttpResponseSpec {
    expected: CallLedger,
    referenced: Vec<String>,
    returns_self: BTreeSet<String>,
    finisher: Option<String>,
}

impl HttpResponseSpec {
    /// Create an empty spec.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn reference(&mut self, method: &str) {
        if !self.referenced.iter().any(|m| m == method) {
            self.referenced.push(method.to_string());
        }
    }

    /// Declare the parameters of the next call to `method`.
    ///
    /// # Errors
    ///
    /// `ExactlyOneResponseFinisher` (4002) when `method` is a finisher and a
    /// different finisher was already declared.
    pub fn expect_call(&mut self, method: &str, params: Vec<Dynamic>) -> Result<()> {
        if is_finisher(method) {
            match &self.finisher {
                Some(declared) if declared != method => return Err(finisher_error()),
                Some(_) => {}
                None => self.finisher = Some(method.to_string()),
            }
        }
        self.reference(method);
        self.expected
            .record_expected_params(&MockPair::new(HTTP_RESPONSE_MOCK, method), params);
        Ok(())
    }

    /// Make every call to `method` return the response object.
    pub fn return_self(&mut self, method: &str) {
        self.reference(method);
        self.returns_self.insert(method.to_string());
    }

    /// The declared finisher.
    #[must_use]
    pub fn finisher(&self) -> Option<&str> {
        self.finisher.as_deref()
    }

    /// The declared finisher.
    ///
    /// # Errors
    ///
    /// `ExactlyOneResponseFinisher` (4002) when none was declared.
    pub fn require_finisher(&self) -> Result<&str> {
        self.finisher().ok_or_else(finisher_error)
    }

    /// Whether calls to `method` return the response object.
    #[must_use]
    pub fn returns_self(&self, method: &str) -> bool {
        self.returns_self.contains(method)
    }

    /// Every method the response mock exposes: the finishers, then any
    /// other method referenced by a declaration.
    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = RESPONSE_FINISHERS.iter().map(ToString::to_string).collect();
        for method in &self.referenced {
            if !is_finisher(method) {
                names.push(method.clone());
            }
        }
        names
    }

    /// Declared parameters, keyed by `HttpResponseMock.<method>`.
    #[must_use]
    pub fn expected(&self) -> &CallLedger {
        &self.expected
    }
}

/// Build the response object.
///
/// Every method forwards to `on_call` with the object itself, the method
/// name and the arguments. The object only holds itself weakly.
pub fn response_object(
    methods: &[String],
    on_call: impl Fn(&Object, &str, Vec<Dynamic>) -> CallResult + 'static,
) -> Object {
    let object = Object::new(HTTP_RESPONSE_MOCK);
    let on_call = Rc::new(on_call);
    for method in methods {
        let weak = object.downgrade();
        let on_call = Rc::clone(&on_call);
        let name = method.clone();
        object.define(method.clone(), move |args| match weak.upgrade() {
            Some(res) => on_call(&res, &name, args),
            None => Err(Dynamic::from(format!(
                "{HTTP_RESPONSE_MOCK}.{name} called after the scenario ended"
            ))),
        });
    }
    object
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::args;

    #[test]
    fn second_distinct_finisher_is_rejected() {
        let mut spec = HttpResponseSpec::new();
        spec.expect_call("send", args!["a"]).unwrap();
        spec.expect_call("send", args!["b"]).unwrap();
        spec.expect_call("status", args![200]).unwrap();
        let err = spec.expect_call("json", args!["c"]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ExactlyOneResponseFinisher);
        assert!(err.report().contains(
            "\"responseFinishers\": [\n    \"send\",\n    \"json\",\n    \"jsonp\",\n    \"redirect\",\n    \"sendFile\",\n    \"render\",\n    \"sendStatus\",\n    \"end\"\n  ]"
        ));
        assert_eq!(spec.finisher(), Some("send"));
    }

    #[test]
    fn missing_finisher_is_an_error() {
        let spec = HttpResponseSpec::new();
        assert_eq!(
            spec.require_finisher().unwrap_err().code(),
            ErrorCode::ExactlyOneResponseFinisher
        );
    }

    #[test]
    fn method_names_cover_finishers_and_references() {
        let mut spec = HttpResponseSpec::new();
        spec.return_self("status");
        spec.expect_call("set", args!["X-Id", "1"]).unwrap();
        spec.expect_call("status", args![200]).unwrap();
        let names = spec.method_names();
        assert_eq!(names.len(), RESPONSE_FINISHERS.len() + 2);
        assert_eq!(&names[8..], ["status".to_string(), "set".to_string()]);
        assert!(spec.returns_self("status"));
        assert!(!spec.returns_self("set"));
    }

    #[test]
    fn response_object_forwards_calls_with_itself() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let res = response_object(&["status".to_string(), "send".to_string()], move |res, method, args| {
            sink.borrow_mut().push((method.to_string(), Dynamic::List(args).to_value()));
            if method == "status" {
                Ok(Dynamic::from(res))
            } else {
                Ok(Dynamic::undefined())
            }
        });

        let chained = res.call("status", args![200]).unwrap();
        let chained = chained.as_object().unwrap();
        assert!(chained.ptr_eq(&res));
        chained.call("send", args!["ok"]).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                ("status".to_string(), json!([200])),
                ("send".to_string(), json!(["ok"])),
            ]
        );
    }
}
