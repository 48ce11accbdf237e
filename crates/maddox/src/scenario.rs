//! The scenario builder.
//!
//! A [`Scenario`] is configured fluently, then executed once:
//!
//! 1. register the collaborator methods to intercept (`mock_this_function`)
//! 2. declare, call by call, what each mock receives (`should_be_called_with`)
//!    and how it answers (`does_return*`, `does_error*`)
//! 3. name the entry point and its input
//! 4. run it with [`Scenario::test`]
//!
//! Every configuration call validates its arguments eagerly and returns the
//! scenario back, or the build error that the argument caused.
//!
//! # Example
//!
//! ```rust
//! use maddox::{Deferred, Dynamic, Object, Outcome, Scenario, args};
//!
//! let service = Object::new("Svc").with_method("getX", |_| Ok(Dynamic::undefined()));
//!
//! let svc = service.clone();
//! let controller = Object::new("Controller").with_method("load", move |args| {
//!     let pending = svc.call("getX", args)?;
//!     Ok(Deferred::new(async move {
//!         let x = pending.settle().await;
//!         x.map(|x| Dynamic::from(format!("got {}", x.as_str().unwrap_or_default())))
//!     })
//!     .into())
//! });
//!
//! let mut outcome = None;
//! Scenario::from_promise()
//!     .mock_this_function("Svc", "getX", &service)?
//!     .with_entry_point(&controller, "load")?
//!     .with_input_params(args![7])?
//!     .should_be_called_with("Svc", "getX", args![7])?
//!     .does_return_with_promise("Svc", "getX", "a")?
//!     .test(|result| outcome = Some(result))?;
//!
//! match outcome {
//!     Some(Ok(Outcome::Resolved(value))) => assert_eq!(value.as_str(), Some("got a")),
//!     other => panic!("unexpected {other:?}"),
//! }
//! # Ok::<(), maddox::MaddoxError>(())
//! ```

mod runner;

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, info};

use crate::compare::{Comparator, DeepEqual};
use crate::config::MaddoxConfig;
use crate::dynamic::Dynamic;
use crate::error::{ErrorCode, MaddoxError, Result};
use crate::http::HttpResponseSpec;
use crate::mock::{CallLedger, MockPair, MockRegistry, ResponseSpec};
use crate::object::{Interceptable, Object};

/// The entry-point style a scenario drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioKind {
    /// A request handler `(req.., res)` that ends by calling a response finisher.
    HttpRequest,
    /// A function whose last argument is an error-first completion callback.
    FromCallback,
    /// A function returning a [`Deferred`](crate::Deferred).
    FromPromise,
    /// A function that returns or throws.
    FromSynchronous,
}

impl ScenarioKind {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::HttpRequest => "http-request",
            Self::FromCallback => "from-callback",
            Self::FromPromise => "from-promise",
            Self::FromSynchronous => "from-synchronous",
        }
    }
}

/// Lifecycle of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Accepting configuration.
    Building,
    /// The entry point is running with interceptors installed.
    Executing,
    /// Verification passed.
    Verified,
    /// A failure was reported.
    Failed,
}

/// What the entry point produced at its terminal event.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A synchronous entry point returned.
    Returned(Dynamic),
    /// A synchronous entry point threw.
    Threw(Dynamic),
    /// The returned deferred resolved.
    Resolved(Dynamic),
    /// The returned deferred rejected.
    Rejected(Dynamic),
    /// The completion callback was invoked with these arguments.
    CalledBack(Vec<Dynamic>),
    /// The response finisher was called.
    Finished {
        /// The finisher's name, e.g. `"send"`.
        method: String,
        /// Its arguments.
        args: Vec<Dynamic>,
    },
}

impl Outcome {
    /// Lower to plain data: single values as themselves, argument lists as arrays.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Returned(value)
            | Self::Threw(value)
            | Self::Resolved(value)
            | Self::Rejected(value) => value.to_value(),
            Self::CalledBack(args) | Self::Finished { args, .. } => {
                Value::Array(args.iter().map(Dynamic::to_value).collect())
            }
        }
    }
}

/// The function a scenario drives.
#[derive(Debug, Clone)]
pub struct EntryPoint {
    object: Object,
    method: String,
}

impl EntryPoint {
    /// The object holding the entry point.
    #[must_use]
    pub const fn object(&self) -> &Object {
        &self.object
    }

    /// The entry point's method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// `Object.method`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}.{}", self.object.name(), self.method)
    }
}

/// A configurable mock-and-verify scenario.
pub struct Scenario {
    kind: ScenarioKind,
    registry: MockRegistry,
    ledger: CallLedger,
    entry_point: Option<EntryPoint>,
    input_params: Vec<Dynamic>,
    http_request: Option<Vec<Dynamic>>,
    response: HttpResponseSpec,
    comparator: Option<Rc<dyn Comparator>>,
    config: MaddoxConfig,
}

fn string_arg(value: Dynamic, code: ErrorCode) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| MaddoxError::from_code(code))
}

fn list_arg(value: Dynamic, code: ErrorCode) -> Result<Vec<Dynamic>> {
    value.into_list().ok_or_else(|| MaddoxError::from_code(code))
}

fn object_arg(value: Dynamic, code: ErrorCode) -> Result<Object> {
    match value {
        Dynamic::Object(object) => Ok(object),
        _ => Err(MaddoxError::from_code(code)),
    }
}

fn names(
    mock_name: Dynamic,
    func_name: Dynamic,
    mock_code: ErrorCode,
    func_code: ErrorCode,
) -> Result<(String, String)> {
    Ok((string_arg(mock_name, mock_code)?, string_arg(func_name, func_code)?))
}

impl Scenario {
    /// Create an empty scenario of the given kind.
    #[must_use]
    pub fn new(kind: ScenarioKind) -> Self {
        Self {
            kind,
            registry: MockRegistry::new(),
            ledger: CallLedger::new(),
            entry_point: None,
            input_params: Vec::new(),
            http_request: None,
            response: HttpResponseSpec::new(),
            comparator: None,
            config: MaddoxConfig::default(),
        }
    }

    /// A scenario driving an HTTP request handler.
    #[must_use]
    pub fn http_request() -> Self {
        Self::new(ScenarioKind::HttpRequest)
    }

    /// A scenario driving a callback-style function.
    #[must_use]
    pub fn from_callback() -> Self {
        Self::new(ScenarioKind::FromCallback)
    }

    /// A scenario driving a function that returns a deferred.
    #[must_use]
    pub fn from_promise() -> Self {
        Self::new(ScenarioKind::FromPromise)
    }

    /// A scenario driving a synchronous function.
    #[must_use]
    pub fn from_synchronous() -> Self {
        Self::new(ScenarioKind::FromSynchronous)
    }

    /// The scenario kind.
    #[must_use]
    pub const fn kind(&self) -> ScenarioKind {
        self.kind
    }

    /// The expectations declared so far.
    #[must_use]
    pub const fn ledger(&self) -> &CallLedger {
        &self.ledger
    }

    /// The registered mocks.
    #[must_use]
    pub const fn registry(&self) -> &MockRegistry {
        &self.registry
    }

    /// Use settings from `config` (timeout, diff truncation).
    #[must_use]
    pub fn with_config(mut self, config: MaddoxConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default deep-equality comparator.
    #[must_use]
    pub fn with_comparator(mut self, comparator: impl Comparator + 'static) -> Self {
        self.comparator = Some(Rc::new(comparator));
        self
    }

    /// Intercept `owner.func_name`, known in expectations as `mock_name`.
    ///
    /// # Errors
    ///
    /// 1002/1003/1004 for argument types, then 2001 when `owner` has no such
    /// method and 2002 when the pair is already mocked.
    pub fn mock_this_function(
        mut self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        owner: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::MockThisFunctionMockString,
            ErrorCode::MockThisFunctionString,
        )?;
        let owner = object_arg(owner.into(), ErrorCode::MockThisFunctionObject)?;
        let target = self.registry.register(&mock_name, &func_name, Rc::new(owner))?;
        self.ledger.track(target.pair().clone());
        Ok(self)
    }

    /// Name the function to drive.
    ///
    /// # Errors
    ///
    /// 1005 when `object` is not an object, 1006 when `func_name` is not a
    /// string, 1007 when the object has no such method.
    pub fn with_entry_point(
        mut self,
        object: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
    ) -> Result<Self> {
        let object = object_arg(object.into(), ErrorCode::EntryPointObject)?;
        let method = string_arg(func_name.into(), ErrorCode::EntryPointString)?;
        if !object.has_method(&method) {
            return Err(MaddoxError::from_code(ErrorCode::EntryPointFunction));
        }
        debug!(entry = %format!("{}.{method}", object.name()), "entry point set");
        self.entry_point = Some(EntryPoint { object, method });
        Ok(self)
    }

    /// Arguments passed to the entry point.
    ///
    /// # Errors
    ///
    /// 1000 when `params` is not a list.
    pub fn with_input_params(mut self, params: impl Into<Dynamic>) -> Result<Self> {
        self.input_params = list_arg(params.into(), ErrorCode::InputParamsArray)?;
        Ok(self)
    }

    /// Request arguments passed to an HTTP entry point, ahead of the response mock.
    ///
    /// # Errors
    ///
    /// 4005 outside HTTP scenarios, 1001 when `request` is not a list.
    pub fn with_http_request(mut self, request: impl Into<Dynamic>) -> Result<Self> {
        self.require_http()?;
        self.http_request = Some(list_arg(request.into(), ErrorCode::HttpRequestArray)?);
        Ok(self)
    }

    fn require_http(&self) -> Result<()> {
        if self.kind == ScenarioKind::HttpRequest {
            Ok(())
        } else {
            Err(MaddoxError::from_code(ErrorCode::HttpOnlyConfiguration))
        }
    }

    fn registered_pair(&self, mock_name: &str, func_name: &str) -> Result<MockPair> {
        let pair = MockPair::new(mock_name, func_name);
        if self.registry.contains(&pair) {
            Ok(pair)
        } else {
            Err(MaddoxError::missing_mock(mock_name, func_name))
        }
    }

    /// Declare the parameters of the next call to a mock.
    ///
    /// # Errors
    ///
    /// 1008/1009/1010 for argument types, then 2000 for an unregistered mock.
    pub fn should_be_called_with(
        mut self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        params: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::ShouldBeCalledWithKeyString,
            ErrorCode::ShouldBeCalledWithFunctionString,
        )?;
        let params = list_arg(params.into(), ErrorCode::ShouldBeCalledWithParamsArray)?;
        let pair = self.registered_pair(&mock_name, &func_name)?;
        let index = self.ledger.record_expected_params(&pair, params);
        debug!(%pair, index, "expected params declared");
        Ok(self)
    }

    fn respond(mut self, mock_name: &str, func_name: &str, response: ResponseSpec) -> Result<Self> {
        let pair = self.registered_pair(mock_name, func_name)?;
        let style = response.style();
        let index = self.ledger.record_response(&pair, response);
        debug!(%pair, index, style, "response declared");
        Ok(self)
    }

    /// The next call returns `value`.
    ///
    /// # Errors
    ///
    /// 1011/1012 for argument types, then 2000 for an unregistered mock.
    pub fn does_return(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        value: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesReturnMockName,
            ErrorCode::DoesReturnFuncName,
        )?;
        self.respond(&mock_name, &func_name, ResponseSpec::Immediate(value.into()))
    }

    /// The next call returns a deferred resolving to `value`.
    ///
    /// # Errors
    ///
    /// 1013/1014 for argument types, then 2000 for an unregistered mock.
    pub fn does_return_with_promise(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        value: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesReturnPromiseMockName,
            ErrorCode::DoesReturnPromiseFuncName,
        )?;
        self.respond(&mock_name, &func_name, ResponseSpec::Deferred(value.into()))
    }

    /// The next call invokes its trailing callback with `callback_args`.
    ///
    /// # Errors
    ///
    /// 1015/1016/1025 for argument types, then 2000 for an unregistered mock.
    pub fn does_return_with_callback(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        callback_args: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesReturnCallbackMockName,
            ErrorCode::DoesReturnCallbackFuncName,
        )?;
        let args = list_arg(callback_args.into(), ErrorCode::DoesReturnCallbackDataToReturn)?;
        self.respond(&mock_name, &func_name, ResponseSpec::CallbackStyle(args))
    }

    /// This call and every later one without its own response invokes the
    /// trailing callback with `callback_args`.
    ///
    /// # Errors
    ///
    /// 1028/1029/1026 for argument types, then 2000 for an unregistered mock.
    pub fn does_always_return_with_callback(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        callback_args: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesAlwaysReturnCallbackMockName,
            ErrorCode::DoesAlwaysReturnCallbackFuncName,
        )?;
        let args = list_arg(
            callback_args.into(),
            ErrorCode::DoesAlwaysReturnCallbackDataToReturn,
        )?;
        self.respond(&mock_name, &func_name, ResponseSpec::AlwaysCallbackStyle(args))
    }

    /// The next call throws `error`.
    ///
    /// # Errors
    ///
    /// 1017/1018 for argument types, then 2000 for an unregistered mock.
    pub fn does_error(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        error: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesErrorMockName,
            ErrorCode::DoesErrorFuncName,
        )?;
        self.respond(&mock_name, &func_name, ResponseSpec::ImmediateError(error.into()))
    }

    /// The next call returns a deferred rejecting with `error`.
    ///
    /// # Errors
    ///
    /// 1019/1020 for argument types, then 2000 for an unregistered mock.
    pub fn does_error_with_promise(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        error: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesErrorPromiseMockName,
            ErrorCode::DoesErrorPromiseFuncName,
        )?;
        self.respond(&mock_name, &func_name, ResponseSpec::DeferredError(error.into()))
    }

    /// The next call invokes its trailing callback with `callback_args`,
    /// conventionally an error first.
    ///
    /// # Errors
    ///
    /// 1021/1022/1027 for argument types, then 2000 for an unregistered mock.
    pub fn does_error_with_callback(
        self,
        mock_name: impl Into<Dynamic>,
        func_name: impl Into<Dynamic>,
        callback_args: impl Into<Dynamic>,
    ) -> Result<Self> {
        let (mock_name, func_name) = names(
            mock_name.into(),
            func_name.into(),
            ErrorCode::DoesErrorCallbackMockName,
            ErrorCode::DoesErrorCallbackFuncName,
        )?;
        let args = list_arg(callback_args.into(), ErrorCode::DoesErrorCallbackDataToReturn)?;
        self.respond(&mock_name, &func_name, ResponseSpec::CallbackStyleError(args))
    }

    /// Declare the parameters of the next call to a response method.
    ///
    /// # Errors
    ///
    /// 4005 outside HTTP scenarios, 4000/4001 for argument types, 4002 when
    /// a second, different finisher is declared.
    pub fn res_should_be_called_with(
        mut self,
        func_name: impl Into<Dynamic>,
        params: impl Into<Dynamic>,
    ) -> Result<Self> {
        self.require_http()?;
        let method = string_arg(func_name.into(), ErrorCode::ResShouldBeCalledWithFunctionString)?;
        let params = list_arg(params.into(), ErrorCode::ResShouldBeCalledWithParamsArray)?;
        self.response.expect_call(&method, params)?;
        debug!(method = %method, "response params declared");
        Ok(self)
    }

    /// Calls to the response method `func_name` return the response itself.
    ///
    /// # Errors
    ///
    /// 4005 outside HTTP scenarios, 4004 when `func_name` is not a string.
    pub fn res_does_return_self(mut self, func_name: impl Into<Dynamic>) -> Result<Self> {
        self.require_http()?;
        let method = string_arg(func_name.into(), ErrorCode::ResDoesReturnSelfFunctionString)?;
        self.response.return_self(&method);
        Ok(self)
    }

    /// Run the scenario and hand the result to `done`.
    ///
    /// Configuration problems found before running are returned directly
    /// and `done` is not called. Otherwise `done` is called exactly once,
    /// with the terminal [`Outcome`] or the first failure, and the final
    /// [`Phase`] is returned.
    ///
    /// # Errors
    ///
    /// 1024 without an entry point; for HTTP scenarios 4003 without a
    /// request and 4002 without a finisher.
    pub fn test(self, done: impl FnOnce(Result<Outcome>)) -> Result<Phase> {
        let report = runner::run(self.into_plan()?);
        done(report.result);
        Ok(report.phase)
    }

    /// Run a synchronous scenario and return its result directly.
    ///
    /// # Errors
    ///
    /// 1023 for any kind other than [`ScenarioKind::FromSynchronous`], then
    /// anything [`Scenario::test`] reports.
    pub fn test_without_callback(self) -> Result<Outcome> {
        if self.kind != ScenarioKind::FromSynchronous {
            return Err(MaddoxError::from_code(ErrorCode::MissingTestCallback));
        }
        runner::run(self.into_plan()?).result
    }

    fn into_plan(self) -> Result<runner::RunPlan> {
        let entry = self
            .entry_point
            .ok_or_else(|| MaddoxError::from_code(ErrorCode::MissingEntryPoint))?;

        let (args, response) = if self.kind == ScenarioKind::HttpRequest {
            let request = self
                .http_request
                .ok_or_else(|| MaddoxError::from_code(ErrorCode::HttpReqUndefined))?;
            self.response.require_finisher()?;
            (request, Some(self.response))
        } else {
            (self.input_params, None)
        };

        let comparator = self.comparator.unwrap_or_else(|| {
            Rc::new(DeepEqual::new().with_truncate_threshold(self.config.truncate_threshold))
        });

        info!(
            kind = self.kind.name(),
            entry = %entry.label(),
            mocks = self.registry.len(),
            "scenario built"
        );

        Ok(runner::RunPlan {
            kind: self.kind,
            registry: self.registry,
            ledger: self.ledger,
            entry,
            args,
            response,
            comparator,
            timeout: self.config.timeout_duration(),
        })
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("kind", &self.kind)
            .field("registry", &self.registry)
            .field("entry_point", &self.entry_point)
            .field("input_params", &self.input_params)
            .field("http_request", &self.http_request)
            .finish()
    }
}
