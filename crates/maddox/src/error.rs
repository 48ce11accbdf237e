//! Error types for maddox.
//!
//! Every failure a scenario can produce carries a stable numeric code and a
//! one-line templated message. Codes are grouped by class:
//!
//! - `1000..=1999`: scenario build errors (bad argument shapes)
//! - `2000..=2999`: missing or duplicate mock registrations
//! - `3000..=3999`: runtime and comparison errors found while driving the entry point
//! - `4000..=4999`: HTTP-scenario specific build errors
//!
//! The rendered form is `"<ErrorClass> (<code>): <message>"` and is kept
//! byte-for-byte stable, so the messages name the configuration calls by
//! their canonical camelCase names.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// The class prefix shown in front of every rendered error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Misuse of the configuration surface.
    ScenarioBuild,
    /// A mismatch discovered while driving the entry point.
    Runtime,
    /// A value mismatch between an expected and an actual parameter.
    Comparison,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ScenarioBuild => "Maddox Scenario Build Error",
            Self::Runtime => "Maddox Runtime Error",
            Self::Comparison => "Maddox Comparison Error",
        };
        f.write_str(name)
    }
}

/// Coarse taxonomy used to decide how an error propagates.
///
/// Build and missing-mock errors are always returned synchronously from the
/// configuration call that caused them. Runtime and comparison errors are
/// funneled to the completion handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad argument shapes or missing scenario pieces (1000s and 4000s).
    Build,
    /// Referencing an unregistered or duplicate mock (2000s).
    MissingMock,
    /// Wrong arity, missing expectation, wrong call count or invocation style.
    Runtime,
    /// A deep-equality mismatch.
    Comparison,
}

/// Stable numeric error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
#[allow(missing_docs)]
pub enum ErrorCode {
    InputParamsArray = 1000,
    HttpRequestArray = 1001,
    MockThisFunctionMockString = 1002,
    MockThisFunctionString = 1003,
    MockThisFunctionObject = 1004,
    EntryPointObject = 1005,
    EntryPointString = 1006,
    EntryPointFunction = 1007,
    ShouldBeCalledWithKeyString = 1008,
    ShouldBeCalledWithFunctionString = 1009,
    ShouldBeCalledWithParamsArray = 1010,
    DoesReturnMockName = 1011,
    DoesReturnFuncName = 1012,
    DoesReturnPromiseMockName = 1013,
    DoesReturnPromiseFuncName = 1014,
    DoesReturnCallbackMockName = 1015,
    DoesReturnCallbackFuncName = 1016,
    DoesErrorMockName = 1017,
    DoesErrorFuncName = 1018,
    DoesErrorPromiseMockName = 1019,
    DoesErrorPromiseFuncName = 1020,
    DoesErrorCallbackMockName = 1021,
    DoesErrorCallbackFuncName = 1022,
    MissingTestCallback = 1023,
    MissingEntryPoint = 1024,
    DoesReturnCallbackDataToReturn = 1025,
    DoesAlwaysReturnCallbackDataToReturn = 1026,
    DoesErrorCallbackDataToReturn = 1027,
    DoesAlwaysReturnCallbackMockName = 1028,
    DoesAlwaysReturnCallbackFuncName = 1029,
    MissingMockThisFunction = 2000,
    FunctionNotInMock = 2001,
    MockAlreadyExists = 2002,
    MissingCallback = 3000,
    MissingMockedData = 3001,
    MockCalledWrongNumberOfTimes = 3002,
    ComparisonShouldEqual = 3003,
    WrongNumberOfParams = 3004,
    ScenarioTimeout = 3005,
    MissingCompletion = 3006,
    SchedulerUnavailable = 3007,
    EntryPointThrew = 3008,
    ResShouldBeCalledWithFunctionString = 4000,
    ResShouldBeCalledWithParamsArray = 4001,
    ExactlyOneResponseFinisher = 4002,
    HttpReqUndefined = 4003,
    ResDoesReturnSelfFunctionString = 4004,
    HttpOnlyConfiguration = 4005,
}

impl ErrorCode {
    /// The numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// The class prefix used when rendering.
    #[must_use]
    pub const fn class(self) -> ErrorClass {
        match self.as_u16() {
            3003 => ErrorClass::Comparison,
            3000..=3999 => ErrorClass::Runtime,
            _ => ErrorClass::ScenarioBuild,
        }
    }

    /// The propagation taxonomy for this code.
    #[must_use]
    pub const fn kind(self) -> ErrorKind {
        match self.as_u16() {
            2000..=2999 => ErrorKind::MissingMock,
            3003 => ErrorKind::Comparison,
            3000..=3999 => ErrorKind::Runtime,
            _ => ErrorKind::Build,
        }
    }

    /// Fixed message for codes whose text carries no parameters.
    const fn fixed_message(self) -> Option<&'static str> {
        let message = match self {
            Self::InputParamsArray => {
                "When calling 'withInputParams', the parameter must be of type Array."
            }
            Self::HttpRequestArray => {
                "When calling 'withHttpRequest', the parameter must be of type Array."
            }
            Self::MockThisFunctionMockString => {
                "When calling 'mockThisFunction', the first parameter must be of type String representing the mock key."
            }
            Self::MockThisFunctionString => {
                "When calling 'mockThisFunction', the second parameter must be of type String representing the function to mock."
            }
            Self::MockThisFunctionObject => {
                "When calling 'mockThisFunction', the third parameter must be of type Object containing the function that you'd like to mock."
            }
            Self::EntryPointObject => {
                "When calling 'withEntryPoint', the first parameter must be of type object representing the object that contains the function to be mocked."
            }
            Self::EntryPointString => {
                "When calling 'withEntryPoint', the second parameter must be of type String representing the function name that will be mocked."
            }
            Self::EntryPointFunction => {
                "When calling 'withEntryPoint', the second param must be the name of a function in the first param object."
            }
            Self::ShouldBeCalledWithKeyString => {
                "When calling 'shouldBeCalledWith', the first parameter must be of type String representing the mock key."
            }
            Self::ShouldBeCalledWithFunctionString => {
                "When calling 'shouldBeCalledWith', the second parameter must be of type String representing the function that was mocked."
            }
            Self::ShouldBeCalledWithParamsArray => {
                "When calling 'shouldBeCalledWith', the third parameter must be of type Array containing the expected parameters."
            }
            Self::DoesReturnMockName => {
                "When calling 'doesReturn', the first parameter must be of type String representing the mock key."
            }
            Self::DoesReturnFuncName => {
                "When calling 'doesReturn', the second parameter must be of type String representing the function to mock."
            }
            Self::DoesReturnPromiseMockName => {
                "When calling 'doesReturnWithPromise', the first parameter must be of type String representing the mock key."
            }
            Self::DoesReturnPromiseFuncName => {
                "When calling 'doesReturnWithPromise', the second parameter must be of type String representing the function to mock."
            }
            Self::DoesReturnCallbackMockName => {
                "When calling 'doesReturnWithCallback', the first parameter must be of type String representing the mock key."
            }
            Self::DoesReturnCallbackFuncName => {
                "When calling 'doesReturnWithCallback', the second parameter must be of type String representing the function to mock."
            }
            Self::DoesErrorMockName => {
                "When calling 'doesError', the first parameter must be of type String representing the mock key."
            }
            Self::DoesErrorFuncName => {
                "When calling 'doesError', the second parameter must be of type String representing the function to mock."
            }
            Self::DoesErrorPromiseMockName => {
                "When calling 'doesErrorWithPromise', the first parameter must be of type String representing the mock key."
            }
            Self::DoesErrorPromiseFuncName => {
                "When calling 'doesErrorWithPromise', the second parameter must be of type String representing the function to mock."
            }
            Self::DoesErrorCallbackMockName => {
                "When calling 'doesErrorWithCallback', the first parameter must be of type String representing the mock key."
            }
            Self::DoesErrorCallbackFuncName => {
                "When calling 'doesErrorWithCallback', the second parameter must be of type String representing the function to mock."
            }
            Self::DoesAlwaysReturnCallbackMockName => {
                "When calling 'doesAlwaysReturnWithCallback', the first parameter must be of type String representing the mock key."
            }
            Self::DoesAlwaysReturnCallbackFuncName => {
                "When calling 'doesAlwaysReturnWithCallback', the second parameter must be of type String representing the function to mock."
            }
            Self::MissingTestCallback => {
                "Every test must pass in a callback to execute when the test is complete."
            }
            Self::MissingEntryPoint => {
                "You must define a valid entry point before executing the test."
            }
            Self::DoesReturnCallbackDataToReturn => {
                "When calling 'doesReturnWithCallback', the third parameter must be of type Array containing the callback's parameters."
            }
            Self::DoesAlwaysReturnCallbackDataToReturn => {
                "When calling 'doesAlwaysReturnWithCallback', the third parameter must be of type Array containing the callback's parameters."
            }
            Self::DoesErrorCallbackDataToReturn => {
                "When calling 'doesErrorWithCallback', the third parameter must be of type Array containing the callback's parameters."
            }
            Self::ResShouldBeCalledWithFunctionString => {
                "When calling 'resShouldBeCalledWith', the first parameter must be of type String representing the response function name."
            }
            Self::ResShouldBeCalledWithParamsArray => {
                "When calling 'resShouldBeCalledWith', the second parameter must be of type Array containing the expected parameters."
            }
            Self::ExactlyOneResponseFinisher => {
                "Exactly one HTTP Response Finisher can be used per scenario. When a HTTP Response Finisher function is called, the testable code phase will end, and the validation phase will begin. Please see below for a list of HTTP Response Finishers."
            }
            Self::HttpReqUndefined => {
                "You need to define the Http Request object using the 'withHttpRequest' function."
            }
            Self::ResDoesReturnSelfFunctionString => {
                "When calling 'resDoesReturnSelf', the first parameter must be of type String representing the response function name."
            }
            Self::HttpOnlyConfiguration => {
                "The 'withHttpRequest', 'resShouldBeCalledWith' and 'resDoesReturnSelf' functions can only be used with an HTTP Request scenario."
            }
            _ => return None,
        };
        Some(message)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Spell out a zero-based position as an English ordinal.
///
/// Index `0` is `"first"`. Beyond the twentieth the numeric form is used.
#[must_use]
pub fn ordinal(index: usize) -> String {
    const WORDS: [&str; 20] = [
        "first",
        "second",
        "third",
        "fourth",
        "fifth",
        "sixth",
        "seventh",
        "eighth",
        "ninth",
        "tenth",
        "eleventh",
        "twelfth",
        "thirteenth",
        "fourteenth",
        "fifteenth",
        "sixteenth",
        "seventeenth",
        "eighteenth",
        "nineteenth",
        "twentieth",
    ];

    if let Some(word) = WORDS.get(index) {
        return (*word).to_string();
    }

    let n = index + 1;
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// The single error type surfaced by scenarios.
#[derive(Debug, Clone, Error)]
#[error("{class} ({number}): {message}", class = .code.class(), number = .code.as_u16())]
pub struct MaddoxError {
    code: ErrorCode,
    message: String,
    debug: Option<Value>,
}

/// Result type alias for maddox operations.
pub type Result<T> = std::result::Result<T, MaddoxError>;

impl MaddoxError {
    fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            debug: None,
        }
    }

    /// Create an error for a code whose message has no parameters.
    ///
    /// Parameterised codes fall back to their code name; use the dedicated
    /// constructors for those.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        let message = code
            .fixed_message()
            .map_or_else(|| format!("{code:?}"), str::to_string);
        Self::with_message(code, message)
    }

    /// Attach a structured debug payload.
    #[must_use]
    pub fn with_debug(mut self, debug: Value) -> Self {
        self.debug = Some(debug);
        self
    }

    /// A mock was configured before `mockThisFunction` registered it.
    pub fn missing_mock(mock_name: &str, func_name: &str) -> Self {
        Self::with_message(
            ErrorCode::MissingMockThisFunction,
            format!(
                "You must declare the mock {mock_name}.{func_name}, using 'mockThisFunction' before declaring return values."
            ),
        )
    }

    /// The owner object has no method by that name.
    pub fn function_not_in_mock(mock_name: &str, func_name: &str) -> Self {
        Self::with_message(
            ErrorCode::FunctionNotInMock,
            format!("Function {func_name} does not exist in mock {mock_name}."),
        )
    }

    /// The same `(mockName, methodName)` pair was registered twice.
    pub fn mock_already_exists(mock_name: &str, func_name: &str) -> Self {
        Self::with_message(
            ErrorCode::MockAlreadyExists,
            format!("Attempted to mock {mock_name}.{func_name}, but it was already mocked."),
        )
    }

    /// A callback-style response was configured but the real call had no trailing callback.
    pub fn missing_callback(label: &str) -> Self {
        Self::with_message(
            ErrorCode::MissingCallback,
            format!(
                "When using 'doesReturnWithCallback' or 'doesErrorWithCallback' for {label} the last parameter in the function must be the callback function."
            ),
        )
    }

    /// No response was configured for this call index.
    pub fn missing_mocked_data(label: &str, index: usize) -> Self {
        Self::with_message(
            ErrorCode::MissingMockedData,
            format!(
                "Attempted to get mocked data for the {} call to {label}, but it wasn't created in the scenario.  You are missing a 'doesReturn / doesError' call.",
                ordinal(index)
            ),
        )
    }

    /// Total call counts differ.
    pub fn called_wrong_number_of_times(label: &str, expected: usize, actual: usize) -> Self {
        Self::with_message(
            ErrorCode::MockCalledWrongNumberOfTimes,
            format!(
                "Expected the mock {label} to be called {expected} time(s), but it was actually called {actual} time(s)."
            ),
        )
    }

    /// A parameter failed deep equality.
    pub fn comparison(label: &str, param_index: usize, call_index: usize, diff: &str) -> Self {
        Self::with_message(
            ErrorCode::ComparisonShouldEqual,
            format!(
                "Failed expectation for the {} param in mock {label}, the {} time the mock was called ::::: {diff}",
                ordinal(param_index),
                ordinal(call_index)
            ),
        )
    }

    /// A call's arity differs from its expectation.
    pub fn wrong_number_of_params(
        label: &str,
        call_index: usize,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::with_message(
            ErrorCode::WrongNumberOfParams,
            format!(
                "Expected the {} call to {label} to have {expected} param(s), but it was actually called with {actual} param(s).",
                ordinal(call_index)
            ),
        )
    }

    /// The scenario never drained within the configured timeout.
    pub fn scenario_timeout(millis: u128) -> Self {
        Self::with_message(
            ErrorCode::ScenarioTimeout,
            format!("The scenario did not complete within {millis} ms."),
        )
    }

    /// The scheduler drained but the terminal event never fired.
    pub fn missing_completion(entry_label: &str) -> Self {
        Self::with_message(
            ErrorCode::MissingCompletion,
            format!("The entry point {entry_label} finished without signalling completion."),
        )
    }

    /// The single-threaded runtime could not be created.
    pub fn scheduler_unavailable(reason: impl fmt::Display) -> Self {
        Self::with_message(
            ErrorCode::SchedulerUnavailable,
            format!("Unable to start the scenario scheduler: {reason}"),
        )
    }

    /// The entry point threw before reaching its terminal event.
    pub fn entry_point_threw(entry_label: &str, thrown: &Value) -> Self {
        Self::with_message(
            ErrorCode::EntryPointThrew,
            format!("The entry point {entry_label} threw before signalling completion: {thrown}"),
        )
    }

    /// The numeric code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// The class prefix.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        self.code.class()
    }

    /// The propagation taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    /// The templated message without class prefix or code.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The structured debug payload, if any.
    #[must_use]
    pub const fn debug(&self) -> Option<&Value> {
        self.debug.as_ref()
    }

    /// The rendered message followed by the pretty-printed debug payload.
    #[must_use]
    pub fn report(&self) -> String {
        match &self.debug {
            Some(debug) => {
                let pretty = serde_json::to_string_pretty(debug).unwrap_or_default();
                format!("{self}\n{pretty}")
            }
            None => self.to_string(),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        /// The file that was being parsed.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// An individual setting has an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// The setting name.
        key: String,
        /// The rejected value.
        value: String,
    },
}
