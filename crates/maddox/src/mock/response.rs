//! Configured completions for a mocked call.

use crate::dynamic::Dynamic;

/// How one expected call completes.
///
/// The variant is chosen by the configuration call (`doesReturn`,
/// `doesErrorWithPromise`, ...), never inferred from the runtime call.
#[derive(Debug, Clone)]
pub enum ResponseSpec {
    /// Return the value synchronously.
    Immediate(Dynamic),
    /// Throw the value synchronously.
    ImmediateError(Dynamic),
    /// Return a deferred that resolves on the next scheduling turn.
    Deferred(Dynamic),
    /// Return a deferred that rejects on the next scheduling turn.
    DeferredError(Dynamic),
    /// Invoke the trailing callback with these arguments on the next turn.
    CallbackStyle(Vec<Dynamic>),
    /// As [`ResponseSpec::CallbackStyle`]; the arguments carry an error.
    CallbackStyleError(Vec<Dynamic>),
    /// As [`ResponseSpec::CallbackStyle`], reused for every later call.
    AlwaysCallbackStyle(Vec<Dynamic>),
}

impl ResponseSpec {
    /// Whether the call must carry a trailing callback.
    #[must_use]
    pub const fn is_callback_style(&self) -> bool {
        matches!(
            self,
            Self::CallbackStyle(_) | Self::CallbackStyleError(_) | Self::AlwaysCallbackStyle(_)
        )
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn style(&self) -> &'static str {
        match self {
            Self::Immediate(_) => "immediate",
            Self::ImmediateError(_) => "immediate-error",
            Self::Deferred(_) => "deferred",
            Self::DeferredError(_) => "deferred-error",
            Self::CallbackStyle(_) => "callback",
            Self::CallbackStyleError(_) => "callback-error",
            Self::AlwaysCallbackStyle(_) => "always-callback",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_styles_are_flagged() {
        assert!(ResponseSpec::CallbackStyle(Vec::new()).is_callback_style());
        assert!(ResponseSpec::CallbackStyleError(Vec::new()).is_callback_style());
        assert!(ResponseSpec::AlwaysCallbackStyle(Vec::new()).is_callback_style());
        assert!(!ResponseSpec::Deferred(Dynamic::undefined()).is_callback_style());
        assert!(!ResponseSpec::Immediate(Dynamic::undefined()).is_callback_style());
    }
}
