//! Errors raised while registering taps or running a hook.

/// The original error value carried by a failing tap.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// HookError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors produced by hooks and their adapters.
///
/// Registration errors ([`InvalidTapName`](Self::InvalidTapName),
/// [`UnsupportedOnHookKind`](Self::UnsupportedOnHookKind)) and construction
/// errors are returned synchronously. Everything raised while taps run is
/// delivered exactly once through the calling convention of the invocation.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// A tap was registered with an empty or whitespace-only name.
    #[error("missing name for tap passed to {method}")]
    InvalidTapName {
        /// Registration method that rejected the tap.
        method: &'static str,
    },

    /// The hook type does not accept taps of this calling convention.
    #[error("{method} is not supported on {hook}")]
    UnsupportedOnHookKind {
        /// Registration method that was called.
        method: &'static str,
        /// Type name of the hook.
        hook: &'static str,
    },

    /// A waterfall hook was declared without arguments.
    #[error("{hook} must have at least one argument")]
    InsufficientArguments {
        /// Type name of the hook.
        hook: &'static str,
    },

    /// The declared argument names disagree with the argument tuple.
    #[error("{hook} declares {declared} argument names but takes {expected} arguments")]
    ArityMismatch {
        /// Type name of the hook.
        hook: &'static str,
        /// Number of argument names supplied at construction.
        declared: usize,
        /// Arity of the hook's argument tuple.
        expected: usize,
    },

    /// A tap returned or delivered an error.
    #[error("tap '{tap}' failed: {source}")]
    TapExecution {
        /// Name of the failing tap.
        tap: String,
        /// The error produced by the tap.
        source: BoxError,
    },

    /// A legacy plugin name matched no hook.
    #[error("no hook is registered under '{0}'")]
    UnknownHookName(String),

    /// A legacy plugin name matched a hook of another type.
    #[error("hook '{name}' is not a {expected}")]
    HookTypeMismatch {
        /// Name the hook was looked up by.
        name: String,
        /// Hook type the caller asked for.
        expected: &'static str,
    },

    /// An asynchronous tap ended up on a synchronous invocation path.
    #[error("tap '{tap}' did not settle synchronously")]
    NotSynchronous {
        /// Name of the offending tap.
        tap: String,
    },

    /// The invocation was dropped before it delivered a result.
    #[error("hook invocation was abandoned before it settled")]
    InvocationAbandoned,
}

impl HookError {
    /// Wraps an error produced by the tap named `tap`.
    pub fn tap_execution(tap: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::TapExecution {
            tap: tap.into(),
            source: source.into(),
        }
    }

    /// Returns the original tap error, if this is a [`TapExecution`](Self::TapExecution).
    #[must_use]
    pub fn tap_error(&self) -> Option<&(dyn core::error::Error + Send + Sync + 'static)> {
        match self {
            Self::TapExecution { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    /// Returns the name of the tap that failed, if any.
    #[must_use]
    pub fn tap_name(&self) -> Option<&str> {
        match self {
            Self::TapExecution { tap, .. } | Self::NotSynchronous { tap } => Some(tap),
            _ => None,
        }
    }

    /// Returns `true` if the error was raised at registration or construction time.
    #[must_use]
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTapName { .. }
                | Self::UnsupportedOnHookKind { .. }
                | Self::InsufficientArguments { .. }
                | Self::ArityMismatch { .. }
        )
    }
}

/// Error delivered when a [`TapCallback`](crate::tap::TapCallback) is dropped
/// without being settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("tap callback was dropped without being settled")]
pub struct CallbackDropped;

#[cfg(test)]
mod tests {
    use super::*;
    use core::error::Error;

    #[test]
    fn tap_execution_exposes_source() {
        let err = HookError::tap_execution("compile", "disk full");

        assert_eq!(err.tap_name(), Some("compile"));
        assert_eq!(
            err.tap_error().map(ToString::to_string),
            Some("disk full".to_string())
        );
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("disk full".to_string())
        );
        assert_eq!(err.to_string(), "tap 'compile' failed: disk full");
    }

    #[test]
    fn registration_errors_are_classified() {
        assert!(HookError::InvalidTapName { method: "tap" }.is_registration_error());
        assert!(
            HookError::UnsupportedOnHookKind {
                method: "tap_async",
                hook: "SyncHook",
            }
            .is_registration_error()
        );
        assert!(!HookError::InvocationAbandoned.is_registration_error());
        assert!(!HookError::UnknownHookName("emit".into()).is_registration_error());
    }

    #[test]
    fn unsupported_message_names_hook() {
        let err = HookError::UnsupportedOnHookKind {
            method: "tap_promise",
            hook: "SyncBailHook",
        };
        assert_eq!(err.to_string(), "tap_promise is not supported on SyncBailHook");
    }
}
