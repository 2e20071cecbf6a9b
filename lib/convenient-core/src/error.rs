//! Error types for convenient.

use derive_more::{Display, Error};

use crate::Scope;

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for convenient operations.
///
/// Configuration errors are raised at the point of misuse (class definition or
/// commit). Contract violations are raised at call time. Neither is retried by
/// the engine.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// A structural edit referenced a middleware (or concern) absent from its stack.
    #[display(
        "middleware `{middleware}` not found in {stack}.\n\
         Register it (for example with `append`) before positioning other entries \
         relative to it, or check the inclusion order of the configs that contribute it."
    )]
    MiddlewareNotFound {
        /// Description of the stack that was edited.
        stack: String,
        /// The missing entry.
        middleware: String,
    },

    /// The class configuration was edited after it was committed.
    #[display(
        "config of `{class}` is already committed.\n\
         Middlewares and concerns can only be changed before the first method call \
         or explicit commit. Move the edit into the class definition."
    )]
    AlreadyCommitted {
        /// Class name.
        class: String,
    },

    /// A middleware was attached to a target it does not declare support for.
    #[display(
        "middleware `{middleware}` is not intended for {target} of `{class}`.\n\
         It declares: {intended_for}.\n\
         Attach it to a supported method or relax its `intended_for` declaration."
    )]
    NotIntendedFor {
        /// Middleware name.
        middleware: String,
        /// Class name.
        class: String,
        /// The target it was attached to.
        target: String,
        /// What the middleware declares.
        intended_for: String,
    },

    /// A middleware rejected its bound arguments at build time.
    #[display("middleware `{middleware}` rejected its arguments: {reason}")]
    InvalidArguments {
        /// Middleware name.
        middleware: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// Unknown middleware stack backend.
    #[display(
        "unsupported middleware backend `{_0}`.\n\
         Supported backends are `list` and `layered` (alias `rack`)."
    )]
    UnsupportedBackend(#[error(not(source))] String),

    /// Invalid engine configuration.
    #[display("invalid engine config: {_0}")]
    InvalidConfig(#[error(not(source))] String),

    /// An intercepted method has no original definition to call.
    #[display(
        "{scope} method `{method}` of `{class}` is not overridden.\n\
         Middlewares are registered for it, but neither the class, its concerns \
         nor its ancestors define it. Define `{method}` in `{class}`."
    )]
    MethodNotOverridden {
        /// Class name.
        class: String,
        /// Method name.
        method: String,
        /// Method scope.
        scope: Scope,
    },

    /// A method that is neither defined nor intercepted was called.
    #[display(
        "undefined {scope} method `{method}` for `{class}`.\n\
         Define it in the class body, in a concern, or in an ancestor."
    )]
    NoSuchMethod {
        /// Class name.
        class: String,
        /// Method name.
        method: String,
        /// Method scope.
        scope: Scope,
    },

    /// An imported dependency was never exported.
    #[display(
        "{scope} dependency `{name}` is probably not satisfied.\n\
         It is expected to be exported by `{container}`, which exports: {exported}.\n\
         Did you forget to include the config that exports it?"
    )]
    DependencyNotSatisfied {
        /// Dependency name.
        name: String,
        /// Dependency scope.
        scope: Scope,
        /// Name of the expected exporter.
        container: String,
        /// Names the exporter does provide.
        exported: String,
    },

    /// A method returned something that is not a result.
    #[display(
        "return value of `{class}#{method}` is not a result.\n\
         Got: {value}.\n\
         Make sure `{method}` returns `success`, `failure` or `error`."
    )]
    NotAResult {
        /// Class name.
        class: String,
        /// Method name.
        method: String,
        /// Rendered return value.
        value: String,
    },

    /// A constructor chain returned something that is not an instance.
    #[display(
        "`{class}.new` did not return an instance.\n\
         A middleware on `new` replaced the constructed instance. Return the value \
         produced by `next` instead."
    )]
    NotAnInstance {
        /// Class name.
        class: String,
    },

    /// A method received an argument it cannot use.
    #[display("invalid argument: {_0}")]
    InvalidArgument(#[error(not(source))] String),

    /// An error raised by a user-defined method body.
    #[display("{_0}")]
    Raised(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error raised from a method body.
    #[must_use]
    pub fn raised(message: impl Into<String>) -> Self {
        Self::Raised(message.into())
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid arguments error for a middleware.
    #[must_use]
    pub fn invalid_arguments(middleware: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            middleware: middleware.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error signals a misconfigured class or engine.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MiddlewareNotFound { .. }
                | Self::AlreadyCommitted { .. }
                | Self::NotIntendedFor { .. }
                | Self::InvalidArguments { .. }
                | Self::UnsupportedBackend(_)
                | Self::InvalidConfig(_)
        )
    }

    /// Returns `true` if a retrying middleware may re-run the chain after this error.
    ///
    /// Only errors raised by method bodies are retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Raised(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::raised("boom");
        assert_eq!(err.to_string(), "boom");

        let err = Error::invalid_arguments("retry", "`attempts` must be positive");
        assert_eq!(
            err.to_string(),
            "middleware `retry` rejected its arguments: `attempts` must be positive"
        );
    }

    #[test]
    fn error_display_not_overridden() {
        let err = Error::MethodNotOverridden {
            class: "CreateUser".to_string(),
            method: "result".to_string(),
            scope: Scope::Instance,
        };
        insta::assert_snapshot!(err.to_string(), @r"
        instance method `result` of `CreateUser` is not overridden.
        Middlewares are registered for it, but neither the class, its concerns nor its ancestors define it. Define `result` in `CreateUser`.
        ");
    }

    #[test]
    fn error_display_dependency() {
        let err = Error::DependencyNotSatisfied {
            name: "is_result".to_string(),
            scope: Scope::Instance,
            container: "Plugins::HasJsendResult".to_string(),
            exported: "(nothing)".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("instance dependency `is_result` is probably not satisfied."));
        assert!(message.contains("exported by `Plugins::HasJsendResult`"));
    }

    #[test]
    fn error_is_configuration() {
        assert!(Error::UnsupportedBackend("ruby".to_string()).is_configuration());
        assert!(
            Error::AlreadyCommitted {
                class: "Service".to_string()
            }
            .is_configuration()
        );
        assert!(!Error::raised("boom").is_configuration());
    }

    #[test]
    fn error_is_retryable() {
        assert!(Error::raised("boom").is_retryable());
        assert!(!Error::invalid_argument("nope").is_retryable());
        assert!(
            !Error::NoSuchMethod {
                class: "Service".to_string(),
                method: "result".to_string(),
                scope: Scope::Instance,
            }
            .is_retryable()
        );
    }
}
