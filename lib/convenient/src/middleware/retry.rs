//! Retry middleware.
//!
//! Re-runs the inner chain when it fails with a retryable error. Middlewares
//! placed before `Retry` in the stack run once per call; middlewares after it
//! and the method itself run once per attempt.

use tracing::{debug, warn};

use crate::{Arguments, ChainEnv, Error, Middleware, MiddlewareInfo, Result, Value};

/// Attempts made when no `attempts` argument is bound.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Middleware that retries the inner chain on retryable errors.
///
/// Only [`Error::Raised`] is retried: configuration errors and contract
/// violations fail immediately.
///
/// Bound arguments:
///
/// - `attempts`: total number of attempts, at least 1 (default 3).
///
/// # Example
///
/// ```
/// use convenient::MiddlewareExt;
/// use convenient::middleware::Retry;
///
/// let spec = Retry.with("attempts", 5);
/// assert_eq!(spec.to_string(), "retry.with(attempts: 5)");
/// ```
#[derive(Debug, Clone, Copy, Default, MiddlewareInfo)]
#[middleware(name = "retry")]
pub struct Retry;

impl Retry {
    fn attempts(arguments: &Arguments) -> Result<u32> {
        let attempts = arguments
            .parse::<u32>("attempts")
            .map_err(|err| Error::invalid_arguments("retry", err.to_string()))?
            .unwrap_or(DEFAULT_ATTEMPTS);
        if attempts == 0 {
            return Err(Error::invalid_arguments("retry", "`attempts` must be at least 1"));
        }
        Ok(attempts)
    }

    /// Returns `true` if the error should be retried.
    fn should_retry(error: &Error) -> bool {
        error.is_retryable()
    }
}

impl Middleware for Retry {
    fn check(&self, arguments: &Arguments) -> Result<()> {
        Self::attempts(arguments).map(|_| ())
    }

    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        let attempts = Self::attempts(env.arguments())?;
        let mut attempt = 1;
        loop {
            match env.next() {
                Err(error) if Self::should_retry(&error) && attempt < attempts => {
                    warn!(
                        class = %env.class(),
                        method = env.method(),
                        attempt,
                        attempts,
                        %error,
                        "call failed, retrying"
                    );
                    attempt += 1;
                }
                result => {
                    if attempt > 1 {
                        debug!(method = env.method(), attempt, ok = result.is_ok(), "retry finished");
                    }
                    return result;
                }
            }
        }
    }
}
