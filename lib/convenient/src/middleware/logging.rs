//! Method call logging middleware.
//!
//! Logs every intercepted call using the `tracing` crate, inside a
//! `method_call` span carrying the class, scope and method.

use std::str::FromStr;
use std::time::Instant;

use tracing::{Level, debug, info, span, warn};

use crate::{Arguments, ChainEnv, Error, Middleware, MiddlewareInfo, Result, Value};

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at debug level (arguments and return values).
    Debug,
    /// Log at info level (summary only).
    #[default]
    Info,
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            other => Err(Error::invalid_arguments(
                "logging",
                format!("unknown level `{other}`, expected `debug` or `info`"),
            )),
        }
    }
}

/// Middleware that logs calls and their outcome.
///
/// Bound arguments:
///
/// - `level`: `"info"` (default) or `"debug"`.
///
/// # Example
///
/// ```
/// use convenient::MiddlewareExt;
/// use convenient::middleware::Logging;
///
/// let spec = Logging.with("level", "debug");
/// assert_eq!(spec.to_string(), r#"logging.with(level: "debug")"#);
/// ```
#[derive(Debug, Clone, Copy, Default, MiddlewareInfo)]
#[middleware(name = "logging")]
pub struct Logging;

impl Logging {
    fn level(arguments: &Arguments) -> Result<LogLevel> {
        arguments
            .parse::<String>("level")?
            .map_or(Ok(LogLevel::default()), |level| level.parse())
    }
}

impl Middleware for Logging {
    fn check(&self, arguments: &Arguments) -> Result<()> {
        Self::level(arguments).map(|_| ())
    }

    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        let level = Self::level(env.arguments())?;
        let span = span!(
            Level::INFO,
            "method_call",
            class = %env.class(),
            scope = %env.scope(),
            method = env.method()
        );
        let _entered = span.enter();

        match level {
            LogLevel::Debug => debug!(args = %env.args, "calling method"),
            LogLevel::Info => info!("calling method"),
        }

        let start = Instant::now();
        let result = env.next();
        // Saturating conversion to u64
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match (&result, level) {
            (Ok(value), LogLevel::Debug) => debug!(%value, elapsed_ms, "method returned"),
            (Ok(_), LogLevel::Info) => info!(elapsed_ms, "method returned"),
            (Err(err), _) => warn!(error = %err, elapsed_ms, "method failed"),
        }

        result
    }
}
