//! Built-in middlewares.
//!
//! Every middleware here implements [`Middleware`](crate::Middleware) and can
//! be placed in any stack, alone or bound to arguments with
//! [`MiddlewareExt::with`](crate::MiddlewareExt::with).
//!
//! # Feature Flags
//!
//! Middlewares are feature-gated for minimal compile times:
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `middleware-logging` | [`Logging`] |
//! | `middleware-retry` | [`Retry`] |
//! | `middleware-cache` | [`CachesReturnValue`] |
//! | `middleware-ensure-result` | [`EnsureResult`] |
//! | `middleware-metrics` | [`Metrics`] |
//! | `middleware-core` | Logging + retry |
//! | `middleware-full` | All middleware |
//!
//! [`Recorder`] is always available.
//!
//! # Ordering
//!
//! The first middleware of a stack is the outermost: it sees the call first
//! and the return value last.
//!
//! ```ignore
//! class.middlewares("result", Scope::Instance, |stack| {
//!     stack.append(Logging);                    // runs once per call
//!     stack.append(Retry.with("attempts", 3));  // re-runs what follows
//!     stack.append(CachesReturnValue);          // runs once per attempt
//!     Ok(())
//! })?;
//! ```

#[cfg(feature = "middleware-cache")]
mod caches_return_value;
#[cfg(feature = "middleware-ensure-result")]
mod ensure_result;
#[cfg(feature = "middleware-logging")]
mod logging;
#[cfg(feature = "middleware-metrics")]
mod metrics;
mod recorder;
#[cfg(feature = "middleware-retry")]
mod retry;

#[cfg(feature = "middleware-cache")]
pub use caches_return_value::CachesReturnValue;
#[cfg(feature = "middleware-ensure-result")]
pub use ensure_result::EnsureResult;
#[cfg(feature = "middleware-logging")]
pub use logging::{LogLevel, Logging};
#[cfg(feature = "middleware-metrics")]
pub use metrics::Metrics;
pub use recorder::{Recorded, Recorder};
#[cfg(feature = "middleware-retry")]
pub use retry::{DEFAULT_ATTEMPTS, Retry};
