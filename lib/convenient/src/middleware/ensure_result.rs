//! Result contract check.

use crate::{Args, ChainEnv, Error, Import, Middleware, MiddlewareInfo, Result, Value};

/// Middleware that fails when a method returns something that is not a result.
///
/// What counts as a result is decided by the imported `is_result` capability,
/// called with the returned value. A missing export surfaces as
/// [`Error::DependencyNotSatisfied`] on the first call.
///
/// # Example
///
/// ```
/// use convenient::{Container, Scope, Value};
/// use convenient::middleware::EnsureResult;
///
/// let results = Container::new("Results");
/// results.export("is_result", Scope::Instance, |args| {
///     Ok(Value::from(args.get(0).and_then(Value::as_str) == Some("success")))
/// });
///
/// let middleware = EnsureResult::new(results.import("is_result", Scope::Instance));
/// # let _ = middleware;
/// ```
#[derive(Debug, Clone, MiddlewareInfo)]
#[middleware(name = "ensure_result", intended_for(methods = ["result"], scope = "instance"))]
pub struct EnsureResult {
    is_result: Import,
}

impl EnsureResult {
    /// Check return values with the given `is_result` import.
    #[must_use]
    pub const fn new(is_result: Import) -> Self {
        Self { is_result }
    }
}

impl Middleware for EnsureResult {
    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        let value = env.next()?;
        let verdict = self.is_result.call(&Args::new().arg(value.clone()))?;
        if verdict.as_bool() == Some(true) {
            return Ok(value);
        }
        Err(Error::NotAResult {
            class: env.class().name().to_string(),
            method: env.method().to_string(),
            value: value.to_string(),
        })
    }
}
