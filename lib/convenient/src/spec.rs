//! Middleware traits and middleware specs.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use crate::chain::ChainEnv;
use crate::{Arguments, IntendedFor, Result, Value};

/// Static description of a middleware.
///
/// Usually derived with `#[derive(MiddlewareInfo)]`:
///
/// ```ignore
/// use convenient::prelude::*;
///
/// #[derive(MiddlewareInfo)]
/// #[middleware(name = "rollback", intended_for(methods = ["result"], scope = "instance"))]
/// struct Rollback;
/// ```
pub trait MiddlewareInfo {
    /// Name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Targets this middleware may be attached to.
    fn intended_for(&self) -> IntendedFor {
        IntendedFor::any()
    }
}

/// An interceptor attached to a method.
///
/// A middleware receives the [`ChainEnv`] of the call. It may inspect or replace
/// the arguments, delegate deeper with [`ChainEnv::next`], transform the returned
/// value, or short-circuit by returning its own value without calling `next`.
///
/// # Example
///
/// ```ignore
/// use convenient::prelude::*;
///
/// #[derive(MiddlewareInfo)]
/// #[middleware(name = "upcase")]
/// struct Upcase;
///
/// impl Middleware for Upcase {
///     fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
///         let value = env.next()?;
///         Ok(value.as_str().map_or(value.clone(), |s| Value::from(s.to_uppercase())))
///     }
/// }
/// ```
pub trait Middleware: MiddlewareInfo + Any + Send + Sync {
    /// Validate the arguments bound with `.with(...)`.
    ///
    /// Called when the chain is built, so invalid arguments fail at commit
    /// instead of at call time.
    fn check(&self, _arguments: &Arguments) -> Result<()> {
        Ok(())
    }

    /// Intercept the call.
    fn call(&self, env: ChainEnv<'_>) -> Result<Value>;
}

/// A middleware plus its bound arguments, as placed in a stack.
///
/// Equality is structural: same middleware type and name, same bound arguments,
/// same observation mode.
#[derive(Clone)]
pub struct MiddlewareSpec {
    middleware: Arc<dyn Middleware>,
    type_id: TypeId,
    arguments: Arguments,
    observed: bool,
}

impl MiddlewareSpec {
    /// Create a spec without bound arguments.
    pub fn new<M: Middleware>(middleware: M) -> Self {
        Self {
            middleware: Arc::new(middleware),
            type_id: TypeId::of::<M>(),
            arguments: Arguments::new(),
            observed: false,
        }
    }

    /// Bind an argument.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.arguments = self.arguments.with(key, value);
        self
    }

    /// Replace all bound arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// Mark this spec as observed: it cannot alter the chain's control flow.
    #[must_use]
    pub fn observed(mut self) -> Self {
        self.observed = true;
        self
    }

    /// The middleware name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.middleware.name()
    }

    /// The bound arguments.
    #[must_use]
    pub const fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Returns `true` if this spec is observed.
    #[must_use]
    pub const fn is_observed(&self) -> bool {
        self.observed
    }

    /// The middleware.
    #[must_use]
    pub fn middleware(&self) -> &Arc<dyn Middleware> {
        &self.middleware
    }
}

impl PartialEq for MiddlewareSpec {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && self.name() == other.name()
            && self.arguments == other.arguments
            && self.observed == other.observed
    }
}

impl fmt::Display for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.observed {
            write!(f, "observe ")?;
        }
        write!(f, "{}", self.name())?;
        if !self.arguments.is_empty() {
            write!(f, ".with({})", self.arguments)?;
        }
        Ok(())
    }
}

impl fmt::Debug for MiddlewareSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareSpec")
            .field("name", &self.name())
            .field("arguments", &self.arguments)
            .field("observed", &self.observed)
            .finish()
    }
}

impl<M: Middleware> From<M> for MiddlewareSpec {
    fn from(middleware: M) -> Self {
        Self::new(middleware)
    }
}

/// Extension methods to turn a middleware into a [`MiddlewareSpec`].
pub trait MiddlewareExt: Middleware + Sized {
    /// Bind an argument (`Middleware.with(key: value)`).
    fn with(self, key: impl Into<String>, value: impl Into<Json>) -> MiddlewareSpec {
        MiddlewareSpec::new(self).with(key, value)
    }

    /// Wrap without arguments.
    fn spec(self) -> MiddlewareSpec {
        MiddlewareSpec::new(self)
    }
}

impl<M: Middleware> MiddlewareExt for M {}
