//! Call recording, for tests and instrumentation.
//!
//! Attach a [`Recorder`] with [`Stack::observe`](crate::Stack::observe) to watch
//! a method without being able to change its outcome.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Args, ChainEnv, Middleware, MiddlewareInfo, Result, Scope, Value};

/// One observed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    /// Receiving class name.
    pub class: String,
    /// Method scope.
    pub scope: Scope,
    /// Method name.
    pub method: String,
    /// Call arguments.
    pub args: Args,
    /// What the rest of the chain returned.
    pub outcome: Result<Value>,
}

/// Middleware that records every call it sees into a shared log.
///
/// Clones share the same log.
///
/// # Example
///
/// ```
/// use convenient::middleware::Recorder;
///
/// let recorder = Recorder::new();
/// let watcher = recorder.clone();
/// assert!(watcher.calls().is_empty());
/// ```
#[derive(Debug, Clone, Default, MiddlewareInfo)]
#[middleware(name = "recorder")]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl Recorder {
    /// Create a recorder with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the log.
    #[must_use]
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().clone()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Empty the log.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl Middleware for Recorder {
    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        let outcome = env.next();
        self.calls.lock().push(Recorded {
            class: env.class().name().to_string(),
            scope: env.scope(),
            method: env.method().to_string(),
            args: env.args.clone(),
            outcome: outcome.clone(),
        });
        outcome
    }
}
