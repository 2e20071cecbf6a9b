//! Metrics middleware using the metrics crate facade.
//!
//! Records method call metrics using the `metrics` crate, which allows
//! integration with various metrics backends (Prometheus, `StatsD`, etc.).

use std::time::Instant;

use crate::{ChainEnv, Middleware, MiddlewareInfo, Result, Value};

/// Labels used for metrics.
const LABEL_CLASS: &str = "class";
const LABEL_SCOPE: &str = "scope";
const LABEL_METHOD: &str = "method";
const LABEL_OUTCOME: &str = "outcome";

/// Metric names.
const METRIC_CALLS_TOTAL: &str = "convenient_method_calls_total";
const METRIC_CALL_DURATION: &str = "convenient_method_duration_seconds";
const METRIC_CALLS_IN_FLIGHT: &str = "convenient_method_calls_in_flight";

/// Middleware that records method metrics.
///
/// Records the following metrics:
/// - `convenient_method_calls_total` (counter): calls, labeled by class, scope, method and outcome
/// - `convenient_method_duration_seconds` (histogram): call duration in seconds
/// - `convenient_method_calls_in_flight` (gauge): calls currently running
#[derive(Debug, Clone, Copy, Default, MiddlewareInfo)]
#[middleware(name = "metrics")]
pub struct Metrics;

impl Middleware for Metrics {
    fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
        let class = env.class().name().to_string();
        let scope = env.scope().to_string();
        let method = env.method().to_string();
        let start = Instant::now();

        metrics::gauge!(METRIC_CALLS_IN_FLIGHT).increment(1.0);
        let result = env.next();
        metrics::gauge!(METRIC_CALLS_IN_FLIGHT).decrement(1.0);

        let duration = start.elapsed().as_secs_f64();
        metrics::histogram!(
            METRIC_CALL_DURATION,
            LABEL_CLASS => class.clone(),
            LABEL_SCOPE => scope.clone(),
            LABEL_METHOD => method.clone()
        )
        .record(duration);

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            METRIC_CALLS_TOTAL,
            LABEL_CLASS => class,
            LABEL_SCOPE => scope,
            LABEL_METHOD => method,
            LABEL_OUTCOME => outcome
        )
        .increment(1);

        result
    }
}
