//! # Chapter 3: Middleware
//!
//! ## Feature Flags
//!
//! Enable built-in middlewares in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! convenient = { version = "0.1", default-features = false, features = ["middleware-core"] }
//! ```
//!
//! | Feature | Middleware | Description |
//! |---------|------------|-------------|
//! | `middleware-logging` | `Logging` | Log calls and outcomes |
//! | `middleware-retry` | `Retry` | Re-run the inner chain on raised errors |
//! | `middleware-cache` | `CachesReturnValue` | Memoize per receiver and arguments |
//! | `middleware-ensure-result` | `EnsureResult` | Fail when `result` does not return a result |
//! | `middleware-metrics` | `Metrics` | Counters and histograms |
//!
//! ## Middleware Order
//!
//! The first entry of a stack is the outermost:
//!
//! ```text
//! call   → Logging → Retry → CachesReturnValue → method
//! result ← Logging ← Retry ← CachesReturnValue ← method
//! ```
//!
//! With this order, `Logging` runs once per call while `CachesReturnValue`
//! and the method run once per attempt.
//!
//! ## Observers
//!
//! [`Stack::observe`](crate::Stack::observe) appends a middleware that sees
//! every call but cannot change it. The inner chain runs once with the
//! original arguments, and its outcome is returned even if the observer
//! returns something else or fails.
//!
//! ```ignore
//! let recorder = Recorder::new();
//! class.middlewares("result", Scope::Instance, |stack| {
//!     stack.observe(recorder.clone());
//!     Ok(())
//! })?;
//! ```
//!
//! ## Dependencies
//!
//! Middlewares that need a capability defined elsewhere import it from a
//! [`Container`](crate::Container). Resolution is lazy: a missing export only
//! fails when the import is called.
//!
//! ```ignore
//! let results = Container::new("Results");
//! results.export("is_result", Scope::Instance, |args| Ok(Value::from(true)));
//!
//! stack.append(EnsureResult::new(results.import("is_result", Scope::Instance)));
//! ```
