//! Method-middleware pipeline for service objects.
//!
//! Classes declare, per method, an ordered stack of middlewares. Reusable
//! configs edit those stacks and mix in concerns. On commit (explicit, or on
//! first instantiation or method call) every stack is compiled into a caller
//! that runs the middlewares around the original method.
//!
//! # Example
//!
//! ```
//! use convenient::prelude::*;
//! use convenient::middleware::Recorder;
//!
//! let recorder = Recorder::new();
//! let observed = recorder.clone();
//!
//! let standard = Config::new("Standard", move |class, _options| {
//!     let recorder = observed.clone();
//!     class.middlewares("result", Scope::Instance, move |stack| {
//!         stack.observe(recorder);
//!         Ok(())
//!     })?;
//!     Ok(())
//! });
//!
//! let service = Class::builder("CreateUser", EntityKind::Service)
//!     .define(|class| {
//!         class.include(&standard)?;
//!         class.instance_method("result", |_, _| Ok(Value::from("success")));
//!         Ok(())
//!     })?;
//!
//! let instance = service.new_instance(Args::new())?;
//! assert_eq!(instance.call("result", Args::new())?.as_str(), Some("success"));
//! assert_eq!(recorder.len(), 1);
//! # Ok::<(), convenient::Error>(())
//! ```
//!
//! See the [tutorial][_tutorial] for a complete guide.

extern crate self as convenient;

pub mod _tutorial;
mod builder;
mod chain;
mod class;
mod commit;
mod composition;
mod concern;
mod config;
mod method;
pub mod middleware;
pub mod prelude;
mod registry;
mod spec;
mod stack;

pub use chain::ChainEnv;
pub use class::{Class, ClassBuilder, Instance, Receiver};
pub use commit::{CommitTrigger, CompiledCaller, CompiledClass};
pub use composition::{Config, Configurator, Options};
pub use concern::Concern;
pub use config::{Backend, EngineConfig, EngineConfigBuilder};
pub use method::{Invocation, MethodFn};
pub use registry::{Registry, StackKey};
pub use spec::{Middleware, MiddlewareExt, MiddlewareInfo, MiddlewareSpec};
pub use stack::Stack;

// Re-export core types
pub use convenient_core::{
    Args, Arguments, Block, Cache, Container, EntityKind, Error, ExportFn, Import, IntendedFor,
    InterceptionTarget, Json, Object, Result, Scope, Selector, Value, json,
};

// Re-export macros
pub use convenient_macro::MiddlewareInfo;
