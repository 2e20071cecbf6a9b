//! # Chapter 0: Getting Started
//!
//! Define a class, give it a method and wrap that method with a middleware.
//!
//! ## Installation
//!
//! ```toml
//! [dependencies]
//! convenient = "0.1"
//! ```
//!
//! ## Your First Middleware
//!
//! A middleware receives a [`ChainEnv`](crate::ChainEnv) and decides what to
//! do with the call: delegate with `next`, change the arguments, transform the
//! result, or answer on its own.
//!
//! ```ignore
//! use convenient::prelude::*;
//!
//! #[derive(MiddlewareInfo)]
//! #[middleware(name = "upcase", intended_for(methods = ["greet"], scope = "instance"))]
//! struct Upcase;
//!
//! impl Middleware for Upcase {
//!     fn call(&self, env: ChainEnv<'_>) -> Result<Value> {
//!         let value = env.next()?;
//!         Ok(value.as_str().map_or(value.clone(), |s| Value::from(s.to_uppercase())))
//!     }
//! }
//! ```
//!
//! ## Your First Class
//!
//! ```ignore
//! let greeter = Class::builder("Greeter", EntityKind::Service).define(|class| {
//!     class.middlewares("greet", Scope::Instance, |stack| {
//!         stack.append(Upcase);
//!         Ok(())
//!     })?;
//!     class.instance_method("greet", |_, args| {
//!         let name: String = args.parse(0)?;
//!         Ok(Value::from(format!("hello {name}")))
//!     });
//!     Ok(())
//! })?;
//!
//! let instance = greeter.new_instance(Args::new())?;
//! let greeting = instance.call("greet", Args::new().arg("bob"))?;
//! assert_eq!(greeting.as_str(), Some("HELLO BOB"));
//! ```
//!
//! The first call commits the class: its stacks are compiled and can no
//! longer be edited.
//!
//! Next: [Chapter 1: Configs & Concerns](super::chapter_1)
