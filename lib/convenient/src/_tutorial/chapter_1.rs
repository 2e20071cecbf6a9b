//! # Chapter 1: Configs & Concerns
//!
//! ## Configs
//!
//! A [`Config`](crate::Config) is a named class body that can be included in
//! many classes. Options select variants of the same config:
//!
//! ```ignore
//! let standard = Config::new("Standard", |class, options| {
//!     class.middlewares("result", Scope::Instance, |stack| {
//!         stack.append(Logging);
//!         if options.contains("retry") {
//!             stack.append(Retry.with("attempts", 3));
//!         }
//!         Ok(())
//!     })?;
//!     Ok(())
//! });
//!
//! let service = Class::builder("CreateUser", EntityKind::Service).define(|class| {
//!     class.include(&standard.with(["retry"]))?;
//!     Ok(())
//! })?;
//! ```
//!
//! Including an equal config (same name, same options) twice does nothing.
//! Including a different one appends its middlewares again.
//!
//! ## Editing Stacks
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `append` | add at the end (innermost) |
//! | `append_once` | add at the end unless already present |
//! | `unshift` | add at the start (outermost) |
//! | `insert_before` / `insert_after` | add next to an existing entry |
//! | `replace` | swap an existing entry in place |
//! | `delete` | remove every occurrence |
//!
//! Positioning relative to a missing entry fails with
//! [`Error::MiddlewareNotFound`](crate::Error::MiddlewareNotFound) and the
//! whole edit block is discarded.
//!
//! ## Concerns
//!
//! [`Concern`](crate::Concern)s bundle methods. They live in their own stack
//! and are mixed in at commit:
//!
//! ```ignore
//! class.concerns(|stack| {
//!     stack.append(Concern::new("HasResult").instance_method("result", |_, _| {
//!         Ok(Value::from("success"))
//!     }));
//!     Ok(())
//! })?;
//! ```
//!
//! Next: [Chapter 2: Commit & Inheritance](super::chapter_2)
