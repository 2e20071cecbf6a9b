//! # Chapter 2: Commit & Inheritance
//!
//! ## Commit
//!
//! A class is committed explicitly with [`Class::commit`](crate::Class::commit),
//! or implicitly by its first instantiation or method call. Commit:
//!
//! 1. resolves every method (class body, then concerns, then the parent),
//! 2. checks each middleware's `intended_for` declaration,
//! 3. validates the arguments bound to each middleware,
//! 4. compiles each non-empty stack into a caller.
//!
//! Commit runs once, even when many threads race to trigger it. Afterwards
//! [`Class::configure`](crate::Class::configure) fails with
//! [`Error::AlreadyCommitted`](crate::Error::AlreadyCommitted), until
//! [`Class::reopen`](crate::Class::reopen) drops the compiled state.
//!
//! ## Engine Configuration
//!
//! ```ignore
//! let engine = EngineConfig::builder()
//!     .backend(Backend::Layered)
//!     .check_intended_for(false)
//!     .build();
//!
//! let class = Class::builder("Legacy", EntityKind::Service)
//!     .engine(engine)
//!     .build();
//! ```
//!
//! Both backends run the same middlewares in the same order.
//!
//! ## Subclasses
//!
//! ```ignore
//! let admin = user.subclass("CreateAdmin").define(|class| {
//!     class.instance_method("result", |invocation, args| {
//!         let value = invocation.call_super(args)?;
//!         Ok(value)
//!     });
//!     Ok(())
//! })?;
//! ```
//!
//! A subclass starts with a copy of its parent's middleware stacks and
//! included configs. `call_super` runs the overridden definition directly,
//! without running the middlewares a second time.
//!
//! Next: [Chapter 3: Middleware](super::chapter_3)
