//! Core types and traits for the convenient method-middleware engine.
//!
//! This crate provides the foundational types used by convenient:
//! - [`Scope`] and [`EntityKind`] - Where a method lives and what role its class plays
//! - [`InterceptionTarget`] and [`IntendedFor`] - Targets and middleware applicability
//! - [`Value`] and [`Object`] - Dynamic values threaded through method chains
//! - [`Args`], [`Block`] and [`Arguments`] - Call arguments and middleware bound arguments
//! - [`Error`] and [`Result`] - Error handling
//! - [`Cache`] - Concurrent key/value store for memoized state
//! - [`Container`] and [`Import`] - Dependency container with lazy imports

mod args;
mod cache;
mod dependency;
mod error;
pub mod prelude;
mod scope;
mod target;
mod value;

pub use args::{Args, Arguments, Block};
pub use cache::Cache;
pub use dependency::{Container, ExportFn, Import};
pub use error::{Error, Result};
pub use scope::{EntityKind, Scope};
pub use target::{IntendedFor, InterceptionTarget, Selector};
pub use value::{Object, Value};

// Re-export the JSON value type used for data values and bound arguments
pub use serde_json::{Value as Json, json};
