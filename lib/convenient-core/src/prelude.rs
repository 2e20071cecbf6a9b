//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types
//! for easy glob importing:
//!
//! ```ignore
//! use convenient_core::prelude::*;
//! ```

pub use crate::{
    Args, Arguments, Block, Cache, Container, EntityKind, Error, Import, IntendedFor,
    InterceptionTarget, Result, Scope, Value, json,
};
