//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types, traits, and macros
//! for easy glob importing:
//!
//! ```ignore
//! use convenient::prelude::*;
//! ```

pub use crate::{
    Args, Arguments, ChainEnv, Class, Concern, Config, Configurator, Container, EngineConfig,
    EntityKind, Error, Import, Instance, IntendedFor, Invocation, Middleware, MiddlewareExt,
    MiddlewareInfo, MiddlewareSpec, Result, Scope, Stack, Value, json,
};
