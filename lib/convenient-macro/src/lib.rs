//! Procedural macros for the convenient method-middleware pipeline.
//!
//! This crate provides:
//! - `#[derive(MiddlewareInfo)]` - Name a middleware and declare the targets it supports
//!
//! # Example
//!
//! ```ignore
//! use convenient::prelude::*;
//!
//! #[derive(MiddlewareInfo)]
//! #[middleware(
//!     name = "rollback_on_failure",
//!     intended_for(methods = ["result"], scope = "instance", entity = "service")
//! )]
//! struct RollbackOnFailure;
//! ```

mod attrs;
mod middleware_derive;

use proc_macro::TokenStream;

/// Derive `convenient::MiddlewareInfo`.
///
/// # Attributes
///
/// - `name` (optional): name used in logs and errors, defaults to the
///   `snake_case` type name
/// - `intended_for(...)` (optional): targets the middleware may be attached to
///   - `methods = ["result", ...]`: method names
///   - `scope = "instance" | "class"`
///   - `entity = "service"` or `entities = ["service", "step"]`
///
/// Anything omitted matches every target.
///
/// # Example
///
/// ```ignore
/// #[derive(MiddlewareInfo)]
/// #[middleware(intended_for(methods = ["new"], scope = "class"))]
/// struct CountInstances;
///
/// assert_eq!(CountInstances.name(), "count_instances");
/// ```
#[proc_macro_derive(MiddlewareInfo, attributes(middleware))]
pub fn derive_middleware_info(input: TokenStream) -> TokenStream {
    middleware_derive::expand_middleware_info(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
