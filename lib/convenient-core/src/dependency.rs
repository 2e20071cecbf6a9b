//! Dependency container.
//!
//! Plugins export named capabilities into a [`Container`]; other plugins
//! [import](Container::import) them without a compile-time dependency on the
//! exporter. Imports are resolved on every call, so a capability may be
//! exported after it was imported.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::{Args, Error, Result, Scope, Value};

/// An exported capability.
pub type ExportFn = Arc<dyn Fn(&Args) -> Result<Value> + Send + Sync>;

struct ContainerInner {
    name: String,
    exports: RwLock<BTreeMap<(Scope, String), ExportFn>>,
}

/// A named namespace of exported capabilities.
///
/// # Example
///
/// ```
/// use convenient_core::{Args, Container, Scope, Value};
///
/// let results = Container::new("Plugins::HasResult");
/// let is_result = results.import("is_result", Scope::Instance);
///
/// // Exported after the import: resolution happens at call time
/// results.export("is_result", Scope::Instance, |args| {
///     Ok(Value::from(args.get(0).is_some_and(|v| v.as_str() == Some("success"))))
/// });
///
/// let answer = is_result.call(&Args::new().arg("success")).expect("exported");
/// assert_eq!(answer.as_bool(), Some(true));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// Create an empty container.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                name: name.into(),
                exports: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    /// The container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Export a capability, replacing any previous export with the same name and scope.
    pub fn export<F>(&self, name: impl Into<String>, scope: Scope, f: F)
    where
        F: Fn(&Args) -> Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        trace!(container = %self.inner.name, %name, %scope, "exporting dependency");
        self.inner.exports.write().insert((scope, name), Arc::new(f));
    }

    /// Returns `true` if the capability is exported.
    #[must_use]
    pub fn is_exported(&self, name: &str, scope: Scope) -> bool {
        self.inner
            .exports
            .read()
            .contains_key(&(scope, name.to_string()))
    }

    /// Names of exported capabilities, rendered as `scope name`.
    #[must_use]
    pub fn exports(&self) -> Vec<String> {
        self.inner
            .exports
            .read()
            .keys()
            .map(|(scope, name)| format!("{scope} {name}"))
            .collect()
    }

    /// Resolve an export now.
    pub fn resolve(&self, name: &str, scope: Scope) -> Result<ExportFn> {
        let found = self.inner.exports.read().get(&(scope, name.to_string())).cloned();
        found.ok_or_else(|| {
            let exported = self.exports();
            Error::DependencyNotSatisfied {
                name: name.to_string(),
                scope,
                container: self.inner.name.clone(),
                exported: if exported.is_empty() {
                    "(nothing)".to_string()
                } else {
                    exported.join(", ")
                },
            }
        })
    }

    /// Create a lazily resolved import.
    #[must_use]
    pub fn import(&self, name: impl Into<String>, scope: Scope) -> Import {
        Import {
            name: name.into(),
            scope,
            from: self.clone(),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.inner.name)
            .field("exports", &self.exports())
            .finish()
    }
}

/// A proxy to a capability exported by a [`Container`].
#[derive(Clone)]
pub struct Import {
    name: String,
    scope: Scope,
    from: Container,
}

impl Import {
    /// The imported name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The imported scope.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// The expected exporter.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.from
    }

    /// Resolve the capability and call it.
    pub fn call(&self, args: &Args) -> Result<Value> {
        let export = self.from.resolve(&self.name, self.scope)?;
        export(args)
    }
}

impl fmt::Debug for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Import")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("from", &self.from.name())
            .finish()
    }
}
