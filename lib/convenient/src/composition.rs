//! Configs: reusable, named bundles of stack edits and methods included into
//! classes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::debug;

use crate::concern::Concern;
use crate::method::{Invocation, MethodFn};
use crate::registry::{Registry, StackKey};
use crate::spec::MiddlewareSpec;
use crate::stack::Stack;
use crate::{Args, EntityKind, Result, Scope, Value};

/// Everything a class body and its configs contributed, before commit.
#[derive(Clone)]
pub(crate) struct Definition {
    pub(crate) configs: Vec<Config>,
    pub(crate) concerns: Stack<Concern>,
    pub(crate) registry: Registry,
    pub(crate) instance_methods: BTreeMap<String, MethodFn>,
    pub(crate) class_methods: BTreeMap<String, MethodFn>,
}

impl Definition {
    pub(crate) fn new(class: &str) -> Self {
        Self {
            configs: Vec::new(),
            concerns: Stack::new(format!("concerns of {class}")),
            registry: Registry::default(),
            instance_methods: BTreeMap::new(),
            class_methods: BTreeMap::new(),
        }
    }

    /// What a subclass starts from: included configs and middleware stacks.
    ///
    /// Concerns and methods are not copied; they are reached through the
    /// parent at resolution time.
    pub(crate) fn inherit(&self, class: &str) -> Self {
        Self {
            configs: self.configs.clone(),
            registry: self.registry.inherit(class),
            ..Self::new(class)
        }
    }

    pub(crate) const fn methods(&self, scope: Scope) -> &BTreeMap<String, MethodFn> {
        match scope {
            Scope::Instance => &self.instance_methods,
            Scope::Class => &self.class_methods,
        }
    }

    const fn methods_mut(&mut self, scope: Scope) -> &mut BTreeMap<String, MethodFn> {
        match scope {
            Scope::Instance => &mut self.instance_methods,
            Scope::Class => &mut self.class_methods,
        }
    }
}

/// Options a config was specialized with (`Config.with(:option)`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Options(BTreeSet<String>);

impl Options {
    /// Returns `true` if the option is enabled.
    #[must_use]
    pub fn contains(&self, option: &str) -> bool {
        self.0.contains(option)
    }

    /// Iterate over enabled options, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if no option is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Options {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options: Vec<_> = self.iter().collect();
        f.write_str(&options.join(", "))
    }
}

type ConfigBody = Arc<dyn Fn(&mut Configurator<'_>, &Options) -> Result<()> + Send + Sync>;

/// A reusable config.
///
/// A config is a named body run against a class's [`Configurator`] when it is
/// included. The body receives the options the config was specialized with.
/// Two configs are equal when they have the same name and options, and
/// including an equal config twice is a no-op.
///
/// # Example
///
/// ```
/// use convenient::{Config, Scope};
///
/// let standard = Config::new("Standard", |class, options| {
///     class.middlewares("result", Scope::Instance, |stack| {
///         if options.contains("retry") {
///             stack.append(convenient::middleware::Retry);
///         }
///         Ok(())
///     })?;
///     Ok(())
/// });
///
/// let with_retry = standard.with(["retry"]);
/// assert_ne!(standard, with_retry);
/// assert_eq!(with_retry.to_string(), "Standard.with(retry)");
/// ```
#[derive(Clone)]
pub struct Config {
    name: Arc<str>,
    options: Options,
    body: ConfigBody,
}

impl Config {
    /// Create a config.
    pub fn new<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&mut Configurator<'_>, &Options) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            options: Options::default(),
            body: Arc::new(body),
        }
    }

    /// The same config with extra options enabled.
    #[must_use]
    pub fn with<I, S>(&self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = self.clone();
        config.options.0.extend(options.into_iter().map(Into::into));
        config
    }

    /// The same config with some options disabled.
    #[must_use]
    pub fn without<I, S>(&self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config = self.clone();
        for option in options {
            config.options.0.remove(&option.into());
        }
        config
    }

    /// The config name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The enabled options.
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.options == other.options
    }
}

impl Eq for Config {}

impl Hash for Config {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.options.hash(state);
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.options.is_empty() {
            write!(f, ".with({})", self.options)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Edits a class definition: includes configs, edits stacks, defines methods.
///
/// Handed to class bodies ([`ClassBuilder::define`](crate::ClassBuilder::define),
/// [`Class::configure`](crate::Class::configure)) and to config bodies.
pub struct Configurator<'a> {
    class: &'a str,
    entity: &'a EntityKind,
    definition: &'a mut Definition,
}

impl<'a> Configurator<'a> {
    pub(crate) const fn new(
        class: &'a str,
        entity: &'a EntityKind,
        definition: &'a mut Definition,
    ) -> Self {
        Self {
            class,
            entity,
            definition,
        }
    }

    /// Name of the class being configured.
    #[must_use]
    pub const fn class_name(&self) -> &str {
        self.class
    }

    /// Entity kind of the class being configured.
    #[must_use]
    pub const fn entity(&self) -> &EntityKind {
        self.entity
    }

    /// Include a config.
    ///
    /// Including a config equal to one already included does nothing. When the
    /// config body fails, every edit it made is rolled back.
    pub fn include(&mut self, config: &Config) -> Result<&mut Self> {
        if self.includes(config) {
            debug!(class = self.class, %config, "config already included, skipping");
            return Ok(self);
        }

        debug!(class = self.class, %config, "including config");
        let snapshot = self.definition.clone();
        self.definition.configs.push(config.clone());
        if let Err(err) = (config.body)(self, &config.options) {
            *self.definition = snapshot;
            return Err(err);
        }
        Ok(self)
    }

    /// Returns `true` if an equal config was included.
    #[must_use]
    pub fn includes(&self, config: &Config) -> bool {
        self.definition.configs.contains(config)
    }

    /// Edit the concern stack.
    ///
    /// Edits are applied only if `edit` succeeds.
    pub fn concerns<F>(&mut self, edit: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Stack<Concern>) -> Result<()>,
    {
        let mut stack = self.definition.concerns.clone();
        edit(&mut stack)?;
        self.definition.concerns = stack;
        Ok(self)
    }

    /// Edit the middleware stack of a method.
    ///
    /// Edits are applied only if `edit` succeeds.
    ///
    /// ```
    /// use convenient::{Class, EntityKind, Scope};
    /// use convenient::middleware::Logging;
    ///
    /// let class = Class::builder("CreateUser", EntityKind::Service)
    ///     .define(|class| {
    ///         class.middlewares("result", Scope::Instance, |stack| {
    ///             stack.append(Logging);
    ///             Ok(())
    ///         })?;
    ///         Ok(())
    ///     })
    ///     .expect("valid class");
    ///
    /// assert_eq!(class.middlewares(Scope::Instance, "result").map(|s| s.len()), Some(1));
    /// ```
    pub fn middlewares<F>(&mut self, method: &str, scope: Scope, edit: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Stack<MiddlewareSpec>) -> Result<()>,
    {
        let key = StackKey::new(scope, method);
        let mut stack = self.definition.registry.snapshot(self.class, &key);
        edit(&mut stack)?;
        self.definition.registry.insert(key, stack);
        Ok(self)
    }

    /// The current middleware stack of a method.
    #[must_use]
    pub fn middleware_stack(&self, method: &str, scope: Scope) -> Option<&Stack<MiddlewareSpec>> {
        self.definition.registry.get(scope, method)
    }

    /// Define (or redefine) an instance method.
    pub fn instance_method<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&Invocation<'_>, Args) -> Result<Value> + Send + Sync + 'static,
    {
        self.define(Scope::Instance, name.into(), Arc::new(body))
    }

    /// Define (or redefine) a class method.
    pub fn class_method<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&Invocation<'_>, Args) -> Result<Value> + Send + Sync + 'static,
    {
        self.define(Scope::Class, name.into(), Arc::new(body))
    }

    fn define(&mut self, scope: Scope, name: String, body: MethodFn) -> &mut Self {
        debug!(class = self.class, %scope, method = %name, "defining method");
        self.definition.methods_mut(scope).insert(name, body);
        self
    }
}

impl fmt::Debug for Configurator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configurator")
            .field("class", &self.class)
            .field("entity", &self.entity)
            .field("configs", &self.definition.configs)
            .finish_non_exhaustive()
    }
}
