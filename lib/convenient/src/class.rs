//! Classes, instances and receivers.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::commit::{self, CommitTrigger, CompiledCaller, CompiledClass};
use crate::composition::{Config, Configurator, Definition};
use crate::config::EngineConfig;
use crate::spec::MiddlewareSpec;
use crate::stack::Stack;
use crate::{Args, Cache, EntityKind, Error, Result, Scope, Value};

/// A class: a name, an entity kind, a definition and, once committed, the
/// compiled method callers.
///
/// Cloning a `Class` is cheap and yields a handle to the same class.
///
/// # Example
///
/// ```
/// use convenient::{Args, Class, EntityKind, Value};
///
/// let class = Class::builder("Greeter", EntityKind::Service)
///     .define(|class| {
///         class.instance_method("greet", |_, args| {
///             let name: String = args.parse(0)?;
///             Ok(Value::from(format!("hello {name}")))
///         });
///         Ok(())
///     })
///     .expect("valid class");
///
/// let greeter = class.new_instance(Args::new()).expect("instance");
/// let greeting = greeter.call("greet", Args::new().arg("bob")).expect("call");
/// assert_eq!(greeting.as_str(), Some("hello bob"));
/// assert!(class.is_committed());
/// ```
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

struct ClassInner {
    name: String,
    entity: EntityKind,
    parent: Option<Class>,
    engine: EngineConfig,
    state: RwLock<ClassState>,
    cache: Cache<String, Value>,
}

struct ClassState {
    definition: Definition,
    compiled: Option<Arc<CompiledClass>>,
}

impl Class {
    /// Start defining a root class.
    pub fn builder(name: impl Into<String>, entity: EntityKind) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            entity,
            parent: None,
            engine: EngineConfig::default(),
        }
    }

    /// Start defining a subclass.
    ///
    /// The subclass starts with a copy of this class's included configs and
    /// middleware stacks, its entity kind and its engine configuration. Methods
    /// and concerns are inherited through resolution, and remain reachable with
    /// `call_super`.
    #[must_use]
    pub fn subclass(&self, name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            entity: self.inner.entity.clone(),
            parent: Some(self.clone()),
            engine: self.inner.engine.clone(),
        }
    }

    /// Class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Entity kind.
    #[must_use]
    pub fn entity(&self) -> &EntityKind {
        &self.inner.entity
    }

    /// Parent class.
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.inner.parent.as_ref()
    }

    /// Engine configuration.
    #[must_use]
    pub fn engine(&self) -> &EngineConfig {
        &self.inner.engine
    }

    /// Class-level state.
    #[must_use]
    pub fn state(&self) -> &Cache<String, Value> {
        &self.inner.cache
    }

    /// Returns `true` if `self` is `other` or one of its descendants.
    #[must_use]
    pub fn is_a(&self, other: &Self) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.parent();
        }
        false
    }

    /// Edit the class definition.
    ///
    /// Edits are applied only if `body` succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyCommitted`] once the class is committed.
    ///
    /// # Deadlocks
    ///
    /// `body` must not call methods of this class.
    pub fn configure<F>(&self, body: F) -> Result<()>
    where
        F: FnOnce(&mut Configurator<'_>) -> Result<()>,
    {
        let mut state = self.inner.state.write();
        if state.compiled.is_some() {
            return Err(Error::AlreadyCommitted {
                class: self.inner.name.clone(),
            });
        }
        let mut definition = state.definition.clone();
        body(&mut Configurator::new(
            &self.inner.name,
            &self.inner.entity,
            &mut definition,
        ))?;
        state.definition = definition;
        Ok(())
    }

    /// Include a config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyCommitted`] once the class is committed, or the
    /// config's own error.
    pub fn include(&self, config: &Config) -> Result<()> {
        self.configure(|class| class.include(config).map(|_| ()))
    }

    /// Returns `true` if an equal config was included.
    #[must_use]
    pub fn includes(&self, config: &Config) -> bool {
        self.inner.state.read().definition.configs.contains(config)
    }

    /// A copy of the current middleware stack of a method.
    #[must_use]
    pub fn middlewares(&self, scope: Scope, method: &str) -> Option<Stack<MiddlewareSpec>> {
        self.inner
            .state
            .read()
            .definition
            .registry
            .get(scope, method)
            .cloned()
    }

    /// Returns `true` once the class is committed.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.inner.state.read().compiled.is_some()
    }

    /// Commit the class: resolve methods and build every method caller.
    ///
    /// Committing is idempotent: later commits return the same compiled class.
    /// Instantiating the class or calling one of its methods commits it
    /// implicitly.
    /// Uncommitted ancestors are committed first, with
    /// [`CommitTrigger::Subclass`].
    ///
    /// # Errors
    ///
    /// Returns the configuration error that prevented compilation. Nothing is
    /// cached in that case, so the class stays editable.
    pub fn commit(&self) -> Result<Arc<CompiledClass>> {
        self.commit_with(CommitTrigger::User)
    }

    pub(crate) fn commit_with(&self, trigger: CommitTrigger) -> Result<Arc<CompiledClass>> {
        if let Some(compiled) = &self.inner.state.read().compiled {
            return Ok(Arc::clone(compiled));
        }

        let parent = self
            .inner
            .parent
            .as_ref()
            .map(|parent| parent.commit_with(CommitTrigger::Subclass))
            .transpose()?;

        let mut state = self.inner.state.write();
        if let Some(compiled) = &state.compiled {
            return Ok(Arc::clone(compiled));
        }
        let compiled = Arc::new(commit::compile(
            self,
            &state.definition,
            parent.as_deref(),
            trigger,
        )?);
        info!(
            class = %self.inner.name,
            %trigger,
            callers = compiled.callers().count(),
            "committed config"
        );
        state.compiled = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Drop the compiled state so the class can be edited again.
    ///
    /// Returns `true` if the class was committed. Subclasses that are already
    /// committed keep their own compiled state.
    pub fn reopen(&self) -> bool {
        let reopened = self.inner.state.write().compiled.take().is_some();
        if reopened {
            debug!(class = %self.inner.name, "reopened");
        }
        reopened
    }

    /// The compiled caller of a method, committing the class first.
    ///
    /// Returns `None` for methods without middlewares.
    ///
    /// # Errors
    ///
    /// Returns the commit error, if any.
    pub fn caller(&self, scope: Scope, method: &str) -> Result<Option<Arc<CompiledCaller>>> {
        let compiled = self.commit()?;
        Ok(compiled.caller(scope, method).cloned())
    }

    /// Call a class method.
    ///
    /// # Errors
    ///
    /// Returns the commit error, [`Error::NoSuchMethod`], or the method's own error.
    pub fn call(&self, method: &str, args: Args) -> Result<Value> {
        let compiled = self.commit_with(CommitTrigger::MethodCall)?;
        compiled.dispatch(Receiver::Class(self), method, args)
    }

    /// Create an instance through the class method `new`.
    ///
    /// `new` allocates the instance and calls `initialize` with `args`. Both
    /// can be intercepted or overridden like any other method.
    ///
    /// # Errors
    ///
    /// Returns the commit error, the error of `new` or `initialize`, or
    /// [`Error::NotAnInstance`] if a middleware on `new` replaced the instance.
    pub fn new_instance(&self, args: Args) -> Result<Instance> {
        let compiled = self.commit_with(CommitTrigger::Instantiation)?;
        let value = compiled.dispatch(Receiver::Class(self), "new", args)?;
        value
            .downcast_ref::<Instance>()
            .cloned()
            .ok_or_else(|| Error::NotAnInstance {
                class: self.inner.name.clone(),
            })
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Class {}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.inner.name)
            .field("entity", &self.inner.entity)
            .field("parent", &self.inner.parent.as_ref().map(Self::name))
            .field("committed", &self.is_committed())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Class`].
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    entity: EntityKind,
    parent: Option<Class>,
    engine: EngineConfig,
}

impl ClassBuilder {
    /// Set the engine configuration.
    #[must_use]
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Run the class body and create the class.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the body.
    pub fn define<F>(self, body: F) -> Result<Class>
    where
        F: FnOnce(&mut Configurator<'_>) -> Result<()>,
    {
        let mut definition = self.initial_definition();
        body(&mut Configurator::new(&self.name, &self.entity, &mut definition))?;
        debug!(class = %self.name, parent = ?self.parent.as_ref().map(Class::name), "class defined");
        Ok(self.finish(definition))
    }

    /// Create the class with an empty body.
    #[must_use]
    pub fn build(self) -> Class {
        let definition = self.initial_definition();
        self.finish(definition)
    }

    fn initial_definition(&self) -> Definition {
        match &self.parent {
            Some(parent) => parent.inner.state.read().definition.inherit(&self.name),
            None => Definition::new(&self.name),
        }
    }

    fn finish(self, definition: Definition) -> Class {
        Class {
            inner: Arc::new(ClassInner {
                name: self.name,
                entity: self.entity,
                parent: self.parent,
                engine: self.engine,
                state: RwLock::new(ClassState {
                    definition,
                    compiled: None,
                }),
                cache: Cache::new(),
            }),
        }
    }
}

/// An instance of a [`Class`], with its own state.
///
/// Cloning an `Instance` is cheap and yields a handle to the same instance.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

struct InstanceInner {
    class: Class,
    state: Cache<String, Value>,
}

impl Instance {
    pub(crate) fn allocate(class: &Class) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                class: class.clone(),
                state: Cache::new(),
            }),
        }
    }

    /// The class of this instance.
    #[must_use]
    pub fn class(&self) -> &Class {
        &self.inner.class
    }

    /// Instance state (instance variables, memoized values).
    #[must_use]
    pub fn state(&self) -> &Cache<String, Value> {
        &self.inner.state
    }

    /// Read an instance variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.state.read(&key.to_string())
    }

    /// Write an instance variable.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.state.write(key.into(), value.into());
    }

    /// Call an instance method.
    ///
    /// # Errors
    ///
    /// Returns the commit error, [`Error::NoSuchMethod`], or the method's own error.
    pub fn call(&self, method: &str, args: Args) -> Result<Value> {
        let compiled = self.inner.class.commit_with(CommitTrigger::MethodCall)?;
        compiled.dispatch(Receiver::Instance(self), method, args)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.inner.class.name())
            .field("state", &self.inner.state)
            .finish()
    }
}

/// The receiver of a call.
#[derive(Debug, Clone, Copy)]
pub enum Receiver<'a> {
    /// An instance, for instance methods.
    Instance(&'a Instance),
    /// A class, for class methods.
    Class(&'a Class),
}

impl<'a> Receiver<'a> {
    /// Scope of the methods this receiver responds to.
    #[must_use]
    pub const fn scope(self) -> Scope {
        match self {
            Self::Instance(_) => Scope::Instance,
            Self::Class(_) => Scope::Class,
        }
    }

    /// The class of the receiver.
    #[must_use]
    pub fn class(self) -> &'a Class {
        match self {
            Self::Instance(instance) => &instance.inner.class,
            Self::Class(class) => class,
        }
    }

    /// The receiver as an instance.
    #[must_use]
    pub const fn instance(self) -> Option<&'a Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Class(_) => None,
        }
    }

    /// Per-receiver state.
    #[must_use]
    pub fn state(self) -> &'a Cache<String, Value> {
        match self {
            Self::Instance(instance) => instance.state(),
            Self::Class(class) => class.state(),
        }
    }

    /// Call a method on the receiver.
    ///
    /// # Errors
    ///
    /// Returns the error of the call.
    pub fn call(self, method: &str, args: Args) -> Result<Value> {
        match self {
            Self::Instance(instance) => instance.call(method, args),
            Self::Class(class) => class.call(method, args),
        }
    }
}

impl fmt::Display for Receiver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(instance) => write!(f, "#<{}>", instance.class().name()),
            Self::Class(class) => write!(f, "{}", class.name()),
        }
    }
}
