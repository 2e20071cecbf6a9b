//! Commit: method resolution and compilation of every middleware stack into a
//! method caller.
//!
//! Resolution order for a method, from most to least specific:
//!
//! 1. the class's own definition,
//! 2. its concerns, last included first,
//! 3. the parent class's resolved definition (which itself follows 1-3),
//! 4. the builtin roots (`new` for classes, `initialize` for instances).
//!
//! Each level keeps a link to the next one as its `super`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use derive_more::Display;
use tracing::debug;

use crate::builder;
use crate::chain::{CallContext, Callable};
use crate::class::{Class, Instance, Receiver};
use crate::composition::Definition;
use crate::config::Backend;
use crate::method::{Invocation, MethodDef, MethodFn};
use crate::registry::StackKey;
use crate::spec::MiddlewareSpec;
use crate::{Args, Error, InterceptionTarget, Result, Scope, Value};

const ROOT: &str = "Object";

/// What caused a class to be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CommitTrigger {
    /// An explicit [`Class::commit`] call.
    #[display("user")]
    User,
    /// The first method call on the class or one of its instances.
    #[display("method call")]
    MethodCall,
    /// The first instantiation.
    #[display("instantiation")]
    Instantiation,
    /// The commit of a subclass, which commits its ancestors first.
    #[display("subclass")]
    Subclass,
}

/// A committed class: resolved methods and compiled callers.
pub struct CompiledClass {
    class: String,
    trigger: CommitTrigger,
    methods: BTreeMap<StackKey, Arc<MethodDef>>,
    callers: BTreeMap<StackKey, Arc<CompiledCaller>>,
}

impl CompiledClass {
    /// Name of the committed class.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// What triggered the commit.
    #[must_use]
    pub const fn trigger(&self) -> CommitTrigger {
        self.trigger
    }

    /// The caller of a method, if it has middlewares.
    #[must_use]
    pub fn caller(&self, scope: Scope, method: &str) -> Option<&Arc<CompiledCaller>> {
        self.callers.get(&StackKey::new(scope, method))
    }

    /// Every compiled caller, in key order.
    pub fn callers(&self) -> impl Iterator<Item = &Arc<CompiledCaller>> {
        self.callers.values()
    }

    /// Returns `true` if the method is defined or intercepted.
    #[must_use]
    pub fn responds_to(&self, scope: Scope, method: &str) -> bool {
        let key = StackKey::new(scope, method);
        self.methods.contains_key(&key) || self.callers.contains_key(&key)
    }

    pub(crate) fn dispatch(&self, receiver: Receiver<'_>, method: &str, args: Args) -> Result<Value> {
        let key = StackKey::new(receiver.scope(), method);
        if let Some(caller) = self.callers.get(&key) {
            return caller.invoke(receiver, args);
        }
        if let Some(definition) = self.methods.get(&key) {
            return definition.invoke(receiver, method, args);
        }
        Err(Error::NoSuchMethod {
            class: receiver.class().name().to_string(),
            method: method.to_string(),
            scope: receiver.scope(),
        })
    }
}

impl fmt::Debug for CompiledClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledClass")
            .field("class", &self.class)
            .field("trigger", &self.trigger)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("callers", &self.callers.values().collect::<Vec<_>>())
            .finish()
    }
}

/// A method wrapped by its middleware chain.
pub struct CompiledCaller {
    key: StackKey,
    middlewares: Vec<MiddlewareSpec>,
    backend: Backend,
    chain: Arc<dyn Callable>,
}

impl CompiledCaller {
    /// Scope of the intercepted method.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.key.scope
    }

    /// Name of the intercepted method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.key.method
    }

    /// The middlewares, outermost first, as they were at commit time.
    #[must_use]
    pub fn middlewares(&self) -> &[MiddlewareSpec] {
        &self.middlewares
    }

    /// Backend the chain was built with.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    pub(crate) fn invoke(&self, receiver: Receiver<'_>, args: Args) -> Result<Value> {
        let ctx = CallContext {
            receiver,
            method: &self.key.method,
        };
        self.chain.call(ctx, args)
    }
}

impl fmt::Debug for CompiledCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCaller")
            .field("key", &self.key)
            .field("middlewares", &self.middlewares)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// The innermost position of a chain: the resolved method.
enum Terminal {
    Method(Arc<MethodDef>),
    NotOverridden { class: String, key: StackKey },
}

impl Callable for Terminal {
    fn call(&self, ctx: CallContext<'_>, args: Args) -> Result<Value> {
        match self {
            Self::Method(definition) => definition.invoke(ctx.receiver, ctx.method, args),
            Self::NotOverridden { class, key } => Err(Error::MethodNotOverridden {
                class: class.clone(),
                method: key.method.clone(),
                scope: key.scope,
            }),
        }
    }
}

pub(crate) fn compile(
    class: &Class,
    definition: &Definition,
    parent: Option<&CompiledClass>,
    trigger: CommitTrigger,
) -> Result<CompiledClass> {
    let methods = resolve_methods(class.name(), definition, parent);
    let engine = class.engine();

    let mut callers = BTreeMap::new();
    for (key, stack) in definition.registry.iter() {
        if stack.is_empty() {
            continue;
        }

        if engine.check_intended_for {
            let target = InterceptionTarget::new(key.scope, key.method.clone(), class.entity().clone());
            for spec in stack {
                let intended_for = spec.middleware().intended_for();
                if !intended_for.matches(&target) {
                    return Err(Error::NotIntendedFor {
                        middleware: spec.name().to_string(),
                        class: class.name().to_string(),
                        target: target.to_string(),
                        intended_for: intended_for.to_string(),
                    });
                }
            }
        }

        let terminal = match methods.get(key) {
            Some(definition) => Terminal::Method(Arc::clone(definition)),
            None => Terminal::NotOverridden {
                class: class.name().to_string(),
                key: key.clone(),
            },
        };
        let chain = builder::build(engine.backend, stack.entries(), Arc::new(terminal))?;
        debug!(
            class = class.name(),
            method = %key,
            middlewares = stack.len(),
            backend = %engine.backend,
            "compiled caller"
        );

        callers.insert(
            key.clone(),
            Arc::new(CompiledCaller {
                key: key.clone(),
                middlewares: stack.entries().to_vec(),
                backend: engine.backend,
                chain,
            }),
        );
    }

    Ok(CompiledClass {
        class: class.name().to_string(),
        trigger,
        methods,
        callers,
    })
}

fn resolve_methods(
    class: &str,
    definition: &Definition,
    parent: Option<&CompiledClass>,
) -> BTreeMap<StackKey, Arc<MethodDef>> {
    let mut keys = BTreeSet::new();
    for scope in [Scope::Instance, Scope::Class] {
        keys.extend(
            definition
                .methods(scope)
                .keys()
                .map(|method| StackKey::new(scope, method.as_str())),
        );
        for concern in &definition.concerns {
            keys.extend(
                concern
                    .methods(scope)
                    .keys()
                    .map(|method| StackKey::new(scope, method.as_str())),
            );
        }
    }
    match parent {
        Some(parent) => keys.extend(parent.methods.keys().cloned()),
        None => keys.extend(builtins().map(|(key, _)| key)),
    }

    keys.into_iter()
        .filter_map(|key| {
            let resolved = resolve(class, definition, parent, &key)?;
            Some((key, resolved))
        })
        .collect()
}

fn resolve(
    class: &str,
    definition: &Definition,
    parent: Option<&CompiledClass>,
    key: &StackKey,
) -> Option<Arc<MethodDef>> {
    let mut resolved = match parent {
        Some(parent) => parent.methods.get(key).cloned(),
        None => builtins()
            .find(|(builtin, _)| builtin == key)
            .map(|(_, body)| Arc::new(MethodDef::new(ROOT, body, None))),
    };

    for concern in &definition.concerns {
        if let Some(body) = concern.method(key.scope, &key.method) {
            resolved = Some(Arc::new(MethodDef::new(
                concern.name(),
                Arc::clone(body),
                resolved,
            )));
        }
    }

    if let Some(body) = definition.methods(key.scope).get(&key.method) {
        resolved = Some(Arc::new(MethodDef::new(class, Arc::clone(body), resolved)));
    }

    resolved
}

fn builtins() -> impl Iterator<Item = (StackKey, MethodFn)> {
    let new: MethodFn = Arc::new(allocate_and_initialize);
    let initialize: MethodFn = Arc::new(initialize_nothing);
    [
        (StackKey::new(Scope::Class, "new"), new),
        (StackKey::new(Scope::Instance, "initialize"), initialize),
    ]
    .into_iter()
}

fn allocate_and_initialize(invocation: &Invocation<'_>, args: Args) -> Result<Value> {
    let instance = Instance::allocate(invocation.class());
    instance.call("initialize", args)?;
    Ok(Value::object(instance))
}

fn initialize_nothing(_: &Invocation<'_>, _: Args) -> Result<Value> {
    Ok(Value::null())
}
