//! Method definitions and the invocation context passed to method bodies.

use std::fmt;
use std::sync::Arc;

use crate::class::{Class, Instance, Receiver};
use crate::{Args, Cache, Error, Result, Scope, Value};

/// Body of a method defined on a class or a concern.
pub type MethodFn = Arc<dyn Fn(&Invocation<'_>, Args) -> Result<Value> + Send + Sync>;

/// A resolved method: the body plus the definition it overrides.
pub(crate) struct MethodDef {
    owner: String,
    body: MethodFn,
    super_method: Option<Arc<MethodDef>>,
}

impl MethodDef {
    pub(crate) fn new(
        owner: impl Into<String>,
        body: MethodFn,
        super_method: Option<Arc<MethodDef>>,
    ) -> Self {
        Self {
            owner: owner.into(),
            body,
            super_method,
        }
    }

    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn invoke(&self, receiver: Receiver<'_>, method: &str, args: Args) -> Result<Value> {
        let invocation = Invocation {
            receiver,
            method,
            definition: self,
        };
        (self.body)(&invocation, args)
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("owner", &self.owner)
            .field("super_method", &self.super_method)
            .finish_non_exhaustive()
    }
}

/// What a method body sees about its own call.
pub struct Invocation<'a> {
    receiver: Receiver<'a>,
    method: &'a str,
    definition: &'a MethodDef,
}

impl<'a> Invocation<'a> {
    /// The receiver (an instance or a class).
    #[must_use]
    pub const fn receiver(&self) -> Receiver<'a> {
        self.receiver
    }

    /// The receiving instance, for instance methods.
    #[must_use]
    pub const fn instance(&self) -> Option<&'a Instance> {
        self.receiver.instance()
    }

    /// The class of the receiver.
    #[must_use]
    pub fn class(&self) -> &'a Class {
        self.receiver.class()
    }

    /// Per-receiver state (instance variables for instances, class state otherwise).
    #[must_use]
    pub fn state(&self) -> &'a Cache<String, Value> {
        self.receiver.state()
    }

    /// Name of the method being run.
    #[must_use]
    pub const fn method(&self) -> &'a str {
        self.method
    }

    /// Scope of the method being run.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.receiver.scope()
    }

    /// Name of the class or concern that defines the running body.
    #[must_use]
    pub fn owner(&self) -> &'a str {
        self.definition.owner()
    }

    /// Returns `true` if an overridden definition exists.
    #[must_use]
    pub const fn has_super(&self) -> bool {
        self.definition.super_method.is_some()
    }

    /// Call the overridden definition (`super`).
    ///
    /// Skips the middleware chain: middlewares wrap the method once, around the
    /// most specific definition.
    pub fn call_super(&self, args: Args) -> Result<Value> {
        match &self.definition.super_method {
            Some(definition) => definition.invoke(self.receiver, self.method, args),
            None => Err(Error::NoSuchMethod {
                class: format!("super of {}", self.definition.owner()),
                method: self.method.to_string(),
                scope: self.scope(),
            }),
        }
    }

    /// Call another method on the same receiver, through its middlewares.
    pub fn call(&self, method: &str, args: Args) -> Result<Value> {
        self.receiver.call(method, args)
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("class", &self.class().name())
            .field("method", &self.method)
            .field("owner", &self.definition.owner())
            .finish_non_exhaustive()
    }
}
