//! Concerns: named bundles of instance and class methods mixed into a class.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::method::{Invocation, MethodFn};
use crate::{Args, Result, Scope, Value};

/// A named bundle of methods.
///
/// Concerns are kept in an ordered [`Stack`](crate::Stack) per class. At commit
/// time they are mixed in first to last, so a later concern overrides an
/// earlier one and the class's own methods override every concern. Overridden
/// definitions stay reachable with [`Invocation::call_super`].
///
/// Two concerns are equal when they have the same name.
///
/// # Example
///
/// ```
/// use convenient::{Concern, Value};
///
/// let concern = Concern::new("HasGreeting")
///     .instance_method("greeting", |_, _| Ok(Value::from("hello")));
/// assert!(concern.responds_to(convenient::Scope::Instance, "greeting"));
/// ```
#[derive(Clone)]
pub struct Concern {
    name: Arc<str>,
    instance_methods: BTreeMap<String, MethodFn>,
    class_methods: BTreeMap<String, MethodFn>,
}

impl Concern {
    /// Create an empty concern.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            instance_methods: BTreeMap::new(),
            class_methods: BTreeMap::new(),
        }
    }

    /// Add an instance method.
    #[must_use]
    pub fn instance_method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>, Args) -> Result<Value> + Send + Sync + 'static,
    {
        self.instance_methods.insert(name.into(), Arc::new(body));
        self
    }

    /// Add a class method.
    #[must_use]
    pub fn class_method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Invocation<'_>, Args) -> Result<Value> + Send + Sync + 'static,
    {
        self.class_methods.insert(name.into(), Arc::new(body));
        self
    }

    /// The concern name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the concern defines the method.
    #[must_use]
    pub fn responds_to(&self, scope: Scope, method: &str) -> bool {
        self.methods(scope).contains_key(method)
    }

    pub(crate) fn method(&self, scope: Scope, method: &str) -> Option<&MethodFn> {
        self.methods(scope).get(method)
    }

    pub(crate) const fn methods(&self, scope: Scope) -> &BTreeMap<String, MethodFn> {
        match scope {
            Scope::Instance => &self.instance_methods,
            Scope::Class => &self.class_methods,
        }
    }
}

impl PartialEq for Concern {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Concern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Concern")
            .field("name", &self.name)
            .field("instance_methods", &self.instance_methods.keys().collect::<Vec<_>>())
            .field("class_methods", &self.class_methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stack;

    #[test]
    fn equality_by_name() {
        let a = Concern::new("Timestamps").instance_method("touch", |_, _| Ok(Value::null()));
        let b = Concern::new("Timestamps");
        assert_eq!(a, b);
        assert_ne!(a, Concern::new("Other"));
    }

    #[test]
    fn scopes_are_separate() {
        let concern = Concern::new("Finder").class_method("find", |_, _| Ok(Value::null()));
        assert!(concern.responds_to(Scope::Class, "find"));
        assert!(!concern.responds_to(Scope::Instance, "find"));
    }

    #[test]
    fn concern_stack_edits() {
        let mut stack: Stack<Concern> = Stack::new("concerns of User");
        stack.append(Concern::new("A")).append(Concern::new("C"));
        stack
            .insert_before(Concern::new("C"), Concern::new("B"))
            .expect("C present");
        let names: Vec<_> = stack.iter().map(Concern::name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }
}
