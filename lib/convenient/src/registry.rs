//! Per-class registry of middleware stacks, keyed by method and scope.

use std::collections::BTreeMap;
use std::fmt;

use crate::Scope;
use crate::spec::MiddlewareSpec;
use crate::stack::Stack;

/// Identifies a method of a class: its scope and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackKey {
    /// Method scope.
    pub scope: Scope,
    /// Method name.
    pub method: String,
}

impl StackKey {
    /// Create a key.
    pub fn new(scope: Scope, method: impl Into<String>) -> Self {
        Self {
            scope,
            method: method.into(),
        }
    }
}

impl fmt::Display for StackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.scope, self.method)
    }
}

pub(crate) fn stack_label(class: &str, key: &StackKey) -> String {
    format!(
        "{} middlewares of {class}{}{}",
        key.scope,
        key.scope.separator(),
        key.method
    )
}

/// The middleware stacks of a class.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    stacks: BTreeMap<StackKey, Stack<MiddlewareSpec>>,
}

impl Registry {
    /// The stack of a method, if one was ever edited.
    #[must_use]
    pub fn get(&self, scope: Scope, method: &str) -> Option<&Stack<MiddlewareSpec>> {
        self.stacks.get(&StackKey::new(scope, method))
    }

    /// A copy of the stack of a method, or a fresh empty one.
    pub(crate) fn snapshot(&self, class: &str, key: &StackKey) -> Stack<MiddlewareSpec> {
        self.stacks
            .get(key)
            .cloned()
            .unwrap_or_else(|| Stack::new(stack_label(class, key)))
    }

    pub(crate) fn insert(&mut self, key: StackKey, stack: Stack<MiddlewareSpec>) {
        self.stacks.insert(key, stack);
    }

    /// Copy for a subclass: same entries, labels naming the subclass.
    pub(crate) fn inherit(&self, class: &str) -> Self {
        let stacks = self
            .stacks
            .iter()
            .map(|(key, stack)| {
                let mut stack = stack.clone();
                stack.set_label(stack_label(class, key));
                (key.clone(), stack)
            })
            .collect();
        Self { stacks }
    }

    /// Iterate over stacks in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StackKey, &Stack<MiddlewareSpec>)> {
        self.stacks.iter()
    }

    /// Number of stacks, empty ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    /// Returns `true` if no stack was ever edited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
