//! Interception targets and middleware applicability.
//!
//! A middleware declares which `(scope, method, entity)` triples it is
//! [intended for](IntendedFor). When a class is committed, every middleware
//! attached to one of its methods is checked against the concrete
//! [`InterceptionTarget`].

use std::fmt;

use crate::{EntityKind, Scope};

/// A concrete `(scope, method, entity)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterceptionTarget {
    /// Method scope.
    pub scope: Scope,
    /// Method name.
    pub method: String,
    /// Role of the class owning the method.
    pub entity: EntityKind,
}

impl InterceptionTarget {
    /// Create a new interception target.
    #[must_use]
    pub fn new(scope: Scope, method: impl Into<String>, entity: EntityKind) -> Self {
        Self {
            scope,
            method: method.into(),
            entity,
        }
    }
}

impl fmt::Display for InterceptionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} method `{}` ({} entity)",
            self.scope, self.method, self.entity
        )
    }
}

/// Either any value, or one of an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector<T> {
    /// Matches everything.
    #[default]
    Any,
    /// Matches one of the listed values.
    Only(Vec<T>),
}

impl<T: PartialEq> Selector<T> {
    /// Returns `true` if `value` is selected.
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Any => true,
            Self::Only(values) => values.contains(value),
        }
    }
}

impl Selector<String> {
    fn matches_str(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(values) => values.iter().any(|v| v == value),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Only(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

/// The targets a middleware declares support for.
///
/// # Example
///
/// ```
/// use convenient_core::{EntityKind, IntendedFor, InterceptionTarget, Scope};
///
/// let intended = IntendedFor::methods(["result"])
///     .scope(Scope::Instance)
///     .entity(EntityKind::Service);
///
/// let target = InterceptionTarget::new(Scope::Instance, "result", EntityKind::Service);
/// assert!(intended.matches(&target));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntendedFor {
    methods: Selector<String>,
    scopes: Selector<Scope>,
    entities: Selector<EntityKind>,
}

impl IntendedFor {
    /// Matches every target.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches the given method names (any scope, any entity).
    #[must_use]
    pub fn methods<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: Selector::Only(methods.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Restrict to a single scope.
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scopes = Selector::Only(vec![scope]);
        self
    }

    /// Restrict to a single entity kind.
    #[must_use]
    pub fn entity(mut self, entity: EntityKind) -> Self {
        self.entities = Selector::Only(vec![entity]);
        self
    }

    /// Restrict to several entity kinds.
    #[must_use]
    pub fn entities(mut self, entities: impl IntoIterator<Item = EntityKind>) -> Self {
        self.entities = Selector::Only(entities.into_iter().collect());
        self
    }

    /// Returns `true` if the target is supported.
    #[must_use]
    pub fn matches(&self, target: &InterceptionTarget) -> bool {
        self.methods.matches_str(&target.method)
            && self.scopes.matches(&target.scope)
            && self.entities.matches(&target.entity)
    }
}

impl fmt::Display for IntendedFor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "methods: {}, scope: {}, entity: {}",
            self.methods, self.scopes, self.entities
        )
    }
}
