//! Method scopes and entity kinds.

use std::borrow::Cow;
use std::str::FromStr;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Where a method is defined: on instances or on the class itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Instance method (called on an instance).
    #[display("instance")]
    Instance,
    /// Class method (called on the class).
    #[display("class")]
    Class,
}

impl Scope {
    /// Returns the separator used when rendering `Class#method` / `Class.method`.
    #[must_use]
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Instance => "#",
            Self::Class => ".",
        }
    }
}

impl FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instance" => Ok(Self::Instance),
            "class" => Ok(Self::Class),
            other => Err(Error::invalid_argument(format!(
                "unknown scope `{other}`, expected `instance` or `class`"
            ))),
        }
    }
}

/// The role a class plays, used to scope middleware applicability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A service object.
    #[display("service")]
    Service,
    /// A step of a service.
    #[display("step")]
    Step,
    /// A service result.
    #[display("result")]
    Result,
    /// A feature (a group of entries).
    #[display("feature")]
    Feature,
    /// Any other user-defined role.
    #[display("{_0}")]
    Custom(Cow<'static, str>),
}

impl EntityKind {
    /// Create a custom entity kind.
    #[must_use]
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom(name.into())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "service" => Self::Service,
            "step" => Self::Step,
            "result" => Self::Result,
            "feature" => Self::Feature,
            "" => {
                return Err(Error::invalid_argument("entity kind cannot be empty"));
            }
            other => Self::Custom(Cow::Owned(other.to_string())),
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_display() {
        assert_eq!(Scope::Instance.to_string(), "instance");
        assert_eq!(Scope::Class.to_string(), "class");
    }

    #[test]
    fn scope_separator() {
        assert_eq!(Scope::Instance.separator(), "#");
        assert_eq!(Scope::Class.separator(), ".");
    }

    #[test]
    fn scope_from_str() {
        assert_eq!("instance".parse::<Scope>(), Ok(Scope::Instance));
        assert_eq!("class".parse::<Scope>(), Ok(Scope::Class));
        assert!("any".parse::<Scope>().is_err());
    }

    #[test]
    fn entity_kind_from_str() {
        assert_eq!("service".parse::<EntityKind>(), Ok(EntityKind::Service));
        assert_eq!("result".parse::<EntityKind>(), Ok(EntityKind::Result));
        assert_eq!(
            "validator".parse::<EntityKind>(),
            Ok(EntityKind::custom("validator"))
        );
        assert!("".parse::<EntityKind>().is_err());
    }

    #[test]
    fn entity_kind_display() {
        assert_eq!(EntityKind::Step.to_string(), "step");
        assert_eq!(EntityKind::custom("validator").to_string(), "validator");
    }
}
