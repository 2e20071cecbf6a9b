//! Engine configuration types.

use std::str::FromStr;

use derive_more::Display;
use serde::Deserialize;

use crate::{Error, Result};

/// Backend used to compose a middleware stack into a callable chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Deserialize)]
#[serde(try_from = "String")]
pub enum Backend {
    /// Ordered-list runner: `next` advances an index into the stack.
    #[default]
    #[display("list")]
    List,
    /// Rack-style builder: every middleware is a layer wrapping the inner callable.
    #[display("layered")]
    Layered,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "list" => Ok(Self::List),
            "layered" | "rack" => Ok(Self::Layered),
            other => Err(Error::UnsupportedBackend(other.to_string())),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Configuration shared by a class and its subclasses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Stack composition backend.
    pub backend: Backend,
    /// Whether commit checks each middleware's `intended_for` declaration.
    pub check_intended_for: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: Backend::List,
            check_intended_for: true,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse a configuration from JSON, missing fields take their defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use convenient::{Backend, EngineConfig};
    ///
    /// let config = EngineConfig::from_json(r#"{ "backend": "rack" }"#).expect("valid");
    /// assert_eq!(config.backend, Backend::Layered);
    /// assert!(config.check_intended_for);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidConfig(err.to_string()))
    }
}

/// Builder for [`EngineConfig`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    backend: Option<Backend>,
    check_intended_for: Option<bool>,
}

impl EngineConfigBuilder {
    /// Set the stack composition backend.
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set whether commit checks `intended_for` declarations.
    #[must_use]
    pub const fn check_intended_for(mut self, check: bool) -> Self {
        self.check_intended_for = Some(check);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            backend: self.backend.unwrap_or(defaults.backend),
            check_intended_for: self
                .check_intended_for
                .unwrap_or(defaults.check_intended_for),
        }
    }
}
