//! Call arguments and middleware bound arguments.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::{Error, Result, Value};

/// A block passed along with a method call.
///
/// Blocks compare by identity.
#[derive(Clone)]
pub struct Block(Arc<dyn Fn(Args) -> Result<Value> + Send + Sync>);

impl Block {
    /// Create a block from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Args) -> Result<Value> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Call the block.
    pub fn call(&self, args: Args) -> Result<Value> {
        (self.0)(args)
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Block")
    }
}

/// Arguments of a method call: positional values, keyword values and an optional block.
///
/// # Example
///
/// ```
/// use convenient_core::Args;
///
/// let args = Args::new().arg(1).kwarg("verbose", true);
/// assert_eq!(args.get(0).and_then(|v| v.as_i64()), Some(1));
/// assert_eq!(args.keyword("verbose").and_then(|v| v.as_bool()), Some(true));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    keywords: BTreeMap<String, Value>,
    block: Option<Block>,
}

impl Args {
    /// Create empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    /// Attach a block.
    #[must_use]
    pub fn block(mut self, block: Block) -> Self {
        self.block = Some(block);
        self
    }

    /// Positional arguments.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Keyword arguments.
    #[must_use]
    pub const fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// The attached block, if any.
    #[must_use]
    pub const fn block_ref(&self) -> Option<&Block> {
        self.block.as_ref()
    }

    /// Get a positional argument.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Get a keyword argument.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Deserialize a positional data argument.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> Result<T> {
        let value = self
            .get(index)
            .ok_or_else(|| Error::invalid_argument(format!("missing positional argument {index}")))?;
        parse_data(value, &format!("positional argument {index}"))
    }

    /// Deserialize a keyword data argument.
    pub fn parse_keyword<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .keyword(name)
            .ok_or_else(|| Error::invalid_argument(format!("missing keyword argument `{name}`")))?;
        parse_data(value, &format!("keyword argument `{name}`"))
    }

    /// Returns `true` if there are no positional, keyword or block arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty() && self.block.is_none()
    }
}

fn parse_data<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    let data = value
        .as_data()
        .ok_or_else(|| Error::invalid_argument(format!("{what} is an object, expected data")))?;
    serde_json::from_value(data.clone())
        .map_err(|err| Error::invalid_argument(format!("{what}: {err}")))
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.positional {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        for (name, value) in &self.keywords {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
            first = false;
        }
        if self.block.is_some() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "&block")?;
        }
        Ok(())
    }
}

/// Arguments bound to a middleware when it is registered (`Middleware.with(...)`).
///
/// Part of a middleware spec's identity: two specs are equal when they share the
/// middleware and their bound arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(BTreeMap<String, Json>);

impl Arguments {
    /// Create empty arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an argument.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a bound argument.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    /// Deserialize a bound argument, `None` when it is absent.
    pub fn parse<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value.clone())
                    .map_err(|err| Error::invalid_argument(format!("argument `{key}`: {err}")))
            })
            .transpose()
    }

    /// Iterate over bound arguments in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Json)> {
        self.0.iter()
    }

    /// Returns `true` if no argument is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<Json>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
