//! Concurrent key/value cache.
//!
//! Used for memoized per-receiver state (instance variables, cached return
//! values) and for commit-time artifacts.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::Result;

/// Thread-safe key/value cache.
///
/// # Example
///
/// ```
/// use convenient_core::Cache;
///
/// let cache = Cache::new();
/// assert!(!cache.exists(&"answer"));
/// assert_eq!(cache.fetch("answer", || 42), 42);
/// assert_eq!(cache.fetch("answer", || 0), 42);
/// assert_eq!(cache.read(&"answer"), Some(42));
/// ```
pub struct Cache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.entries.read().len())
            .finish()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value.
    #[must_use]
    pub fn read(&self, key: &K) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Write a value, returning it.
    pub fn write(&self, key: K, value: V) -> V {
        self.entries.write().insert(key, value.clone());
        value
    }

    /// Returns `true` if the key is present.
    #[must_use]
    pub fn exists(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Read a value, computing and storing it when absent.
    ///
    /// The computation runs without holding the lock, so concurrent callers may
    /// compute the same key; the first stored value wins.
    pub fn fetch(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.read().get(&key) {
            return value.clone();
        }
        let value = compute();
        self.entries.write().entry(key).or_insert(value).clone()
    }

    /// Like [`fetch`](Self::fetch), but errors are returned and not stored.
    pub fn try_fetch(&self, key: K, compute: impl FnOnce() -> Result<V>) -> Result<V> {
        if let Some(value) = self.entries.read().get(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        Ok(self.entries.write().entry(key).or_insert(value).clone())
    }

    /// Remove a value, returning it.
    pub fn delete(&self, key: &K) -> Option<V> {
        self.entries.write().remove(key)
    }

    /// Remove every value.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
