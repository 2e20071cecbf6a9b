//! Ordered stacks of middlewares or concerns.
//!
//! A [`Stack`] records structural edits (`append`, `unshift`, `insert_before`,
//! `insert_after`, `replace`, `delete`). Its order is fully determined by the
//! sequence of edits applied to it.

use std::fmt;

use tracing::trace;

use crate::spec::MiddlewareSpec;
use crate::{Error, Result};

/// An ordered, labelled list of entries.
///
/// The label describes the stack in error messages, for example
/// `instance middlewares of CreateUser#result`.
#[derive(Clone)]
pub struct Stack<T> {
    label: String,
    entries: Vec<T>,
}

impl<T> Stack<T>
where
    T: PartialEq + fmt::Display,
{
    /// Create an empty stack.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
        }
    }

    /// The stack description.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Append an entry (`use`).
    ///
    /// Duplicates are kept: appending an entry twice puts it twice in the stack.
    #[doc(alias = "use")]
    pub fn append(&mut self, entry: impl Into<T>) -> &mut Self {
        let entry = entry.into();
        trace!(stack = %self.label, %entry, "append");
        self.entries.push(entry);
        self
    }

    /// Append an entry unless an equal entry is already present.
    ///
    /// Returns `true` if the entry was appended.
    pub fn append_once(&mut self, entry: impl Into<T>) -> bool {
        let entry = entry.into();
        if self.entries.contains(&entry) {
            trace!(stack = %self.label, %entry, "already present, skipping");
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Prepend an entry.
    pub fn unshift(&mut self, entry: impl Into<T>) -> &mut Self {
        let entry = entry.into();
        trace!(stack = %self.label, %entry, "unshift");
        self.entries.insert(0, entry);
        self
    }

    /// Insert `entry` right before the first occurrence of `existing`.
    ///
    /// The stack is left untouched when `existing` is absent.
    pub fn insert_before(&mut self, existing: impl Into<T>, entry: impl Into<T>) -> Result<&mut Self> {
        let index = self.require(&existing.into())?;
        self.entries.insert(index, entry.into());
        Ok(self)
    }

    /// Insert `entry` right after the first occurrence of `existing`.
    ///
    /// The stack is left untouched when `existing` is absent.
    pub fn insert_after(&mut self, existing: impl Into<T>, entry: impl Into<T>) -> Result<&mut Self> {
        let index = self.require(&existing.into())?;
        self.entries.insert(index + 1, entry.into());
        Ok(self)
    }

    /// Replace the first occurrence of `old` with `entry`, at the same position.
    ///
    /// The stack is left untouched when `old` is absent.
    pub fn replace(&mut self, old: impl Into<T>, entry: impl Into<T>) -> Result<&mut Self> {
        let index = self.require(&old.into())?;
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = entry.into();
        }
        Ok(self)
    }

    /// Remove every occurrence of `entry`, returning how many were removed.
    ///
    /// Deleting an absent entry is not an error.
    pub fn delete(&mut self, entry: impl Into<T>) -> usize {
        let entry = entry.into();
        let before = self.entries.len();
        self.entries.retain(|e| *e != entry);
        let removed = before - self.entries.len();
        trace!(stack = %self.label, %entry, removed, "delete");
        removed
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns `true` if an equal entry is present.
    #[must_use]
    pub fn contains(&self, entry: &T) -> bool {
        self.entries.contains(entry)
    }

    /// Position of the first equal entry.
    #[must_use]
    pub fn position(&self, entry: &T) -> Option<usize> {
        self.entries.iter().position(|e| e == entry)
    }

    /// Iterate over entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require(&self, entry: &T) -> Result<usize> {
        self.position(entry)
            .ok_or_else(|| Error::MiddlewareNotFound {
                stack: self.label.clone(),
                middleware: entry.to_string(),
            })
    }
}

impl Stack<MiddlewareSpec> {
    /// Append a middleware as an observer (test instrumentation).
    ///
    /// An observed middleware sees every call but cannot change its outcome:
    /// the inner chain runs exactly once with the original arguments, and the
    /// observer's own return value or error is discarded.
    pub fn observe(&mut self, entry: impl Into<MiddlewareSpec>) -> &mut Self {
        self.append(entry.into().observed())
    }
}

impl<T: fmt::Display> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("label", &self.label)
            .field(
                "entries",
                &self.entries.iter().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a Stack<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
