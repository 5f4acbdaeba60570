//! Immutable, validated containers used by builders (`spec.md` §4.1).
//!
//! `OrderedKeySet` and `ValidatedKeyMap` are the only mutation-capable types used while building
//! a [`crate::location::ResourceLocation`]; everything the crate exposes externally is an
//! immutable view over one of these once `build()` is called.

use crate::{ConfigError, Result};
use indexmap::{IndexMap, IndexSet};

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// An insertion-ordered set of non-blank strings.
///
/// Adding a null-like (blank) entry is silently rejected rather than raising: §4.1 specifies
/// ordered sets "reject null/blank entries silently".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderedKeySet {
    inner: IndexSet<String>,
}

impl OrderedKeySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` if it is non-blank; return `true` if it was newly inserted.
    pub fn add(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if is_blank(&value) {
            return false;
        }
        self.inner.insert(value)
    }

    /// Add every non-blank value from `values`, skipping invalid entries without raising.
    pub fn extend(&mut self, values: impl IntoIterator<Item = impl Into<String>>) {
        for v in values {
            self.add(v);
        }
    }

    /// Iterate values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// `true` if this set has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// `true` if `value` is present.
    pub fn contains(&self, value: &str) -> bool {
        self.inner.contains(value)
    }
}

impl<'a> IntoIterator for &'a OrderedKeySet {
    type Item = &'a str;
    type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// An insertion-ordered string-to-string map where every mutation validates both key and value
/// are non-blank.
///
/// Unlike [`OrderedKeySet`], an invalid `put` is a recoverable configuration error (`spec.md`
/// §7, category *Invalid variables*) rather than a silent no-op, since a caller supplying a
/// blank variable value is very likely a programming mistake in the consuming application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatedKeyMap {
    inner: IndexMap<String, String>,
}

impl ValidatedKeyMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` → `value`, validating both are non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVariables`] if either `key` or `value` is blank.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        if is_blank(&key) {
            return Err(ConfigError::InvalidVariables {
                key: key.clone(),
                reason: "key must be non-blank",
            });
        }
        if is_blank(&value) {
            return Err(ConfigError::InvalidVariables {
                key,
                reason: "value must be non-blank",
            });
        }
        self.inner.insert(key, value);
        Ok(())
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// `true` if this map has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
