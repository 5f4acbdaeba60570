//! Pluggable key→value lookup used by the placeholder engine (`spec.md` §4.3).

use std::collections::HashMap;
use std::env;

/// A single-method port: look up a string value by key, or report it absent.
///
/// Implementations must not panic on an unknown key; absence is communicated by returning
/// `None`.
pub trait PropertySource {
    /// Return the value bound to `key`, or `None` if this source has no binding for it.
    fn get(&self, key: &str) -> Option<String>;
}

/// A [`PropertySource`] backed by the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl PropertySource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// A [`PropertySource`] backed by an owned map, defensively copied at construction so later
/// mutation of the caller's map has no effect on this source.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: HashMap<String, String>,
}

impl MapSource {
    /// Build a source from any map whose values can be turned into a string (null-safe: a
    /// missing `Display` impl is a compile error, not a runtime one, so callers only ever hand
    /// in stringifiable values).
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Build a source from key/value pairs of any displayable type.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: ToString,
        I: IntoIterator<Item = (K, V)>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.to_string()))
            .collect();
        Self { values }
    }
}

impl PropertySource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// A [`PropertySource`] that wraps any `Fn(&str) -> Option<String>` closure.
pub struct FnSource<F>(F)
where
    F: Fn(&str) -> Option<String>;

impl<F> FnSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Wrap `f` as a property source.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> PropertySource for FnSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }
}
