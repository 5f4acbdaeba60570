//! `Configuration`: the typed, read-only, path-addressed view produced by a [`crate::pipeline`]
//! run and handed back to callers (`spec.md` §4.9).

use crate::duration;
use crate::tree::{parse_path, PathSegment, Tree, TreeDeserializer};
use crate::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::sync::Mutex;
use std::time::Duration;

/// A typed, read-only view over a merged and interpolated configuration tree.
///
/// Every accessor takes a dotted path (`a.b.c`, `a.b[0].c`); resolved path segments are cached
/// (guarded by a `Mutex`, compute-if-absent) since the same path is commonly looked up many
/// times over a `Configuration`'s lifetime.
pub struct Configuration {
    root: Tree,
    path_cache: Mutex<std::collections::HashMap<String, Option<Vec<PathSegment>>>>,
}

impl Configuration {
    /// Wrap an already merged-and-interpolated tree as a queryable configuration.
    pub fn new(root: Tree) -> Self {
        Self {
            root,
            path_cache: Mutex::new(std::collections::HashMap::new()),
        }
    }

    /// Returns `true` if `path` addresses a present (non-absent) node.
    pub fn contains_key(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Resolve `path` to a subtree, or `None` if any segment is absent.
    fn resolve(&self, path: &str) -> Option<&Tree> {
        let segments = self.cached_segments(path)?;
        self.root.get_path(&segments)
    }

    fn cached_segments(&self, path: &str) -> Option<Vec<PathSegment>> {
        let mut cache = self.path_cache.lock().expect("path cache poisoned");
        if let Some(entry) = cache.get(path) {
            return entry.clone();
        }
        let parsed = parse_path(path).ok();
        cache.insert(path.to_string(), parsed.clone());
        parsed
    }

    /// Convert the subtree at `path` into `T`, or `None` if the path is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conversion`] if the subtree exists but does not convert to `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.resolve(path) {
            None => Ok(None),
            Some(tree) => T::deserialize(TreeDeserializer::new(tree))
                .map(Some)
                .map_err(|source| ConfigError::Conversion {
                    path: path.to_string(),
                    source,
                }),
        }
    }

    /// Like [`Configuration::get`], but raises [`ConfigError::MissingKey`] instead of returning
    /// `None` when the path is absent.
    pub fn get_or_err<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path)?
            .ok_or_else(|| ConfigError::MissingKey(path.to_string()))
    }

    /// Like [`Configuration::get_or_err`], but returns `default` instead of raising when the
    /// path is absent.
    pub fn get_or<T: DeserializeOwned>(&self, path: &str, default: T) -> Result<T> {
        Ok(self.get(path)?.unwrap_or(default))
    }

    /// Resolve `path` to a `Vec<T>`.
    ///
    /// A missing path, or a path that resolves to something other than an array, yields an empty
    /// `Vec` rather than an error — only a genuine element-conversion failure is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conversion`] if the subtree is array-shaped but an element doesn't
    /// convert to `T`.
    pub fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let Some(tree) = self.resolve(path) else {
            return Ok(Vec::new());
        };
        let Some(items) = tree.as_array() else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| {
                T::deserialize(TreeDeserializer::new(item)).map_err(|source| ConfigError::Conversion {
                    path: path.to_string(),
                    source,
                })
            })
            .collect()
    }

    /// Resolve `path` to an ordered `Vec<(String, T)>`, preserving the subtree's key order.
    ///
    /// A missing path, or a path that resolves to something other than an object, yields an empty
    /// `Vec` rather than an error — only a genuine entry-conversion failure is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conversion`] if the subtree is object-shaped but a value doesn't
    /// convert to `T`.
    pub fn get_map<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<(String, T)>> {
        let Some(tree) = self.resolve(path) else {
            return Ok(Vec::new());
        };
        let Some(map) = tree.as_object() else {
            return Ok(Vec::new());
        };
        map.iter()
            .map(|(k, v)| {
                T::deserialize(TreeDeserializer::new(v))
                    .map(|value| (k.clone(), value))
                    .map_err(|source| ConfigError::Conversion {
                        path: format!("{path}.{k}"),
                        source,
                    })
            })
            .collect()
    }

    /// Deserialize the entire root tree as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conversion`] if the root tree does not convert to `T`.
    pub fn get_root_as<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(TreeDeserializer::new(&self.root)).map_err(|source| ConfigError::Conversion {
            path: String::new(),
            source,
        })
    }

    /// Deserialize the root tree's top-level entries as an ordered `Vec<(String, T)>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Conversion`] if the root is not object-shaped or a value doesn't
    /// convert.
    pub fn get_root_as_map<T: DeserializeOwned>(&self) -> Result<Vec<(String, T)>> {
        let map = self.root.as_object().ok_or_else(|| ConfigError::Conversion {
            path: String::new(),
            source: serde_json::from_str::<()>("null").unwrap_err(),
        })?;
        map.iter()
            .map(|(k, v)| {
                T::deserialize(TreeDeserializer::new(v))
                    .map(|value| (k.clone(), value))
                    .map_err(|source| ConfigError::Conversion {
                        path: k.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Resolve `path` as a string.
    pub fn get_string(&self, path: &str) -> Result<String> {
        self.get_or_err(path)
    }

    /// Resolve `path` as an `i64`.
    pub fn get_int(&self, path: &str) -> Result<i64> {
        self.get_or_err(path)
    }

    /// Resolve `path` as an `f64`.
    pub fn get_float(&self, path: &str) -> Result<f64> {
        self.get_or_err(path)
    }

    /// Resolve `path` as a `bool`.
    pub fn get_bool(&self, path: &str) -> Result<bool> {
        self.get_or_err(path)
    }

    /// Resolve `path` as a [`Duration`], accepting both `humantime` short form and a minimal
    /// ISO-8601 form (see [`crate::duration`]).
    pub fn get_duration(&self, path: &str) -> Result<Duration> {
        let raw: String = self.get_or_err(path)?;
        duration::parse(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeMap;

    fn config() -> Configuration {
        let mut server = TreeMap::new();
        server.insert("host".to_string(), Tree::String("localhost".to_string()));
        server.insert("port".to_string(), Tree::Int(9090));
        server.insert("timeout".to_string(), Tree::String("5s".to_string()));

        let mut root = TreeMap::new();
        root.insert("server".to_string(), Tree::Object(server));
        root.insert(
            "tags".to_string(),
            Tree::Array(vec![Tree::String("a".to_string()), Tree::String("b".to_string())]),
        );
        Configuration::new(Tree::Object(root))
    }

    #[test]
    fn contains_key_reflects_presence() {
        let cfg = config();
        assert!(cfg.contains_key("server.port"));
        assert!(!cfg.contains_key("server.missing"));
    }

    #[test]
    fn typed_getters_resolve_nested_paths() {
        let cfg = config();
        assert_eq!(cfg.get_string("server.host").unwrap(), "localhost");
        assert_eq!(cfg.get_int("server.port").unwrap(), 9090);
    }

    #[test]
    fn missing_key_without_default_errors() {
        let cfg = config();
        assert!(matches!(
            cfg.get_int("server.missing"),
            Err(ConfigError::MissingKey(_))
        ));
    }

    #[test]
    fn get_or_falls_back_to_default() {
        let cfg = config();
        assert_eq!(cfg.get_or("server.missing", 42i64).unwrap(), 42);
    }

    #[test]
    fn get_list_resolves_arrays() {
        let cfg = config();
        let tags: Vec<String> = cfg.get_list("tags").unwrap();
        assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn get_list_is_empty_when_path_is_missing() {
        let cfg = config();
        let tags: Vec<String> = cfg.get_list("no.such.path").unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn get_list_is_empty_when_path_is_not_an_array() {
        let cfg = config();
        let tags: Vec<String> = cfg.get_list("server.host").unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn get_list_still_errors_on_element_conversion_failure() {
        let cfg = config();
        assert!(matches!(
            cfg.get_list::<i64>("tags"),
            Err(ConfigError::Conversion { .. })
        ));
    }

    #[test]
    fn get_map_is_empty_when_path_is_missing() {
        let cfg = config();
        let entries: Vec<(String, String)> = cfg.get_map("no.such.path").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn get_map_is_empty_when_path_is_not_an_object() {
        let cfg = config();
        let entries: Vec<(String, String)> = cfg.get_map("tags").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn get_map_still_errors_on_entry_conversion_failure() {
        let cfg = config();
        assert!(matches!(
            cfg.get_map::<i64>("server"),
            Err(ConfigError::Conversion { .. })
        ));
    }

    #[test]
    fn get_duration_parses_short_form() {
        let cfg = config();
        assert_eq!(cfg.get_duration("server.timeout").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn repeated_lookups_use_cached_path() {
        let cfg = config();
        assert_eq!(cfg.get_int("server.port").unwrap(), 9090);
        assert_eq!(cfg.get_int("server.port").unwrap(), 9090);
        assert_eq!(cfg.path_cache.lock().unwrap().len(), 1);
    }
}
