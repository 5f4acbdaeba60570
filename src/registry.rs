//! Key-normalised, insertion-ordered registry and resolver for providers and loaders
//! (`spec.md` §4.5).

use crate::error::ConfigError;
use indexmap::IndexMap;
use std::sync::Arc;

/// Something addressable by a set of keys (a loader by file extension, a provider by its name).
///
/// `Send + Sync` so registries built over `Arc<dyn Strategy>` can be shared across threads, per
/// `spec.md` §5's concurrent-map requirement for [`crate::manager::ConfigurationManager`].
pub trait Strategy: Send + Sync {
    /// The keys this strategy is addressable by, e.g. a JSON loader advertises `{"json"}`.
    fn keys(&self) -> Vec<String>;
}

/// Case-normalising, insertion-ordered lookup table from key to strategy.
///
/// Built from an ordered list of strategies; every key a strategy declares maps to it. On key
/// collision the later strategy in the input list wins, but the *iteration order* of keys still
/// reflects first insertion (`spec.md` §4.5).
pub struct StrategyRegistry<S: ?Sized> {
    by_key: IndexMap<String, Arc<S>>,
    normalize: fn(&str) -> String,
}

impl<S> StrategyRegistry<S>
where
    S: Strategy + ?Sized,
{
    /// Build a registry from `strategies`, normalising keys with `normalize` (case-folding to a
    /// canonical form; callers typically pass `str::to_lowercase`).
    pub fn new(strategies: Vec<Arc<S>>, normalize: fn(&str) -> String) -> Self {
        let mut by_key = IndexMap::new();
        for strategy in strategies {
            for key in strategy.keys() {
                let normalized = normalize(&key);
                by_key.insert(normalized, Arc::clone(&strategy));
            }
        }
        Self { by_key, normalize }
    }

    /// Resolve `key` to its strategy, case-normalised via this registry's normaliser.
    pub fn get(&self, key: &str) -> Option<&S> {
        self.by_key.get(&(self.normalize)(key)).map(Arc::as_ref)
    }

    /// Iterate all `(normalised key, strategy)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &S)> {
        self.by_key.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }
}

/// Wraps a [`StrategyRegistry`] with a typed "not found" error, for use at resolution sites
/// described in `spec.md` §4.5/§4.6.
pub struct StrategyResolver<S: ?Sized> {
    registry: StrategyRegistry<S>,
    kind: &'static str,
}

impl<S> StrategyResolver<S>
where
    S: Strategy + ?Sized,
{
    /// Wrap `registry`, labelling its not-found errors with `kind` (e.g. `"provider"` or
    /// `"loader"`).
    pub fn new(registry: StrategyRegistry<S>, kind: &'static str) -> Self {
        Self { registry, kind }
    }

    /// Resolve `key`, or a [`ConfigError::StrategyNotFound`] naming this resolver's `kind`.
    pub fn resolve(&self, key: &str) -> Result<&S, ConfigError> {
        self.registry
            .get(key)
            .ok_or_else(|| ConfigError::StrategyNotFound {
                kind: self.kind,
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        keys: Vec<String>,
        label: &'static str,
    }

    impl Strategy for Fixture {
        fn keys(&self) -> Vec<String> {
            self.keys.clone()
        }
    }

    #[test]
    fn later_strategy_overrides_on_key_collision() {
        let a = Arc::new(Fixture {
            keys: vec!["json".to_string()],
            label: "first",
        });
        let b = Arc::new(Fixture {
            keys: vec!["json".to_string()],
            label: "second",
        });
        let registry = StrategyRegistry::new(vec![a, b], str::to_lowercase);
        assert_eq!(registry.get("json").unwrap().label, "second");
    }

    #[test]
    fn lookup_is_case_normalised() {
        let a = Arc::new(Fixture {
            keys: vec!["Yaml".to_string()],
            label: "yaml",
        });
        let registry = StrategyRegistry::new(vec![a], str::to_lowercase);
        assert_eq!(registry.get("YAML").unwrap().label, "yaml");
        assert_eq!(registry.get("yaml").unwrap().label, "yaml");
    }

    #[test]
    fn multiple_keys_address_the_same_strategy() {
        let a = Arc::new(Fixture {
            keys: vec!["yaml".to_string(), "yml".to_string()],
            label: "yaml",
        });
        let registry = StrategyRegistry::new(vec![a], str::to_lowercase);
        assert_eq!(registry.get("yaml").unwrap().label, "yaml");
        assert_eq!(registry.get("yml").unwrap().label, "yaml");
    }

    #[test]
    fn resolver_reports_typed_not_found() {
        let registry: StrategyRegistry<Fixture> = StrategyRegistry::new(vec![], str::to_lowercase);
        let resolver = StrategyResolver::new(registry, "loader");
        match resolver.resolve("toml") {
            Err(ConfigError::StrategyNotFound { kind, key }) => {
                assert_eq!(kind, "loader");
                assert_eq!(key, "toml");
            }
            _ => panic!("expected StrategyNotFound"),
        }
    }

    #[test]
    fn overridden_key_keeps_its_original_position() {
        let a = Arc::new(Fixture {
            keys: vec!["json".to_string(), "a".to_string()],
            label: "first",
        });
        let b = Arc::new(Fixture {
            keys: vec!["json".to_string()],
            label: "second",
        });
        let registry = StrategyRegistry::new(vec![a, b], str::to_lowercase);
        let keys: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["json", "a"]);
        assert_eq!(registry.get("json").unwrap().label, "second");
    }

    #[test]
    fn iteration_preserves_first_insertion_order() {
        let a = Arc::new(Fixture {
            keys: vec!["b".to_string()],
            label: "b",
        });
        let c = Arc::new(Fixture {
            keys: vec!["a".to_string()],
            label: "a",
        });
        let registry = StrategyRegistry::new(vec![a, c], str::to_lowercase);
        let keys: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}

