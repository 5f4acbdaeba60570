//! `ConfigurationManager`: assembles the bundled providers/loaders, runs the pipeline, and caches
//! the resulting [`Configuration`] per distinct [`ResourceLocation`] (`spec.md` §4.10).

use crate::loader::ResourceLoader;
use crate::location::ResourceLocation;
use crate::pipeline::Pipeline;
use crate::provider::classpath::ClasspathProvider;
use crate::provider::ResourceProvider;
use crate::registry::{StrategyRegistry, StrategyResolver};
use crate::resolver::Configuration;
use crate::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Loads configuration resources for a [`ResourceLocation`] and caches the resulting
/// [`Configuration`], keyed by the location's own equality (`spec.md` §4.10: process-wide
/// compute-if-absent, not per-thread).
///
/// `Configuration` is returned wrapped in an `Arc` so repeated `load` calls for the same location
/// hand back the same cached instance cheaply. The manager itself is `Send + Sync` (providers and
/// loaders are held as `Arc<dyn Trait>`, not `Rc`), so one instance can be wrapped in an `Arc` and
/// shared across OS threads — the concurrent-map semantics `spec.md` §5 requires (at most one
/// computation per location even under contention) depend on this.
pub struct ConfigurationManager {
    providers: StrategyResolver<dyn ResourceProvider>,
    loaders: StrategyResolver<dyn ResourceLoader>,
    cache: Mutex<HashMap<ResourceLocation, Arc<Configuration>>>,
}

impl ConfigurationManager {
    /// Build a manager with the bundled `classpath` provider and every loader enabled by the
    /// crate's active Cargo features.
    pub fn new() -> Self {
        Self::with_providers(vec![Arc::new(ClasspathProvider::new())])
    }

    /// Build a manager over a custom set of providers (e.g. to add a `file` or `http` provider),
    /// still using the bundled loaders.
    pub fn with_providers(providers: Vec<Arc<dyn ResourceProvider>>) -> Self {
        let providers = StrategyRegistry::new(providers, str::to_lowercase);
        let loaders = StrategyRegistry::new(bundled_loaders(), str::to_lowercase);
        Self {
            providers: StrategyResolver::new(providers, "provider"),
            loaders: StrategyResolver::new(loaders, "loader"),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load `location`, returning a cached [`Configuration`] if this exact location (by value
    /// equality) was already loaded, or running the pipeline and caching the result otherwise.
    ///
    /// # Errors
    ///
    /// Returns whatever [`crate::pipeline::Pipeline::execute`] returns for a fresh load; a cache
    /// hit never fails.
    pub fn load(&self, location: &ResourceLocation) -> Result<Arc<Configuration>> {
        self.load_with_profile(location, None)
    }

    /// Like [`ConfigurationManager::load`], overriding the profile the preparer would otherwise
    /// derive from the environment.
    pub fn load_with_profile(&self, location: &ResourceLocation, profile: Option<&str>) -> Result<Arc<Configuration>> {
        {
            let cache = self.cache.lock().expect("configuration cache poisoned");
            if let Some(existing) = cache.get(location) {
                return Ok(Arc::clone(existing));
            }
        }

        let pipeline = Pipeline::new(&self.providers, &self.loaders);
        let configuration = Arc::new(pipeline.execute(location, profile)?);

        let mut cache = self.cache.lock().expect("configuration cache poisoned");
        Ok(Arc::clone(
            cache.entry(location.clone()).or_insert(configuration),
        ))
    }

    /// Remove every cached configuration, forcing the next [`ConfigurationManager::load`] for
    /// any location to re-run the pipeline.
    pub fn invalidate_all(&self) {
        self.cache.lock().expect("configuration cache poisoned").clear();
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

fn bundled_loaders() -> Vec<Arc<dyn ResourceLoader>> {
    #[allow(unused_mut)]
    let mut loaders: Vec<Arc<dyn ResourceLoader>> = Vec::new();
    #[cfg(feature = "properties")]
    loaders.push(Arc::new(crate::loader::properties::PropertiesLoader));
    #[cfg(feature = "yaml")]
    loaders.push(Arc::new(crate::loader::yaml::YamlLoader));
    #[cfg(feature = "json")]
    loaders.push(Arc::new(crate::loader::json::JsonLoader));
    #[cfg(feature = "xml")]
    loaders.push(Arc::new(crate::loader::xml::XmlLoader));
    loaders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn manager_is_send_and_sync() {
        assert_send_sync::<ConfigurationManager>();
    }

    #[test]
    fn repeated_load_of_equal_location_returns_cached_instance() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("application.json"), br#"{"a":1}"#).unwrap();

        let manager = ConfigurationManager::new();
        let location = ResourceLocation::builder()
            .provider("classpath")
            .base_directory(dir.path().to_string_lossy().to_string())
            .resource_name("application.json")
            .build();

        let first = manager.load(&location).unwrap();
        let second = manager.load(&location).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidate_all_forces_a_fresh_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("application.json"), br#"{"a":1}"#).unwrap();

        let manager = ConfigurationManager::new();
        let location = ResourceLocation::builder()
            .provider("classpath")
            .base_directory(dir.path().to_string_lossy().to_string())
            .resource_name("application.json")
            .build();

        let first = manager.load(&location).unwrap();
        manager.invalidate_all();
        let second = manager.load(&location).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
