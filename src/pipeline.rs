//! Orchestrates preparer → provider → loader → merge → interpolate with per-resource failure
//! isolation (`spec.md` §4.6, §4.6.1).

use crate::location::ResourceLocation;
use crate::loader::ResourceLoader;
use crate::merge;
use crate::placeholder;
use crate::preparer::ResourcePreparer;
use crate::provider::ResourceProvider;
use crate::registry::StrategyResolver;
use crate::resolver::Configuration;
use crate::source::{EnvSource, PropertySource};
use crate::tree::Tree;
use crate::{ConfigError, Result};

/// Runs the full resource-acquisition pipeline for one [`ResourceLocation`].
pub struct Pipeline<'a> {
    providers: &'a StrategyResolver<dyn ResourceProvider>,
    loaders: &'a StrategyResolver<dyn ResourceLoader>,
}

impl<'a> Pipeline<'a> {
    /// Build a pipeline over the given provider/loader resolvers.
    pub fn new(
        providers: &'a StrategyResolver<dyn ResourceProvider>,
        loaders: &'a StrategyResolver<dyn ResourceLoader>,
    ) -> Self {
        Self { providers, loaders }
    }

    /// Execute the pipeline for `location`, returning a fully merged and interpolated
    /// [`Configuration`].
    ///
    /// Each identifier is resolved and parsed independently. A blank provider or resource name is
    /// skipped with no log at all; a provider, loader, or parse failure is logged at WARN and the
    /// resource is skipped, rather than aborting the whole load (`spec.md` §4.6.1 per-resource
    /// failure isolation). Placeholder interpolation failures are raised to the caller, since they
    /// indicate the merged tree itself is unusable.
    ///
    /// The whole call runs inside a `tracing` DEBUG span, and every successful step (provider
    /// resolved, stream opened, loader resolved, resource parsed) emits its own event: at DEBUG
    /// when the location's `verbose` flag is set, at TRACE otherwise — so `verbose` raises the
    /// granularity of what this one call reports without touching any global subscriber
    /// configuration (`spec.md` §7).
    pub fn execute(&self, location: &ResourceLocation, profile_override: Option<&str>) -> Result<Configuration> {
        let verbose = location.verbose();
        let span = tracing::debug_span!("config_load", verbose);
        let _entered = span.enter();

        let identifiers = ResourcePreparer::new(location).prepare(profile_override);

        let mut trees = Vec::with_capacity(identifiers.len());
        let mut loaded = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;

        for identifier in &identifiers {
            if is_blank(identifier) {
                skipped += 1;
                continue;
            }

            match self.load_one(identifier, location, verbose) {
                Ok(tree) => {
                    step(verbose, identifier.provider(), identifier.resource_name(), "loaded resource");
                    trees.push(tree);
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        provider = identifier.provider(),
                        resource = identifier.resource_name(),
                        error = %e,
                        "skipping resource that failed to resolve or parse"
                    );
                    failed += 1;
                }
            }
        }

        tracing::info!(
            loaded,
            failed,
            skipped,
            total = identifiers.len(),
            "finished loading configuration resources"
        );

        let merged = merge::merge(trees);
        let interpolated = self.interpolate(merged, location)?;
        Ok(Configuration::new(interpolated))
    }

    fn load_one(
        &self,
        identifier: &crate::location::ResourceIdentifier,
        location: &ResourceLocation,
        verbose: bool,
    ) -> Result<Tree> {
        let provider = self.providers.resolve(identifier.provider())?;
        step(verbose, identifier.provider(), identifier.resource_name(), "resolved provider");

        let stream = provider
            .resolve_resource(identifier, location)
            .map_err(|source| ConfigError::Provider {
                provider: identifier.provider().to_string(),
                resource: identifier.resource_name().to_string(),
                source: Box::new(source),
            })?;
        step(verbose, identifier.provider(), identifier.resource_name(), "opened resource stream");

        let loader_key = stream
            .extension()
            .ok_or_else(|| ConfigError::StrategyNotFound {
                kind: "loader",
                key: identifier.resource_name().to_string(),
            })?;
        let loader = self.loaders.resolve(&loader_key)?;
        step(verbose, identifier.provider(), identifier.resource_name(), "resolved loader");

        let resource_name = identifier.resource_name().to_string();
        loader.load(stream).map_err(|source| ConfigError::Loader {
            resource: resource_name,
            source: Box::new(source),
        })
    }

    /// Recursively expand `${key[:default]}` placeholders across every string leaf of `tree`,
    /// resolving each against the process environment and the location's own variables.
    fn interpolate(&self, tree: Tree, location: &ResourceLocation) -> Result<Tree> {
        let env = EnvSource;
        let vars = LocationVariables(location);
        let sources: Vec<&dyn PropertySource> = vec![&vars, &env];
        interpolate_tree(tree, location, &sources)
    }
}

/// An identifier with a blank provider or resource name is skipped silently, with no log at all
/// (`spec.md` §4.6.1), rather than reaching `providers.resolve()` and surfacing as a logged
/// `StrategyNotFound` indistinguishable from a genuine provider-miss.
fn is_blank(identifier: &crate::location::ResourceIdentifier) -> bool {
    identifier.provider().trim().is_empty() || identifier.resource_name().trim().is_empty()
}

/// Emit one pipeline step event at DEBUG when `verbose`, at TRACE otherwise.
fn step(verbose: bool, provider: &str, resource: &str, message: &'static str) {
    if verbose {
        tracing::debug!(provider, resource, "{message}");
    } else {
        tracing::trace!(provider, resource, "{message}");
    }
}

struct LocationVariables<'a>(&'a ResourceLocation);

impl PropertySource for LocationVariables<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.0.variables().get(key).map(str::to_string)
    }
}

fn interpolate_tree(tree: Tree, location: &ResourceLocation, sources: &[&dyn PropertySource]) -> Result<Tree> {
    match tree {
        Tree::String(s) => {
            let expanded = placeholder::expand(location.placeholder_spec(), &s, sources)?;
            match expanded {
                Some(value) => Ok(Tree::String(value)),
                None => Ok(Tree::String(s)),
            }
        }
        Tree::Array(items) => {
            let mut result = Vec::with_capacity(items.len());
            for item in items {
                result.push(interpolate_tree(item, location, sources)?);
            }
            Ok(Tree::Array(result))
        }
        Tree::Object(map) => {
            let mut result = crate::tree::TreeMap::with_capacity(map.len());
            for (k, v) in map {
                result.insert(k, interpolate_tree(v, location, sources)?);
            }
            Ok(Tree::Object(result))
        }
        other => Ok(other),
    }
}
