//! Expands a [`ResourceLocation`] into an ordered list of [`ResourceIdentifier`]s
//! (`spec.md` §4.4).

use crate::location::{ResourceIdentifier, ResourceLocation};
use crate::placeholder;
use crate::source::{EnvSource, MapSource, PropertySource};

/// The provider the preparer substitutes when a location does not declare one.
pub const DEFAULT_PROVIDER: &str = "classpath";
/// Variable name driving which override files are selected by default.
pub const PROFILE_VARIABLE: &str = "profile";
/// Profile value used when nothing else supplies one.
pub const DEFAULT_PROFILE: &str = "default";
/// Environment variable consulted for the profile when the caller doesn't supply one.
pub const PROFILE_ENV_VAR: &str = "LIANA_PROFILE";
/// Base resource name used when a classpath location declares none.
pub const BASE_RESOURCE_NAME: &str = "application";
/// Pattern for the profile-specific override of [`BASE_RESOURCE_NAME`].
pub const BASE_PATTERN: &str = "application-${profile}";

/// Expands resource-name templates into safety-validated, fully-resolved resource identifiers.
pub struct ResourcePreparer<'a> {
    location: &'a ResourceLocation,
    validator: ResourceNameValidator<'a>,
}

impl<'a> ResourcePreparer<'a> {
    /// Build a preparer over `location`, validating resource names against its base
    /// directories.
    pub fn new(location: &'a ResourceLocation) -> Self {
        Self {
            location,
            validator: ResourceNameValidator::new(location),
        }
    }

    /// Prepare the identifier list, optionally overriding the profile the preparer would
    /// otherwise derive from the environment.
    pub fn prepare(&self, profile_override: Option<&str>) -> Vec<ResourceIdentifier> {
        let provider = effective_provider(self.location);
        let profile = effective_profile(profile_override);

        // The derived profile is injected as a `profile` variable only when the provider is the
        // classpath default and the location declares no variables of its own (`spec.md` §4.4
        // rule 3) — otherwise a location's explicit variables (or lack of a classpath provider)
        // must govern `${profile}` resolution on their own, with no fallback.
        let location_vars = LocationVariables(self.location);
        let inject = provider == DEFAULT_PROVIDER && self.location.variables().is_empty();
        let injected_profile =
            inject.then(|| MapSource::from_pairs([(PROFILE_VARIABLE, profile.as_str())]));

        let mut variables: Vec<&dyn PropertySource> = vec![&location_vars];
        if let Some(ref injected) = injected_profile {
            variables.push(injected);
        }

        if provider == DEFAULT_PROVIDER && self.location.resource_names().is_empty() {
            return self.default_classpath_names(provider, &variables);
        }

        self.templated_names(&provider, &variables)
    }

    fn default_classpath_names(
        &self,
        provider: String,
        variables: &[&dyn PropertySource],
    ) -> Vec<ResourceIdentifier> {
        let mut result = vec![ResourceIdentifier::new(provider.clone(), BASE_RESOURCE_NAME)];
        if let Some(resolved) =
            placeholder::expand(self.location.placeholder_spec(), BASE_PATTERN, variables)
                .unwrap_or(None)
        {
            if self.validator.is_safe(&resolved) {
                result.push(ResourceIdentifier::new(provider, resolved));
            }
        }
        result
    }

    fn templated_names(
        &self,
        provider: &str,
        variables: &[&dyn PropertySource],
    ) -> Vec<ResourceIdentifier> {
        let mut result = Vec::new();
        for template in self.location.resource_names() {
            let Some(resolved) =
                placeholder::expand(self.location.placeholder_spec(), template, variables)
                    .unwrap_or(None)
            else {
                continue;
            };

            if !self.validator.is_safe(&resolved) {
                continue;
            }

            let (resource_provider, resource_name) = split_provider_prefix(&resolved)
                .unwrap_or_else(|| (provider.to_string(), resolved.clone()));
            result.push(ResourceIdentifier::new(resource_provider, resource_name));
        }
        result
    }
}

/// A [`PropertySource`] over a location's own variable bindings.
struct LocationVariables<'a>(&'a ResourceLocation);

impl PropertySource for LocationVariables<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.0.variables().get(key).map(str::to_string)
    }
}

fn effective_provider(location: &ResourceLocation) -> String {
    if location.provider().trim().is_empty() {
        DEFAULT_PROVIDER.to_string()
    } else {
        location.provider().to_string()
    }
}

fn effective_profile(profile_override: Option<&str>) -> String {
    if let Some(p) = profile_override {
        if !p.trim().is_empty() {
            return p.to_string();
        }
    }
    if let Some(env) = EnvSource.get(PROFILE_ENV_VAR) {
        if !env.trim().is_empty() {
            return env;
        }
    }
    DEFAULT_PROFILE.to_string()
}

/// Splits a `providerKey:remainder` resource name into its provider and remainder, per
/// `spec.md` §4.4 rule 6 (`^(\w+):(.+)$`).
fn split_provider_prefix(name: &str) -> Option<(String, String)> {
    let colon = name.find(':')?;
    let (prefix, rest) = (&name[..colon], &name[colon + 1..]);
    if prefix.is_empty() || rest.is_empty() {
        return None;
    }
    if !prefix.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some((prefix.to_string(), rest.to_string()))
}

/// Validates that a resource name is safe to resolve: non-blank, does not contain a `..`
/// traversal segment, and — when resolved against each configured absolute base directory —
/// still starts with that base (`spec.md` §4.4).
pub struct ResourceNameValidator<'a> {
    base_directories: Vec<&'a str>,
}

impl<'a> ResourceNameValidator<'a> {
    /// Build a validator over a location's base directories.
    pub fn new(location: &'a ResourceLocation) -> Self {
        Self {
            base_directories: location.base_directories().iter().collect(),
        }
    }

    /// Returns `true` iff `name` is safe per `spec.md` §4.4.
    pub fn is_safe(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }

        let normalized = name.replace('\\', "/");
        if normalized.split('/').any(|segment| segment == "..") {
            return false;
        }

        for base in &self.base_directories {
            if !std::path::Path::new(base).is_absolute() {
                continue;
            }
            let joined = std::path::Path::new(base).join(&normalized);
            let joined_str = joined.to_string_lossy().replace('\\', "/");
            let base_str = base.replace('\\', "/");
            if !joined_str.starts_with(base_str.as_str()) {
                return false;
            }
        }

        true
    }
}
