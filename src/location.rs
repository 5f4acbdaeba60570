//! `ResourceLocation`: a declarative description of what to load and how (`spec.md` §3).

use crate::containers::{OrderedKeySet, ValidatedKeyMap};
use crate::placeholder::PlaceholderSpec;
use crate::Result;
use std::hash::{Hash, Hasher};

/// A `(providerKey, resourceName)` pair produced by [`crate::preparer::ResourcePreparer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceIdentifier {
    provider: String,
    resource_name: String,
}

impl ResourceIdentifier {
    /// Construct an identifier.
    pub fn new(provider: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            resource_name: resource_name.into(),
        }
    }

    /// The provider key this identifier should be resolved through.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// The logical resource name to resolve.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }
}

/// Declarative description of where to find configuration: a provider, base directories,
/// resource-name templates, variable bindings, a verbosity flag, and a placeholder syntax.
///
/// `ResourceLocation` is immutable once built; its equality/hash (derived from every field)
/// serves as the cache key in [`crate::manager::ConfigurationManager`].
#[derive(Clone, Debug)]
pub struct ResourceLocation {
    provider: String,
    base_directories: OrderedKeySet,
    resource_names: OrderedKeySet,
    variables: ValidatedKeyMap,
    verbose: bool,
    placeholder_spec: PlaceholderSpec,
}

impl ResourceLocation {
    /// Start building a location.
    pub fn builder() -> ResourceLocationBuilder {
        ResourceLocationBuilder::default()
    }

    /// The location's provider identifier, or empty string if unset (the preparer substitutes
    /// the `classpath` default in that case).
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Ordered base directories.
    pub fn base_directories(&self) -> &OrderedKeySet {
        &self.base_directories
    }

    /// Ordered resource-name templates.
    pub fn resource_names(&self) -> &OrderedKeySet {
        &self.resource_names
    }

    /// Variable bindings used during placeholder expansion and resource-name templating.
    pub fn variables(&self) -> &ValidatedKeyMap {
        &self.variables
    }

    /// Whether this load should run at a raised (DEBUG-and-above) log level.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The placeholder syntax used for this location's templates and tree interpolation.
    pub fn placeholder_spec(&self) -> &PlaceholderSpec {
        &self.placeholder_spec
    }
}

/// Cache-key equality: two locations are equal iff every field is equal, including variable and
/// resource-name insertion order (order is part of identity since it drives merge precedence).
impl PartialEq for ResourceLocation {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider
            && self.base_directories.iter().eq(other.base_directories.iter())
            && self.resource_names.iter().eq(other.resource_names.iter())
            && self.variables.iter().eq(other.variables.iter())
            && self.verbose == other.verbose
            && self.placeholder_spec == other.placeholder_spec
    }
}

impl Eq for ResourceLocation {}

impl Hash for ResourceLocation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.provider.hash(state);
        for v in self.base_directories.iter() {
            v.hash(state);
        }
        for v in self.resource_names.iter() {
            v.hash(state);
        }
        for (k, v) in self.variables.iter() {
            k.hash(state);
            v.hash(state);
        }
        self.verbose.hash(state);
        self.placeholder_spec.prefix().hash(state);
        self.placeholder_spec.suffix().hash(state);
        self.placeholder_spec.delimiter().hash(state);
        self.placeholder_spec.escape().hash(state);
    }
}

/// Builder for [`ResourceLocation`]. Holds mutable state and freezes into an immutable value on
/// [`ResourceLocationBuilder::build`].
#[derive(Clone, Debug)]
pub struct ResourceLocationBuilder {
    provider: String,
    base_directories: OrderedKeySet,
    resource_names: OrderedKeySet,
    variables: ValidatedKeyMap,
    verbose: bool,
    placeholder_spec: PlaceholderSpec,
}

impl Default for ResourceLocationBuilder {
    fn default() -> Self {
        Self {
            provider: String::new(),
            base_directories: OrderedKeySet::new(),
            resource_names: OrderedKeySet::new(),
            variables: ValidatedKeyMap::new(),
            verbose: false,
            placeholder_spec: PlaceholderSpec::default(),
        }
    }
}

impl ResourceLocationBuilder {
    /// Set the provider identifier.
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Append one base directory.
    pub fn base_directory(mut self, dir: impl Into<String>) -> Self {
        self.base_directories.add(dir);
        self
    }

    /// Append several base directories.
    pub fn base_directories(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.base_directories.extend(dirs);
        self
    }

    /// Append one resource-name template.
    pub fn resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_names.add(name);
        self
    }

    /// Append several resource-name templates.
    pub fn resource_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.resource_names.extend(names);
        self
    }

    /// Bind a variable, validated as non-blank key/value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::InvalidVariables`] if `key` or `value` is blank.
    pub fn variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        self.variables.put(key, value)?;
        Ok(self)
    }

    /// Enable verbose (DEBUG-and-above) logging for loads using this location.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Override the placeholder syntax. Default is `${`, `}`, `:`, `\`.
    pub fn placeholder_spec(mut self, spec: PlaceholderSpec) -> Self {
        self.placeholder_spec = spec;
        self
    }

    /// Freeze the builder into an immutable [`ResourceLocation`].
    pub fn build(self) -> ResourceLocation {
        ResourceLocation {
            provider: self.provider,
            base_directories: self.base_directories,
            resource_names: self.resource_names,
            variables: self.variables,
            verbose: self.verbose,
            placeholder_spec: self.placeholder_spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_locations_hash_equal() {
        let a = ResourceLocation::builder()
            .provider("classpath")
            .resource_name("application")
            .build();
        let b = ResourceLocation::builder()
            .provider("classpath")
            .resource_name("application")
            .build();
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn resource_name_order_is_part_of_identity() {
        let a = ResourceLocation::builder()
            .resource_names(["a", "b"])
            .build();
        let b = ResourceLocation::builder()
            .resource_names(["b", "a"])
            .build();
        assert_ne!(a, b);
    }

    #[test]
    fn variable_builder_rejects_blank() {
        let result = ResourceLocation::builder().variable("k", "  ");
        assert!(result.is_err());
    }
}
