//! `ResourceProvider`: the port that turns a logical resource name into an open byte stream
//! (`spec.md` §6).

pub mod classpath;

use crate::location::{ResourceIdentifier, ResourceLocation};
use crate::registry::Strategy;
use crate::stream::ResourceStream;

/// Error raised by a [`ResourceProvider`] when it cannot resolve a resource.
///
/// Kept distinct from [`crate::ConfigError`] at the port boundary (providers are implemented
/// outside this crate too) and wrapped into `ConfigError::Provider` by the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The resource name was rejected before any I/O was attempted (e.g. blank name).
    #[error("invalid resource name {0:?}")]
    InvalidResource(String),
    /// The underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolves a logical resource name into an open [`ResourceStream`].
pub trait ResourceProvider: Strategy {
    /// Resolve `identifier` into an open stream. `location` is the location this identifier was
    /// prepared from, so providers whose search path depends on it (e.g. `classpath`'s base
    /// directories) can read that context without carrying their own copy of it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the resource cannot be opened.
    fn resolve_resource(
        &self,
        identifier: &ResourceIdentifier,
        location: &ResourceLocation,
    ) -> Result<ResourceStream, ProviderError>;

    /// Validate a resource identifier before attempting to resolve it. Default implementation
    /// rejects a blank resource name; providers may tighten this further.
    fn validate_resource(&self, identifier: &ResourceIdentifier) -> Result<(), ProviderError> {
        if identifier.resource_name().trim().is_empty() {
            return Err(ProviderError::InvalidResource(
                identifier.resource_name().to_string(),
            ));
        }
        Ok(())
    }
}
