//! The bundled `classpath` provider: searches an ordered set of base directories on the local
//! filesystem, standing in for the host's class-path lookup (`spec.md` §6).

use crate::location::{ResourceIdentifier, ResourceLocation};
use crate::provider::{ProviderError, ResourceProvider};
use crate::registry::Strategy;
use crate::stream::ResourceStream;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when a resource name lacks one (`spec.md` §6).
const EXTENSIONLESS_FALLBACKS: &[&str] = &["properties", "yaml", "yml"];

/// This key the preparer defaults to when a location has no explicit provider.
pub const KEY: &str = "classpath";

/// Searches a location's base directories (defaulting to `["", "config"]` when the location
/// declares none) for a resource name, appending fallback extensions when the name has none.
///
/// Stateless: the search path is read from the [`ResourceLocation`] passed to
/// [`ResourceProvider::resolve_resource`], not stored on the provider itself, so one instance
/// serves every location.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClasspathProvider;

impl ClasspathProvider {
    /// Construct the provider. Kept as a constructor (rather than requiring callers to write
    /// `ClasspathProvider` directly) for symmetry with the other bundled strategies.
    pub fn new() -> Self {
        Self
    }

    fn candidate_paths(&self, base_directories: &[&str], resource_name: &str) -> Vec<PathBuf> {
        let names: Vec<String> = if Path::new(resource_name).extension().is_some() {
            vec![resource_name.to_string()]
        } else {
            EXTENSIONLESS_FALLBACKS
                .iter()
                .map(|ext| format!("{resource_name}.{ext}"))
                .collect()
        };

        let mut paths = Vec::with_capacity(base_directories.len() * names.len());
        for dir in base_directories {
            for name in &names {
                paths.push(if dir.is_empty() {
                    PathBuf::from(name)
                } else {
                    Path::new(dir).join(name)
                });
            }
        }
        paths
    }
}

impl Strategy for ClasspathProvider {
    fn keys(&self) -> Vec<String> {
        vec![KEY.to_string()]
    }
}

impl ResourceProvider for ClasspathProvider {
    fn resolve_resource(
        &self,
        identifier: &ResourceIdentifier,
        location: &ResourceLocation,
    ) -> Result<ResourceStream, ProviderError> {
        self.validate_resource(identifier)?;

        let base_directories: Vec<&str> = location.base_directories().iter().collect();
        let base_directories = if base_directories.is_empty() {
            vec!["", "config"]
        } else {
            base_directories
        };

        for path in self.candidate_paths(&base_directories, identifier.resource_name()) {
            match File::open(&path) {
                Ok(file) => {
                    return Ok(ResourceStream::new(
                        path.to_string_lossy().to_string(),
                        Box::new(file),
                    ))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ProviderError::Io(e)),
            }
        }

        Err(ProviderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!(
                "no resource named {:?} found under {base_directories:?}",
                identifier.resource_name(),
            ),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn location_over(dir: &std::path::Path) -> ResourceLocation {
        ResourceLocation::builder()
            .base_directory(dir.to_string_lossy().to_string())
            .build()
    }

    #[test]
    fn resolves_exact_name_with_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.json"), b"{}").unwrap();
        let provider = ClasspathProvider::new();
        let id = ResourceIdentifier::new("classpath", "app.json");
        let stream = provider.resolve_resource(&id, &location_over(dir.path())).unwrap();
        assert!(stream.name().ends_with("app.json"));
    }

    #[test]
    fn tries_fallback_extensions_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("application.yaml")).unwrap();
        f.write_all(b"a: 1").unwrap();
        let provider = ClasspathProvider::new();
        let id = ResourceIdentifier::new("classpath", "application");
        let stream = provider.resolve_resource(&id, &location_over(dir.path())).unwrap();
        assert!(stream.name().ends_with("application.yaml"));
    }

    #[test]
    fn missing_resource_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ClasspathProvider::new();
        let id = ResourceIdentifier::new("classpath", "nope.json");
        assert!(provider.resolve_resource(&id, &location_over(dir.path())).is_err());
    }

    #[test]
    fn blank_resource_name_rejected_before_io() {
        let provider = ClasspathProvider::new();
        let id = ResourceIdentifier::new("classpath", "   ");
        let location = ResourceLocation::builder().build();
        assert!(matches!(
            provider.resolve_resource(&id, &location),
            Err(ProviderError::InvalidResource(_))
        ));
    }
}
