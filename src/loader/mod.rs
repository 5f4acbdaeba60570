//! `ResourceLoader`: the port that turns a byte stream of a known format into a [`crate::Tree`]
//! (`spec.md` §6).

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "properties")]
pub mod properties;
#[cfg(feature = "xml")]
pub mod xml;
#[cfg(feature = "yaml")]
pub mod yaml;

use crate::registry::Strategy;
use crate::stream::ResourceStream;
use crate::tree::Tree;

/// Error raised by a [`ResourceLoader`] when it cannot parse a resource stream.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The stream failed this loader's `validate_resource` precondition.
    #[error("invalid resource stream: {0}")]
    InvalidStream(String),
    /// The underlying format parser failed.
    #[error(transparent)]
    Parse(#[from] Box<dyn std::error::Error + Send + Sync>),
    /// Reading the stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parses an open [`ResourceStream`] of a known textual format into a [`Tree`].
pub trait ResourceLoader: Strategy {
    /// Parse `stream` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the stream cannot be read or does not parse as this loader's
    /// format.
    fn load(&self, stream: ResourceStream) -> Result<Tree, LoaderError>;

    /// Validate a stream before parsing. Default implementation checks the stream has a
    /// non-blank name; loaders may tighten this further.
    fn validate_resource(&self, stream: &ResourceStream) -> Result<(), LoaderError> {
        if stream.name().trim().is_empty() {
            return Err(LoaderError::InvalidStream("empty resource name".to_string()));
        }
        Ok(())
    }
}
