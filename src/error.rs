//! The crate's single error type, covering every error kind the components in this crate can
//! raise.

use std::result::Result as StdResult;

/// A result type using the crate's [`ConfigError`].
pub type Result<T> = StdResult<T, ConfigError>;

/// Error generated during any crate operation.
///
/// Each variant corresponds to one of the error kinds described by the configuration
/// acquisition/consumption propagation policy: the `*Invalid*` and `Missing`/`Conversion`
/// variants are raised straight to the caller, while provider/loader failures are logged and the
/// offending resource is skipped rather than raised (see [`crate::pipeline`]).
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A key or value supplied to a [`crate::containers::ValidatedKeyMap`] was null-like or blank.
    #[error("invalid variable {key:?}: {reason}")]
    InvalidVariables {
        /// The offending key (or an empty string if the key itself was the problem).
        key: String,
        /// Human-readable reason.
        reason: &'static str,
    },

    /// The placeholder engine detected a self-referential cycle, or was configured with a
    /// malformed [`crate::location::PlaceholderSpec`].
    #[error("invalid placeholder: {0}")]
    InvalidPlaceholder(String),

    /// A [`crate::provider::ResourceProvider`] failed to resolve a resource.
    #[error("provider {provider:?} failed to resolve {resource:?}: {source}")]
    Provider {
        /// The provider's key.
        provider: String,
        /// The logical resource name.
        resource: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A [`crate::loader::ResourceLoader`] failed to parse a resource stream.
    #[error("loader failed to parse {resource:?}: {source}")]
    Loader {
        /// The logical resource name that failed to parse.
        resource: String,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A strategy (provider or loader) key could not be resolved in a
    /// [`crate::registry::StrategyRegistry`].
    #[error("no {kind} registered for key {key:?}")]
    StrategyNotFound {
        /// `"provider"` or `"loader"`.
        kind: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// A typed value could not be converted to the requested target type.
    #[error("failed to convert value at {path:?} to the requested type: {source}")]
    Conversion {
        /// Dotted path that was being converted.
        path: String,
        /// Underlying (de)serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// A typed getter without a default value found no value at the requested path.
    #[error("missing configuration key: {0:?}")]
    MissingKey(String),

    /// Path syntax was invalid (e.g. empty, or an unmatched bracket index).
    #[error("invalid configuration path {0:?}")]
    InvalidPath(String),

    /// A value requested via a duration-typed getter did not parse as a duration.
    #[error("{0:?} is not a recognized duration")]
    InvalidDuration(String),

    /// Underlying I/O failure (opening a resource stream, reading a file).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
