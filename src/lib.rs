#![doc(html_root_url = "https://docs.rs/liana-config/0.1.0")]
#![doc = include_str!("../README.md")]

pub mod containers;
pub mod duration;
pub mod error;
pub mod loader;
pub mod location;
pub mod manager;
pub mod merge;
pub mod pipeline;
pub mod placeholder;
pub mod preparer;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod source;
pub mod stream;
pub mod tree;

pub use error::{ConfigError, Result};
pub use location::{ResourceIdentifier, ResourceLocation, ResourceLocationBuilder};
pub use manager::ConfigurationManager;
pub use placeholder::PlaceholderSpec;
pub use resolver::Configuration;
pub use stream::ResourceStream;
pub use tree::Tree;
