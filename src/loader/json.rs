//! The bundled `JSON` loader.

use crate::loader::{LoaderError, ResourceLoader};
use crate::registry::Strategy;
use crate::stream::ResourceStream;
use crate::tree::Tree;

/// Parses JSON resource streams into a [`Tree`] via `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl Strategy for JsonLoader {
    fn keys(&self) -> Vec<String> {
        vec!["json".to_string()]
    }
}

impl ResourceLoader for JsonLoader {
    fn load(&self, mut stream: ResourceStream) -> Result<Tree, LoaderError> {
        self.validate_resource(&stream)?;
        serde_json::from_reader(stream.reader())
            .map_err(|e| LoaderError::Parse(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_nested_object() {
        let stream = ResourceStream::new(
            "application.json",
            Box::new(Cursor::new(br#"{"app":{"name":"Liana"}}"#.to_vec())),
        );
        let tree = JsonLoader.load(stream).unwrap();
        let app = tree.as_object().unwrap().get("app").unwrap();
        assert_eq!(app.as_object().unwrap().get("name").unwrap().as_str(), Some("Liana"));
    }

    #[test]
    fn invalid_json_is_a_loader_error() {
        let stream = ResourceStream::new("x.json", Box::new(Cursor::new(b"not json".to_vec())));
        assert!(JsonLoader.load(stream).is_err());
    }
}
