//! The bundled `YAML` loader. Accepts both `yaml` and `yml` extensions (`spec.md` §6).

use crate::loader::{LoaderError, ResourceLoader};
use crate::registry::Strategy;
use crate::stream::ResourceStream;
use crate::tree::Tree;

/// Parses YAML resource streams into a [`Tree`] via `serde_yaml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlLoader;

impl Strategy for YamlLoader {
    fn keys(&self) -> Vec<String> {
        vec!["yaml".to_string(), "yml".to_string()]
    }
}

impl ResourceLoader for YamlLoader {
    fn load(&self, mut stream: ResourceStream) -> Result<Tree, LoaderError> {
        self.validate_resource(&stream)?;
        serde_yaml::from_reader(stream.reader())
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
            "application.yaml",
            Box::new(Cursor::new(b"server:\n  port: 9090\n".to_vec())),
        );
        let tree = YamlLoader.load(stream).unwrap();
        let server = tree.as_object().unwrap().get("server").unwrap();
        assert_eq!(server.as_object().unwrap().get("port").unwrap(), &Tree::Int(9090));
    }

    #[test]
    fn advertises_both_extensions() {
        assert_eq!(YamlLoader.keys(), vec!["yaml", "yml"]);
    }
}
