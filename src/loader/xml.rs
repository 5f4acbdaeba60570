//! The bundled `XML` loader.
//!
//! Policy (per `spec.md` §9 Open Questions, resolved in `SPEC_FULL.md` §6): the document's root
//! element name is discarded and its children become the outer object; an element's attributes
//! become string-valued leaves alongside its child-element map, under the same object.

use crate::loader::{LoaderError, ResourceLoader};
use crate::registry::Strategy;
use crate::stream::ResourceStream;
use crate::tree::{Tree, TreeMap};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

/// Parses XML resource streams into a [`Tree`] via `quick-xml`'s pull parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlLoader;

impl Strategy for XmlLoader {
    fn keys(&self) -> Vec<String> {
        vec!["xml".to_string()]
    }
}

impl ResourceLoader for XmlLoader {
    fn load(&self, mut stream: ResourceStream) -> Result<Tree, LoaderError> {
        self.validate_resource(&stream)?;
        let mut buf = String::new();
        stream
            .reader()
            .read_to_string(&mut buf)
            .map_err(LoaderError::Io)?;

        let mut reader = Reader::from_str(&buf);
        reader.trim_text(true);

        let root = parse_element(&mut reader, None)
            .map_err(|e| LoaderError::Parse(Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))))?;
        Ok(root.unwrap_or_else(Tree::empty_object))
    }
}

/// Parse one element's children (and, if `own_attrs` is `Some`, its own attributes) until the
/// matching end tag or end of document. Returns `None` if the element has no content at all.
fn parse_element(
    reader: &mut Reader<&[u8]>,
    own_attrs: Option<Vec<(String, String)>>,
) -> Result<Option<Tree>, quick_xml::Error> {
    let mut children = TreeMap::new();
    if let Some(attrs) = own_attrs {
        for (k, v) in attrs {
            children.insert(k, Tree::String(v));
        }
    }
    let mut text = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let attrs = collect_attrs(&e)?;
                let child = parse_element(reader, Some(attrs))?.unwrap_or_else(Tree::empty_object);
                insert_child(&mut children, name, child);
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let attrs = collect_attrs(&e)?;
                let child = if attrs.is_empty() {
                    Tree::Null
                } else {
                    let mut map = TreeMap::new();
                    for (k, v) in attrs {
                        map.insert(k, Tree::String(v));
                    }
                    Tree::Object(map)
                };
                insert_child(&mut children, name, child);
            }
            Event::Text(e) => {
                text.push_str(&e.unescape()?);
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Event::End(_) => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if children.is_empty() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Tree::String(trimmed.to_string())));
    }

    Ok(Some(Tree::Object(children)))
}

fn collect_attrs(e: &quick_xml::events::BytesStart) -> Result<Vec<(String, String)>, quick_xml::Error> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        attrs.push((key, value));
    }
    Ok(attrs)
}

/// Repeated child element names become an array, matching how every other bundled loader
/// represents repeated keys in a sequence-shaped source.
fn insert_child(children: &mut TreeMap, name: String, value: Tree) {
    match children.get_mut(&name) {
        Some(Tree::Array(items)) => items.push(value),
        Some(existing) => {
            let previous = existing.clone();
            *existing = Tree::Array(vec![previous, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn root_is_discarded_children_become_outer_object() {
        let xml = r#"<config><app><name>Liana</name></app></config>"#;
        let stream = ResourceStream::new("application.xml", Box::new(Cursor::new(xml.as_bytes().to_vec())));
        let tree = XmlLoader.load(stream).unwrap();
        let app = tree.as_object().unwrap().get("app").unwrap();
        assert_eq!(
            app.as_object().unwrap().get("name").unwrap().as_str(),
            Some("Liana")
        );
    }

    #[test]
    fn attributes_become_string_leaves_alongside_children() {
        let xml = r#"<config><server port="9090"><host>localhost</host></server></config>"#;
        let stream = ResourceStream::new("x.xml", Box::new(Cursor::new(xml.as_bytes().to_vec())));
        let tree = XmlLoader.load(stream).unwrap();
        let server = tree.as_object().unwrap().get("server").unwrap().as_object().unwrap();
        assert_eq!(server.get("port").unwrap().as_str(), Some("9090"));
        assert_eq!(server.get("host").unwrap().as_str(), Some("localhost"));
    }

    #[test]
    fn repeated_elements_become_an_array() {
        let xml = r#"<config><servers><item>a</item><item>b</item></servers></config>"#;
        let stream = ResourceStream::new("x.xml", Box::new(Cursor::new(xml.as_bytes().to_vec())));
        let tree = XmlLoader.load(stream).unwrap();
        let servers = tree
            .as_object()
            .unwrap()
            .get("servers")
            .unwrap()
            .as_object()
            .unwrap();
        let items = servers.get("item").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 2);
    }
}
