//! The bundled `properties` loader: the Java `.properties` line format.
//!
//! No crate in this library's dependency corpus parses this format (see `SPEC_FULL.md` §6), so
//! it is hand-rolled here: `key=value` / `key:value` / `key value` pairs, `#`/`!` comments,
//! trailing-backslash line continuation, and `\uXXXX` unicode escapes. Dotted keys (`a.b.c`)
//! are split into nested objects, matching how every other bundled loader represents
//! hierarchical data.

use crate::loader::{LoaderError, ResourceLoader};
use crate::registry::Strategy;
use crate::stream::ResourceStream;
use crate::tree::{Tree, TreeMap};
use std::io::Read;

/// Parses Java-style `.properties` resource streams into a [`Tree`].
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesLoader;

impl Strategy for PropertiesLoader {
    fn keys(&self) -> Vec<String> {
        vec!["properties".to_string()]
    }
}

impl ResourceLoader for PropertiesLoader {
    fn load(&self, mut stream: ResourceStream) -> Result<Tree, LoaderError> {
        self.validate_resource(&stream)?;
        let mut data = String::new();
        stream
            .reader()
            .read_to_string(&mut data)
            .map_err(LoaderError::Io)?;
        parse(&data).map_err(|e| LoaderError::Parse(Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))))
    }
}

fn parse(data: &str) -> Result<Tree, String> {
    let mut root = TreeMap::new();

    for line in join_continuations(data) {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let (key, value) = split_key_value(trimmed);
        let key = unescape(&key);
        let value = unescape(&value);
        insert_dotted(&mut root, &key, Tree::String(value));
    }

    Ok(Tree::Object(root))
}

/// Merge lines ending in an odd number of trailing backslashes with the following line.
fn join_continuations(data: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut pending = String::new();
    for raw_line in data.lines() {
        let line = if pending.is_empty() {
            raw_line.to_string()
        } else {
            format!("{pending}{raw_line}")
        };

        let trailing_backslashes = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            pending = line[..line.len() - 1].to_string();
            continue;
        }

        pending.clear();
        result.push(line);
    }
    if !pending.is_empty() {
        result.push(pending);
    }
    result
}

/// Split a non-comment, non-blank line into (key, value) on the first unescaped `=`, `:`, or
/// run of whitespace, per the Java `.properties` grammar.
fn split_key_value(line: &str) -> (String, String) {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    let mut key = String::new();
    let mut escaped = false;

    while i < chars.len() {
        let c = chars[i];
        if escaped {
            key.push('\\');
            key.push(c);
            escaped = false;
            i += 1;
            continue;
        }
        if c == '\\' {
            escaped = true;
            i += 1;
            continue;
        }
        if c == '=' || c == ':' || c.is_whitespace() {
            break;
        }
        key.push(c);
        i += 1;
    }

    // Skip whitespace, then at most one separator (`=` or `:`), then any more whitespace.
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    if i < chars.len() && (chars[i] == '=' || chars[i] == ':') {
        i += 1;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
    }

    let value: String = chars[i..].iter().collect();
    (key, value)
}

fn unescape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                if let Ok(code) = u32::from_str_radix(&hex, 16) {
                    if let Some(ch) = char::from_u32(code) {
                        result.push(ch);
                    }
                }
            }
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

fn insert_dotted(root: &mut TreeMap, key: &str, value: Tree) {
    let mut segments = key.split('.').peekable();
    let mut map = root;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        let entry = map
            .entry(segment.to_string())
            .or_insert_with(Tree::empty_object);
        if !matches!(entry, Tree::Object(_)) {
            *entry = Tree::empty_object();
        }
        map = match entry {
            Tree::Object(m) => m,
            _ => unreachable!(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(data: &str) -> Tree {
        let stream = ResourceStream::new("x.properties", Box::new(Cursor::new(data.as_bytes().to_vec())));
        PropertiesLoader.load(stream).unwrap()
    }

    #[test]
    fn parses_simple_pairs() {
        let tree = load("app.name=Liana\napp.port: 8080\n");
        let app = tree.as_object().unwrap().get("app").unwrap().as_object().unwrap();
        assert_eq!(app.get("name").unwrap().as_str(), Some("Liana"));
        assert_eq!(app.get("port").unwrap().as_str(), Some("8080"));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let tree = load("# comment\n\n! also a comment\nkey=value\n");
        assert_eq!(
            tree.as_object().unwrap().get("key").unwrap().as_str(),
            Some("value")
        );
    }

    #[test]
    fn joins_continuation_lines() {
        let tree = load("key=first \\\nsecond\n");
        assert_eq!(
            tree.as_object().unwrap().get("key").unwrap().as_str(),
            Some("first second")
        );
    }

    #[test]
    fn supports_space_separated_pairs() {
        let tree = load("key value\n");
        assert_eq!(
            tree.as_object().unwrap().get("key").unwrap().as_str(),
            Some("value")
        );
    }

    #[test]
    fn decodes_unicode_escapes() {
        let tree = load("greeting=caf\\u00e9\n");
        assert_eq!(
            tree.as_object().unwrap().get("greeting").unwrap().as_str(),
            Some("caf\u{e9}")
        );
    }
}
