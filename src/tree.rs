//! The canonical configuration value: a recursive, insertion-ordered tree that every
//! [`crate::loader::ResourceLoader`] produces and every consumer (merger, interpolator, typed
//! resolver) operates on.

use indexmap::IndexMap;
use serde::de::{
    DeserializeOwned, DeserializeSeed, Deserializer, EnumAccess, Error as DeError, MapAccess,
    SeqAccess, VariantAccess, Visitor,
};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A string-keyed, insertion-ordered map from tree keys to trees.
pub type TreeMap = IndexMap<String, Tree>;

/// The canonical recursive configuration value.
///
/// Every format loader in [`crate::loader`] parses its input into a `Tree`; the
/// [`crate::merge`] and interpolation passes operate purely on `Tree` values; the typed resolver
/// in [`crate::resolver`] converts `Tree` subtrees into caller types via `serde`.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Tree {
    /// Absence of a value (JSON/YAML `null`).
    #[default]
    Null,
    /// A boolean scalar.
    Bool(bool),
    /// A signed integer scalar.
    Int(i64),
    /// A floating point scalar.
    Float(f64),
    /// A string scalar.
    String(String),
    /// An ordered sequence of trees.
    Array(Vec<Tree>),
    /// An insertion-ordered string-keyed map of trees.
    Object(TreeMap),
}

impl Tree {
    /// An empty object, the identity element for [`crate::merge::merge`].
    #[inline]
    pub fn empty_object() -> Self {
        Tree::Object(TreeMap::new())
    }

    /// Return `true` if this tree is [`Tree::Null`].
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Tree::Null)
    }

    /// Borrow this tree as an object map, if it is one.
    #[inline]
    pub fn as_object(&self) -> Option<&TreeMap> {
        match self {
            Tree::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Mutably borrow this tree as an object map, if it is one.
    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut TreeMap> {
        match self {
            Tree::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow this tree as an array, if it is one.
    #[inline]
    pub fn as_array(&self) -> Option<&[Tree]> {
        match self {
            Tree::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow this tree as a string, if it is a string scalar.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tree::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a mutable reference to the child addressed by a single path segment, if this tree
    /// is an object or array and the segment resolves within it.
    pub fn get_segment_mut(&mut self, segment: &PathSegment) -> Option<&mut Tree> {
        match (self, segment) {
            (Tree::Object(m), PathSegment::Key(k)) => m.get_mut(k),
            (Tree::Array(a), PathSegment::Index(i)) => a.get_mut(*i),
            _ => None,
        }
    }

    /// Returns a reference to the child addressed by a single path segment.
    pub fn get_segment(&self, segment: &PathSegment) -> Option<&Tree> {
        match (self, segment) {
            (Tree::Object(m), PathSegment::Key(k)) => m.get(k),
            (Tree::Array(a), PathSegment::Index(i)) => a.get(*i),
            _ => None,
        }
    }

    /// Traverse a parsed path, returning the addressed subtree, if present.
    pub fn get_path(&self, path: &[PathSegment]) -> Option<&Tree> {
        let mut node = self;
        for segment in path {
            node = node.get_segment(segment)?;
        }
        Some(node)
    }

    /// Convert this tree (or a subtree reached via `get_path`) into any `DeserializeOwned` type.
    pub fn convert<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(TreeDeserializer { tree: self })
    }
}

/// One segment of a parsed configuration path: either an object key or an array index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// An object key, e.g. `a` in `a.b`.
    Key(String),
    /// An array index, e.g. `0` in `a[0]`.
    Index(usize),
}

/// Parse a dotted path with optional bracket indices (`a.b.c`, `a[0].b`) into path segments.
///
/// Translation follows `spec.md` §4.9: `a.b.c` addresses the same node as the JSON pointer
/// `/a/b/c`; `a[0].b` addresses `/a/0/b`.
pub fn parse_path(path: &str) -> crate::Result<Vec<PathSegment>> {
    if path.is_empty() {
        return Err(crate::ConfigError::InvalidPath(path.to_string()));
    }

    let mut segments = Vec::new();
    for dotted in path.split('.') {
        let mut rest = dotted;
        // Leading key before any bracket, e.g. "servers" in "servers[0]".
        let key_end = rest.find('[').unwrap_or(rest.len());
        let key = &rest[..key_end];
        if !key.is_empty() {
            segments.push(PathSegment::Key(key.to_string()));
        }
        rest = &rest[key_end..];

        while !rest.is_empty() {
            if !rest.starts_with('[') {
                return Err(crate::ConfigError::InvalidPath(path.to_string()));
            }
            let close = rest
                .find(']')
                .ok_or_else(|| crate::ConfigError::InvalidPath(path.to_string()))?;
            let index: usize = rest[1..close]
                .parse()
                .map_err(|_| crate::ConfigError::InvalidPath(path.to_string()))?;
            segments.push(PathSegment::Index(index));
            rest = &rest[close + 1..];
        }
    }

    if segments.is_empty() {
        return Err(crate::ConfigError::InvalidPath(path.to_string()));
    }

    Ok(segments)
}

impl Serialize for Tree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Tree::Null => serializer.serialize_none(),
            Tree::Bool(b) => serializer.serialize_bool(*b),
            Tree::Int(i) => serializer.serialize_i64(*i),
            Tree::Float(f) => serializer.serialize_f64(*f),
            Tree::String(s) => serializer.serialize_str(s),
            Tree::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Tree::Object(map) => {
                let mut ser_map = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    ser_map.serialize_entry(k, v)?;
                }
                ser_map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Tree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = Tree;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("any value representable as a configuration tree")
            }

            fn visit_bool<E: DeError>(self, v: bool) -> Result<Tree, E> {
                Ok(Tree::Bool(v))
            }

            fn visit_i64<E: DeError>(self, v: i64) -> Result<Tree, E> {
                Ok(Tree::Int(v))
            }

            fn visit_u64<E: DeError>(self, v: u64) -> Result<Tree, E> {
                if let Ok(v) = i64::try_from(v) {
                    Ok(Tree::Int(v))
                } else {
                    Ok(Tree::Float(v as f64))
                }
            }

            fn visit_f64<E: DeError>(self, v: f64) -> Result<Tree, E> {
                Ok(Tree::Float(v))
            }

            fn visit_str<E: DeError>(self, v: &str) -> Result<Tree, E> {
                Ok(Tree::String(v.to_string()))
            }

            fn visit_string<E: DeError>(self, v: String) -> Result<Tree, E> {
                Ok(Tree::String(v))
            }

            fn visit_unit<E: DeError>(self) -> Result<Tree, E> {
                Ok(Tree::Null)
            }

            fn visit_none<E: DeError>(self) -> Result<Tree, E> {
                Ok(Tree::Null)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Tree, D::Error> {
                Tree::deserialize(d)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Tree, A::Error> {
                let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Tree::Array(items))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Tree, A::Error> {
                let mut result = TreeMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((k, v)) = map.next_entry::<String, Tree>()? {
                    result.insert(k, v);
                }
                Ok(Tree::Object(result))
            }
        }

        deserializer.deserialize_any(TreeVisitor)
    }
}

/// A `serde::Deserializer` over a borrowed [`Tree`], used by
/// [`crate::resolver::ValueResolver`] to convert subtrees into caller types without a
/// runtime-reflective mapper.
pub struct TreeDeserializer<'a> {
    tree: &'a Tree,
}

impl<'a> TreeDeserializer<'a> {
    /// Wrap a tree reference for `serde` deserialization.
    pub fn new(tree: &'a Tree) -> Self {
        Self { tree }
    }
}

macro_rules! forward_scalar {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
            match self.tree {
                Tree::Int(i) => visitor.$visit(*i as $ty),
                Tree::Float(f) => visitor.$visit(*f as $ty),
                other => Err(DeError::custom(format!(
                    "expected a number, found {other:?}"
                ))),
            }
        }
    };
}

impl<'de, 'a> Deserializer<'de> for TreeDeserializer<'a> {
    type Error = serde_json::Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::Null => visitor.visit_unit(),
            Tree::Bool(b) => visitor.visit_bool(*b),
            Tree::Int(i) => visitor.visit_i64(*i),
            Tree::Float(f) => visitor.visit_f64(*f),
            Tree::String(s) => visitor.visit_str(s),
            Tree::Array(items) => visitor.visit_seq(TreeSeqAccess {
                iter: items.iter(),
            }),
            Tree::Object(map) => visitor.visit_map(TreeMapAccess {
                iter: map.iter(),
                value: None,
            }),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::Bool(b) => visitor.visit_bool(*b),
            other => Err(DeError::custom(format!(
                "expected a boolean, found {other:?}"
            ))),
        }
    }

    forward_scalar!(deserialize_i8, visit_i8, i8);
    forward_scalar!(deserialize_i16, visit_i16, i16);
    forward_scalar!(deserialize_i32, visit_i32, i32);
    forward_scalar!(deserialize_i64, visit_i64, i64);
    forward_scalar!(deserialize_u8, visit_u8, u8);
    forward_scalar!(deserialize_u16, visit_u16, u16);
    forward_scalar!(deserialize_u32, visit_u32, u32);
    forward_scalar!(deserialize_u64, visit_u64, u64);
    forward_scalar!(deserialize_f32, visit_f32, f32);
    forward_scalar!(deserialize_f64, visit_f64, f64);

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::String(s) if s.chars().count() == 1 => {
                visitor.visit_char(s.chars().next().unwrap())
            }
            other => Err(DeError::custom(format!(
                "expected a single character, found {other:?}"
            ))),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::String(s) => visitor.visit_str(s),
            other => Err(DeError::custom(format!(
                "expected a string, found {other:?}"
            ))),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::String(s) => visitor.visit_bytes(s.as_bytes()),
            other => Err(DeError::custom(format!(
                "expected a string, found {other:?}"
            ))),
        }
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::Null => visitor.visit_unit(),
            other => Err(DeError::custom(format!("expected null, found {other:?}"))),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::Array(items) => visitor.visit_seq(TreeSeqAccess {
                iter: items.iter(),
            }),
            other => Err(DeError::custom(format!(
                "expected an array, found {other:?}"
            ))),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::Object(map) => visitor.visit_map(TreeMapAccess {
                iter: map.iter(),
                value: None,
            }),
            other => Err(DeError::custom(format!(
                "expected an object, found {other:?}"
            ))),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_map(visitor)
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(
        self,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_any(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self.tree {
            Tree::String(variant) => visitor.visit_enum(TreeEnumAccess {
                variant,
                content: None,
            }),
            Tree::Object(map) if map.len() == 1 => {
                let (variant, content) = map.iter().next().unwrap();
                visitor.visit_enum(TreeEnumAccess {
                    variant,
                    content: Some(content),
                })
            }
            other => Err(DeError::custom(format!(
                "expected a string or single-entry object for an enum, found {other:?}"
            ))),
        }
    }
}

struct TreeSeqAccess<'a> {
    iter: std::slice::Iter<'a, Tree>,
}

impl<'de, 'a> SeqAccess<'de> for TreeSeqAccess<'a> {
    type Error = serde_json::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Self::Error> {
        match self.iter.next() {
            Some(tree) => seed.deserialize(TreeDeserializer { tree }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct TreeMapAccess<'a> {
    iter: indexmap::map::Iter<'a, String, Tree>,
    value: Option<&'a Tree>,
}

impl<'de, 'a> MapAccess<'de> for TreeMapAccess<'a> {
    type Error = serde_json::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        match self.iter.next() {
            Some((k, v)) => {
                self.value = Some(v);
                seed.deserialize(serde::de::value::StrDeserializer::new(k))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(
        &mut self,
        seed: V,
    ) -> Result<V::Value, Self::Error> {
        let tree = self.value.take().expect("next_value called before next_key");
        seed.deserialize(TreeDeserializer { tree })
    }

    fn size_hint(&self) -> Option<usize> {
        self.iter.size_hint().1
    }
}

struct TreeEnumAccess<'a> {
    variant: &'a str,
    content: Option<&'a Tree>,
}

impl<'de, 'a> EnumAccess<'de> for TreeEnumAccess<'a> {
    type Error = serde_json::Error;
    type Variant = TreeVariantAccess<'a>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), Self::Error> {
        let value = seed.deserialize(serde::de::value::StrDeserializer::new(self.variant))?;
        Ok((
            value,
            TreeVariantAccess {
                content: self.content,
            },
        ))
    }
}

struct TreeVariantAccess<'a> {
    content: Option<&'a Tree>,
}

impl<'de, 'a> VariantAccess<'de> for TreeVariantAccess<'a> {
    type Error = serde_json::Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(
        self,
        seed: T,
    ) -> Result<T::Value, Self::Error> {
        let tree = self
            .content
            .ok_or_else(|| DeError::custom("expected newtype variant content"))?;
        seed.deserialize(TreeDeserializer { tree })
    }

    fn tuple_variant<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let tree = self
            .content
            .ok_or_else(|| DeError::custom("expected tuple variant content"))?;
        TreeDeserializer { tree }.deserialize_seq(visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let tree = self
            .content
            .ok_or_else(|| DeError::custom("expected struct variant content"))?;
        TreeDeserializer { tree }.deserialize_map(visitor)
    }
}
