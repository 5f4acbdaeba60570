//! The placeholder engine: a recursive, escape-aware, default-value-aware resolver for
//! `${key[:default]}` style expressions, with cycle detection and all-or-nothing semantics.
//!
//! See `spec.md` §4.2 for the full algorithm description this module implements.

use crate::source::PropertySource;
use crate::{ConfigError, Result};
use std::collections::HashSet;

/// Prefix/suffix/delimiter/escape configuration for placeholder expressions.
///
/// All of `prefix`, `suffix` and `delimiter` must be non-blank; `escape` is a single character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderSpec {
    prefix: String,
    suffix: String,
    delimiter: String,
    escape: char,
}

impl PlaceholderSpec {
    /// Construct a spec, rejecting blank prefix/suffix/delimiter.
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        delimiter: impl Into<String>,
        escape: char,
    ) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        let delimiter = delimiter.into();
        for (name, v) in [("prefix", &prefix), ("suffix", &suffix), ("delimiter", &delimiter)] {
            if v.trim().is_empty() {
                return Err(ConfigError::InvalidPlaceholder(format!(
                    "{name} must be non-blank"
                )));
            }
        }
        Ok(Self {
            prefix,
            suffix,
            delimiter,
            escape,
        })
    }

    #[inline]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[inline]
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    #[inline]
    pub fn escape(&self) -> char {
        self.escape
    }
}

impl Default for PlaceholderSpec {
    /// `${`, `}`, `:`, `\` — the library defaults named in `spec.md` §6.
    fn default() -> Self {
        Self {
            prefix: "${".to_string(),
            suffix: "}".to_string(),
            delimiter: ":".to_string(),
            escape: '\\',
        }
    }
}

/// Recursively expand placeholder expressions in `template` using `sources` in order.
///
/// Returns `Ok(None)` if any placeholder in `template` could not be resolved (the all-or-nothing
/// contract from `spec.md` §4.2); never returns a partially expanded string. Returns
/// `Err(ConfigError::InvalidPlaceholder)` if a cycle is detected while resolving a key.
pub fn expand(spec: &PlaceholderSpec, template: &str, sources: &[&dyn PropertySource]) -> Result<Option<String>> {
    let mut in_progress = HashSet::new();
    let mut unresolved = HashSet::new();
    let result = expand_inner(spec, template, sources, &mut in_progress, &mut unresolved)?;
    if unresolved.is_empty() {
        Ok(Some(result))
    } else {
        Ok(None)
    }
}

/// Scan `template` left to right, expanding placeholders via `resolve_body`.
///
/// Implements the offset-stack scanning algorithm of `spec.md` §4.2: a stack of output-buffer
/// offsets marks where each currently-open `prefix` began, so nested placeholders (`${a${b}}`)
/// are recognised and resolved inside-out without recursing on the call stack for the scan
/// itself (recursion only happens, bounded by key depth, when a resolved value or default is
/// itself expanded).
fn expand_inner(
    spec: &PlaceholderSpec,
    template: &str,
    sources: &[&dyn PropertySource],
    in_progress: &mut HashSet<String>,
    unresolved: &mut HashSet<String>,
) -> Result<String> {
    if template.is_empty() {
        return Ok(String::new());
    }
    if !template.contains(spec.prefix()) {
        return Ok(template.to_string());
    }

    let prefix = spec.prefix();
    let suffix = spec.suffix();
    let escape = spec.escape();
    let prefix_chars: Vec<char> = prefix.chars().collect();
    let suffix_chars: Vec<char> = suffix.chars().collect();

    let mut output = String::with_capacity(template.len());
    let mut stack: Vec<usize> = Vec::new();
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0usize;

    while i < chars.len() {
        if matches_at(&chars, i, &prefix_chars) {
            let escaped = i > 0 && chars[i - 1] == escape;
            if escaped {
                output.pop();
                output.push_str(prefix);
                i += prefix_chars.len();
                continue;
            }
            stack.push(output.len());
            output.push_str(prefix);
            i += prefix_chars.len();
            continue;
        }

        if !stack.is_empty() && matches_at(&chars, i, &suffix_chars) {
            let start = stack.pop().unwrap();
            let body_start = start + prefix.len();
            let body = output[body_start..].to_string();
            output.truncate(start);
            let resolved = resolve_body(spec, &body, sources, in_progress, unresolved)?;
            output.push_str(&resolved);
            i += suffix_chars.len();
            continue;
        }

        output.push(chars[i]);
        i += 1;
    }

    Ok(output)
}

fn matches_at(chars: &[char], i: usize, needle_chars: &[char]) -> bool {
    if i + needle_chars.len() > chars.len() {
        return false;
    }
    chars[i..i + needle_chars.len()] == needle_chars[..]
}

/// Resolve the body of a single placeholder (`key[:default]`), recursively expanding the key
/// and, if the key is unresolved, the default.
fn resolve_body(
    spec: &PlaceholderSpec,
    body: &str,
    sources: &[&dyn PropertySource],
    in_progress: &mut HashSet<String>,
    unresolved: &mut HashSet<String>,
) -> Result<String> {
    let (key, default) = match body.split_once(spec.delimiter()) {
        Some((k, d)) => (k, Some(d)),
        None => (body, None),
    };

    if key.trim().is_empty() {
        return resolve_missing(spec, body, default, sources, in_progress, unresolved);
    }

    if in_progress.contains(key) {
        return Err(ConfigError::InvalidPlaceholder(format!(
            "cyclic placeholder reference: {key}"
        )));
    }

    for source in sources {
        if let Some(value) = source.get(key) {
            in_progress.insert(key.to_string());
            let expanded = expand_inner(spec, &value, sources, in_progress, unresolved);
            in_progress.remove(key);
            return expanded;
        }
    }

    resolve_missing(spec, body, default, sources, in_progress, unresolved)
}

fn resolve_missing(
    spec: &PlaceholderSpec,
    body: &str,
    default: Option<&str>,
    sources: &[&dyn PropertySource],
    in_progress: &mut HashSet<String>,
    unresolved: &mut HashSet<String>,
) -> Result<String> {
    match default {
        Some(default) => expand_inner(spec, default, sources, in_progress, unresolved),
        None => {
            unresolved.insert(body.to_string());
            Ok(format!("{}{}{}", spec.prefix(), body, spec.suffix()))
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::source::MapSource;
    use proptest::prelude::*;
    use std::collections::HashMap;

    proptest! {
        /// A body with no nested `${`/`}` of its own, escaped with a leading `\`, always expands
        /// to the literal placeholder text — escaping never depends on whether any source could
        /// have resolved the key (`spec.md` §4.2).
        #[test]
        fn escaped_placeholder_always_round_trips_literally(body in "[a-zA-Z0-9_]{0,12}") {
            let spec = PlaceholderSpec::default();
            let src = MapSource::new(HashMap::new());
            let refs: Vec<&dyn PropertySource> = vec![&src];
            let escaped = format!("\\${{{body}}}");
            let expected = format!("${{{body}}}");
            prop_assert_eq!(expand(&spec, &escaped, &refs).unwrap(), Some(expected));
        }

        /// A string containing none of the spec's prefix sequence expands to itself unchanged,
        /// regardless of content, since the scanner short-circuits before touching any source.
        #[test]
        fn string_without_prefix_is_unchanged(text in "[a-zA-Z0-9_ .,/-]{0,32}") {
            prop_assume!(!text.contains("${"));
            let spec = PlaceholderSpec::default();
            let src = MapSource::new(HashMap::new());
            let refs: Vec<&dyn PropertySource> = vec![&src];
            prop_assert_eq!(expand(&spec, &text, &refs).unwrap(), Some(text));
        }
    }
}
