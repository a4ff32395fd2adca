//! JSON Pointer helpers (RFC 6901).
//!
//! Schema locations are kept as escaped pointer strings. Instance locations
//! are tracked as a borrowed linked list during validation and only rendered
//! to a string when a violation is recorded.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Escape a single reference token (`~` → `~0`, `/` → `~1`).
pub fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Undo [`escape`].
pub fn unescape(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Append one token to an escaped pointer.
pub fn join(pointer: &str, token: &str) -> String {
    format!("{pointer}/{}", escape(token))
}

/// Append an array index to an escaped pointer.
pub fn join_index(pointer: &str, index: usize) -> String {
    format!("{pointer}/{index}")
}

/// Percent-decode a URI fragment into an escaped JSON Pointer.
///
/// Returns `None` when the decoded bytes are not UTF-8.
pub fn decode_fragment(fragment: &str) -> Option<String> {
    percent_decode_str(fragment)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Resolve an escaped pointer against a document.
pub fn resolve<'v>(document: &'v Value, pointer: &str) -> Option<&'v Value> {
    if pointer.is_empty() {
        return Some(document);
    }
    let rest = pointer.strip_prefix('/')?;
    rest.split('/').try_fold(document, |current, raw| {
        let token = unescape(raw);
        match current {
            Value::Object(map) => map.get(&token),
            Value::Array(items) => {
                if token.len() > 1 && token.starts_with('0') {
                    return None;
                }
                token.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            _ => None,
        }
    })
}

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Root,
    Key(&'a str),
    Index(usize),
}

/// Position of a value inside the instance being validated.
#[derive(Debug)]
pub(crate) struct Location<'a> {
    parent: Option<&'a Location<'a>>,
    segment: Segment<'a>,
    depth: usize,
}

impl<'a> Location<'a> {
    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            segment: Segment::Root,
            depth: 0,
        }
    }

    pub(crate) fn key<'b>(&'b self, key: &'b str) -> Location<'b> {
        Location {
            parent: Some(self),
            segment: Segment::Key(key),
            depth: self.depth + 1,
        }
    }

    pub(crate) fn index(&self, index: usize) -> Location<'_> {
        Location {
            parent: Some(self),
            segment: Segment::Index(index),
            depth: self.depth + 1,
        }
    }

    /// Nesting depth; the root is 0.
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn to_pointer(&self) -> String {
        let mut segments = Vec::with_capacity(self.depth);
        let mut current = Some(self);
        while let Some(location) = current {
            segments.push(location.segment);
            current = location.parent;
        }
        let mut pointer = String::new();
        for segment in segments.iter().rev() {
            match segment {
                Segment::Root => {}
                Segment::Key(key) => {
                    pointer.push('/');
                    pointer.push_str(&escape(key));
                }
                Segment::Index(index) => {
                    pointer.push('/');
                    pointer.push_str(&index.to_string());
                }
            }
        }
        pointer
    }
}
