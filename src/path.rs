//! JSONPath-style locators
//!
//! Every error is located by a string rooted at `$`, using `['name']` for
//! object keys and `[n]` for array indices, e.g. `$['items'][2]['id']`.
//! Locators are rebuilt at every recursion level from the parent locator;
//! nothing mutates a locator in place.

use std::fmt;

use crate::error::{Result, ValidatorError};

/// The locator of the document root
pub const ROOT: &str = "$";

/// One step of a locator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property access (`['name']`)
    Key(String),
    /// Array element access (`[n]`)
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => {
                f.write_str("['")?;
                for c in key.chars() {
                    if c == '\'' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("']")
            }
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Extend `locator` by one segment.
///
/// An empty key leaves the locator unchanged.
pub fn extend(locator: &str, segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(key) if key.is_empty() => locator.to_string(),
        _ => format!("{}{}", locator, segment),
    }
}

/// Extend `locator` with a property accessor
pub fn with_key(locator: &str, key: &str) -> String {
    if key.is_empty() {
        return locator.to_string();
    }
    extend(locator, &PathSegment::from(key))
}

/// Extend `locator` with an index accessor
pub fn with_index(locator: &str, index: usize) -> String {
    extend(locator, &PathSegment::Index(index))
}

/// Split a locator back into its segments.
pub fn parse(locator: &str) -> Result<Vec<PathSegment>> {
    let fail = |offset: usize| ValidatorError::InvalidLocator {
        locator: locator.to_string(),
        offset,
    };

    let rest = locator.strip_prefix(ROOT).ok_or_else(|| fail(0))?;
    let bytes = rest.as_bytes();
    let base = ROOT.len();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'[' {
            return Err(fail(base + pos));
        }
        pos += 1;

        if bytes.get(pos) == Some(&b'\'') {
            pos += 1;
            let mut key = String::new();
            let mut chars = rest[pos..].char_indices();
            let mut closed = false;
            while let Some((offset, c)) = chars.next() {
                match c {
                    '\\' => match chars.next() {
                        Some((_, escaped)) => key.push(escaped),
                        None => return Err(fail(base + pos + offset)),
                    },
                    '\'' => {
                        pos += offset + 1;
                        closed = true;
                        break;
                    }
                    other => key.push(other),
                }
            }
            if !closed || bytes.get(pos) != Some(&b']') {
                return Err(fail(base + pos));
            }
            pos += 1;
            segments.push(PathSegment::Key(key));
        } else {
            let start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if start == pos || bytes.get(pos) != Some(&b']') {
                return Err(fail(base + pos));
            }
            let index = rest[start..pos].parse().map_err(|_| fail(base + start))?;
            pos += 1;
            segments.push(PathSegment::Index(index));
        }
    }

    Ok(segments)
}
