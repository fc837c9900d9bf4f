//! # Path Templates
//!
//! Parses route patterns such as `/users/{id}` into an ordered list of
//! segments, and splits request paths the same way so both sides line up.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// A single template segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Static text, e.g. `users` in `/users/{id}`
    Literal(String),
    /// Named placeholder, e.g. `id` in `/users/{id}`
    Placeholder(String),
}

impl Segment {
    /// Classify one piece of a pattern
    ///
    /// `{name}` (at least two characters, braces at both ends) becomes a
    /// placeholder holding `name`; anything else is literal text.
    #[must_use]
    pub fn parse(piece: &str) -> Self {
        if piece.len() >= 2 && piece.starts_with('{') && piece.ends_with('}') {
            Self::Placeholder(piece[1..piece.len() - 1].to_string())
        } else {
            Self::Literal(piece.to_string())
        }
    }

    /// Placeholder name, if this segment is one
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Placeholder(name) => Some(name.as_str()),
            Self::Literal(_) => None,
        }
    }

    /// Check if segment is static text
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Placeholder(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// Parsed path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a path pattern
    ///
    /// Only the path portion is used: a query string or fragment in the
    /// pattern is ignored. Slashes are trimmed from both ends before
    /// splitting, so `/`, `` and `//` all produce an empty template.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let path = pattern.split(['?', '#']).next().unwrap_or_default();
        let segments = split_path(path).into_iter().map(Segment::parse).collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Original pattern text
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parsed segments in order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments a request path must have to match
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the template has no segments (the root path)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check if any segment is static text
    #[must_use]
    pub fn has_literals(&self) -> bool {
        self.segments.iter().any(Segment::is_literal)
    }

    /// First placeholder name that occurs more than once
    #[must_use]
    pub fn duplicate_placeholder(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.segments
            .iter()
            .filter_map(Segment::placeholder)
            .find(|name| !seen.insert(*name))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Split a path into segments
///
/// Leading and trailing slashes are trimmed first; an empty remainder yields
/// no segments. Interior empty segments (`a//b`) are kept.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Percent-decode one path segment
///
/// Run after [`split_path`], so an encoded `%2F` stays inside its segment.
/// `+` is left alone (it only means space in form data), malformed escapes
/// are kept as-is and invalid UTF-8 is replaced.
#[must_use]
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }

    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = if bytes[i] == b'%' && i + 2 < bytes.len() {
            hex_digit(bytes[i + 1])
                .zip(hex_digit(bytes[i + 2]))
                .map(|(hi, lo)| (hi << 4) | lo)
        } else {
            None
        };
        match escaped {
            Some(byte) => {
                decoded.push(byte);
                i += 3;
            }
            None => {
                decoded.push(bytes[i]);
                i += 1;
            }
        }
    }

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

const fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
