//! # Route Matcher
//!
//! Binds template placeholders to request segments.
//!
//! Extraction is strict: every template segment must be a placeholder.
//! A literal segment anywhere in the template makes extraction fail even
//! when the request text is identical, which is why the dispatcher refuses
//! to register such templates.

use crate::args::Args;
use crate::template::{PathTemplate, Segment};

/// Bind each placeholder of `template` to the request segment at the same
/// position
///
/// Returns `None` if the segment counts differ or the template contains a
/// literal segment.
#[must_use]
pub fn extract(template: &PathTemplate, segments: &[&str]) -> Option<Args> {
    if template.len() != segments.len() {
        return None;
    }

    let mut args = Args::new();
    for (segment, value) in template.segments().iter().zip(segments) {
        match segment {
            Segment::Placeholder(name) => args.insert(name.as_str(), *value),
            Segment::Literal(_) => return None,
        }
    }
    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_placeholder() {
        let template = PathTemplate::parse("/{id}");
        let args = extract(&template, &["1"]).unwrap();
        assert_eq!(args.get("id"), Some("1"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_extract_binds_in_template_order() {
        let template = PathTemplate::parse("/{user_id}/{post_id}");
        let args = extract(&template, &["456", "789"]).unwrap();
        let bound: Vec<(&str, &str)> = args.iter().collect();
        assert_eq!(bound, vec![("user_id", "456"), ("post_id", "789")]);
    }

    #[test]
    fn test_extract_no_coercion() {
        let template = PathTemplate::parse("/{id}");
        let args = extract(&template, &["007"]).unwrap();
        assert_eq!(args.get("id"), Some("007"));
    }

    #[test]
    fn test_extract_root() {
        let template = PathTemplate::parse("/");
        let args = extract(&template, &[]).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_extract_count_mismatch() {
        let template = PathTemplate::parse("/{id}");
        assert!(extract(&template, &[]).is_none());
        assert!(extract(&template, &["1", "2"]).is_none());
    }

    #[test]
    fn test_extract_rejects_any_literal() {
        let mixed = PathTemplate::parse("/users/{id}");
        assert!(extract(&mixed, &["users", "1"]).is_none());
        assert!(extract(&mixed, &["other", "1"]).is_none());

        let literal_only = PathTemplate::parse("/health");
        assert!(extract(&literal_only, &["health"]).is_none());
    }
}
