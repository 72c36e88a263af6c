//! Conditional request support
//!
//! `ETag` generation and `If-None-Match` evaluation for served assets.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Compute a quoted `ETag` from asset content.
///
/// The tag is a hash of the bytes, so it changes whenever the file on disk
/// changes and stays stable between identical reads.
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Evaluate a client's `If-None-Match` header against the computed `ETag`.
///
/// Accepts a single tag, a comma-separated list, or the `*` wildcard.
/// Returns true when the client's copy is current (respond 304).
pub fn etag_matches(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etag_is_quoted() {
        let etag = generate_etag(b"<html></html>");
        assert!(etag.starts_with('"'));
        assert!(etag.ends_with('"'));
        assert!(etag.len() > 2);
    }

    #[test]
    fn test_etag_stable_for_same_content() {
        assert_eq!(generate_etag(b"body { margin: 0 }"), generate_etag(b"body { margin: 0 }"));
    }

    #[test]
    fn test_etag_changes_with_content() {
        assert_ne!(generate_etag(b"v1"), generate_etag(b"v2"));
    }

    #[test]
    fn test_if_none_match_evaluation() {
        let etag = "\"abc123\"";
        assert!(etag_matches(Some("\"abc123\""), etag));
        assert!(etag_matches(Some("\"stale\", \"abc123\""), etag));
        assert!(etag_matches(Some("*"), etag));
        assert!(!etag_matches(Some("\"stale\""), etag));
        assert!(!etag_matches(None, etag));
    }
}
