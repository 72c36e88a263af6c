//! Static asset handler
//!
//! Resolves request paths against the configured asset directory and serves
//! file contents verbatim. Lookups never escape the directory: paths are
//! sanitized first, then the canonicalized result is checked for containment.

use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, range::RangeOutcome, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Result of an asset lookup
pub enum AssetOutcome {
    /// File found and read
    Found {
        content: Vec<u8>,
        content_type: &'static str,
    },
    /// No such asset (or the path tried to escape the directory)
    Missing,
    /// The file exists but could not be read
    Unreadable(std::io::Error),
}

/// Serve a static asset for the request path.
pub async fn serve_asset(ctx: &RequestContext<'_>, static_dir: &str) -> Response<Full<Bytes>> {
    match load_asset(static_dir, ctx.path).await {
        AssetOutcome::Found {
            content,
            content_type,
        } => build_asset_response(
            &content,
            content_type,
            ctx.if_none_match.as_deref(),
            ctx.is_head,
            ctx.range_header.as_deref(),
        ),
        AssetOutcome::Missing => http::build_404_response(),
        AssetOutcome::Unreadable(e) => {
            logger::log_error(&format!("Failed to read asset for '{}': {e}", ctx.path));
            http::build_500_response()
        }
    }
}

/// Strip the leading slash and reject traversal attempts.
///
/// Returns the directory-relative path, or None when the request path is
/// empty after trimming or carries a `..` component or a NUL byte.
pub fn sanitize_request_path(path: &str) -> Option<&str> {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.contains('\0') {
        return None;
    }
    if relative.split('/').any(|component| component == "..") {
        return None;
    }
    Some(relative)
}

/// Resolve and read an asset from the directory.
pub async fn load_asset(static_dir: &str, path: &str) -> AssetOutcome {
    let Some(relative) = sanitize_request_path(path) else {
        logger::log_warning(&format!("Rejected asset path: {path}"));
        return AssetOutcome::Missing;
    };

    let Some(file_path) = contain_in_dir(static_dir, relative, path) else {
        return AssetOutcome::Missing;
    };

    if file_path.is_dir() {
        return AssetOutcome::Missing;
    }

    match fs::read(&file_path).await {
        Ok(content) => {
            let content_type =
                mime::content_type_for(file_path.extension().and_then(|e| e.to_str()));
            AssetOutcome::Found {
                content,
                content_type,
            }
        }
        // Lost a race with a deletion; still just a 404
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AssetOutcome::Missing,
        Err(e) => AssetOutcome::Unreadable(e),
    }
}

/// Canonicalize the joined path and verify it stays inside the directory.
///
/// Canonicalization also resolves symlinks, so a link pointing outside the
/// directory is refused the same way a `..` path would be.
fn contain_in_dir(static_dir: &str, relative: &str, request_path: &str) -> Option<PathBuf> {
    let dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // A missing file fails to canonicalize; that is the ordinary 404 path
    let file_canonical = Path::new(static_dir).join(relative).canonicalize().ok()?;

    if !file_canonical.starts_with(&dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            file_canonical.display()
        ));
        return None;
    }

    Some(file_canonical)
}

/// Build the asset response with cache validators and Range support
fn build_asset_response(
    data: &[u8],
    content_type: &str,
    if_none_match: Option<&str>,
    is_head: bool,
    range_header: Option<&str>,
) -> Response<Full<Bytes>> {
    let etag = cache::generate_etag(data);
    let total_size = data.len();

    if cache::etag_matches(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    match http::parse_range_header(range_header, total_size) {
        RangeOutcome::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);

            let body = if is_head {
                Bytes::new()
            } else {
                Bytes::from(data[start..=end].to_vec())
            };

            return response::build_partial_response(
                body,
                content_type,
                &etag,
                start,
                end,
                total_size,
                is_head,
            );
        }
        RangeOutcome::NotSatisfiable => {
            return http::build_416_response(total_size);
        }
        RangeOutcome::None => {}
    }

    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(data.to_owned())
    };

    response::build_cached_response(body, content_type, &etag, is_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "staticd-assets-{label}-{}-{}",
            std::process::id(),
            DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn test_sanitize_accepts_normal_paths() {
        assert_eq!(sanitize_request_path("/style.css"), Some("style.css"));
        assert_eq!(sanitize_request_path("/js/app.js"), Some("js/app.js"));
        // Dot-prefixed names are not traversal
        assert_eq!(sanitize_request_path("/.well-known/x"), Some(".well-known/x"));
        assert_eq!(sanitize_request_path("/notes..txt"), Some("notes..txt"));
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize_request_path("/../../etc/passwd"), None);
        assert_eq!(sanitize_request_path("/css/../../secret"), None);
        assert_eq!(sanitize_request_path("/.."), None);
        assert_eq!(sanitize_request_path("/"), None);
        assert_eq!(sanitize_request_path("/file\0name"), None);
    }

    #[tokio::test]
    async fn test_serves_file_bytes_verbatim() {
        let dir = scratch_dir("verbatim");
        let payload = b"body { margin: 0; }\n".to_vec();
        std::fs::write(dir.join("site.css"), &payload).expect("write css");

        match load_asset(dir.to_str().expect("utf-8"), "/site.css").await {
            AssetOutcome::Found {
                content,
                content_type,
            } => {
                assert_eq!(content, payload);
                assert_eq!(content_type, "text/css");
            }
            _ => panic!("Expected Found"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_asset_is_missing() {
        let dir = scratch_dir("missing");

        assert!(matches!(
            load_asset(dir.to_str().expect("utf-8"), "/nope.css").await,
            AssetOutcome::Missing
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_traversal_never_escapes_directory() {
        let dir = scratch_dir("traverse");
        // A real file one level above the served directory
        let outside = dir.join("secret.txt");
        std::fs::write(&outside, "confidential").expect("write secret");
        let served = dir.join("public");
        std::fs::create_dir_all(&served).expect("create served dir");

        let served_str = served.to_str().expect("utf-8");
        assert!(matches!(
            load_asset(served_str, "/../secret.txt").await,
            AssetOutcome::Missing
        ));
        assert!(matches!(
            load_asset(served_str, "/../../etc/passwd").await,
            AssetOutcome::Missing
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_directories_are_not_served() {
        let dir = scratch_dir("dirs");
        std::fs::create_dir_all(dir.join("img")).expect("create subdir");

        assert!(matches!(
            load_asset(dir.to_str().expect("utf-8"), "/img").await,
            AssetOutcome::Missing
        ));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_response_carries_validators() {
        let response = build_asset_response(b"abcdefghij", "text/plain", None, false, None);
        assert_eq!(response.status(), 200);
        assert!(response.headers().get("etag").is_some());
        assert_eq!(
            response
                .headers()
                .get("accept-ranges")
                .and_then(|v| v.to_str().ok()),
            Some("bytes")
        );
    }

    #[test]
    fn test_matching_etag_yields_304() {
        let etag = cache::generate_etag(b"abcdefghij");
        let response =
            build_asset_response(b"abcdefghij", "text/plain", Some(&etag), false, None);
        assert_eq!(response.status(), 304);
    }

    #[test]
    fn test_range_request_yields_206() {
        let response =
            build_asset_response(b"abcdefghij", "text/plain", None, false, Some("bytes=2-5"));
        assert_eq!(response.status(), 206);
        assert_eq!(
            response
                .headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok()),
            Some("bytes 2-5/10")
        );
        assert_eq!(
            response
                .headers()
                .get("content-length")
                .and_then(|v| v.to_str().ok()),
            Some("4")
        );
    }

    #[test]
    fn test_unsatisfiable_range_yields_416() {
        let response =
            build_asset_response(b"abcdefghij", "text/plain", None, false, Some("bytes=50-"));
        assert_eq!(response.status(), 416);
        assert_eq!(
            response
                .headers()
                .get("content-range")
                .and_then(|v| v.to_str().ok()),
            Some("bytes */10")
        );
    }
}
