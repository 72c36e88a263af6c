//! Request routing dispatch
//!
//! Entry point for HTTP request processing: method validation, route table
//! lookup, dispatch to the matching handler, and access logging.

use crate::config::AppState;
use crate::handler::{root, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Route pattern, checked against the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(&'static str),
    Prefix(&'static str),
}

impl RoutePattern {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == *p,
            Self::Prefix(p) => path.starts_with(p),
        }
    }
}

/// What a matched route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Serve the configured index file, re-read on every request
    RootDocument,
    /// Resolve the path against the static asset directory
    AssetDir,
}

/// One routing table entry
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    pub action: RouteAction,
}

/// Ordered routing table: entries are checked in order, first match wins.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build the static site routing table.
    ///
    /// The exact `/` entry must precede the catch-all prefix: the root
    /// document is served from its own configured path, not from the asset
    /// directory lookup.
    pub fn build() -> Self {
        Self {
            routes: vec![
                Route {
                    pattern: RoutePattern::Exact("/"),
                    action: RouteAction::RootDocument,
                },
                Route {
                    pattern: RoutePattern::Prefix("/"),
                    action: RouteAction::AssetDir,
                },
            ],
        }
    }

    /// Find the action for a path, first match wins.
    pub fn resolve(&self, path: &str) -> Option<RouteAction> {
        self.routes
            .iter()
            .find(|route| route.pattern.matches(path))
            .map(|route| route.action)
    }
}

/// Request context handed to the individual handlers
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let method = req.method();
    let uri = req.uri();
    let path = uri.path();
    let is_head = *method == Method::HEAD;

    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        method.to_string(),
        path.to_string(),
    );
    entry.query = uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header_value(&req, "referer");
    entry.user_agent = header_value(&req, "user-agent");

    let response = dispatch(&req, &state, path, is_head).await;

    entry.status = response.status().as_u16();
    entry.body_bytes = content_length_of(&response);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    if state.config.logging.access_log {
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Validate the request and dispatch it through the routing table
async fn dispatch(
    req: &Request<hyper::body::Incoming>,
    state: &Arc<AppState>,
    path: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    // 1. Method gate
    if let Some(resp) = check_http_method(req.method(), state.config.http.enable_cors) {
        return resp;
    }

    // 2. Body size check
    if let Some(resp) = check_body_size(req, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Extract conditional/range headers
    let ctx = RequestContext {
        path,
        is_head,
        if_none_match: header_value(req, "if-none-match"),
        range_header: header_value(req, "range"),
    };

    // 4. Route table lookup, first match wins
    match state.routes.resolve(ctx.path) {
        Some(RouteAction::RootDocument) => root::serve_root_document(&ctx, &state.config).await,
        Some(RouteAction::AssetDir) => {
            static_files::serve_asset(&ctx, &state.config.site.static_dir).await
        }
        None => http::build_404_response(),
    }
}

/// Check HTTP method and return an early response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match method {
        &Method::GET | &Method::HEAD => None,
        &Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    req: &Request<hyper::body::Incoming>,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_value(req: &Request<hyper::body::Incoming>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
}

fn content_length_of(response: &Response<Full<Bytes>>) -> usize {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_route_wins_over_catch_all() {
        let table = RouteTable::build();
        assert_eq!(table.resolve("/"), Some(RouteAction::RootDocument));
    }

    #[test]
    fn test_other_paths_hit_asset_dir() {
        let table = RouteTable::build();
        assert_eq!(table.resolve("/style.css"), Some(RouteAction::AssetDir));
        assert_eq!(table.resolve("/js/app.js"), Some(RouteAction::AssetDir));
        assert_eq!(table.resolve("/index.html"), Some(RouteAction::AssetDir));
    }

    #[test]
    fn test_pattern_matching() {
        assert!(RoutePattern::Exact("/").matches("/"));
        assert!(!RoutePattern::Exact("/").matches("/about"));
        assert!(RoutePattern::Prefix("/").matches("/anything/at/all"));
    }

    #[test]
    fn test_method_gate() {
        assert!(check_http_method(&Method::GET, false).is_none());
        assert!(check_http_method(&Method::HEAD, false).is_none());

        let options = check_http_method(&Method::OPTIONS, false).expect("response");
        assert_eq!(options.status(), 204);

        let post = check_http_method(&Method::POST, false).expect("response");
        assert_eq!(post.status(), 405);
        assert_eq!(
            post.headers().get("allow").and_then(|v| v.to_str().ok()),
            Some("GET, HEAD, OPTIONS")
        );
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
