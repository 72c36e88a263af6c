//! Root document handler
//!
//! Serves `GET /` from the configured index file. The file is read from disk
//! on every request, never cached, so edits are visible on the next request
//! without a restart. Its path is configured independently of the asset
//! directory.

use crate::config::Config;
use crate::handler::router::RequestContext;
use crate::http::{self, response};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::ErrorKind;
use tokio::fs;

/// Serve the root document.
///
/// Missing file at request time is a 404; any other read failure is a 500
/// with the cause logged and kept out of the response body.
pub async fn serve_root_document(
    ctx: &RequestContext<'_>,
    config: &Config,
) -> Response<Full<Bytes>> {
    match fs::read(&config.site.index_file).await {
        Ok(content) => {
            response::build_html_response(content, &config.http.server_name, ctx.is_head)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            logger::log_warning(&format!(
                "Index file '{}' missing at request time",
                config.site.index_file
            ));
            http::build_404_response()
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read index file '{}': {e}",
                config.site.index_file
            ));
            http::build_500_response()
        }
    }
}
