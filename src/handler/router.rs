//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, mapping the
//! URI onto the media root, and handing the request to the stream dispatcher.

use crate::config::AppState;
use crate::http::{self, MediaRequest, MediaResponse, ResponseBody};
use crate::logger;
use crate::media::DispatchOptions;
use hyper::header::ORIGIN;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible> {
    let method = req.method().clone();

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(&req) {
        return Ok(resp);
    }

    let media_req = MediaRequest::from_http(&req);

    // 2. Map URI onto the media root
    let Some(file_path) = resolve_media_path(
        Path::new(&state.config.media.root),
        state.media_root(),
        &media_req.path,
    ) else {
        return Ok(http::build_404_response());
    };

    // 3. Stream
    let response = MediaResponse::new();
    let path = file_path.to_string_lossy();
    let served = match state
        .dispatcher
        .dispatch(&media_req, &response, &path, DispatchOptions::new())
    {
        Ok(served) => served,
        Err(e) => {
            logger::log_error(&format!("Dispatch failed for '{}': {e}", media_req.path));
            return Ok(http::build_404_response());
        }
    };

    if state.access_log() {
        let status = response.status().unwrap_or_default();
        logger::log_served(&method, &media_req.path, status, served);
    }

    Ok(response.into_http())
}

/// Answer OPTIONS and reject everything except GET/HEAD
fn check_http_method<B>(req: &Request<B>) -> Option<Response<ResponseBody>> {
    match *req.method() {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => {
            let origin = req.headers().get(ORIGIN).and_then(|v| v.to_str().ok());
            Some(http::build_options_response(origin))
        }
        ref method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// File path for a request URI under the media root
///
/// Returns `None` when the URI escapes the root. Paths that do not exist are
/// still returned so the dispatcher can answer them.
fn resolve_media_path(
    root: &Path,
    canonical_root: Option<&Path>,
    uri_path: &str,
) -> Option<PathBuf> {
    let decoded = urlencoding::decode(uri_path).ok()?;

    // Remove leading slash and prevent directory traversal
    let clean_path = decoded.replace("..", "");
    let file_path = root.join(clean_path.trim_start_matches('/'));

    // Security: an existing file must live inside the media root
    if let (Some(root_canonical), Ok(file_canonical)) = (canonical_root, file_path.canonicalize()) {
        if !file_canonical.starts_with(root_canonical) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                uri_path,
                file_canonical.display()
            ));
            return None;
        }
    }

    Some(file_path)
}
