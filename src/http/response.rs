//! HTTP response building module
//!
//! Header sets for media responses and builders for the fixed responses the
//! router answers without touching the filesystem.

use super::body::ResponseBody;
use super::exchange::insert_header;
use super::range::RangeWindow;
use hyper::header::{
    HeaderMap, ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ALLOW, CONTENT_LENGTH, CONTENT_RANGE,
    CONTENT_TYPE,
};
use hyper::{Response, StatusCode};

/// Methods advertised to cross-origin players
pub const CORS_METHODS: &str = "POST, GET, OPTIONS";

/// Headers shared by every streamed media response
pub fn media_headers(content_type: &str, origin: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, CONTENT_TYPE, content_type);
    insert_header(&mut headers, ACCESS_CONTROL_ALLOW_ORIGIN, origin.unwrap_or("*"));
    insert_header(&mut headers, ACCESS_CONTROL_ALLOW_METHODS, CORS_METHODS);
    insert_header(&mut headers, ACCESS_CONTROL_ALLOW_HEADERS, CORS_METHODS);
    headers
}

/// Headers and status for a passthrough response over `window`
pub fn passthrough_head(
    window: &RangeWindow,
    content_type: &str,
    origin: Option<&str>,
) -> (StatusCode, HeaderMap) {
    let mut headers = media_headers(content_type, origin);
    headers.insert(CONTENT_LENGTH, window.len().into());

    if window.is_partial() {
        insert_header(&mut headers, ACCEPT_RANGES, "bytes");
        insert_header(&mut headers, CONTENT_RANGE, &window.content_range());
        (StatusCode::PARTIAL_CONTENT, headers)
    } else {
        (StatusCode::OK, headers)
    }
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(origin: Option<&str>) -> Response<ResponseBody> {
    Response::builder()
        .status(204)
        .header(ALLOW, "GET, HEAD, OPTIONS")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, origin.unwrap_or("*"))
        .header(ACCESS_CONTROL_ALLOW_METHODS, CORS_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Range")
        .header(ACCESS_CONTROL_MAX_AGE, "86400")
        .body(ResponseBody::empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(ResponseBody::empty())
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(405)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, "GET, HEAD, OPTIONS")
        .body(ResponseBody::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(ResponseBody::full("405 Method Not Allowed"))
        })
}

/// Build 404 response for paths outside the media root
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(404)
        .header(CONTENT_TYPE, "text/plain")
        .body(ResponseBody::full("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(ResponseBody::full("404 Not Found"))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_head() {
        let (status, headers) = passthrough_head(&RangeWindow::full(1_000_000), "video/mp4", None);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_LENGTH], "1000000");
        assert_eq!(headers[CONTENT_TYPE], "video/mp4");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers.get(CONTENT_RANGE).is_none());
        assert!(headers.get(ACCEPT_RANGES).is_none());
    }

    #[test]
    fn test_partial_head() {
        let window = RangeWindow {
            start: 500_000,
            end: 631_072,
            total: 1_000_000,
        };
        let (status, headers) =
            passthrough_head(&window, "video/mp4", Some("https://player.example"));
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers[CONTENT_LENGTH], "131072");
        assert_eq!(headers[CONTENT_RANGE], "bytes 500000-631072/1000000");
        assert_eq!(headers[ACCEPT_RANGES], "bytes");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://player.example");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], CORS_METHODS);
    }

    #[test]
    fn test_fixed_responses() {
        assert_eq!(build_405_response().status(), 405);
        assert_eq!(build_404_response().status(), 404);
        let options = build_options_response(None);
        assert_eq!(options.status(), 204);
        assert_eq!(options.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
