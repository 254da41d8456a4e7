//! Request/response pair handed to the media dispatcher
//!
//! `MediaResponse` mirrors a streaming response writer: the head is written
//! once, body chunks are pushed as they become available, and `end` closes
//! the body. Clones share the same underlying response.

use super::body::{Lifecycle, LifecycleEvent, ResponseBody};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, ORIGIN, RANGE};
use hyper::{Request, Response, StatusCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Body chunks buffered between a writer and the transport
const BODY_CHANNEL_CAPACITY: usize = 16;

/// Request data the dispatcher relies on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRequest {
    /// Request URI path
    pub path: String,
    /// Raw `Range` header
    pub range: Option<String>,
    /// Raw `Origin` header
    pub origin: Option<String>,
}

impl MediaRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Extract the relevant parts of a hyper request
    pub fn from_http<B>(req: &Request<B>) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            path: req.uri().path().to_string(),
            range: header(RANGE),
            origin: header(ORIGIN),
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Status line and headers of a response
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

#[derive(Debug)]
struct Shared {
    head: Mutex<Option<ResponseHead>>,
    tx: Mutex<Option<mpsc::Sender<Bytes>>>,
    rx: Mutex<Option<mpsc::Receiver<Bytes>>>,
    ended: AtomicBool,
    lifecycle: Arc<Lifecycle>,
}

/// Streaming response writer
#[derive(Debug, Clone)]
pub struct MediaResponse {
    shared: Arc<Shared>,
}

impl Default for MediaResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaResponse {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                head: Mutex::new(None),
                tx: Mutex::new(Some(tx)),
                rx: Mutex::new(Some(rx)),
                ended: AtomicBool::new(false),
                lifecycle: Arc::new(Lifecycle::default()),
            }),
        }
    }

    /// Commit status and headers; only the first call takes effect
    pub fn write_head(&self, status: StatusCode, headers: HeaderMap) -> bool {
        let Ok(mut head) = self.shared.head.lock() else {
            return false;
        };
        if head.is_some() {
            return false;
        }
        *head = Some(ResponseHead { status, headers });
        true
    }

    /// Status of the committed head
    pub fn status(&self) -> Option<StatusCode> {
        self.shared
            .head
            .lock()
            .ok()
            .and_then(|h| h.as_ref().map(|h| h.status))
    }

    /// Value of a committed header
    pub fn header(&self, name: &str) -> Option<String> {
        let head = self.shared.head.lock().ok()?;
        head.as_ref()?
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    }

    fn sender(&self) -> Option<mpsc::Sender<Bytes>> {
        if self.is_ended() {
            return None;
        }
        self.shared.tx.lock().ok()?.clone()
    }

    /// Queue a chunk without waiting; fails when the buffer is full,
    /// the response has ended or the client is gone
    pub fn try_write(&self, chunk: impl Into<Bytes>) -> bool {
        self.sender()
            .is_some_and(|tx| tx.try_send(chunk.into()).is_ok())
    }

    /// Queue a chunk, waiting for buffer space
    pub async fn write(&self, chunk: impl Into<Bytes>) -> bool {
        match self.sender() {
            Some(tx) => tx.send(chunk.into()).await.is_ok(),
            None => false,
        }
    }

    /// End the response; only the first call takes effect
    pub fn end(&self) -> bool {
        if self.shared.ended.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Ok(mut tx) = self.shared.tx.lock() {
            tx.take();
        }
        self.shared.lifecycle.emit(LifecycleEvent::End);
        true
    }

    pub fn is_ended(&self) -> bool {
        self.shared.ended.load(Ordering::SeqCst)
    }

    /// Subscribe to a lifecycle event
    pub fn on<F>(&self, event: LifecycleEvent, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.shared.lifecycle.on(event, Arc::new(listener));
    }

    /// Take the body half; `None` once taken
    pub fn take_body(&self) -> Option<ResponseBody> {
        let rx = self.shared.rx.lock().ok()?.take()?;
        Some(ResponseBody::new(rx, Arc::clone(&self.shared.lifecycle)))
    }

    /// Convert into a hyper response; an unwritten head becomes `200 OK`
    pub fn into_http(self) -> Response<ResponseBody> {
        let head = self
            .shared
            .head
            .lock()
            .ok()
            .and_then(|mut h| h.take())
            .unwrap_or_else(|| ResponseHead {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
            });
        let body = self.take_body().unwrap_or_else(ResponseBody::empty);

        let mut response = Response::new(body);
        *response.status_mut() = head.status;
        *response.headers_mut() = head.headers;
        response
    }
}

/// Insert a header, skipping values that are not valid header text
pub fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if let Ok(v) = HeaderValue::from_str(value) {
        headers.insert(name, v);
    }
}
