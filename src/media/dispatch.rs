//! Stream dispatcher
//!
//! Entry point of the media core. For one request it:
//! 1. Resolves the file size (missing files get a plain-text answer)
//! 2. Computes the byte window from the `Range` header
//! 3. Resolves the Content-Type from the extension or an override
//! 4. Opens a bounded read source and ties its release to the response
//!    lifecycle
//! 5. Either pipes the bytes straight to the client or hands the source to
//!    the transform handlers registered for the extension

use super::guard::OnceAction;
use super::registry::{Finish, TransformContext, TransformHandler};
use super::source::RangeSource;
use super::MediaState;
use crate::error::DispatchError;
use crate::http::exchange::{MediaRequest, MediaResponse};
use crate::http::mime::{extension_of, normalize_extension};
use crate::http::range::{compute_window, RangeWindow};
use crate::http::response::{media_headers, passthrough_head};
use crate::http::LifecycleEvent;
use crate::logger;
use hyper::StatusCode;
use std::path::Path;
use std::sync::Arc;

/// Called with the served path once a passthrough stream stops
pub type CompletionCallback = Box<dyn FnOnce(&str) + Send + 'static>;

/// Per-call dispatch settings
#[derive(Default)]
pub struct DispatchOptions {
    /// Explicit Content-Type, bypassing the MIME table
    pub content_type: Option<String>,
    /// Extension key used for MIME lookup and handler selection instead of
    /// the path's own extension
    pub extension: Option<String>,
    pub on_complete: Option<CompletionCallback>,
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    #[must_use]
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&str) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("content_type", &self.content_type)
            .field("extension", &self.extension)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Serves media files into [`MediaResponse`]s
#[derive(Debug, Clone)]
pub struct StreamDispatcher {
    state: Arc<MediaState>,
}

impl StreamDispatcher {
    pub const fn new(state: Arc<MediaState>) -> Self {
        Self { state }
    }

    pub const fn state(&self) -> &Arc<MediaState> {
        &self.state
    }

    /// Serve `path` into `response`
    ///
    /// Returns `Ok(true)` once the response is committed to streaming and
    /// `Ok(false)` when a plain-text "not found" answer was written instead.
    /// Streaming continues on spawned tasks, so this must run inside a tokio
    /// runtime.
    pub fn dispatch(
        &self,
        request: &MediaRequest,
        response: &MediaResponse,
        path: &str,
        options: DispatchOptions,
    ) -> Result<bool, DispatchError> {
        if path.is_empty() {
            return Err(DispatchError::InvalidPath);
        }
        let file_path = Path::new(path);

        let Some(total) = self.state.metadata.resolve(file_path) else {
            return Ok(answer(response, &format!("{path} not found")));
        };

        let window = compute_window(request.range.as_deref(), total);

        let extension = options
            .extension
            .as_deref()
            .map_or_else(|| extension_of(path), normalize_extension);

        let content_type = options
            .content_type
            .filter(|t| !t.is_empty())
            .or_else(|| self.state.content_type(&extension));

        let Some(content_type) = content_type else {
            let name = file_path
                .file_name()
                .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned());
            return Ok(answer(response, &format!("Media format not found for {name}")));
        };

        let source = match RangeSource::open(file_path, window.start, window.len()) {
            Ok(source) => source,
            Err(e) => {
                logger::log_warning(&format!("Failed to open '{path}': {e}"));
                return Ok(answer(response, &format!("{path} not found")));
            }
        };

        release_on_lifecycle(response, &source);

        let handlers = self.state.registry.handlers_for(&extension);
        if handlers.is_empty() {
            passthrough(request, response, path, &window, &content_type, source, options.on_complete);
        } else {
            transform(request, response, &content_type, &source, handlers);
        }

        Ok(true)
    }
}

/// Write a plain-text body and end the response
fn answer(response: &MediaResponse, message: &str) -> bool {
    response.try_write(message.to_string());
    response.end();
    false
}

/// Close the source on whichever of close/end/finish fires first
fn release_on_lifecycle(response: &MediaResponse, source: &RangeSource) {
    let release = {
        let source = source.clone();
        Arc::new(OnceAction::new(move || {
            source.release();
        }))
    };

    for event in [LifecycleEvent::Close, LifecycleEvent::End, LifecycleEvent::Finish] {
        let release = Arc::clone(&release);
        response.on(event, move || {
            release.run();
        });
    }
}

fn passthrough(
    request: &MediaRequest,
    response: &MediaResponse,
    path: &str,
    window: &RangeWindow,
    content_type: &str,
    source: RangeSource,
    on_complete: Option<CompletionCallback>,
) {
    let (status, headers) = passthrough_head(window, content_type, request.origin.as_deref());
    response.write_head(status, headers);

    let response = response.clone();
    let path = path.to_string();
    tokio::spawn(async move {
        pipe(&source, &response).await;
        response.end();
        if let Some(callback) = on_complete {
            callback(&path);
        }
    });
}

/// Copy chunks until the source is exhausted, released, or the client leaves
async fn pipe(source: &RangeSource, response: &MediaResponse) {
    loop {
        match source.next_chunk().await {
            Ok(Some(chunk)) => {
                if !response.write(chunk).await {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                logger::log_error(&format!(
                    "Read error on '{}': {e}",
                    source.path().display()
                ));
                break;
            }
        }
    }
}

fn transform(
    request: &MediaRequest,
    response: &MediaResponse,
    content_type: &str,
    source: &RangeSource,
    handlers: Vec<Arc<dyn TransformHandler>>,
) {
    response.write_head(
        StatusCode::OK,
        media_headers(content_type, request.origin.as_deref()),
    );

    let request = Arc::new(request.clone());
    let finish = Finish::new(response.clone());
    for handler in handlers {
        handler.invoke(TransformContext {
            source: source.clone(),
            request: Arc::clone(&request),
            response: response.clone(),
            finish: finish.clone(),
        });
    }
}
