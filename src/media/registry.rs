//! Per-extension transform handler registry
//!
//! Handlers registered for an extension receive the raw byte-range source
//! instead of the default passthrough, and own the whole response body.
//! Handlers for one extension run in registration order.

use super::source::RangeSource;
use crate::http::exchange::{MediaRequest, MediaResponse};
use crate::http::mime::normalize_extension;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Ends the shared response; only the first call across all handlers counts
#[derive(Debug, Clone)]
pub struct Finish {
    response: MediaResponse,
}

impl Finish {
    pub const fn new(response: MediaResponse) -> Self {
        Self { response }
    }

    /// Returns `true` for the call that ended the response
    pub fn call(&self) -> bool {
        self.response.end()
    }
}

/// Everything a transform handler gets for one request
#[derive(Debug, Clone)]
pub struct TransformContext {
    /// Raw byte-range source of the requested file
    pub source: RangeSource,
    pub request: Arc<MediaRequest>,
    /// Response with status and headers already committed
    pub response: MediaResponse,
    pub finish: Finish,
}

/// Transform hook for one extension
///
/// Handlers are invoked synchronously from the dispatcher and should spawn
/// their own tasks for I/O. They must check `response.is_ended()` before
/// writing, since another handler may have finished the response.
pub trait TransformHandler: Send + Sync {
    fn invoke(&self, ctx: TransformContext);
}

impl<F> TransformHandler for F
where
    F: Fn(TransformContext) + Send + Sync,
{
    fn invoke(&self, ctx: TransformContext) {
        self(ctx);
    }
}

/// Registration token, used to remove a handler again
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId {
    seq: u64,
    extension: String,
}

impl HandlerId {
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

struct Entry {
    seq: u64,
    handler: Arc<dyn TransformHandler>,
}

/// Extension → ordered handler list
#[derive(Default)]
pub struct ExtensionRegistry {
    next_seq: AtomicU64,
    table: RwLock<HashMap<String, Vec<Entry>>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `extension` (`mp4`, `.MP4` and `.mp4` are the same key)
    pub fn register<H>(&self, extension: &str, handler: H) -> HandlerId
    where
        H: TransformHandler + 'static,
    {
        self.register_shared(extension, Arc::new(handler))
    }

    /// Append an already shared handler; registering it twice invokes it twice
    pub fn register_shared(&self, extension: &str, handler: Arc<dyn TransformHandler>) -> HandlerId {
        let extension = normalize_extension(extension);
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);

        if let Ok(mut table) = self.table.write() {
            table
                .entry(extension.clone())
                .or_default()
                .push(Entry { seq, handler });
        }

        HandlerId { seq, extension }
    }

    /// Remove a registration; unknown ids are ignored
    pub fn unregister(&self, id: &HandlerId) -> bool {
        let Ok(mut table) = self.table.write() else {
            return false;
        };
        let Some(entries) = table.get_mut(&id.extension) else {
            return false;
        };
        let Some(pos) = entries.iter().position(|e| e.seq == id.seq) else {
            return false;
        };

        entries.remove(pos);
        if entries.is_empty() {
            table.remove(&id.extension);
        }
        true
    }

    /// Handlers for a normalized extension, in invocation order
    pub fn handlers_for(&self, extension: &str) -> Vec<Arc<dyn TransformHandler>> {
        self.table.read().map_or_else(
            |_| Vec::new(),
            |table| {
                table
                    .get(extension)
                    .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
                    .unwrap_or_default()
            },
        )
    }

    pub fn has_handlers(&self, extension: &str) -> bool {
        self.table
            .read()
            .is_ok_and(|table| table.contains_key(extension))
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.table
            .read()
            .map_or(0, |table| table.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let extensions: Vec<String> = self
            .table
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &extensions)
            .field("handlers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Handler that records its tag when invoked
    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> impl TransformHandler {
        let log = Arc::clone(log);
        move |_ctx: TransformContext| log.lock().unwrap().push(tag)
    }

    fn invoke_all(registry: &ExtensionRegistry, extension: &str) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = RangeSource::open(file.path(), 0, 0).unwrap();
        let response = MediaResponse::new();
        for handler in registry.handlers_for(extension) {
            handler.invoke(TransformContext {
                source: source.clone(),
                request: Arc::new(MediaRequest::new("/x")),
                response: response.clone(),
                finish: Finish::new(response.clone()),
            });
        }
    }

    #[tokio::test]
    async fn test_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtensionRegistry::new();
        registry.register(".custom", recorder(&log, "a"));
        registry.register(".custom", recorder(&log, "b"));
        registry.register(".custom", recorder(&log, "c"));

        invoke_all(&registry, ".custom");
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_unregister_keeps_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtensionRegistry::new();
        registry.register(".custom", recorder(&log, "a"));
        let b = registry.register(".custom", recorder(&log, "b"));
        registry.register(".custom", recorder(&log, "c"));

        assert!(registry.unregister(&b));
        assert!(!registry.unregister(&b));
        assert_eq!(registry.len(), 2);

        invoke_all(&registry, ".custom");
        assert_eq!(*log.lock().unwrap(), vec!["a", "c"]);
    }

    #[test]
    fn test_first_registration_can_be_removed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtensionRegistry::new();
        let a = registry.register(".custom", recorder(&log, "a"));
        assert_eq!(a.seq(), 0);

        assert!(registry.unregister(&a));
        assert!(!registry.has_handlers(".custom"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_extension_normalized() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtensionRegistry::new();
        let id = registry.register("MP4", recorder(&log, "a"));
        assert_eq!(id.extension(), ".mp4");
        assert!(registry.has_handlers(".mp4"));
        assert!(!registry.has_handlers(".MP4"));
        assert!(!registry.has_handlers(".webm"));
    }

    #[tokio::test]
    async fn test_duplicate_shared_handler_runs_twice() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtensionRegistry::new();
        let handler: Arc<dyn TransformHandler> = Arc::new(recorder(&log, "dup"));
        let first = registry.register_shared(".custom", Arc::clone(&handler));
        let second = registry.register_shared(".custom", handler);
        assert_ne!(first, second);

        invoke_all(&registry, ".custom");
        assert_eq!(*log.lock().unwrap(), vec!["dup", "dup"]);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtensionRegistry::new();
        registry.register(".custom", recorder(&log, "a"));

        let other = ExtensionRegistry::new();
        let foreign = other.register(".other", recorder(&log, "x"));
        assert!(!registry.unregister(&foreign));
        assert_eq!(registry.len(), 1);
    }
}
