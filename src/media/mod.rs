//! Media core
//!
//! Size resolution, transform handler registry and the stream dispatcher,
//! sharing one injectable [`MediaState`].

pub mod dispatch;
pub mod guard;
pub mod metadata;
pub mod registry;
pub mod source;

pub use dispatch::{DispatchOptions, StreamDispatcher};
pub use metadata::MetadataResolver;
pub use registry::{ExtensionRegistry, Finish, HandlerId, TransformContext, TransformHandler};
pub use source::RangeSource;

use crate::config::MediaConfig;
use crate::http::mime::MimeTable;
use std::sync::RwLock;

/// State shared by every request: size cache, handlers and MIME table
#[derive(Debug, Default)]
pub struct MediaState {
    pub metadata: MetadataResolver,
    pub registry: ExtensionRegistry,
    mime: RwLock<MimeTable>,
}

impl MediaState {
    pub fn new(no_cache: bool, mime: MimeTable) -> Self {
        Self {
            metadata: MetadataResolver::new(no_cache),
            registry: ExtensionRegistry::new(),
            mime: RwLock::new(mime),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.no_cache, MimeTable::with_overrides(&config.types))
    }

    /// Content-Type for a normalized extension
    pub fn content_type(&self, extension: &str) -> Option<String> {
        self.mime
            .read()
            .ok()?
            .lookup(extension)
            .map(ToString::to_string)
    }

    /// Add or replace a MIME table entry at runtime
    pub fn set_content_type(&self, extension: &str, content_type: &str) {
        if let Ok(mut mime) = self.mime.write() {
            mime.insert(extension, content_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_config() {
        let config = MediaConfig {
            root: "media".to_string(),
            no_cache: true,
            types: HashMap::from([("mkv".to_string(), "video/webm".to_string())]),
        };
        let state = MediaState::from_config(&config);
        assert!(state.metadata.no_cache());
        assert_eq!(state.content_type(".mkv").as_deref(), Some("video/webm"));
        assert_eq!(state.content_type(".mp4").as_deref(), Some("video/mp4"));
    }

    #[test]
    fn test_set_content_type() {
        let state = MediaState::default();
        assert_eq!(state.content_type(".custom"), None);
        state.set_content_type(".custom", "application/x-custom");
        assert_eq!(
            state.content_type(".custom").as_deref(),
            Some("application/x-custom")
        );
    }
}
