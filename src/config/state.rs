// Application state module
// Holds configuration, the media dispatcher and cached flags for request handling

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::types::Config;
use crate::media::{MediaState, StreamDispatcher};

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: StreamDispatcher,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,

    /// Canonical media root, `None` if it does not exist yet
    media_root: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let media = Arc::new(MediaState::from_config(&config.media));
        Self::with_media(config, media)
    }

    /// Build state around an existing media core (handlers already registered)
    pub fn with_media(config: &Config, media: Arc<MediaState>) -> Self {
        let media_root = Path::new(&config.media.root).canonicalize().ok();
        Self {
            config: config.clone(),
            dispatcher: StreamDispatcher::new(media),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
            media_root,
        }
    }

    pub fn media_root(&self) -> Option<&Path> {
        self.media_root.as_deref()
    }

    pub fn access_log(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }

    pub fn set_access_log(&self, enabled: bool) {
        self.cached_access_log.store(enabled, Ordering::Relaxed);
    }
}
