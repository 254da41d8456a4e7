//! File size resolution with a per-path cache
//!
//! Sizes are cached on the first successful stat and never refreshed on
//! their own: a file that changes on disk keeps reporting its cached size
//! until the cache is cleared or disabled.

use crate::logger;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Resolves file sizes, consulting the size cache unless disabled
#[derive(Debug, Default)]
pub struct MetadataResolver {
    sizes: RwLock<HashMap<PathBuf, u64>>,
    no_cache: AtomicBool,
}

impl MetadataResolver {
    pub fn new(no_cache: bool) -> Self {
        Self {
            sizes: RwLock::new(HashMap::new()),
            no_cache: AtomicBool::new(no_cache),
        }
    }

    /// Disable or re-enable the cache for all subsequent lookups
    pub fn set_no_cache(&self, no_cache: bool) {
        self.no_cache.store(no_cache, Ordering::Relaxed);
    }

    pub fn no_cache(&self) -> bool {
        self.no_cache.load(Ordering::Relaxed)
    }

    /// Size of the file at `path`, or `None` if there is no such file
    pub fn resolve(&self, path: &Path) -> Option<u64> {
        let use_cache = !self.no_cache();

        if use_cache {
            if let Some(size) = self.cached(path) {
                return Some(size);
            }
        }

        // Missing files are the common 404 case, not worth a warning
        if !path.exists() {
            return None;
        }

        let size = match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => return None,
            Err(e) => {
                logger::log_warning(&format!("Failed to stat '{}': {e}", path.display()));
                return None;
            }
        };

        if use_cache {
            if let Ok(mut sizes) = self.sizes.write() {
                sizes.insert(path.to_path_buf(), size);
            }
        }

        Some(size)
    }

    fn cached(&self, path: &Path) -> Option<u64> {
        self.sizes.read().ok()?.get(path).copied()
    }

    /// Drop every cached size
    pub fn clear(&self) {
        if let Ok(mut sizes) = self.sizes.write() {
            sizes.clear();
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.sizes.read().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = MetadataResolver::new(false);
        assert_eq!(resolver.resolve(&dir.path().join("missing.mp4")), None);
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = MetadataResolver::new(false);
        assert_eq!(resolver.resolve(dir.path()), None);
    }

    #[test]
    fn test_cached_size_survives_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, vec![0u8; 1000]).unwrap();

        let resolver = MetadataResolver::new(false);
        assert_eq!(resolver.resolve(&path), Some(1000));

        fs::write(&path, vec![0u8; 10]).unwrap();
        assert_eq!(resolver.resolve(&path), Some(1000));
        assert_eq!(resolver.len(), 1);

        resolver.clear();
        assert_eq!(resolver.resolve(&path), Some(10));
    }

    #[test]
    fn test_no_cache_sees_truncation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, vec![0u8; 1000]).unwrap();

        let resolver = MetadataResolver::new(true);
        assert_eq!(resolver.resolve(&path), Some(1000));

        fs::write(&path, vec![0u8; 10]).unwrap();
        assert_eq!(resolver.resolve(&path), Some(10));
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_toggle_no_cache_bypasses_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, vec![0u8; 1000]).unwrap();

        let resolver = MetadataResolver::new(false);
        assert_eq!(resolver.resolve(&path), Some(1000));
        fs::write(&path, vec![0u8; 20]).unwrap();

        resolver.set_no_cache(true);
        assert_eq!(resolver.resolve(&path), Some(20));

        resolver.set_no_cache(false);
        assert_eq!(resolver.resolve(&path), Some(1000));
    }

    #[test]
    fn test_empty_file_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mp4");
        fs::write(&path, b"").unwrap();

        let resolver = MetadataResolver::new(false);
        assert_eq!(resolver.resolve(&path), Some(0));
        assert_eq!(resolver.len(), 1);
    }
}
