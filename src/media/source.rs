//! Bounded byte-range read source over a media file

use hyper::body::Bytes;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, Take};
use tokio::sync::Mutex;

/// Bytes read per chunk
const READ_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    start: u64,
    len: u64,
    file: Mutex<Option<Take<tokio::fs::File>>>,
    released: AtomicBool,
}

/// Reads `len` bytes of a file starting at `start`
///
/// Clones share the cursor and the open handle, so every clone observes the
/// same stream of chunks. The handle is closed by [`RangeSource::release`].
#[derive(Debug, Clone)]
pub struct RangeSource {
    inner: Arc<Inner>,
}

impl RangeSource {
    /// Open `path` and position it at `start`
    pub fn open(path: &Path, start: u64, len: u64) -> io::Result<Self> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(start))?;
        let file = tokio::fs::File::from_std(file).take(len);

        Ok(Self {
            inner: Arc::new(Inner {
                path: path.to_path_buf(),
                start,
                len,
                file: Mutex::new(Some(file)),
                released: AtomicBool::new(false),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// `(start, len)` of the window this source reads
    pub fn window(&self) -> (u64, u64) {
        (self.inner.start, self.inner.len)
    }

    /// Next chunk of the window; `None` at its end or once released
    pub async fn next_chunk(&self) -> io::Result<Option<Bytes>> {
        let mut file = self.inner.file.lock().await;
        if self.is_released() {
            file.take();
            return Ok(None);
        }
        let Some(reader) = file.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok(Some(Bytes::from(buf)))
    }

    /// Read the remaining window into memory
    pub async fn read_to_end(&self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    /// Close the file handle; returns `true` only for the call that closed it
    pub fn release(&self) -> bool {
        if self.inner.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        // A reader holding the lock drops the handle on its next call
        if let Ok(mut file) = self.inner.file.try_lock() {
            file.take();
        }
        true
    }

    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::SeqCst)
    }
}
