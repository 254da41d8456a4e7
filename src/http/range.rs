//! HTTP Range window calculation
//!
//! Media players seek by sending open-ended `bytes=N-` requests. Every ranged
//! request is answered with a single bounded chunk starting at the requested
//! offset, which keeps per-request buffering small.

/// Maximum number of bytes served for one ranged request (128 KiB)
pub const CHUNK_SIZE: u64 = 131_072;

/// Smallest `end` offset handed out for a ranged request
pub const MIN_RANGE_END: u64 = 16;

/// Byte window served for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeWindow {
    /// First byte offset
    pub start: u64,
    /// End offset as advertised in `Content-Range`
    pub end: u64,
    /// Total file size for partial content, 0 for a full-body response
    pub total: u64,
}

impl RangeWindow {
    /// Window covering the whole file, no partial-content headers
    #[inline]
    pub const fn full(total: u64) -> Self {
        Self {
            start: 0,
            end: total,
            total: 0,
        }
    }

    /// Whether the response must carry partial-content semantics (206)
    #[inline]
    pub const fn is_partial(&self) -> bool {
        self.total != 0
    }

    /// Number of bytes sent in the body and in `Content-Length`
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Content-Range` header value
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Compute the byte window for a request
///
/// Only the start offset of a `bytes=` range is honoured; the window is one
/// chunk long or runs up to the last byte of the file. Malformed ranges and
/// offsets past the end of the file fall back to a full-body window.
///
/// # Examples
/// ```
/// use mediapipe::http::range::{compute_window, RangeWindow};
///
/// assert_eq!(compute_window(None, 1000), RangeWindow::full(1000));
///
/// let window = compute_window(Some("bytes=100-"), 1000);
/// assert_eq!((window.start, window.end, window.total), (100, 999, 1000));
/// ```
pub fn compute_window(range_header: Option<&str>, total: u64) -> RangeWindow {
    let full = RangeWindow::full(total);

    let Some(header) = range_header else {
        return full;
    };

    let Some(loc) = header.find("bytes=") else {
        return full;
    };

    let spec = &header[loc + "bytes=".len()..];
    let start_str = spec.split('-').next().unwrap_or_default().trim();

    let Ok(start) = start_str.parse::<u64>() else {
        return full; // Malformed or suffix range
    };

    if start >= total {
        return full;
    }

    let mut end = start.saturating_add(CHUNK_SIZE).min(total);
    if end == total {
        end -= 1;
    }
    let end = end.max(MIN_RANGE_END).min(total);

    RangeWindow { start, end, total }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_range() {
        let window = compute_window(None, 1_000_000);
        assert_eq!(window, RangeWindow::full(1_000_000));
        assert!(!window.is_partial());
        assert_eq!(window.len(), 1_000_000);
    }

    #[test]
    fn test_open_range_chunked() {
        let window = compute_window(Some("bytes=500000-"), 1_000_000);
        assert_eq!(window.start, 500_000);
        assert_eq!(window.end, 631_072);
        assert_eq!(window.total, 1_000_000);
        assert_eq!(window.len(), CHUNK_SIZE);
        assert_eq!(window.content_range(), "bytes 500000-631072/1000000");
    }

    #[test]
    fn test_range_near_end_of_file() {
        let window = compute_window(Some("bytes=900000-"), 1_000_000);
        assert_eq!(window.end, 999_999);
        assert_eq!(window.total, 1_000_000);
        assert_eq!(window.len(), 99_999);
    }

    #[test]
    fn test_explicit_end_is_ignored() {
        let window = compute_window(Some("bytes=0-99"), 1_000_000);
        assert_eq!((window.start, window.end), (0, CHUNK_SIZE));
    }

    #[test]
    fn test_small_file_clamp() {
        // end = total - 1 = 9, raised to 16 then capped at the file size
        let window = compute_window(Some("bytes=0-"), 10);
        assert_eq!((window.start, window.end, window.total), (0, 10, 10));

        let window = compute_window(Some("bytes=0-"), 100);
        assert_eq!(window.end, 99);
    }

    #[test]
    fn test_token_inside_header() {
        let window = compute_window(Some("  bytes=42-"), 1000);
        assert_eq!((window.start, window.end, window.total), (42, 999, 1000));
    }

    #[test]
    fn test_malformed_falls_back_to_full() {
        assert_eq!(compute_window(Some("bytes=a-b"), 100), RangeWindow::full(100));
        assert_eq!(compute_window(Some("bytes=-20"), 100), RangeWindow::full(100));
        assert_eq!(compute_window(Some("items=0-9"), 100), RangeWindow::full(100));
        assert_eq!(compute_window(Some("bytes="), 100), RangeWindow::full(100));
    }

    #[test]
    fn test_start_beyond_file() {
        assert_eq!(compute_window(Some("bytes=200-"), 100), RangeWindow::full(100));
        assert_eq!(compute_window(Some("bytes=0-"), 0), RangeWindow::full(0));
    }

    #[test]
    fn test_window_invariant_holds() {
        for total in [1u64, 15, 16, 17, 1000, CHUNK_SIZE, CHUNK_SIZE + 1, 5 * CHUNK_SIZE] {
            for start in [0, total / 2, total.saturating_sub(1)] {
                let header = format!("bytes={start}-");
                let w = compute_window(Some(&header), total);
                assert!(w.start <= w.end, "{w:?}");
                assert!(w.end <= w.total, "{w:?}");
                assert!(w.len() <= CHUNK_SIZE, "{w:?}");
            }
        }
    }
}
