//! MIME type lookup module
//!
//! Maps a lower-cased file extension (with its leading dot) to a Content-Type.
//! Unknown extensions resolve to nothing; callers decide how to answer.

use std::collections::HashMap;
use std::path::Path;

/// Built-in Content-Type for an extension such as `.mp4`
///
/// # Examples
/// ```
/// use mediapipe::http::mime::builtin_content_type;
/// assert_eq!(builtin_content_type(".mp4"), Some("video/mp4"));
/// assert_eq!(builtin_content_type(".xyz"), None);
/// ```
pub fn builtin_content_type(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Video
        ".mp4" | ".m4v" => "video/mp4",
        ".webm" => "video/webm",
        ".ogv" => "video/ogg",
        ".mov" => "video/quicktime",
        ".avi" => "video/x-msvideo",
        ".mkv" => "video/x-matroska",
        ".flv" => "video/x-flv",
        ".wmv" => "video/x-ms-wmv",
        ".3gp" => "video/3gpp",
        ".mpeg" | ".mpg" => "video/mpeg",
        ".ts" => "video/mp2t",
        ".m3u8" => "application/vnd.apple.mpegurl",
        ".mpd" => "application/dash+xml",

        // Audio
        ".mp3" => "audio/mpeg",
        ".m4a" => "audio/mp4",
        ".aac" => "audio/aac",
        ".wav" => "audio/wav",
        ".flac" => "audio/flac",
        ".ogg" | ".oga" => "audio/ogg",
        ".opus" => "audio/opus",
        ".weba" => "audio/webm",
        ".mid" | ".midi" => "audio/midi",

        // Images
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".svg" => "image/svg+xml",
        ".ico" => "image/x-icon",
        ".webp" => "image/webp",
        ".bmp" => "image/bmp",

        // Text and subtitles
        ".html" | ".htm" => "text/html; charset=utf-8",
        ".css" => "text/css",
        ".txt" => "text/plain; charset=utf-8",
        ".vtt" => "text/vtt",
        ".srt" => "application/x-subrip",
        ".json" => "application/json",
        ".js" => "application/javascript",
        ".xml" => "application/xml",

        // Documents
        ".pdf" => "application/pdf",
        ".zip" => "application/zip",

        _ => return None,
    };
    Some(content_type)
}

/// Lower-cased extension of `path` with its leading dot, or an empty string
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Normalize a user-supplied extension key: lower-case with a leading dot
pub fn normalize_extension(extension: &str) -> String {
    let ext = extension.trim().to_lowercase();
    if ext.is_empty() || ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Extension to Content-Type table with configurable overrides
#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    overrides: HashMap<String, String>,
}

impl MimeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configured `extension -> type` pairs
    pub fn with_overrides<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut table = Self::new();
        for (ext, content_type) in pairs {
            table.insert(ext, content_type);
        }
        table
    }

    /// Add or replace the type for an extension
    pub fn insert(&mut self, extension: &str, content_type: &str) {
        self.overrides
            .insert(normalize_extension(extension), content_type.to_string());
    }

    /// Resolve the Content-Type of a normalized extension
    pub fn lookup(&self, extension: &str) -> Option<&str> {
        if extension.is_empty() {
            return None;
        }
        self.overrides
            .get(extension)
            .map(String::as_str)
            .or_else(|| builtin_content_type(extension))
    }
}
