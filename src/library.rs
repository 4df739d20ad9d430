//! Book model, identifier resolution and the book cache.

pub mod book;
pub mod cache;
pub mod lru;
pub mod resolver;

pub use book::{Book, BookMetadata, ChapterContent, ChapterNav, TocEntry};
pub use cache::{BookCache, CacheStatsSnapshot, LoadOutcome};
pub use resolver::{BookId, ResolvedBook};

use std::path::Path;

/// Keep only the final file name of a requested image.
///
/// Directory components are dropped, so `../../etc/passwd` becomes `passwd`.
/// Returns `None` when nothing usable is left (`..`, empty, trailing `/`).
pub fn sanitize_image_name(name: &str) -> Option<&str> {
    if name.ends_with('/') {
        return None;
    }
    Path::new(name).file_name().and_then(|s| s.to_str())
}

/// MIME type for an image file, from its extension.
pub fn image_mime_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}
