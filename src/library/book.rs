//! Book snapshot model.
//!
//! These records mirror the snapshot written by the parsing pipeline. Unknown
//! fields are ignored so newer snapshots still load; list fields default to
//! empty when missing.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Snapshot schema version assumed when the field is missing.
pub const DEFAULT_SNAPSHOT_VERSION: &str = "3.0";

/// A fully parsed book, as stored in its snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Descriptive metadata.
    pub metadata: BookMetadata,

    /// Chapters in reading order.
    #[serde(default)]
    pub spine: Vec<ChapterContent>,

    /// Table of contents (a forest).
    #[serde(default)]
    pub toc: Vec<TocEntry>,

    /// Image filename to stored representation.
    #[serde(default)]
    pub images: BTreeMap<String, String>,

    /// Name of the file the book was parsed from.
    #[serde(default)]
    pub source_file: String,

    /// When the snapshot was produced (ISO-8601).
    #[serde(default)]
    pub processed_at: String,

    /// Snapshot schema version. Read but not acted upon.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    DEFAULT_SNAPSHOT_VERSION.to_string()
}

/// Book metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookMetadata {
    /// Book title.
    pub title: String,

    /// Language code (e.g., "en", "fr").
    #[serde(default)]
    pub language: String,

    /// Authors (may be empty).
    #[serde(default)]
    pub authors: Vec<String>,

    /// Book description or summary.
    #[serde(default)]
    pub description: Option<String>,

    /// Publisher name.
    #[serde(default)]
    pub publisher: Option<String>,

    /// Publication date.
    #[serde(default)]
    pub date: Option<String>,

    /// ISBNs, UUIDs and other identifiers.
    #[serde(default)]
    pub identifiers: Vec<String>,

    /// Subject/genre tags.
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// One chapter of the spine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContent {
    /// Manifest id, unique within the book.
    pub id: String,

    /// Source document href.
    pub href: String,

    /// Chapter title.
    #[serde(default)]
    pub title: String,

    /// Rendered markup.
    #[serde(default)]
    pub content: String,

    /// Extracted plain text.
    #[serde(default)]
    pub text: String,

    /// Position in the spine.
    pub order: u32,
}

/// Table of contents entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TocEntry {
    /// Entry label.
    pub title: String,

    /// Original href, possibly with a fragment.
    pub href: String,

    /// Href of the target document without fragment.
    pub file_href: String,

    /// Fragment within the target document.
    #[serde(default)]
    pub anchor: Option<String>,

    /// Nested entries.
    #[serde(default)]
    pub children: Vec<TocEntry>,
}

impl TocEntry {
    /// Anchor, treating an empty string as absent.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref().filter(|a| !a.is_empty())
    }
}

/// A chapter position with its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterNav {
    /// Current spine position.
    pub index: usize,
    /// Previous position, absent on the first chapter.
    pub prev: Option<usize>,
    /// Next position, absent on the last chapter.
    pub next: Option<usize>,
}

impl Book {
    /// Navigation for a requested chapter index.
    ///
    /// Returns `None` for any index outside the spine, negative included.
    /// Neighbours stop at the ends instead of wrapping.
    pub fn navigate(&self, index: i64) -> Option<ChapterNav> {
        let index = usize::try_from(index).ok()?;
        if index >= self.spine.len() {
            return None;
        }

        Some(ChapterNav {
            index,
            prev: index.checked_sub(1),
            next: Some(index + 1).filter(|&n| n < self.spine.len()),
        })
    }

    /// Get display name for authors.
    pub fn authors_display(&self) -> String {
        if self.metadata.authors.is_empty() {
            "Unknown Author".to_string()
        } else {
            self.metadata.authors.join(", ")
        }
    }

    /// Number of chapters in the spine.
    pub fn chapter_count(&self) -> usize {
        self.spine.len()
    }

    /// Chapter at a spine position.
    pub fn chapter(&self, index: usize) -> Option<&ChapterContent> {
        self.spine.get(index)
    }

    /// Spine position of the chapter stored at `file_href`.
    pub fn chapter_index_for_href(&self, file_href: &str) -> Option<usize> {
        self.spine.iter().position(|c| c.href == file_href)
    }

    /// Processing timestamp formatted for display, or the raw string.
    pub fn processed_at_display(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.processed_at) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
        // Naive timestamps carry no offset and an optional fraction
        if let Ok(dt) = NaiveDateTime::parse_from_str(&self.processed_at, "%Y-%m-%dT%H:%M:%S%.f")
        {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
        self.processed_at.clone()
    }

    /// Check spine ordering and id uniqueness.
    ///
    /// Returns a description of each violation found. Snapshots are trusted,
    /// so callers only log these.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = HashSet::with_capacity(self.spine.len());

        for (position, chapter) in self.spine.iter().enumerate() {
            if chapter.order as usize != position {
                problems.push(format!(
                    "chapter {} has order {} at position {}",
                    chapter.id, chapter.order, position
                ));
            }
            if !seen.insert(chapter.id.as_str()) {
                problems.push(format!("duplicate chapter id {}", chapter.id));
            }
        }

        problems
    }
}
