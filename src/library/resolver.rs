//! Book identifier parsing and path resolution.

use crate::config::RootDirs;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the serialized book inside a book data folder.
pub const SNAPSHOT_FILE: &str = "book-snapshot";

/// Suffix marking a directory as a book data folder.
pub const BOOK_DIR_SUFFIX: &str = "_data";

/// A book identifier as it arrives in a URL.
///
/// `"<index>:<folder>"` addresses a folder under a specific root. Anything
/// else, including a colon form whose prefix is not a number, is looked up
/// by name across all roots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BookId {
    raw: String,
    scope: Option<(usize, String)>,
}

impl BookId {
    /// Parse an identifier. Never fails.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let scope = raw.split_once(':').and_then(|(index, folder)| {
            let index = parse_root_index(index)?;
            Some((index, folder.to_string()))
        });
        Self { raw, scope }
    }

    /// Scoped identifier for a folder under root `index`.
    pub fn scoped(index: usize, folder: &str) -> Self {
        Self::parse(format!("{}:{}", index, folder))
    }

    /// The identifier exactly as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Root index and folder, when the prefix is numeric.
    ///
    /// The index is not checked against any root list here.
    pub fn scope(&self) -> Option<(usize, &str)> {
        self.scope.as_ref().map(|(i, f)| (*i, f.as_str()))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Signed decimal prefix, surrounding whitespace allowed. `-0` is root 0;
/// negative values are not a scope.
fn parse_root_index(prefix: &str) -> Option<usize> {
    let index = prefix.trim().parse::<i64>().ok()?;
    usize::try_from(index).ok()
}

/// Location of a book on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBook {
    /// Path of the snapshot file.
    pub snapshot: PathBuf,
    /// Book data folder containing the snapshot and `images/`.
    pub folder: PathBuf,
}

impl ResolvedBook {
    fn in_folder(folder: PathBuf) -> Self {
        Self {
            snapshot: folder.join(SNAPSHOT_FILE),
            folder,
        }
    }
}

/// Resolve a book identifier against the configured roots.
///
/// A scoped identifier with an in-range index maps straight to
/// `<root>/<folder>/book-snapshot` without touching the disk. Otherwise every
/// root is probed in order for `<root>/<id>/book-snapshot` using the whole
/// identifier, and the first existing one wins.
pub fn resolve(id: &BookId, roots: &RootDirs) -> Option<ResolvedBook> {
    if let Some((index, folder)) = id.scope()
        && let Some(root) = roots.get(index)
    {
        return Some(ResolvedBook::in_folder(root.join(folder)));
    }

    roots
        .iter()
        .map(|root| root.join(id.as_str()))
        .find(|folder| folder.join(SNAPSHOT_FILE).exists())
        .map(ResolvedBook::in_folder)
}

/// Whether a directory name marks a book data folder.
pub fn is_book_dir_name(name: &str) -> bool {
    name.ends_with(BOOK_DIR_SUFFIX)
}

/// Display name for a root: its final path segment, or the raw path.
pub fn root_display_name(root: &Path) -> String {
    let absolute = absolute_path(root);
    absolute
        .file_name()
        .and_then(|s| s.to_str())
        .map(String::from)
        .unwrap_or_else(|| root.to_string_lossy().to_string())
}

/// Absolute form of a root path, without resolving symlinks.
pub fn absolute_path(root: &Path) -> PathBuf {
    std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf())
}
