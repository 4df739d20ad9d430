//! Application state shared across handlers.

use crate::config::{Config, RootDirs};
use crate::error::{AppError, Result};
use crate::library::resolver::{self, BookId};
use crate::library::{self, Book, BookCache};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Book cache (also owns the root list).
    books: Arc<BookCache>,
}

/// A configured root offered on the directory chooser.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryEntry {
    /// Final path segment.
    pub name: String,
    /// Absolute path.
    pub path: String,
    /// Position in the root list.
    pub index: usize,
}

/// A loadable book in a library listing.
#[derive(Debug, Clone, Serialize)]
pub struct BookSummary {
    /// Scoped identifier, e.g. `0:dracula_data`.
    pub id: String,
    /// Book title.
    pub title: String,
    /// Authors joined with ", ".
    pub author: String,
    /// Number of chapters.
    pub chapters: usize,
}

/// What the library page shows.
#[derive(Debug, Clone)]
pub enum LibraryView {
    /// Several roots and none selected.
    Directories(Vec<DirectoryEntry>),
    /// Books under one root.
    Books {
        /// Root the books were listed from.
        dir_index: usize,
        /// Whether more than one root is configured.
        multiple_roots: bool,
        /// Books that loaded.
        books: Vec<BookSummary>,
    },
}

impl AppState {
    /// Create application state from a finished configuration.
    pub fn new(config: Config) -> Self {
        let books = BookCache::new(config.root_dirs(), config.cache.capacity);
        Self {
            config: Arc::new(config),
            books: Arc::new(books),
        }
    }

    /// Configured library roots.
    pub fn roots(&self) -> &RootDirs {
        self.books.roots()
    }

    /// Book cache.
    pub fn cache(&self) -> &BookCache {
        &self.books
    }

    /// Get a book through the cache.
    pub fn get_book(&self, id: &BookId) -> Option<Arc<Book>> {
        self.books.get(id)
    }

    /// Get a book or a not-found error, loading on the blocking pool.
    pub async fn require_book(&self, id: BookId) -> Result<Arc<Book>> {
        self.run_blocking(move |state| state.get_book(&id))
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    /// Run work that may read snapshots from disk off the async workers.
    pub async fn run_blocking<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(AppState) -> T + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || work(state))
            .await
            .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))
    }

    /// Decide what the library page lists.
    ///
    /// With several roots and no selection, the roots themselves. Otherwise
    /// the books of the selected root, an out-of-range selection meaning the
    /// first one.
    pub fn library_view(&self, dir_index: Option<i64>) -> LibraryView {
        let roots = self.roots();

        let Some(requested) = dir_index else {
            if roots.len() > 1 {
                return LibraryView::Directories(self.list_directories());
            }
            return self.books_view(0);
        };

        let index = usize::try_from(requested)
            .ok()
            .filter(|&i| i < roots.len())
            .unwrap_or(0);
        self.books_view(index)
    }

    fn books_view(&self, dir_index: usize) -> LibraryView {
        LibraryView::Books {
            dir_index,
            multiple_roots: self.roots().len() > 1,
            books: self.list_books(dir_index),
        }
    }

    /// Configured roots with their display names.
    pub fn list_directories(&self) -> Vec<DirectoryEntry> {
        self.roots()
            .iter()
            .enumerate()
            .map(|(index, root)| DirectoryEntry {
                name: resolver::root_display_name(root),
                path: resolver::absolute_path(root).to_string_lossy().to_string(),
                index,
            })
            .collect()
    }

    /// Books found directly under root `dir_index`.
    ///
    /// Only `*_data` folders whose snapshot loads are listed; the rest are
    /// skipped without comment.
    pub fn list_books(&self, dir_index: usize) -> Vec<BookSummary> {
        let Some(root) = self.roots().get(dir_index) else {
            return Vec::new();
        };
        if !root.is_dir() {
            tracing::warn!(root = %root.display(), "Library root is not a directory");
            return Vec::new();
        }

        walkdir::WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter(|name| resolver::is_book_dir_name(name))
            .filter_map(|name| {
                let id = BookId::scoped(dir_index, &name);
                let book = self.get_book(&id)?;
                Some(BookSummary {
                    id: id.to_string(),
                    title: book.metadata.title.clone(),
                    author: book.metadata.authors.join(", "),
                    chapters: book.chapter_count(),
                })
            })
            .collect()
    }

    /// Path of an image belonging to a book.
    ///
    /// Only the final component of `image_name` is used, so the result always
    /// lies inside the book's `images` folder.
    pub fn image_path(&self, id: &BookId, image_name: &str) -> Result<PathBuf> {
        let resolved = self
            .books
            .resolve(id)
            .ok_or_else(|| AppError::NotFound("Book path not found".to_string()))?;

        let name = library::sanitize_image_name(image_name)
            .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

        let path = resolved.folder.join("images").join(name);
        if !path.is_file() {
            return Err(AppError::NotFound("Image not found".to_string()));
        }

        Ok(path)
    }
}
