//! Bounded cache of deserialized books.

use crate::config::RootDirs;
use crate::error::SnapshotError;
use crate::library::book::Book;
use crate::library::lru::LruCache;
use crate::library::resolver::{self, BookId, ResolvedBook};
use ahash::RandomState;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of books kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 10;

/// Result of trying to load one book from disk.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Snapshot read and decoded.
    Loaded(Arc<Book>),
    /// No snapshot for this identifier.
    Missing,
    /// Snapshot present but unreadable.
    Failed {
        /// Snapshot that failed.
        path: PathBuf,
        /// Why it failed.
        error: SnapshotError,
    },
}

impl LoadOutcome {
    /// The book, if it loaded.
    pub fn into_book(self) -> Option<Arc<Book>> {
        match self {
            LoadOutcome::Loaded(book) => Some(book),
            LoadOutcome::Missing | LoadOutcome::Failed { .. } => None,
        }
    }
}

/// Read and decode a snapshot file.
pub fn read_snapshot(path: &Path) -> std::result::Result<Book, SnapshotError> {
    let data = std::fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Counters describing cache behaviour.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Copy of [`CacheStats`] counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    /// Lookups answered from memory (including cached misses).
    pub hits: u64,
    /// Lookups that went to disk.
    pub misses: u64,
    /// Snapshots successfully decoded.
    pub loads: u64,
    /// Snapshots that existed but could not be decoded.
    pub load_failures: u64,
    /// Entries dropped to make room.
    pub evictions: u64,
}

/// LRU cache mapping book identifiers to loaded books.
///
/// Absence is cached too, so a missing or broken book is only probed once
/// until it ages out. The LRU lock is never held across disk I/O. Loads are
/// serialized per identifier instead: concurrent requests for the same
/// uncached book decode it once, while hits and loads of other books proceed.
pub struct BookCache {
    roots: RootDirs,
    entries: Mutex<LruCache<BookId, Option<Arc<Book>>>>,
    loading: Mutex<HashMap<BookId, Arc<Mutex<()>>, RandomState>>,
    stats: CacheStats,
}

impl BookCache {
    /// Create an empty cache over the given roots.
    pub fn new(roots: RootDirs, capacity: usize) -> Self {
        Self {
            roots,
            entries: Mutex::new(LruCache::new(capacity)),
            loading: Mutex::new(HashMap::with_hasher(RandomState::new())),
            stats: CacheStats::default(),
        }
    }

    /// Roots the cache resolves against.
    pub fn roots(&self) -> &RootDirs {
        &self.roots
    }

    /// Resolve an identifier without loading anything.
    pub fn resolve(&self, id: &BookId) -> Option<ResolvedBook> {
        resolver::resolve(id, &self.roots)
    }

    /// Get a book, loading it on a miss.
    ///
    /// Blocks on disk I/O for a miss; async callers should run it on the
    /// blocking pool.
    pub fn get(&self, id: &BookId) -> Option<Arc<Book>> {
        if let Some(entry) = self.lookup(id) {
            return entry;
        }

        let slot = Arc::clone(self.loading.lock().entry(id.clone()).or_default());
        let _load_guard = slot.lock();

        // Another request may have finished this load while we waited.
        if let Some(entry) = self.lookup(id) {
            return entry;
        }

        self.stats.record_miss();
        let book = self.load(id).into_book();
        self.insert(id, book.clone());
        self.loading.lock().remove(id);

        book
    }

    fn lookup(&self, id: &BookId) -> Option<Option<Arc<Book>>> {
        let entry = self.entries.lock().get(id).cloned();
        if entry.is_some() {
            self.stats.record_hit();
        }
        entry
    }

    fn insert(&self, id: &BookId, book: Option<Arc<Book>>) {
        let evicted = self.entries.lock().put(id.clone(), book);
        if let Some((evicted, _)) = evicted {
            self.stats.record_eviction();
            tracing::debug!(book_id = %evicted, "Evicted book from cache");
        }
    }

    /// Load a book from disk, bypassing the cache.
    pub fn load(&self, id: &BookId) -> LoadOutcome {
        let Some(resolved) = self.resolve(id) else {
            tracing::debug!(book_id = %id, "Book id did not resolve");
            return LoadOutcome::Missing;
        };

        if !resolved.snapshot.exists() {
            tracing::debug!(book_id = %id, path = %resolved.snapshot.display(), "Snapshot missing");
            return LoadOutcome::Missing;
        }

        match read_snapshot(&resolved.snapshot) {
            Ok(book) => {
                self.stats.record_load();
                for problem in book.check_consistency() {
                    tracing::warn!(book_id = %id, problem = %problem, "Inconsistent snapshot");
                }
                tracing::debug!(
                    book_id = %id,
                    title = %book.metadata.title,
                    chapters = book.spine.len(),
                    version = %book.version,
                    "Loaded book"
                );
                LoadOutcome::Loaded(Arc::new(book))
            }
            Err(error) => {
                self.stats.record_load_failure();
                tracing::warn!(
                    book_id = %id,
                    path = %resolved.snapshot.display(),
                    error = %error,
                    "Failed to load book"
                );
                LoadOutcome::Failed {
                    path: resolved.snapshot,
                    error,
                }
            }
        }
    }

    /// Whether an identifier is currently cached (book or absence).
    pub fn contains(&self, id: &BookId) -> bool {
        self.entries.lock().peek(id).is_some()
    }

    /// Cached identifiers, most recently used first.
    pub fn cached_ids(&self) -> Vec<BookId> {
        self.entries.lock().keys()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of cached entries.
    pub fn capacity(&self) -> usize {
        self.entries.lock().capacity()
    }

    /// Drop every cached entry, including cached misses.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Cache counters.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}
