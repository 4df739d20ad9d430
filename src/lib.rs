//! ebook-reader: a chapter-by-chapter reading server for pre-parsed ebooks.
//!
//! Books are produced ahead of time by a separate parsing pipeline, one
//! `<name>_data` folder per book holding a `book-snapshot` file and an
//! `images/` directory. This crate serves them over HTTP:
//!
//! - library listing across one or more root directories
//! - chapter reader with table of contents and previous/next navigation
//! - book images
//!
//! Loaded books are kept in a small LRU cache keyed by book identifier
//! (`"<root index>:<folder>"` or a bare folder name).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Configuration and CLI.
pub mod config;
/// Error types.
pub mod error;
/// Book model, resolution and caching.
pub mod library;
/// HTTP server.
pub mod server;


pub use config::{Cli, Command, Config, RootDirs};
pub use error::{AppError, Result};
pub use library::{Book, BookCache, BookId};
pub use server::AppState;
