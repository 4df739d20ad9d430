//! HTTP request handlers.

use crate::error::{AppError, Result};
use crate::library::{self, BookId, CacheStatsSnapshot};
use crate::server::AppState;
use crate::server::pages;
use crate::server::state::LibraryView;
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

// ============================================================================
// LIBRARY
// ============================================================================

/// Library query parameters.
#[derive(Debug, Deserialize)]
pub struct LibraryParams {
    /// Selected root.
    pub dir_index: Option<i64>,
}

/// Library page: directory chooser or book list.
pub async fn library_index(
    State(state): State<AppState>,
    Query(params): Query<LibraryParams>,
) -> Result<Html<String>> {
    let view = state
        .run_blocking(move |state| state.library_view(params.dir_index))
        .await?;
    let title = &state.config.server.title;

    let html = match view {
        LibraryView::Directories(dirs) => pages::directories_page(title, &dirs),
        LibraryView::Books {
            multiple_roots,
            books,
            ..
        } => pages::library_page(title, &books, multiple_roots),
    };

    Ok(Html(html))
}

// ============================================================================
// READER
// ============================================================================

/// Entry point of a book: redirects to its first chapter.
///
/// Chapter pages live one level deeper, so relative `images/...` links in
/// chapter markup resolve to the image route.
pub async fn read_book(
    State(state): State<AppState>,
    Path(book_id): Path<String>,
) -> Result<Redirect> {
    let id = BookId::parse(book_id);
    let url = pages::chapter_url(id.as_str(), 0);
    state.require_book(id).await?;

    Ok(Redirect::to(&url))
}

/// One chapter of a book.
pub async fn read_chapter(
    State(state): State<AppState>,
    Path((book_id, chapter_index)): Path<(String, i64)>,
) -> Result<Html<String>> {
    let id = BookId::parse(book_id);
    let book = state.require_book(id.clone()).await?;

    let nav = book
        .navigate(chapter_index)
        .ok_or_else(|| AppError::NotFound("Chapter not found".to_string()))?;

    Ok(Html(pages::reader_page(id.as_str(), &book, nav)))
}

/// Image stored alongside a book.
pub async fn book_image(
    State(state): State<AppState>,
    Path((book_id, image_name)): Path<(String, String)>,
) -> Result<Response<Body>> {
    let id = BookId::parse(book_id);
    let path = state.image_path(&id, &image_name)?;

    let file = tokio::fs::File::open(&path).await?;
    let size = file.metadata().await?.len();
    let body = Body::from_stream(ReaderStream::new(file));

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, library::image_mime_type(&image_name))
        .header(header::CONTENT_LENGTH, size)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build image response: {}", e)))?;

    Ok(response)
}

// ============================================================================
// STATS API
// ============================================================================

/// Cache statistics response.
#[derive(Serialize)]
pub struct StatsResponse {
    roots: Vec<String>,
    cache_capacity: usize,
    cached_books: usize,
    cache: CacheStatsSnapshot,
}

/// API: cache statistics.
pub async fn api_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache();

    Json(StatsResponse {
        roots: state
            .roots()
            .iter()
            .map(|r| r.to_string_lossy().to_string())
            .collect(),
        cache_capacity: cache.capacity(),
        cached_books: cache.len(),
        cache: cache.stats(),
    })
}
