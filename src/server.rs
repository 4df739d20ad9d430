//! HTTP server and routes.

pub(crate) mod handlers;
pub(crate) mod pages;
mod state;

pub use state::{AppState, BookSummary, DirectoryEntry, LibraryView};

use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let read_routes = Router::new()
        .route("/{book_id}", get(handlers::read_book))
        .route("/{book_id}/{chapter_index}", get(handlers::read_chapter))
        .route("/{book_id}/images/{image_name}", get(handlers::book_image));

    Router::new()
        .route("/", get(handlers::library_index))
        .route("/api/stats", get(handlers::api_stats))
        .nest("/read", read_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
