use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::files;
use crate::state::AppState;

/// Build the application router.
pub fn build_router(max_upload_bytes: usize, state: AppState) -> Router {
    Router::new()
        .route("/files", post(files::create_file))
        .route(
            "/files/{id}",
            put(files::upload_file).get(files::file_status),
        )
        .route("/files/{id}/download", get(files::download_file))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
