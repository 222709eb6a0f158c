pub mod health;
pub mod parse;

use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Request bodies above this are rejected at the server boundary, before
/// any handler logic runs.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health::health_handler))
        .route("/parse", post(parse::handle_parse))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// GET /
/// Serves the static upload-form page, embedded at compile time.
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}
