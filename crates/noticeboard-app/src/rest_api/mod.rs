pub mod announcement;

use axum::{http::StatusCode, response::IntoResponse, routing::get};

use crate::state::AppState;

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// All application routes, ready to be given state
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(announcement::router())
        .route("/health", get(health))
}
