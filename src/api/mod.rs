pub mod auth;
pub mod inquiry;
pub mod models;
pub mod review;
pub mod user;

// Re-exports
pub use models::*;

use axum::{extract::State, routing::get, Json, Router};

pub async fn root_handler() -> &'static str {
    "Agency API is running"
}

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let total_reviews = state
        .db
        .reviews
        .estimated_document_count()
        .await
        .unwrap_or(0);
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_reviews,
    })
}

/// All routes, ready to take the shared state.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(auth::routes())
        .merge(inquiry::routes())
        .merge(review::routes())
        .merge(user::routes())
}
