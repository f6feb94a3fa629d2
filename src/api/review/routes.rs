use crate::api::models::AppState;
use crate::api::review::handlers::{
    create_review_handler, get_review_handler, list_reviews_handler, review_stats_handler,
    update_review_handler,
};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reviews",
            get(list_reviews_handler).post(create_review_handler),
        )
        .route("/api/reviews/stats/summary", get(review_stats_handler))
        .route(
            "/api/reviews/{id}",
            get(get_review_handler).put(update_review_handler),
        )
}
