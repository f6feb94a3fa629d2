use crate::api::inquiry::handlers::{
    create_inquiry_handler, list_inquiries_handler, update_inquiry_status_handler,
};
use crate::api::models::AppState;
use axum::{
    routing::{get, patch},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/inquiries",
            get(list_inquiries_handler).post(create_inquiry_handler),
        )
        .route(
            "/api/inquiries/{id}/status",
            patch(update_inquiry_status_handler).put(update_inquiry_status_handler),
        )
}
