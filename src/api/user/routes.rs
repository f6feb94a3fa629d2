use crate::api::models::AppState;
use crate::api::user::handlers::{get_profile_handler, update_profile_handler};
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/users/profile",
        get(get_profile_handler).put(update_profile_handler),
    )
}
