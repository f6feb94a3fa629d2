use crate::api::models::*;
use crate::auth::AuthUser;
use axum::extract::State;
use axum::Json;
use mongodb::bson::{doc, Document};
use mongodb::options::ReturnDocument;
use tracing::info;

pub async fn get_profile_handler(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .db
        .users
        .find_one(doc! { "_id": auth.id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}

fn build_profile_update(request: UpdateProfileRequest) -> Result<Document, AppError> {
    let mut set = Document::new();
    if let Some(full_name) = request.full_name.filter(|v| !v.trim().is_empty()) {
        set.insert("fullName", full_name);
    }
    if let Some(email) = request.email.filter(|v| !v.trim().is_empty()) {
        if !is_valid_email(&email) {
            return Err(AppError::BadRequest(
                "Please provide a valid email address".to_string(),
            ));
        }
        set.insert("email", email.to_lowercase());
    }
    Ok(set)
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let set = build_profile_update(request)?;

    let updated = if set.is_empty() {
        state.db.users.find_one(doc! { "_id": auth.id }).await?
    } else {
        state
            .db
            .users
            .find_one_and_update(doc! { "_id": auth.id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
    };

    match updated {
        Some(user) => {
            info!(id = %auth.id, "Profile updated");
            Ok(Json(ProfileResponse::from(user)))
        }
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}
