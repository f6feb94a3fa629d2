use crate::api::models::*;
use crate::auth::{hash_password, verify_password};
use crate::db::User;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use tracing::info;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) if write_error.code == 11000
    )
}

pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let full_name = required(request.full_name, "fullName")?;
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(
            "Please provide a valid email address".to_string(),
        ));
    }

    let mut user = User::new(full_name, email, hash_password(&password)?);

    // The unique email index catches concurrent registrations too; both
    // paths surface the same message.
    let inserted = state.db.users.insert_one(&user).await.map_err(|err| {
        if is_duplicate_key(&err) {
            AppError::BadRequest("Email already registered".to_string())
        } else {
            AppError::from(err)
        }
    })?;
    user.id = inserted.inserted_id.as_object_id();

    let id = user
        .id
        .ok_or_else(|| AppError::Internal("Inserted user has no id".to_string()))?;
    let token = state.jwt.issue(&id)?;

    info!(email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: ProfileResponse::from(user),
        }),
    ))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = required(request.email, "email")?.to_lowercase();
    let password = required(request.password, "password")?;

    let user = state
        .db
        .users
        .find_one(doc! { "email": &email })
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&user.password, &password) {
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let id = user
        .id
        .ok_or_else(|| AppError::Internal("Stored user has no id".to_string()))?;
    let token = state.jwt.issue(&id)?;

    info!(email = %user.email, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: ProfileResponse::from(user),
    }))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!(
            "The {} field is required",
            field
        ))),
    }
}
