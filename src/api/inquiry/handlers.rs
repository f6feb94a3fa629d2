use crate::api::models::*;
use crate::db::{Inquiry, InquiryStatus};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::options::ReturnDocument;
use tracing::info;

pub async fn create_inquiry_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateInquiryRequest>,
) -> Result<(StatusCode, Json<Inquiry>), AppError> {
    let mut inquiry = request.into_inquiry().map_err(AppError::BadRequest)?;

    let inserted = state.db.inquiries.insert_one(&inquiry).await?;
    inquiry.id = inserted.inserted_id.as_object_id();

    info!(email = %inquiry.email, "Inquiry submitted");

    Ok((StatusCode::CREATED, Json(inquiry)))
}

/// Full scan, newest first. Admin listing has no pagination.
pub async fn list_inquiries_handler(
    State(state): State<AppState>,
) -> Result<Json<InquiryListResponse>, AppError> {
    let inquiries: Vec<Inquiry> = state
        .db
        .inquiries
        .find(doc! {})
        .sort(doc! { "createdAt": -1 })
        .await?
        .try_collect()
        .await?;

    Ok(Json(InquiryListResponse {
        count: inquiries.len(),
        inquiries,
    }))
}

pub async fn update_inquiry_status_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateInquiryStatusRequest>,
) -> Result<Json<Inquiry>, AppError> {
    let status: InquiryStatus = request
        .status
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status value".to_string()))?;
    let oid = parse_object_id(&id, "inquiry")?;

    // Single atomic update; no read-modify-write window.
    let update = doc! {
        "$set": {
            "status": bson::to_bson(&status)?,
            "updatedAt": bson::DateTime::from_chrono(Utc::now()),
        }
    };

    let updated = state
        .db
        .inquiries
        .find_one_and_update(doc! { "_id": oid }, update)
        .return_document(ReturnDocument::After)
        .await?;

    match updated {
        Some(inquiry) => {
            info!(id = %oid, status = %request.status, "Inquiry status updated");
            Ok(Json(inquiry))
        }
        None => Err(AppError::NotFound("Inquiry not found".to_string())),
    }
}
