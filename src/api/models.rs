use crate::auth::JwtAuth;
use crate::db::{Db, Inquiry, Interests, Review, Reviewer, Role, User};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub jwt: Arc<JwtAuth>,
}

/// Error response body, shared by every failing route.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        error!(error = %err, "Storage operation failed");
        AppError::Internal(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for AppError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub fn parse_object_id(id: &str, kind: &str) -> Result<mongodb::bson::oid::ObjectId, AppError> {
    mongodb::bson::oid::ObjectId::parse_str(id)
        .map_err(|_| AppError::BadRequest(format!("Invalid {} id", kind)))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse {
            error: status.to_string(),
            message,
        }))
        .into_response()
    }
}

// Same pattern the contact form enforces client-side.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_reviews: u64,
}

/// Contact-form submission body
#[derive(Debug, Deserialize)]
pub struct CreateInquiryRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub interests: Option<Interests>,
}

impl CreateInquiryRequest {
    /// Validate the submission and build the record to store.
    pub fn into_inquiry(self) -> Result<Inquiry, String> {
        let name = required_text(self.name, "name")?;
        let email = required_text(self.email, "email")?;
        let message = required_text(self.message, "message")?;
        if !is_valid_email(&email) {
            return Err("Please provide a valid email address".to_string());
        }
        Ok(Inquiry::new(
            name,
            email,
            self.phone.filter(|p| !p.trim().is_empty()),
            message,
            self.interests.unwrap_or_default(),
        ))
    }
}

/// Inquiry listing response
#[derive(Debug, Serialize)]
pub struct InquiryListResponse {
    pub count: usize,
    pub inquiries: Vec<Inquiry>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInquiryStatusRequest {
    pub status: String,
}

/// Review listing query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ListReviewsQuery {
    pub status: Option<String>,
    pub rating: Option<i32>,
    pub highlighted: Option<bool>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<Review>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct ReviewerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
}

/// Review submission body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub reviewer: Option<ReviewerInput>,
    pub rating: Option<i32>,
    pub content: Option<String>,
    pub project_title: Option<String>,
}

impl CreateReviewRequest {
    /// Validate the submission and build the record to store.
    pub fn into_review(self) -> Result<Review, String> {
        let reviewer = self
            .reviewer
            .ok_or_else(|| "Please provide all required fields".to_string())?;
        let name = required_text(reviewer.name, "reviewer.name")?;
        let email = required_text(reviewer.email, "reviewer.email")?;
        let content = required_text(self.content, "content")?;
        let rating = self
            .rating
            .ok_or_else(|| "The rating field is required".to_string())?;
        if !(1..=5).contains(&rating) {
            return Err("Rating must be between 1 and 5".to_string());
        }
        Ok(Review::submitted(
            Reviewer {
                name,
                email,
                company: reviewer.company.filter(|c| !c.trim().is_empty()),
            },
            rating,
            content,
            self.project_title,
        ))
    }
}

/// Partial-update body for the authenticated review route.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub reviewer: Option<ReviewerInput>,
    pub rating: Option<i32>,
    pub content: Option<String>,
    pub project_title: Option<String>,
    pub highlighted: Option<bool>,
    pub status: Option<String>,
    pub reply_message: Option<String>,
    pub reply_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: i32,
    pub count: i64,
    pub percentage: i64,
}

/// Summary statistics over published reviews.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_count: u64,
    pub average_rating: f64,
    pub positive_percentage: i64,
    pub rating_distribution: Vec<RatingBucket>,
}

/// Profile shape returned by the user routes, credential excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Registration body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: ProfileResponse,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("The {} field is required", field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ReviewStatus;

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("jane.doe@mail.example.org"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn inquiry_missing_email_is_rejected() {
        let request = CreateInquiryRequest {
            name: Some("Jane".into()),
            email: None,
            phone: None,
            message: Some("Hello".into()),
            interests: None,
        };
        let err = request.into_inquiry().unwrap_err();
        assert!(err.contains("email"));
    }

    #[test]
    fn inquiry_blank_message_is_rejected() {
        let request = CreateInquiryRequest {
            name: Some("Jane".into()),
            email: Some("jane@example.com".into()),
            phone: None,
            message: Some("   ".into()),
            interests: None,
        };
        assert!(request.into_inquiry().is_err());
    }

    #[test]
    fn valid_inquiry_builds_with_defaults() {
        let request = CreateInquiryRequest {
            name: Some("Jane".into()),
            email: Some("Jane@Example.com".into()),
            phone: Some("".into()),
            message: Some("Hello".into()),
            interests: None,
        };
        let inquiry = request.into_inquiry().unwrap();
        assert_eq!(inquiry.email, "jane@example.com");
        assert!(inquiry.phone.is_none());
    }

    #[test]
    fn review_missing_reviewer_email_is_rejected() {
        let request = CreateReviewRequest {
            reviewer: Some(ReviewerInput {
                name: Some("Sam".into()),
                email: None,
                company: None,
            }),
            rating: Some(5),
            content: Some("Great".into()),
            project_title: None,
        };
        assert!(request.into_review().is_err());
    }

    #[test]
    fn review_rating_out_of_range_is_rejected() {
        let request = CreateReviewRequest {
            reviewer: Some(ReviewerInput {
                name: Some("Sam".into()),
                email: Some("sam@client.io".into()),
                company: None,
            }),
            rating: Some(6),
            content: Some("Great".into()),
            project_title: None,
        };
        assert!(request.into_review().is_err());
    }

    #[test]
    fn valid_review_is_stored_as_published() {
        let request = CreateReviewRequest {
            reviewer: Some(ReviewerInput {
                name: Some("Sam".into()),
                email: Some("sam@client.io".into()),
                company: Some("Acme".into()),
            }),
            rating: Some(4),
            content: Some("Solid delivery".into()),
            project_title: Some("Brand refresh".into()),
        };
        let review = request.into_review().unwrap();
        assert_eq!(review.status, ReviewStatus::Published);
        assert!(!review.highlighted);
        assert_eq!(review.rating, 4);
    }
}
