use crate::api::models::*;
use crate::auth::AuthUser;
use crate::db::{Review, ReviewStatus};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::ReturnDocument;
use serde::Deserialize;
use tracing::info;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Match document for the listing query. Public callers only see published
/// reviews unless they explicitly request another status.
fn build_filter(query: &ListReviewsQuery) -> Document {
    let mut filter = Document::new();
    filter.insert(
        "status",
        query
            .status
            .clone()
            .unwrap_or_else(|| "published".to_string()),
    );
    if let Some(rating) = query.rating {
        filter.insert("rating", rating);
    }
    if let Some(highlighted) = query.highlighted {
        filter.insert("highlighted", highlighted);
    }
    filter
}

fn sort_doc(sort: Option<&str>) -> Document {
    match sort {
        Some("highest") => doc! { "rating": -1 },
        Some("lowest") => doc! { "rating": 1 },
        _ => doc! { "createdAt": -1 },
    }
}

fn total_pages(total: u64, limit: i64) -> i64 {
    (total as i64 + limit - 1) / limit
}

pub async fn list_reviews_handler(
    State(state): State<AppState>,
    Query(query): Query<ListReviewsQuery>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = query.page.unwrap_or(1).max(1);
    let filter = build_filter(&query);

    let reviews: Vec<Review> = state
        .db
        .reviews
        .find(filter.clone())
        .sort(sort_doc(query.sort.as_deref()))
        .skip(((page - 1) * limit) as u64)
        .limit(limit)
        .await?
        .try_collect()
        .await?;

    let total = state.db.reviews.count_documents(filter).await?;

    Ok(Json(ReviewListResponse {
        reviews,
        pagination: Pagination {
            total,
            page,
            pages: total_pages(total, limit),
        },
    }))
}

pub async fn get_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Review>, AppError> {
    let oid = parse_object_id(&id, "review")?;
    state
        .db
        .reviews
        .find_one(doc! { "_id": oid })
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
}

pub async fn create_review_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let mut review = request.into_review().map_err(AppError::BadRequest)?;

    let inserted = state.db.reviews.insert_one(&review).await?;
    review.id = inserted.inserted_id.as_object_id();

    info!(rating = review.rating, "Review submitted");

    Ok((StatusCode::CREATED, Json(review)))
}

/// `$set` document for the partial update. A supplied reply message carries
/// the supplied reply date, or the current time when none is given.
fn build_update(request: UpdateReviewRequest, now: DateTime<Utc>) -> Result<Document, AppError> {
    let mut set = Document::new();

    if let Some(reviewer) = request.reviewer {
        if let Some(name) = reviewer.name {
            set.insert("reviewer.name", name);
        }
        if let Some(email) = reviewer.email {
            set.insert("reviewer.email", email.to_lowercase());
        }
        if let Some(company) = reviewer.company {
            set.insert("reviewer.company", company);
        }
    }
    if let Some(rating) = request.rating {
        if !(1..=5).contains(&rating) {
            return Err(AppError::BadRequest(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        set.insert("rating", rating);
    }
    if let Some(content) = request.content {
        set.insert("content", content);
    }
    if let Some(project_title) = request.project_title {
        set.insert("projectTitle", project_title);
    }
    if let Some(highlighted) = request.highlighted {
        set.insert("highlighted", highlighted);
    }
    if let Some(status) = request.status {
        status
            .parse::<ReviewStatus>()
            .map_err(|_| AppError::BadRequest("Invalid status value".to_string()))?;
        set.insert("status", status);
    }
    if let Some(reply_message) = request.reply_message {
        // An empty reply clears the message without stamping a date.
        if !reply_message.is_empty() {
            let reply_date = request.reply_date.unwrap_or(now);
            set.insert("replyDate", bson::DateTime::from_chrono(reply_date));
        }
        set.insert("replyMessage", reply_message);
    }

    Ok(set)
}

/// Token-gated partial update. Applied as one atomic `$set`.
pub async fn update_review_handler(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>, AppError> {
    let oid = parse_object_id(&id, "review")?;
    let set = build_update(request, Utc::now())?;

    // An empty body changes nothing; skip the update round trip.
    let updated = if set.is_empty() {
        state.db.reviews.find_one(doc! { "_id": oid }).await?
    } else {
        state
            .db
            .reviews
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
    };

    match updated {
        Some(review) => {
            info!(id = %oid, "Review updated");
            Ok(Json(review))
        }
        None => Err(AppError::NotFound("Review not found".to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct RatingGroup {
    #[serde(rename = "_id")]
    rating: i32,
    count: i64,
}

fn percentage(count: i64, total: u64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as i64
}

/// With no matching reviews the summary is all zeros.
fn summarize(total: u64, average: f64, groups: &[RatingGroup]) -> StatsSummary {
    let positive: i64 = groups.iter().filter(|g| g.rating >= 4).map(|g| g.count).sum();
    StatsSummary {
        total_count: total,
        average_rating: (average * 10.0).round() / 10.0,
        positive_percentage: percentage(positive, total),
        rating_distribution: groups
            .iter()
            .map(|g| RatingBucket {
                rating: g.rating,
                count: g.count,
                percentage: percentage(g.count, total),
            })
            .collect(),
    }
}

/// Aggregate rating statistics over published reviews.
pub async fn review_stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsSummary>, AppError> {
    let published = doc! { "status": "published" };

    let total = state.db.reviews.count_documents(published.clone()).await?;
    if total == 0 {
        return Ok(Json(summarize(0, 0.0, &[])));
    }

    let mut avg_cursor = state
        .db
        .reviews
        .aggregate(vec![
            doc! { "$match": published.clone() },
            doc! { "$group": { "_id": null, "averageRating": { "$avg": "$rating" } } },
        ])
        .await?;
    let average = match avg_cursor.try_next().await? {
        Some(row) => row.get_f64("averageRating").unwrap_or(0.0),
        None => 0.0,
    };

    let rows: Vec<Document> = state
        .db
        .reviews
        .aggregate(vec![
            doc! { "$match": published },
            doc! { "$group": { "_id": "$rating", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": -1 } },
        ])
        .await?
        .try_collect()
        .await?;

    let mut groups = Vec::with_capacity(rows.len());
    for row in rows {
        groups.push(bson::from_document::<RatingGroup>(row)?);
    }

    Ok(Json(summarize(total, average, &groups)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults_to_published() {
        let filter = build_filter(&ListReviewsQuery::default());
        assert_eq!(filter, doc! { "status": "published" });
    }

    #[test]
    fn filter_keeps_explicit_status_and_rating() {
        let query = ListReviewsQuery {
            status: Some("pending".into()),
            rating: Some(3),
            ..Default::default()
        };
        assert_eq!(
            build_filter(&query),
            doc! { "status": "pending", "rating": 3 }
        );
    }

    #[test]
    fn filter_highlighted_is_tri_state() {
        assert!(!build_filter(&ListReviewsQuery::default()).contains_key("highlighted"));

        let query = ListReviewsQuery {
            highlighted: Some(false),
            ..Default::default()
        };
        assert_eq!(
            build_filter(&query),
            doc! { "status": "published", "highlighted": false }
        );
    }

    #[test]
    fn sort_options() {
        assert_eq!(sort_doc(None), doc! { "createdAt": -1 });
        assert_eq!(sort_doc(Some("newest")), doc! { "createdAt": -1 });
        assert_eq!(sort_doc(Some("highest")), doc! { "rating": -1 });
        assert_eq!(sort_doc(Some("lowest")), doc! { "rating": 1 });
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(total_pages(15, 10), 2);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn summary_for_known_ratings() {
        // Ratings [5, 5, 4, 3, 1].
        let groups = [
            RatingGroup { rating: 5, count: 2 },
            RatingGroup { rating: 4, count: 1 },
            RatingGroup { rating: 3, count: 1 },
            RatingGroup { rating: 1, count: 1 },
        ];
        let summary = summarize(5, 3.6, &groups);
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.average_rating, 3.6);
        assert_eq!(summary.positive_percentage, 60);
        let buckets: Vec<(i32, i64, i64)> = summary
            .rating_distribution
            .iter()
            .map(|b| (b.rating, b.count, b.percentage))
            .collect();
        assert_eq!(buckets, vec![(5, 2, 40), (4, 1, 20), (3, 1, 20), (1, 1, 20)]);
    }

    #[test]
    fn average_is_rounded_to_one_decimal() {
        let groups = [
            RatingGroup { rating: 5, count: 1 },
            RatingGroup { rating: 4, count: 2 },
        ];
        let summary = summarize(3, 4.333333333, &groups);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.positive_percentage, 100);
    }

    #[test]
    fn summary_with_no_published_reviews_is_all_zeros() {
        let summary = summarize(0, 0.0, &[]);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.positive_percentage, 0);
        assert!(summary.rating_distribution.is_empty());
    }

    #[test]
    fn update_reply_defaults_date_to_now() {
        let now = Utc::now();
        let request = UpdateReviewRequest {
            reply_message: Some("Thanks!".into()),
            ..Default::default()
        };
        let set = build_update(request, now).unwrap();
        assert_eq!(set.get_str("replyMessage").unwrap(), "Thanks!");
        assert_eq!(
            set.get("replyDate"),
            Some(&bson::Bson::DateTime(bson::DateTime::from_chrono(now)))
        );
    }

    #[test]
    fn update_reply_keeps_supplied_date() {
        let now = Utc::now();
        let supplied = "2026-01-15T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let request = UpdateReviewRequest {
            reply_message: Some("Thanks!".into()),
            reply_date: Some(supplied),
            ..Default::default()
        };
        let set = build_update(request, now).unwrap();
        assert_eq!(
            set.get("replyDate"),
            Some(&bson::Bson::DateTime(bson::DateTime::from_chrono(supplied)))
        );
    }

    #[test]
    fn empty_reply_message_does_not_stamp_a_date() {
        let request = UpdateReviewRequest {
            reply_message: Some("".into()),
            ..Default::default()
        };
        let set = build_update(request, Utc::now()).unwrap();
        assert_eq!(set.get_str("replyMessage").unwrap(), "");
        assert!(!set.contains_key("replyDate"));
    }

    #[test]
    fn update_rejects_unknown_status() {
        let request = UpdateReviewRequest {
            status: Some("hidden".into()),
            ..Default::default()
        };
        assert!(build_update(request, Utc::now()).is_err());
    }

    #[test]
    fn update_normalizes_reviewer_email() {
        let request = UpdateReviewRequest {
            reviewer: Some(ReviewerInput {
                name: None,
                email: Some("Sam@Client.IO".into()),
                company: None,
            }),
            ..Default::default()
        };
        let set = build_update(request, Utc::now()).unwrap();
        assert_eq!(set.get_str("reviewer.email").unwrap(), "sam@client.io");
    }

    #[test]
    fn empty_update_produces_empty_set() {
        let set = build_update(UpdateReviewRequest::default(), Utc::now()).unwrap();
        assert!(set.is_empty());
    }
}
