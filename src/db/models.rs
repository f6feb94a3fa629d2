use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// `Option<DateTime<Utc>>` stored as a native BSON date when present.
pub mod optional_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => bson::DateTime::from_chrono(*dt).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Ok(Option::<bson::DateTime>::deserialize(deserializer)?.map(|dt| dt.to_chrono()))
    }
}

/// Moderation status of a contact-form inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    InProgress,
    Completed,
    Archived,
}

impl FromStr for InquiryStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(()),
        }
    }
}

/// Service categories a prospect can tick on the contact form.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Interests {
    pub website_designing: bool,
    pub graphic_designing: bool,
    pub app_development: bool,
    pub social_media_marketing: bool,
    pub content_marketing: bool,
    pub website_development: bool,
}

/// A contact-form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub interests: Interests,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Inquiry {
    /// A freshly submitted inquiry. Email is stored lower-cased.
    pub fn new(
        name: String,
        email: String,
        phone: Option<String>,
        message: String,
        interests: Interests,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            email: email.to_lowercase(),
            phone,
            message,
            interests,
            status: InquiryStatus::New,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Moderation status of a customer review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    #[default]
    Published,
    Pending,
    Rejected,
}

impl FromStr for ReviewStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Self::Published),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            _ => Err(()),
        }
    }
}

/// Who wrote a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reviewer {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// A customer testimonial with rating, moderation status and optional reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reviewer: Reviewer,
    pub rating: i32,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_title: Option<String>,
    #[serde(default)]
    pub highlighted: bool,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_message: Option<String>,
    #[serde(
        default,
        with = "optional_bson_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    pub reply_date: Option<DateTime<Utc>>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// A public submission. Always stored as published and not highlighted,
    /// whatever the caller sent.
    pub fn submitted(
        reviewer: Reviewer,
        rating: i32,
        content: String,
        project_title: Option<String>,
    ) -> Self {
        Self {
            id: None,
            reviewer: Reviewer {
                email: reviewer.email.to_lowercase(),
                ..reviewer
            },
            rating,
            content,
            project_title,
            highlighted: false,
            status: ReviewStatus::Published,
            reply_message: None,
            reply_date: None,
            created_at: Utc::now(),
        }
    }
}

/// Role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    User,
    Admin,
    Editor,
}

/// A registered user. `password` holds an argon2 PHC hash, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: String, email: String, password_hash: String) -> Self {
        Self {
            id: None,
            full_name,
            email: email.to_lowercase(),
            password: password_hash,
            role: Role::User,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    #[test]
    fn inquiry_status_wire_names() {
        let all = [
            (InquiryStatus::New, "new"),
            (InquiryStatus::Contacted, "contacted"),
            (InquiryStatus::InProgress, "in-progress"),
            (InquiryStatus::Completed, "completed"),
            (InquiryStatus::Archived, "archived"),
        ];
        for (status, name) in all {
            assert_eq!(bson::to_bson(&status).unwrap(), bson::Bson::String(name.into()));
            assert_eq!(name.parse::<InquiryStatus>().unwrap(), status);
        }
        assert!("closed".parse::<InquiryStatus>().is_err());
    }

    #[test]
    fn new_inquiry_defaults() {
        let inquiry = Inquiry::new(
            "Jane".into(),
            "Jane@Example.COM".into(),
            None,
            "Hello".into(),
            Interests::default(),
        );
        assert_eq!(inquiry.status, InquiryStatus::New);
        assert_eq!(inquiry.email, "jane@example.com");
        assert_eq!(inquiry.created_at, inquiry.updated_at);
        assert!(!inquiry.interests.app_development);
    }

    #[test]
    fn submitted_review_ignores_caller_moderation() {
        let review = Review::submitted(
            Reviewer {
                name: "Sam".into(),
                email: "SAM@client.io".into(),
                company: None,
            },
            5,
            "Great work".into(),
            Some("Site redesign".into()),
        );
        assert_eq!(review.status, ReviewStatus::Published);
        assert!(!review.highlighted);
        assert_eq!(review.reviewer.email, "sam@client.io");
        assert!(review.reply_date.is_none());
    }

    #[test]
    fn interests_deserialize_partial() {
        let doc = bson::doc! { "appDevelopment": true };
        let interests: Interests = bson::from_document(doc).unwrap();
        assert!(interests.app_development);
        assert!(!interests.website_designing);
    }

    #[test]
    fn role_defaults_to_user_when_absent() {
        let doc = bson::doc! {
            "fullName": "Jane",
            "email": "jane@example.com",
            "password": "$argon2id$...",
            "createdAt": bson::DateTime::now(),
        };
        let user: User = bson::from_document(doc).unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn timestamps_are_stored_as_bson_dates() {
        let inquiry = Inquiry::new(
            "Jane".into(),
            "jane@example.com".into(),
            None,
            "Hello".into(),
            Interests::default(),
        );
        let doc = bson::to_document(&inquiry).unwrap();
        assert!(matches!(doc.get("createdAt"), Some(bson::Bson::DateTime(_))));
        assert!(matches!(doc.get("updatedAt"), Some(bson::Bson::DateTime(_))));

        let round_tripped: Inquiry = bson::from_document(doc).unwrap();
        assert_eq!(
            round_tripped.created_at.timestamp_millis(),
            inquiry.created_at.timestamp_millis()
        );
    }

    #[test]
    fn reply_date_is_a_bson_date_when_present() {
        let mut review = Review::submitted(
            Reviewer {
                name: "Sam".into(),
                email: "sam@client.io".into(),
                company: None,
            },
            5,
            "Great work".into(),
            None,
        );
        let doc = bson::to_document(&review).unwrap();
        assert!(matches!(doc.get("createdAt"), Some(bson::Bson::DateTime(_))));
        assert!(!doc.contains_key("replyDate"));

        review.reply_date = Some(Utc::now());
        let doc = bson::to_document(&review).unwrap();
        assert!(matches!(doc.get("replyDate"), Some(bson::Bson::DateTime(_))));
    }
}
