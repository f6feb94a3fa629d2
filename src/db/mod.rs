pub mod models;

pub use models::{Inquiry, InquiryStatus, Interests, Review, ReviewStatus, Reviewer, Role, User};

use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

/// Handle to the three record collections. Constructed once at startup and
/// passed down through application state.
#[derive(Clone)]
pub struct Db {
    pub inquiries: Collection<Inquiry>,
    pub reviews: Collection<Review>,
    pub users: Collection<User>,
}

impl Db {
    pub async fn connect(uri: &str, db_name: &str) -> mongodb::error::Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(db_name);
        Ok(Self {
            inquiries: database.collection("inquiries"),
            reviews: database.collection("reviews"),
            users: database.collection("users"),
        })
    }

    /// Unique index on user email. Idempotent; called once after connect.
    pub async fn ensure_indexes(&self) -> mongodb::error::Result<()> {
        let email_unique = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(email_unique).await?;
        Ok(())
    }
}
