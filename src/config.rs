use anyhow::Context;
use std::env;

/// Application configuration, loaded from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub cors_origin: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let port = match env::var("PORT") {
            Ok(v) => v.parse().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        let jwt_expiry_hours = match env::var("JWT_EXPIRY_HOURS") {
            Ok(v) => v.parse().context("JWT_EXPIRY_HOURS must be a number")?,
            Err(_) => 24,
        };

        Ok(Self {
            port,
            mongodb_uri: env::var("MONGODB_URI").context("MONGODB_URI is not set")?,
            mongodb_db: env::var("MONGODB_DB").unwrap_or_else(|_| "agency".to_string()),
            cors_origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            jwt_expiry_hours,
        })
    }
}
