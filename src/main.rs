mod api;
mod auth;
mod config;
mod db;

use crate::api::AppState;
use crate::auth::JwtAuth;
use crate::config::AppConfig;
use crate::db::Db;
use axum::http::{header, HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("🚀 Starting Agency API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Database: {}", config.mongodb_db);
    info!("   - CORS origin: {}", config.cors_origin);
    info!("   - Port: {}", config.port);

    // Connect to the document store
    let db = Db::connect(&config.mongodb_uri, &config.mongodb_db).await?;
    db.ensure_indexes().await?;
    info!("✅ Connected to MongoDB");

    let state = AppState {
        db,
        jwt: Arc::new(JwtAuth::new(
            config.jwt_secret.as_bytes(),
            config.jwt_expiry_hours,
        )),
    };

    let app = api::router()
        .with_state(state)
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET   /health                      - Health check");
    info!("   POST  /api/auth/register           - Register a user");
    info!("   POST  /api/auth/login              - Log in, receive a token");
    info!("   POST  /api/inquiries               - Submit a contact-form inquiry");
    info!("   GET   /api/inquiries               - List inquiries, newest first");
    info!("   PATCH /api/inquiries/{{id}}/status   - Update inquiry status");
    info!("   GET   /api/reviews                 - List reviews with filters");
    info!("   POST  /api/reviews                 - Submit a review");
    info!("   GET   /api/reviews/stats/summary   - Rating statistics");
    info!("   GET   /api/reviews/{{id}}            - Fetch a review");
    info!("   PUT   /api/reviews/{{id}}            - Update a review (token)");
    info!("   GET   /api/users/profile           - Current profile (token)");
    info!("   PUT   /api/users/profile           - Update profile (token)");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// CORS layer from the configured allowed origin. A wildcard origin cannot
/// carry credentials; a concrete one does.
fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(if origin == "*" {
        layer.allow_origin(Any)
    } else {
        layer
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_credentials(true)
    })
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
