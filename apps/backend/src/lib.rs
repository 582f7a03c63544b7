pub mod db;
pub mod error;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState { db: Arc::new(db) };

    // Build router with protected routes
    let protected_routes = Router::new()
        // Auth routes
        .route("/api/auth/logout", post(routes::auth::logout))
        // Habit routes
        .route("/api/habits", get(routes::habits::list))
        .route("/api/habits", post(routes::habits::create))
        .route("/api/habits/{id}", get(routes::habits::get_habit))
        .route("/api/habits/{id}", put(routes::habits::update))
        .route("/api/habits/{id}", delete(routes::habits::archive))
        .route("/api/habits/{id}/complete", post(routes::habits::complete))
        .route("/api/habits/{id}/complete", delete(routes::habits::uncomplete))
        .route("/api/habits/{id}/stats", get(routes::habits::stats))
        // Deleted habit routes
        .route("/api/deleted-habits", get(routes::deleted_habits::list))
        .route(
            "/api/deleted-habits/{id}/restore",
            post(routes::deleted_habits::restore),
        )
        .route(
            "/api/deleted-habits/{id}",
            delete(routes::deleted_habits::purge),
        )
        // Profile routes
        .route("/api/profile", get(routes::profile::get_profile))
        .route("/api/profile", put(routes::profile::update_profile))
        .route(
            "/api/profile/change-password",
            put(routes::profile::change_password),
        )
        .route("/api/profile/stats", get(routes::profile::stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    // Build full router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
