//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext for setting up test environment with database
//! - Helper functions for creating test data
//! - Authentication helpers
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL env var).

pub mod fixtures;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;

use habitflow_backend::db::Database;
use habitflow_backend::routes;
use habitflow_backend::routes::auth::hash_password;
use habitflow_backend::AppState;

/// Password used for every test account.
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Test context containing database connection and test server.
///
/// Use this to set up integration tests with a real database connection.
/// Requires DATABASE_URL environment variable to be set.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let db = Database::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let db = Arc::new(db);

        let state = AppState { db: db.clone() };

        let app = build_test_router(state);

        Self { db, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Create a test user with an active session and return its ID and token.
    pub async fn create_test_user(&self, email: &str) -> (Uuid, String) {
        let password_hash = hash_password(TEST_PASSWORD).expect("Failed to hash password");
        let user = self
            .db
            .create_user("Test User", email, &password_hash)
            .await
            .expect("Failed to create test user");
        let session = self
            .db
            .create_session(user.id)
            .await
            .expect("Failed to create test session");
        (user.id, session.token)
    }

    /// Format authorization header value.
    pub fn auth_header_value(token: &str) -> String {
        format!("Bearer {}", token)
    }

    /// Clean up test data for a user.
    ///
    /// Habits, completions, sessions and archives cascade from the user row.
    pub async fn cleanup_user(&self, user_id: Uuid) {
        let _ = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await;
    }
}

/// Build the test router with all routes.
fn build_test_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/habits", get(routes::habits::list))
        .route("/api/habits", post(routes::habits::create))
        .route("/api/habits/{id}", get(routes::habits::get_habit))
        .route("/api/habits/{id}", put(routes::habits::update))
        .route("/api/habits/{id}", delete(routes::habits::archive))
        .route("/api/habits/{id}/complete", post(routes::habits::complete))
        .route(
            "/api/habits/{id}/complete",
            delete(routes::habits::uncomplete),
        )
        .route("/api/habits/{id}/stats", get(routes::habits::stats))
        .route("/api/deleted-habits", get(routes::deleted_habits::list))
        .route(
            "/api/deleted-habits/{id}/restore",
            post(routes::deleted_habits::restore),
        )
        .route(
            "/api/deleted-habits/{id}",
            delete(routes::deleted_habits::purge),
        )
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

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .merge(protected_routes)
        .with_state(state)
}
