//! Habit CRUD API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use common::fixtures;
use common::TestContext;

/// Test creating a habit applies defaults for omitted fields.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_habit_with_defaults() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("create")).await;

    let response = server
        .post("/api/habits")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_habit_request("Read a book"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["habit"]["name"], "Read a book");
    assert_eq!(body["habit"]["category"], "health");
    assert_eq!(body["habit"]["frequency"], "daily");
    assert_eq!(body["habit"]["color"], "#3b82f6");
    assert_eq!(body["habit"]["icon_name"], "heart");
    assert_eq!(body["habit"]["is_active"], true);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test creating a habit with the full field set.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_habit_full_fields() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("full")).await;

    let response = server
        .post("/api/habits")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .json(&fixtures::create_habit_request_full(
            "Evening run",
            "weekly",
            "fitness",
            "#10b981",
        ))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["habit"]["frequency"], "weekly");
    assert_eq!(body["habit"]["category"], "fitness");
    assert_eq!(body["habit"]["color"], "#10b981");

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test create rejects values outside the allowed domains.
#[tokio::test]
#[ignore = "requires database"]
async fn test_create_habit_rejects_invalid_fields() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("invalid")).await;

    let auth = TestContext::auth_header_value(&token);

    // Name below the 2-character minimum.
    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "x", "category": "health" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Unknown category.
    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Stretch", "category": "sports" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Unknown frequency.
    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Stretch", "category": "health", "frequency": "yearly" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Malformed color.
    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Stretch", "category": "health", "color": "blue" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test list is empty for a fresh user.
#[tokio::test]
#[ignore = "requires database"]
async fn test_list_habits_empty() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("empty")).await;

    let response = server
        .get("/api/habits")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["habits"].as_array().unwrap().is_empty());

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test list carries completions and derived statistics per habit.
#[tokio::test]
#[ignore = "requires database"]
async fn test_list_includes_stats() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("stats")).await;
    let auth = TestContext::auth_header_value(&token);

    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_habit_request("Meditate"))
        .await;
    let habit_id = response.json::<serde_json::Value>()["habit"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Two consecutive days ending today.
    for date in [fixtures::days_ago(1), fixtures::today()] {
        server
            .post(&format!("/api/habits/{}/complete", habit_id))
            .add_header(axum::http::header::AUTHORIZATION, auth.clone())
            .json(&fixtures::complete_request(&date))
            .await
            .assert_status_ok();
    }

    let response = server
        .get("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let habits = body["habits"].as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["stats"]["streak"], 2);
    assert_eq!(habits[0]["stats"]["completed_today"], true);
    assert_eq!(habits[0]["stats"]["total_completions"], 2);
    assert_eq!(habits[0]["completions"].as_array().unwrap().len(), 2);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test getting an unknown habit returns 404.
#[tokio::test]
#[ignore = "requires database"]
async fn test_get_habit_not_found() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("missing")).await;

    let response = server
        .get(&format!("/api/habits/{}", uuid::Uuid::new_v4()))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&token),
        )
        .await;

    response.assert_status(StatusCode::NOT_FOUND);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test a habit is invisible to other users.
#[tokio::test]
#[ignore = "requires database"]
async fn test_habit_not_visible_to_other_user() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (owner_id, owner_token) = ctx.create_test_user(&fixtures::unique_email("owner")).await;
    let (other_id, other_token) = ctx.create_test_user(&fixtures::unique_email("other")).await;

    let response = server
        .post("/api/habits")
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&owner_token),
        )
        .json(&fixtures::create_habit_request("Private habit"))
        .await;
    let habit_id = response.json::<serde_json::Value>()["habit"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .get(&format!("/api/habits/{}", habit_id))
        .add_header(
            axum::http::header::AUTHORIZATION,
            TestContext::auth_header_value(&other_token),
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Cleanup
    ctx.cleanup_user(owner_id).await;
    ctx.cleanup_user(other_id).await;
}

/// Test partial update changes only the supplied fields.
#[tokio::test]
#[ignore = "requires database"]
async fn test_update_habit_partial() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("update")).await;
    let auth = TestContext::auth_header_value(&token);

    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_habit_request_full(
            "Journal",
            "daily",
            "mindfulness",
            "#8b5cf6",
        ))
        .await;
    let habit_id = response.json::<serde_json::Value>()["habit"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .put(&format!("/api/habits/{}", habit_id))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&json!({ "name": "Morning journal", "color": "#f59e0b" }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["habit"]["name"], "Morning journal");
    assert_eq!(body["habit"]["color"], "#f59e0b");
    // Untouched fields keep their values.
    assert_eq!(body["habit"]["category"], "mindfulness");
    assert_eq!(body["habit"]["frequency"], "daily");

    // Cleanup
    ctx.cleanup_user(user_id).await;
}

/// Test update rejects invalid field values.
#[tokio::test]
#[ignore = "requires database"]
async fn test_update_habit_rejects_invalid_frequency() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();
    let (user_id, token) = ctx.create_test_user(&fixtures::unique_email("badupd")).await;
    let auth = TestContext::auth_header_value(&token);

    let response = server
        .post("/api/habits")
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&fixtures::create_habit_request("Stretch"))
        .await;
    let habit_id = response.json::<serde_json::Value>()["habit"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = server
        .put(&format!("/api/habits/{}", habit_id))
        .add_header(axum::http::header::AUTHORIZATION, auth.clone())
        .json(&json!({ "frequency": "hourly" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    // Cleanup
    ctx.cleanup_user(user_id).await;
}
