//! Test fixtures and factory functions for creating test data.

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

/// Generate a unique email to avoid collisions between test runs.
pub fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, &Uuid::new_v4().to_string()[..8])
}

/// Today's date as a `YYYY-MM-DD` string.
pub fn today() -> String {
    Utc::now().date_naive().to_string()
}

/// A date `days` before today as a `YYYY-MM-DD` string.
pub fn days_ago(days: u64) -> String {
    Utc::now()
        .date_naive()
        .checked_sub_days(chrono::Days::new(days))
        .unwrap()
        .to_string()
}

/// Create a signup request body.
pub fn signup_request(name: &str, email: &str, password: &str) -> serde_json::Value {
    json!({ "name": name, "email": email, "password": password })
}

/// Create a login request body.
pub fn login_request(email: &str, password: &str) -> serde_json::Value {
    json!({ "email": email, "password": password })
}

/// Create-habit request body with only the required fields.
pub fn create_habit_request(name: &str) -> serde_json::Value {
    json!({ "name": name, "category": "health" })
}

/// Create-habit request body with the full field set.
pub fn create_habit_request_full(
    name: &str,
    frequency: &str,
    category: &str,
    color: &str,
) -> serde_json::Value {
    json!({
        "name": name,
        "frequency": frequency,
        "category": category,
        "color": color
    })
}

/// Completion request body for a date.
pub fn complete_request(date: &str) -> serde_json::Value {
    json!({ "date": date })
}

/// Completion request body with notes.
pub fn complete_request_with_notes(date: &str, notes: &str) -> serde_json::Value {
    json!({ "date": date, "notes": notes })
}

/// Update-profile request body.
pub fn update_profile_request(name: &str, email: &str) -> serde_json::Value {
    json!({ "name": name, "email": email })
}

/// Change-password request body.
pub fn change_password_request(current: &str, new: &str) -> serde_json::Value {
    json!({ "current_password": current, "new_password": new })
}
