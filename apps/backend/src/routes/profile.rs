//! Profile endpoints

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use std::collections::HashMap;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::{hash_password, verify_password, AuthenticatedUser};
use crate::routes::habits::{compute_stats, days_since_creation};
use crate::AppState;

/// GET /api/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .db
        .get_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user: user.to_public(),
    }))
}

/// PUT /api/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    payload.validate()?;

    // Reject an email already held by a different account
    if payload.email != auth.email {
        if let Some(existing) = state.db.get_user_by_email(&payload.email).await? {
            if existing.id != auth.user_id {
                return Err(ApiError::Conflict(
                    "A user with this email already exists".to_string(),
                ));
            }
        }
    }

    let user = state
        .db
        .update_user_profile(auth.user_id, &payload.name, &payload.email)
        .await?;

    Ok(Json(ProfileResponse {
        user: user.to_public(),
    }))
}

/// PUT /api/profile/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    payload.validate()?;

    let user = state
        .db
        .get_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.new_password)?;
    state
        .db
        .update_user_password(auth.user_id, &password_hash)
        .await?;

    Ok(Json(serde_json::json!({ "changed": true })))
}

/// GET /api/profile/stats
///
/// Account-wide aggregates across all active habits.
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileStatsResponse>> {
    let now = Utc::now();
    let today = now.date_naive();
    let habits = state.db.get_habits(auth.user_id).await?;

    let mut total_completions = 0u32;
    let mut completed_today = 0u32;
    let mut longest_streak = 0u32;
    let mut possible_days = 0i64;
    let mut habits_by_category: HashMap<String, u32> = HashMap::new();

    for habit in &habits {
        let stats = compute_stats(&state, habit, today, now).await?;

        total_completions += stats.total_completions;
        if stats.completed_today {
            completed_today += 1;
        }
        longest_streak = longest_streak.max(stats.streak);
        possible_days += days_since_creation(habit.created_at, now);
        *habits_by_category.entry(habit.category.clone()).or_insert(0) += 1;
    }

    Ok(Json(ProfileStatsResponse {
        total_habits: habits.len() as u32,
        total_completions,
        completed_today,
        success_rate: habit_core::success_rate(total_completions, possible_days),
        longest_streak,
        habits_by_category,
    }))
}
