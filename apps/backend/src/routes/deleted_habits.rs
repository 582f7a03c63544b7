//! Deleted habit endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// How many archived completion records list responses carry.
const RECENT_COMPLETIONS: i64 = 30;

/// GET /api/deleted-habits
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DeletedHabitListResponse>> {
    let deleted = state.db.get_deleted_habits(auth.user_id).await?;

    let mut details = Vec::with_capacity(deleted.len());
    for deleted_habit in deleted {
        let completions = state
            .db
            .get_archived_completions(deleted_habit.id, RECENT_COMPLETIONS)
            .await?;
        details.push(DeletedHabitDetail {
            deleted_habit,
            completions,
        });
    }

    Ok(Json(DeletedHabitListResponse {
        deleted_habits: details,
    }))
}

/// POST /api/deleted-habits/:id/restore
///
/// Recreates the habit under its original id along with its completion
/// history, then removes the archive entry.
pub async fn restore(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deleted_habit_id): Path<Uuid>,
) -> Result<Json<HabitResponse>> {
    let habit = state
        .db
        .restore_habit(auth.user_id, deleted_habit_id)
        .await?;

    tracing::info!("Restored habit {} from archive {}", habit.id, deleted_habit_id);

    Ok(Json(HabitResponse { habit }))
}

/// DELETE /api/deleted-habits/:id
///
/// Permanently removes the archived habit and its completions.
pub async fn purge(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(deleted_habit_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let purged = state
        .db
        .purge_deleted_habit(auth.user_id, deleted_habit_id)
        .await?;

    if !purged {
        return Err(ApiError::NotFound("Deleted habit not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
