//! Habit endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

/// How many completion records habit responses carry.
const RECENT_COMPLETIONS: i64 = 30;

/// Whole days elapsed since a habit was created, rounded up.
pub(crate) fn days_since_creation(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (now - created_at).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds + 86_399) / 86_400
}

/// Derive streak/completion statistics for one habit.
pub(crate) async fn compute_stats(
    state: &AppState,
    habit: &Habit,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<HabitStats> {
    let window_start = today
        .checked_sub_days(Days::new(habit_core::STREAK_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN);
    let window = state
        .db
        .get_completions_since(habit.id, window_start)
        .await?;
    let days: Vec<CompletionDay> = window.iter().map(|c| c.to_completion_day()).collect();
    let total = state.db.count_completions(habit.id).await?;

    Ok(HabitStats {
        streak: habit_core::streak(&days, today),
        completed_today: habit_core::completed_on(&days, today),
        success_rate: habit_core::success_rate(
            total as u32,
            days_since_creation(habit.created_at, now),
        ),
        total_completions: total as u32,
    })
}

/// Assemble a habit with its recent completions and statistics.
async fn load_detail(state: &AppState, habit: Habit) -> Result<HabitDetail> {
    let now = Utc::now();
    let completions = state
        .db
        .get_recent_completions(habit.id, RECENT_COMPLETIONS)
        .await?;
    let stats = compute_stats(state, &habit, now.date_naive(), now).await?;

    Ok(HabitDetail {
        habit,
        completions,
        stats,
    })
}

/// GET /api/habits
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<HabitListResponse>> {
    let habits = state.db.get_habits(auth.user_id).await?;

    let mut details = Vec::with_capacity(habits.len());
    for habit in habits {
        details.push(load_detail(&state, habit).await?);
    }

    Ok(Json(HabitListResponse { habits: details }))
}

/// POST /api/habits
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>)> {
    let fields = payload.into_fields()?;
    let habit = state.db.create_habit(auth.user_id, &fields).await?;

    tracing::info!("Created habit {} for user {}", habit.id, auth.user_id);

    Ok((StatusCode::CREATED, Json(HabitResponse { habit })))
}

/// GET /api/habits/:id
pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<HabitDetail>> {
    let habit = state
        .db
        .get_habit(auth.user_id, habit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    Ok(Json(load_detail(&state, habit).await?))
}

/// PUT /api/habits/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitResponse>> {
    let mut habit = state
        .db
        .get_habit(auth.user_id, habit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    payload.apply_to(&mut habit)?;
    let habit = state.db.update_habit(&habit).await?;

    Ok(Json(HabitResponse { habit }))
}

/// DELETE /api/habits/:id
///
/// Archives the habit: the row and its completions move to the deleted
/// tables and the active row is removed.
pub async fn archive(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<ArchiveResponse>> {
    let deleted = state
        .db
        .archive_habit(auth.user_id, habit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    tracing::info!("Archived habit {} as {}", habit_id, deleted.id);

    Ok(Json(ArchiveResponse {
        deleted_habit_id: deleted.id,
    }))
}

/// POST /api/habits/:id/complete
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
    Json(payload): Json<CompleteHabitRequest>,
) -> Result<Json<CompletionResponse>> {
    payload.validate()?;
    let date = parse_date(&payload.date)?;

    state
        .db
        .get_habit(auth.user_id, habit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    let completion = state
        .db
        .upsert_completion(habit_id, date, true, payload.notes.as_deref())
        .await?;

    Ok(Json(CompletionResponse { completion }))
}

/// DELETE /api/habits/:id/complete?date=YYYY-MM-DD
pub async fn uncomplete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<UncompleteQuery>,
) -> Result<Json<serde_json::Value>> {
    let date = query
        .date
        .ok_or_else(|| ApiError::BadRequest("date query parameter is required".to_string()))?;
    let date = parse_date(&date)?;

    state
        .db
        .get_habit(auth.user_id, habit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    let removed = state.db.remove_completion(habit_id, date).await?;

    Ok(Json(serde_json::json!({ "deleted": removed > 0 })))
}

/// GET /api/habits/:id/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(habit_id): Path<Uuid>,
) -> Result<Json<HabitStats>> {
    let habit = state
        .db
        .get_habit(auth.user_id, habit_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Habit not found".to_string()))?;

    let now = Utc::now();
    let stats = compute_stats(&state, &habit, now.date_naive(), now).await?;

    Ok(Json(stats))
}
