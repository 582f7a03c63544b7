//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, Result};

// Re-export shared types from habit-core
pub use habit_core::types::{Category, CompletionDay, Frequency};

/// Default habit color (blue).
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// Default habit icon.
pub const DEFAULT_ICON: &str = "heart";

// === Database Entity Types ===

/// Application user account
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of the account, safe to return to clients.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Login session backed by an opaque bearer token
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Active habit row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub category: String,
    pub icon_name: String,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completion record for one (habit, calendar day) pair
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HabitCompletion {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HabitCompletion {
    /// Project to the core type consumed by the statistics functions.
    pub fn to_completion_day(&self) -> CompletionDay {
        CompletionDay {
            date: self.date,
            completed: self.completed,
        }
    }
}

/// Archived habit row, duplicated from the active table at archive time
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeletedHabit {
    pub id: Uuid,
    pub original_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub category: String,
    pub icon_name: String,
    pub color: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

/// Archived completion row owned by a DeletedHabit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeletedHabitCompletion {
    pub id: Uuid,
    pub deleted_habit_id: Uuid,
    pub date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// === Validated Input ===

/// Validated, typed fields for creating a habit.
#[derive(Debug, Clone)]
pub struct HabitFields {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub category: Category,
    pub icon_name: String,
    pub color: String,
}

/// Check a `#RRGGBB` hex color string.
fn parse_color(color: &str) -> Result<String> {
    let well_formed = matches!(
        color.strip_prefix('#'),
        Some(hex) if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())
    );

    if well_formed {
        Ok(color.to_string())
    } else {
        Err(ApiError::Validation(format!(
            "color must be in #RRGGBB format: {color}"
        )))
    }
}

/// Parse a `YYYY-MM-DD` calendar date from untrusted input.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let well_formed = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !well_formed {
        return Err(ApiError::Validation(format!(
            "invalid date format (expected YYYY-MM-DD): {value}"
        )));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation(format!("invalid calendar date: {value}")))
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: String,
    #[validate(
        email(message = "invalid email format"),
        length(max = 255, message = "email cannot exceed 255 characters")
    )]
    pub email: String,
    #[validate(length(min = 8, max = 100, message = "password must be 8-100 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub category: String,
    #[validate(length(min = 1, message = "icon name is required"))]
    pub icon_name: Option<String>,
    pub color: Option<String>,
}

impl CreateHabitRequest {
    /// Validate and resolve defaults into typed habit fields.
    pub fn into_fields(self) -> Result<HabitFields> {
        self.validate()?;

        let frequency = match self.frequency.as_deref() {
            Some(value) => value.parse::<Frequency>()?,
            None => Frequency::default(),
        };
        let category = self.category.parse::<Category>()?;
        let color = match self.color.as_deref() {
            Some(value) => parse_color(value)?,
            None => DEFAULT_COLOR.to_string(),
        };
        let icon_name = self
            .icon_name
            .unwrap_or_else(|| DEFAULT_ICON.to_string());

        Ok(HabitFields {
            name: self.name,
            description: self.description,
            frequency,
            category,
            icon_name,
            color,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub category: Option<String>,
    #[validate(length(min = 1, message = "icon name is required"))]
    pub icon_name: Option<String>,
    pub color: Option<String>,
}

impl UpdateHabitRequest {
    /// Validate and apply the supplied fields onto an existing habit.
    pub fn apply_to(self, habit: &mut Habit) -> Result<()> {
        self.validate()?;

        if let Some(name) = self.name {
            habit.name = name;
        }
        if let Some(description) = self.description {
            habit.description = Some(description);
        }
        if let Some(frequency) = self.frequency {
            habit.frequency = frequency.parse::<Frequency>()?.as_str().to_string();
        }
        if let Some(category) = self.category {
            habit.category = category.parse::<Category>()?.as_str().to_string();
        }
        if let Some(icon_name) = self.icon_name {
            habit.icon_name = icon_name;
        }
        if let Some(color) = self.color {
            habit.color = parse_color(&color)?;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteHabitRequest {
    pub date: String,
    #[validate(length(max = 500, message = "notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UncompleteQuery {
    pub date: Option<String>,
}

/// Derived statistics for one habit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitStats {
    pub streak: u32,
    pub completed_today: bool,
    pub success_rate: u32,
    pub total_completions: u32,
}

/// Habit with its recent completions and derived statistics
#[derive(Debug, Serialize)]
pub struct HabitDetail {
    #[serde(flatten)]
    pub habit: Habit,
    pub completions: Vec<HabitCompletion>,
    pub stats: HabitStats,
}

#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<HabitDetail>,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    pub habit: Habit,
}

#[derive(Debug, Serialize)]
pub struct ArchiveResponse {
    pub deleted_habit_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub completion: HabitCompletion,
}

/// Archived habit with its archived completions
#[derive(Debug, Serialize)]
pub struct DeletedHabitDetail {
    #[serde(flatten)]
    pub deleted_habit: DeletedHabit,
    pub completions: Vec<DeletedHabitCompletion>,
}

#[derive(Debug, Serialize)]
pub struct DeletedHabitListResponse {
    pub deleted_habits: Vec<DeletedHabitDetail>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "name must be 2-100 characters"))]
    pub name: String,
    #[validate(
        email(message = "invalid email format"),
        length(max = 255, message = "email cannot exceed 255 characters")
    )]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, max = 100, message = "password must be 8-100 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}

/// Account-wide statistics across all active habits
#[derive(Debug, Serialize)]
pub struct ProfileStatsResponse {
    pub total_habits: u32,
    pub total_completions: u32,
    pub completed_today: u32,
    pub success_rate: u32,
    pub longest_streak: u32,
    pub habits_by_category: HashMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_resolves_defaults() {
        let request = CreateHabitRequest {
            name: "Drink water".to_string(),
            description: None,
            frequency: None,
            category: "health".to_string(),
            icon_name: None,
            color: None,
        };

        let fields = request.into_fields().unwrap();
        assert_eq!(fields.frequency, Frequency::Daily);
        assert_eq!(fields.color, DEFAULT_COLOR);
        assert_eq!(fields.icon_name, DEFAULT_ICON);
    }

    #[test]
    fn create_request_rejects_short_name() {
        let request = CreateHabitRequest {
            name: "x".to_string(),
            description: None,
            frequency: None,
            category: "health".to_string(),
            icon_name: None,
            color: None,
        };

        assert!(matches!(
            request.into_fields(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn create_request_rejects_unknown_category() {
        let request = CreateHabitRequest {
            name: "Drink water".to_string(),
            description: None,
            frequency: None,
            category: "sports".to_string(),
            icon_name: None,
            color: None,
        };

        assert!(matches!(
            request.into_fields(),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn parse_color_accepts_hex() {
        assert_eq!(parse_color("#3b82f6").unwrap(), "#3b82f6");
        assert_eq!(parse_color("#FF00aa").unwrap(), "#FF00aa");
    }

    #[test]
    fn parse_color_rejects_malformed() {
        assert!(parse_color("3b82f6").is_err());
        assert!(parse_color("#3b82f").is_err());
        assert!(parse_color("#3b82g6").is_err());
        assert!(parse_color("#3b82f6aa").is_err());
    }

    #[test]
    fn parse_date_accepts_iso_day() {
        let date = parse_date("2024-01-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn parse_date_rejects_malformed() {
        assert!(parse_date("2024-1-1").is_err());
        assert!(parse_date("01-01-2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("not-a-date").is_err());
    }
}
