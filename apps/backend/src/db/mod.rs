//! PostgreSQL database operations

use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === User Repository ===

    /// Create a new user account
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique_violation(
            "A user with this email already exists",
        ))?;

        Ok(user)
    }

    /// Get user by email
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Get user by id
    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user name and email
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, name, password_hash, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique_violation(
            "A user with this email already exists",
        ))?;

        Ok(user)
    }

    /// Replace the stored password hash
    pub async fn update_user_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Session Repository ===

    /// Create a session with a generated token, valid for 30 days
    pub async fn create_session(&self, user_id: Uuid) -> Result<Session> {
        let token = Uuid::new_v4().to_string();
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, NOW() + INTERVAL '30 days')
            RETURNING token, user_id, created_at, expires_at
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// Get the user behind an unexpired session token
    pub async fn get_session_user(&self, token: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.name, u.password_hash, u.created_at, u.updated_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Delete a session token
    pub async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Habit Repository ===

    /// Create a new active habit
    pub async fn create_habit(&self, user_id: Uuid, fields: &HabitFields) -> Result<Habit> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, name, description, frequency, category, icon_name, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, name, description, frequency, category, icon_name, color,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.frequency.as_str())
        .bind(fields.category.as_str())
        .bind(&fields.icon_name)
        .bind(&fields.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(habit)
    }

    /// Get an active habit owned by the user
    pub async fn get_habit(&self, user_id: Uuid, habit_id: Uuid) -> Result<Option<Habit>> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, frequency, category, icon_name, color,
                   is_active, created_at, updated_at
            FROM habits
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(habit)
    }

    /// Get all active habits for a user, newest first
    pub async fn get_habits(&self, user_id: Uuid) -> Result<Vec<Habit>> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, frequency, category, icon_name, color,
                   is_active, created_at, updated_at
            FROM habits
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(habits)
    }

    /// Persist the full field set of a habit, refreshing updated_at
    pub async fn update_habit(&self, habit: &Habit) -> Result<Habit> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits
            SET name = $2, description = $3, frequency = $4, category = $5,
                icon_name = $6, color = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, name, description, frequency, category, icon_name, color,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(habit.id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(&habit.frequency)
        .bind(&habit.category)
        .bind(&habit.icon_name)
        .bind(&habit.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(habit)
    }

    // === Completion Repository ===

    /// Get the most recent completions for a habit
    pub async fn get_recent_completions(
        &self,
        habit_id: Uuid,
        limit: i64,
    ) -> Result<Vec<HabitCompletion>> {
        let completions = sqlx::query_as::<_, HabitCompletion>(
            r#"
            SELECT id, habit_id, date, completed, notes, created_at
            FROM habit_completions
            WHERE habit_id = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(habit_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }

    /// Get completions on or after a date (the streak window)
    pub async fn get_completions_since(
        &self,
        habit_id: Uuid,
        since: NaiveDate,
    ) -> Result<Vec<HabitCompletion>> {
        let completions = sqlx::query_as::<_, HabitCompletion>(
            r#"
            SELECT id, habit_id, date, completed, notes, created_at
            FROM habit_completions
            WHERE habit_id = $1 AND date >= $2
            ORDER BY date DESC
            "#,
        )
        .bind(habit_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }

    /// Count completed records for a habit
    pub async fn count_completions(&self, habit_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM habit_completions
            WHERE habit_id = $1 AND completed = TRUE
            "#,
        )
        .bind(habit_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Upsert the completion record for one (habit, date) pair.
    ///
    /// Notes are only replaced when a new value is supplied; passing None
    /// keeps whatever the existing record holds.
    pub async fn upsert_completion(
        &self,
        habit_id: Uuid,
        date: NaiveDate,
        completed: bool,
        notes: Option<&str>,
    ) -> Result<HabitCompletion> {
        let completion = sqlx::query_as::<_, HabitCompletion>(
            r#"
            INSERT INTO habit_completions (habit_id, date, completed, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (habit_id, date) DO UPDATE SET
                completed = EXCLUDED.completed,
                notes = COALESCE(EXCLUDED.notes, habit_completions.notes)
            RETURNING id, habit_id, date, completed, notes, created_at
            "#,
        )
        .bind(habit_id)
        .bind(date)
        .bind(completed)
        .bind(notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(completion)
    }

    /// Delete the completion record for one (habit, date) pair.
    ///
    /// Tolerant of zero matches; returns the number of rows removed.
    pub async fn remove_completion(&self, habit_id: Uuid, date: NaiveDate) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM habit_completions
            WHERE habit_id = $1 AND date = $2
            "#,
        )
        .bind(habit_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // === Deleted Habit Repository ===

    /// Archive an active habit into the deleted_habits table.
    ///
    /// Runs in a single transaction: the habit row and every completion are
    /// duplicated into the archive tables before the active row is deleted,
    /// so a failure partway leaves the habit untouched. Returns None if no
    /// active habit matches.
    pub async fn archive_habit(
        &self,
        user_id: Uuid,
        habit_id: Uuid,
    ) -> Result<Option<DeletedHabit>> {
        let mut tx = self.pool.begin().await?;

        let habit = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, description, frequency, category, icon_name, color,
                   is_active, created_at, updated_at
            FROM habits
            WHERE id = $1 AND user_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(habit) = habit else {
            return Ok(None);
        };

        let completions = sqlx::query_as::<_, HabitCompletion>(
            r#"
            SELECT id, habit_id, date, completed, notes, created_at
            FROM habit_completions
            WHERE habit_id = $1
            "#,
        )
        .bind(habit_id)
        .fetch_all(&mut *tx)
        .await?;

        let deleted = sqlx::query_as::<_, DeletedHabit>(
            r#"
            INSERT INTO deleted_habits (original_id, user_id, name, description, frequency,
                                        category, icon_name, color, is_active, created_at,
                                        updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            RETURNING id, original_id, user_id, name, description, frequency, category,
                      icon_name, color, is_active, created_at, updated_at, deleted_at
            "#,
        )
        .bind(habit.id)
        .bind(habit.user_id)
        .bind(&habit.name)
        .bind(&habit.description)
        .bind(&habit.frequency)
        .bind(&habit.category)
        .bind(&habit.icon_name)
        .bind(&habit.color)
        .bind(habit.is_active)
        .bind(habit.created_at)
        .bind(habit.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        for completion in &completions {
            sqlx::query(
                r#"
                INSERT INTO deleted_habit_completions (deleted_habit_id, date, completed,
                                                       notes, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(deleted.id)
            .bind(completion.date)
            .bind(completion.completed)
            .bind(&completion.notes)
            .bind(completion.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // Cascade removes the active completion rows.
        sqlx::query(
            r#"
            DELETE FROM habits
            WHERE id = $1
            "#,
        )
        .bind(habit_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(deleted))
    }

    /// Get all archived habits for a user, most recently deleted first
    pub async fn get_deleted_habits(&self, user_id: Uuid) -> Result<Vec<DeletedHabit>> {
        let deleted = sqlx::query_as::<_, DeletedHabit>(
            r#"
            SELECT id, original_id, user_id, name, description, frequency, category,
                   icon_name, color, is_active, created_at, updated_at, deleted_at
            FROM deleted_habits
            WHERE user_id = $1
            ORDER BY deleted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(deleted)
    }

    /// Get one archived habit owned by the user
    pub async fn get_deleted_habit(
        &self,
        user_id: Uuid,
        deleted_habit_id: Uuid,
    ) -> Result<Option<DeletedHabit>> {
        let deleted = sqlx::query_as::<_, DeletedHabit>(
            r#"
            SELECT id, original_id, user_id, name, description, frequency, category,
                   icon_name, color, is_active, created_at, updated_at, deleted_at
            FROM deleted_habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(deleted_habit_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted)
    }

    /// Get the most recent archived completions for a deleted habit
    pub async fn get_archived_completions(
        &self,
        deleted_habit_id: Uuid,
        limit: i64,
    ) -> Result<Vec<DeletedHabitCompletion>> {
        let completions = sqlx::query_as::<_, DeletedHabitCompletion>(
            r#"
            SELECT id, deleted_habit_id, date, completed, notes, created_at
            FROM deleted_habit_completions
            WHERE deleted_habit_id = $1
            ORDER BY date DESC
            LIMIT $2
            "#,
        )
        .bind(deleted_habit_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }

    /// Restore an archived habit under its original id.
    ///
    /// Runs in a single transaction: the active habit and every archived
    /// completion are recreated before the archive row is deleted. Fails
    /// with NotFound if the archive row is absent or not owned, and with
    /// Conflict if an active habit already holds the original id (the
    /// archive row is left untouched in both cases).
    pub async fn restore_habit(&self, user_id: Uuid, deleted_habit_id: Uuid) -> Result<Habit> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, DeletedHabit>(
            r#"
            SELECT id, original_id, user_id, name, description, frequency, category,
                   icon_name, color, is_active, created_at, updated_at, deleted_at
            FROM deleted_habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(deleted_habit_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::NotFound("Deleted habit not found".to_string()))?;

        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(deleted.original_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(ApiError::Conflict(
                "An active habit with this id already exists".to_string(),
            ));
        }

        let completions = sqlx::query_as::<_, DeletedHabitCompletion>(
            r#"
            SELECT id, deleted_habit_id, date, completed, notes, created_at
            FROM deleted_habit_completions
            WHERE deleted_habit_id = $1
            "#,
        )
        .bind(deleted_habit_id)
        .fetch_all(&mut *tx)
        .await?;

        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (id, user_id, name, description, frequency, category,
                                icon_name, color, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            RETURNING id, user_id, name, description, frequency, category, icon_name, color,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(deleted.original_id)
        .bind(deleted.user_id)
        .bind(&deleted.name)
        .bind(&deleted.description)
        .bind(&deleted.frequency)
        .bind(&deleted.category)
        .bind(&deleted.icon_name)
        .bind(&deleted.color)
        .bind(deleted.is_active)
        .bind(deleted.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(conflict_on_unique_violation(
            "An active habit with this id already exists",
        ))?;

        for completion in &completions {
            sqlx::query(
                r#"
                INSERT INTO habit_completions (habit_id, date, completed, notes, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(habit.id)
            .bind(completion.date)
            .bind(completion.completed)
            .bind(&completion.notes)
            .bind(completion.created_at)
            .execute(&mut *tx)
            .await?;
        }

        // Cascade removes the archived completion rows.
        sqlx::query(
            r#"
            DELETE FROM deleted_habits
            WHERE id = $1
            "#,
        )
        .bind(deleted_habit_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(habit)
    }

    /// Permanently delete an archived habit and its completions
    pub async fn purge_deleted_habit(&self, user_id: Uuid, deleted_habit_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM deleted_habits
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(deleted_habit_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map a unique-key violation to Conflict, leaving other errors as Database.
fn conflict_on_unique_violation(message: &str) -> impl FnOnce(sqlx::Error) -> ApiError + '_ {
    move |error| match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict(message.to_string())
        }
        _ => ApiError::Database(error),
    }
}
