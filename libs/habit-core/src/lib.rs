//! Core habit library shared by the backend.
//!
//! Provides:
//! - Streak and success-rate statistics over completion records
//! - Shared domain types (Frequency, Category, CompletionDay)

pub mod error;
pub mod stats;
pub mod types;

pub use error::{ParseError, Result};
pub use stats::{completed_on, streak, success_rate, STREAK_WINDOW_DAYS};
pub use types::{Category, CompletionDay, Frequency};
