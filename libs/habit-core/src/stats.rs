//! Streak and success-rate statistics.
//!
//! Pure functions over already-fetched completion records. Callers pass the
//! current date explicitly so results are deterministic under test.

use chrono::{Days, NaiveDate};

use crate::types::CompletionDay;

/// Maximum number of days the streak walk looks back.
///
/// A streak is never reported longer than this, even if older completions
/// exist.
pub const STREAK_WINDOW_DAYS: u64 = 365;

/// Whether a completed record exists for the exact calendar day.
pub fn completed_on(completions: &[CompletionDay], day: NaiveDate) -> bool {
    completions.iter().any(|c| c.date == day && c.completed)
}

/// Count of consecutive completed days ending at `today`.
///
/// Walks backward one day at a time and stops at the first day without a
/// completed record, so a habit not completed today always reports 0. The
/// walk is capped at [`STREAK_WINDOW_DAYS`].
pub fn streak(completions: &[CompletionDay], today: NaiveDate) -> u32 {
    let mut count = 0;

    for offset in 0..STREAK_WINDOW_DAYS {
        let day = match today.checked_sub_days(Days::new(offset)) {
            Some(day) => day,
            None => break,
        };

        if completed_on(completions, day) {
            count += 1;
        } else {
            break;
        }
    }

    count
}

/// Integer success percentage: completions over days since the habit was
/// created, rounded.
///
/// A non-positive day count yields 0 rather than dividing by zero.
pub fn success_rate(total_completions: u32, days_since_creation: i64) -> u32 {
    if days_since_creation <= 0 {
        return 0;
    }

    let rate = f64::from(total_completions) * 100.0 / days_since_creation as f64;
    rate.round() as u32
}
