//! Core types for habit tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// How often a habit is meant to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Default for Frequency {
    fn default() -> Self {
        Self::Daily
    }
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(ParseError::UnknownFrequency(other.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Habit category, fixed set of ten values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Health,
    Fitness,
    Learning,
    Productivity,
    Lifestyle,
    Creativity,
    Mindfulness,
    Social,
    Finance,
    Nature,
}

impl Category {
    /// All valid categories, in display order.
    pub const ALL: [Category; 10] = [
        Self::Health,
        Self::Fitness,
        Self::Learning,
        Self::Productivity,
        Self::Lifestyle,
        Self::Creativity,
        Self::Mindfulness,
        Self::Social,
        Self::Finance,
        Self::Nature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Fitness => "fitness",
            Self::Learning => "learning",
            Self::Productivity => "productivity",
            Self::Lifestyle => "lifestyle",
            Self::Creativity => "creativity",
            Self::Mindfulness => "mindfulness",
            Self::Social => "social",
            Self::Finance => "finance",
            Self::Nature => "nature",
        }
    }
}

impl FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(Self::Health),
            "fitness" => Ok(Self::Fitness),
            "learning" => Ok(Self::Learning),
            "productivity" => Ok(Self::Productivity),
            "lifestyle" => Ok(Self::Lifestyle),
            "creativity" => Ok(Self::Creativity),
            "mindfulness" => Ok(Self::Mindfulness),
            "social" => Ok(Self::Social),
            "finance" => Ok(Self::Finance),
            "nature" => Ok(Self::Nature),
            other => Err(ParseError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single day's completion record for a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionDay {
    pub date: NaiveDate,
    pub completed: bool,
}
