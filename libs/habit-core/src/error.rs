//! Error types for habit-core.

use thiserror::Error;

/// Result type alias using ParseError.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur when parsing domain values from strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown frequency: {0}")]
    UnknownFrequency(String),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
