//! Domain model for community profiles, feed and moderation records.
//!
//! # Responsibility
//! - Define canonical records persisted by the repository layer.
//! - Keep derived-string setters (tags, data lists, code lists) next to the
//!   fields they replace.
//!
//! # Invariants
//! - Every persisted record is identified by a SQLite rowid (`i64`).
//! - `validate()` is the single gate for record-level invariants.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod activity;
pub mod image;
pub mod link;
pub mod notification;
pub mod preferences;
pub mod report;
pub mod user;

/// Unix epoch milliseconds.
pub type EpochMs = i64;

/// Returns the current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMs {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as EpochMs)
        .unwrap_or(0)
}

/// Record-level invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trimming.
    EmptyField(&'static str),
    /// Text field exceeds its storage limit (in characters).
    TooLong { field: &'static str, max: usize },
    /// Field content does not match its allowed format.
    InvalidFormat { field: &'static str, message: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` cannot be empty"),
            Self::TooLong { field, max } => {
                write!(f, "`{field}` cannot be longer than {max} characters")
            }
            Self::InvalidFormat { field, message } => write!(f, "invalid `{field}`: {message}"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
