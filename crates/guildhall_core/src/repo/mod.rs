//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per aggregate.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Multi-statement writes run inside one transaction.

pub mod activity_repo;
pub mod link_repo;
pub mod notification_repo;
pub mod report_repo;
pub mod user_repo;

use user_repo::{RepoError, RepoResult};

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

/// Clamps list limits to `1..=max`, using `default` for unset or zero.
pub(crate) fn normalize_limit(limit: Option<u32>, default: u32, max: u32) -> u32 {
    match limit {
        None | Some(0) => default,
        Some(value) => value.min(max),
    }
}
