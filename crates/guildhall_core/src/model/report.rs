//! Moderation reports filed by users.
//!
//! # Invariants
//! - A report references exactly one known reportable entity.
//! - `staff_id` is set only once a staff member handled the report.

use super::activity::ActivityId;
use super::image::UserImageId;
use super::user::UserId;
use super::{require_max_chars, require_non_empty, EpochMs, ValidationError};
use serde::{Deserialize, Serialize};

pub type ReportId = i64;

const TITLE_MAX_CHARS: usize = 300;

/// Entity a report points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReportedThing {
    Activity(ActivityId),
    User(UserId),
}

impl ReportedThing {
    pub fn kind_code(self) -> &'static str {
        match self {
            Self::Activity(_) => "activity",
            Self::User(_) => "user",
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Self::Activity(id) | Self::User(id) => id,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "activity" => Some(Self::Activity(id)),
            "user" => Some(Self::User(id)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Deleted,
    Edited,
    Ignored,
}

impl ReportStatus {
    pub fn as_code(self) -> i64 {
        match self {
            Self::Pending => 0,
            Self::Deleted => 1,
            Self::Edited => 2,
            Self::Ignored => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Deleted),
            2 => Some(Self::Edited),
            3 => Some(Self::Ignored),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
    pub owner_id: UserId,
    pub reported_thing: ReportedThing,
    pub reported_thing_title: String,
    pub message: String,
    pub images: Vec<UserImageId>,
    pub staff_id: Option<UserId>,
    pub staff_message: Option<String>,
    pub status: ReportStatus,
    /// Copy of the reported content at filing time.
    pub saved_data: Option<String>,
}

impl Report {
    pub fn new(
        owner_id: UserId,
        reported_thing: ReportedThing,
        reported_thing_title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            created_at: 0,
            updated_at: 0,
            owner_id,
            reported_thing,
            reported_thing_title: reported_thing_title.into(),
            message: message.into(),
            images: Vec::new(),
            staff_id: None,
            staff_message: None,
            status: ReportStatus::Pending,
            saved_data: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("message", &self.message)?;
        require_max_chars("reported_thing_title", &self.reported_thing_title, TITLE_MAX_CHARS)?;
        if self.reported_thing.id() <= 0 {
            return Err(ValidationError::InvalidFormat {
                field: "reported_thing_id",
                message: "must be a positive id".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.status != ReportStatus::Pending
    }
}
