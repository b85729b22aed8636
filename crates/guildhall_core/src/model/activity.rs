//! Activity feed posts and their denormalized owner snapshot.
//!
//! # Responsibility
//! - Hold feed post content and its CSV-encoded tag list.
//! - Carry a time-stamped copy of owner fields so feed rendering does not
//!   need to load the owner and preferences rows.
//!
//! # Invariants
//! - Tag mutators fully replace `tags_string`.
//! - The owner snapshot is fresh for `OWNER_CACHE_TTL_MS` after
//!   `owner_cache_updated_at`; unset means stale.
//! - Refreshing the snapshot always updates all snapshot fields together.

use super::user::UserId;
use super::{require_max_chars, require_non_empty, EpochMs, ValidationError};
use crate::codec::{decode_optional_list, encode_list};
use serde::{Deserialize, Serialize};

pub type ActivityId = i64;

/// Owner snapshot freshness window (20 days).
pub const OWNER_CACHE_TTL_MS: EpochMs = 20 * 24 * 60 * 60 * 1000;

const SUMMARY_MAX_CHARS: usize = 100;
const LANGUAGE_MAX_CHARS: usize = 4;

/// Owner fields copied onto an activity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OwnerSnapshot {
    pub username: Option<String>,
    pub email: String,
    pub status: Option<String>,
    pub twitter: Option<String>,
}

/// Read-only view of the cached owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedOwner {
    pub id: UserId,
    pub username: Option<String>,
    pub email: String,
    pub preferences: CachedOwnerPreferences,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedOwnerPreferences {
    pub status: Option<String>,
    pub twitter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub owner_id: UserId,
    pub created_at: EpochMs,
    pub updated_at: EpochMs,
    pub message: String,
    pub language: String,
    pub image: Option<String>,
    pub tags_string: Option<String>,
    pub owner_cache: OwnerSnapshot,
    pub owner_cache_updated_at: Option<EpochMs>,
}

impl Activity {
    /// Creates an unsaved activity with an empty (stale) owner snapshot.
    pub fn new(owner_id: UserId, message: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: 0,
            owner_id,
            created_at: 0,
            updated_at: 0,
            message: message.into(),
            language: language.into(),
            image: None,
            tags_string: None,
            owner_cache: OwnerSnapshot::default(),
            owner_cache_updated_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("message", &self.message)?;
        require_max_chars("language", &self.language, LANGUAGE_MAX_CHARS)?;
        Ok(())
    }

    pub fn tags(&self) -> Vec<String> {
        decode_optional_list(self.tags_string.as_deref())
    }

    /// Appends tags not already present, keeping existing order first.
    pub fn add_tags<S: AsRef<str>>(&mut self, new_tags: &[S]) {
        let mut tags = self.tags();
        for tag in new_tags {
            let tag = tag.as_ref();
            if !tags.iter().any(|existing| existing == tag) {
                tags.push(tag.to_string());
            }
        }
        self.tags_string = Some(encode_list(&tags));
    }

    pub fn remove_tags<S: AsRef<str>>(&mut self, tags_to_remove: &[S]) {
        let tags: Vec<String> = self
            .tags()
            .into_iter()
            .filter(|tag| !tags_to_remove.iter().any(|removed| removed.as_ref() == tag))
            .collect();
        self.tags_string = Some(encode_list(&tags));
    }

    /// Replaces the whole tag list.
    pub fn save_tags<S: AsRef<str>>(&mut self, tags: &[S]) {
        self.tags_string = Some(encode_list(tags));
    }

    pub fn is_owner_cache_stale(&self, now: EpochMs) -> bool {
        match self.owner_cache_updated_at {
            None => true,
            Some(updated_at) => now.saturating_sub(updated_at) >= OWNER_CACHE_TTL_MS,
        }
    }

    pub fn apply_owner_snapshot(&mut self, snapshot: OwnerSnapshot, now: EpochMs) {
        self.owner_cache = snapshot;
        self.owner_cache_updated_at = Some(now);
    }

    /// Returns the snapshot as stored, without checking freshness.
    pub fn owner_cache_view(&self) -> CachedOwner {
        CachedOwner {
            id: self.owner_id,
            username: self.owner_cache.username.clone(),
            email: self.owner_cache.email.clone(),
            preferences: CachedOwnerPreferences {
                status: self.owner_cache.status.clone(),
                twitter: self.owner_cache.twitter.clone(),
            },
        }
    }

    /// First 100 characters of the message without cutting a word.
    pub fn summary(&self) -> String {
        if self.message.chars().count() <= SUMMARY_MAX_CHARS {
            return self.message.clone();
        }
        let head: String = self.message.chars().take(SUMMARY_MAX_CHARS + 1).collect();
        let words: Vec<&str> = head.split(' ').collect();
        let kept = &words[..words.len().saturating_sub(1)];
        format!("{}...", kept.join(" "))
    }
}
