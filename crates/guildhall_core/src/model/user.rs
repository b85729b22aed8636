//! User account record.

use super::{require_max_chars, require_non_empty, ValidationError};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

const USERNAME_MAX_CHARS: usize = 32;
const EMAIL_MAX_CHARS: usize = 254;

/// Account identity that profile, feed and moderation records hang off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// `0` until the record is persisted.
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            username: username.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("username", &self.username)?;
        require_max_chars("username", &self.username, USERNAME_MAX_CHARS)?;
        require_max_chars("email", &self.email, EMAIL_MAX_CHARS)?;
        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                message: "missing `@`".to_string(),
            });
        }
        Ok(())
    }
}
