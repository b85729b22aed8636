//! User notifications.

use super::user::UserId;
use crate::codec::{decode_optional_list, encode_list};
use serde::{Deserialize, Serialize};

pub type NotificationId = i64;
/// Notification type code, keys the configured template table.
pub type NotificationCode = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub owner_id: UserId,
    pub message: NotificationCode,
    /// CSV-encoded positional arguments for the message template.
    pub message_data: Option<String>,
    /// CSV-encoded positional arguments for the URL template.
    pub url_data: Option<String>,
    pub email_sent: bool,
    pub seen: bool,
    pub image: Option<String>,
}

impl Notification {
    pub fn new<S: AsRef<str>>(owner_id: UserId, message: NotificationCode, message_data: &[S]) -> Self {
        Self {
            id: 0,
            owner_id,
            message,
            message_data: Some(encode_list(message_data)),
            url_data: None,
            email_sent: false,
            seen: false,
            image: None,
        }
    }

    pub fn message_args(&self) -> Vec<String> {
        decode_optional_list(self.message_data.as_deref())
    }

    /// URL arguments, falling back to the message arguments when no
    /// dedicated URL data is stored.
    pub fn url_args(&self) -> Vec<String> {
        match self.url_data.as_deref() {
            Some(url_data) if !url_data.is_empty() => decode_optional_list(Some(url_data)),
            _ => self.message_args(),
        }
    }

    pub fn save_message_data<S: AsRef<str>>(&mut self, values: &[S]) {
        self.message_data = Some(encode_list(values));
    }

    pub fn save_url_data<S: AsRef<str>>(&mut self, values: &[S]) {
        self.url_data = Some(encode_list(values));
    }
}
