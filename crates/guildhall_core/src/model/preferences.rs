//! Per-user profile preferences.
//!
//! # Responsibility
//! - Hold profile attributes shown on user pages.
//! - Own the e-mail notification opt-out code list.
//!
//! # Invariants
//! - Exactly one preferences record per user.
//! - `email_notifications_turned_off_string` is absent, empty, or a
//!   comma-joined list of integer notification codes.
//! - `twitter` is a cache maintained by link mutations, never edited directly.

use super::notification::NotificationCode;
use super::user::UserId;
use super::{require_max_chars, ValidationError};
use crate::codec::{decode_codes, encode_codes, CodeListError};
use serde::{Deserialize, Serialize};

/// Number of favorite character slots on a profile.
pub const FAVORITE_CHARACTER_SLOTS: usize = 3;

const LANGUAGE_MAX_CHARS: usize = 4;
const LOCATION_MAX_CHARS: usize = 200;
const STATUS_MAX_CHARS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: UserId,
    pub language: String,
    pub description: Option<String>,
    /// Character codes for slots 1..=3, stored in order.
    pub favorite_characters: [Option<String>; FAVORITE_CHARACTER_SLOTS],
    pub color: Option<String>,
    /// ISO `YYYY-MM-DD`.
    pub birthdate: Option<String>,
    pub location: Option<String>,
    pub location_changed: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<String>,
    pub donation_link: Option<String>,
    pub donation_link_title: Option<String>,
    pub email_notifications_turned_off_string: Option<String>,
    pub unread_notifications: u32,
    pub twitter: Option<String>,
}

impl UserPreferences {
    pub fn new(user_id: UserId, language: impl Into<String>) -> Self {
        Self {
            user_id,
            language: language.into(),
            description: None,
            favorite_characters: Default::default(),
            color: None,
            birthdate: None,
            location: None,
            location_changed: false,
            latitude: None,
            longitude: None,
            status: None,
            donation_link: None,
            donation_link_title: None,
            email_notifications_turned_off_string: None,
            unread_notifications: 0,
            twitter: None,
        }
    }

    /// Returns the character code in 1-based `slot`, if set.
    pub fn favorite_character(&self, slot: usize) -> Option<&str> {
        slot.checked_sub(1)
            .and_then(|index| self.favorite_characters.get(index))
            .and_then(|value| value.as_deref())
            .filter(|value| !value.is_empty())
    }

    /// Sets the character code in 1-based `slot`. Out-of-range slots are
    /// rejected.
    pub fn set_favorite_character(
        &mut self,
        slot: usize,
        value: Option<String>,
    ) -> Result<(), ValidationError> {
        let index = slot
            .checked_sub(1)
            .filter(|index| *index < FAVORITE_CHARACTER_SLOTS)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "favorite_character",
                message: format!("slot {slot} is outside 1..={FAVORITE_CHARACTER_SLOTS}"),
            })?;
        self.favorite_characters[index] = value;
        Ok(())
    }

    /// Notification codes the user opted out of receiving by e-mail.
    pub fn email_notifications_turned_off(&self) -> Result<Vec<NotificationCode>, CodeListError> {
        decode_codes(self.email_notifications_turned_off_string.as_deref().unwrap_or_default())
    }

    pub fn is_notification_email_allowed(&self, code: NotificationCode) -> Result<bool, CodeListError> {
        Ok(!self.email_notifications_turned_off()?.contains(&code))
    }

    /// Replaces the whole opt-out list.
    pub fn save_email_notifications_turned_off(&mut self, turned_off: &[NotificationCode]) {
        self.email_notifications_turned_off_string = Some(encode_codes(turned_off));
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_max_chars("language", &self.language, LANGUAGE_MAX_CHARS)?;
        if let Some(location) = self.location.as_deref() {
            require_max_chars("location", location, LOCATION_MAX_CHARS)?;
        }
        if let Some(status) = self.status.as_deref() {
            require_max_chars("status", status, STATUS_MAX_CHARS)?;
        }
        if let Some(raw) = self.email_notifications_turned_off_string.as_deref() {
            decode_codes(raw).map_err(|err| ValidationError::InvalidFormat {
                field: "email_notifications_turned_off_string",
                message: err.to_string(),
            })?;
        }
        if let Some(birthdate) = self.birthdate.as_deref() {
            if !is_iso_date(birthdate) {
                return Err(ValidationError::InvalidFormat {
                    field: "birthdate",
                    message: format!("`{birthdate}` is not YYYY-MM-DD"),
                });
            }
        }
        Ok(())
    }
}

fn is_iso_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return false;
    };
    let numeric = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
    if !(numeric(year, 4) && numeric(month, 2) && numeric(day, 2)) {
        return false;
    }
    matches!(month.parse::<u32>(), Ok(1..=12)) && matches!(day.parse::<u32>(), Ok(1..=31))
}

#[cfg(test)]
mod tests {
    use super::UserPreferences;
    use crate::model::ValidationError;

    #[test]
    fn email_opt_out_round_trip() {
        let mut prefs = UserPreferences::new(1, "en");
        assert!(prefs.email_notifications_turned_off().unwrap().is_empty());
        assert!(prefs.is_notification_email_allowed(4).unwrap());

        prefs.save_email_notifications_turned_off(&[4, 7]);
        assert_eq!(
            prefs.email_notifications_turned_off_string.as_deref(),
            Some("4,7")
        );
        assert_eq!(prefs.email_notifications_turned_off().unwrap(), vec![4, 7]);
        assert!(!prefs.is_notification_email_allowed(7).unwrap());
        assert!(prefs.is_notification_email_allowed(5).unwrap());

        prefs.save_email_notifications_turned_off(&[]);
        assert!(prefs.email_notifications_turned_off().unwrap().is_empty());
    }

    #[test]
    fn malformed_opt_out_list_is_reported() {
        let mut prefs = UserPreferences::new(1, "en");
        prefs.email_notifications_turned_off_string = Some("3,x,5".to_string());

        let err = prefs.email_notifications_turned_off().unwrap_err();
        assert_eq!(err.value, "x");
        assert!(prefs.is_notification_email_allowed(3).is_err());
    }

    #[test]
    fn favorite_character_slots_are_one_based() {
        let mut prefs = UserPreferences::new(1, "en");
        prefs
            .set_favorite_character(2, Some("honoka".to_string()))
            .unwrap();
        assert_eq!(prefs.favorite_character(1), None);
        assert_eq!(prefs.favorite_character(2), Some("honoka"));
        assert_eq!(prefs.favorite_character(0), None);
        assert_eq!(prefs.favorite_character(4), None);
        assert!(prefs.set_favorite_character(4, None).is_err());
        assert!(prefs.set_favorite_character(0, None).is_err());
    }

    #[test]
    fn validate_checks_codes_dates_and_lengths() {
        let mut prefs = UserPreferences::new(1, "en");
        prefs.birthdate = Some("2001-02-03".to_string());
        assert!(prefs.validate().is_ok());

        prefs.email_notifications_turned_off_string = Some("1,a".to_string());
        assert!(matches!(
            prefs.validate(),
            Err(ValidationError::InvalidFormat {
                field: "email_notifications_turned_off_string",
                ..
            })
        ));

        prefs.email_notifications_turned_off_string = None;
        prefs.birthdate = Some("03/02/2001".to_string());
        assert!(prefs.validate().is_err());

        prefs.birthdate = None;
        prefs.language = "english".to_string();
        assert_eq!(
            prefs.validate(),
            Err(ValidationError::TooLong {
                field: "language",
                max: 4
            })
        );
    }
}
