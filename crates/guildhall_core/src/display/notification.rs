//! Notification message formatter.

use crate::config::NotificationTemplate;
use crate::i18n::Translator;
use crate::model::notification::{Notification, NotificationCode};
use crate::template::{format_positional, TemplateError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Notification rendering failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No template configured for the notification type.
    UnknownMessage(NotificationCode),
    /// Template needs more positional arguments than stored.
    MissingArgument {
        code: NotificationCode,
        index: usize,
        provided: usize,
    },
    InvalidTemplate {
        code: NotificationCode,
        message: String,
    },
}

impl Display for FormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownMessage(code) => write!(f, "unknown notification type: {code}"),
            Self::MissingArgument {
                code,
                index,
                provided,
            } => write!(
                f,
                "notification {code} template needs argument {index} but only {provided} stored"
            ),
            Self::InvalidTemplate { code, message } => {
                write!(f, "notification {code} template is invalid: {message}")
            }
        }
    }
}

impl Error for FormatError {}

/// Rendered notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedNotification {
    pub message: String,
    pub url: String,
    pub icon: String,
}

/// Renders notifications from the configured per-type templates.
pub struct NotificationFormatter<'a> {
    templates: &'a BTreeMap<NotificationCode, NotificationTemplate>,
    translator: &'a dyn Translator,
}

impl<'a> NotificationFormatter<'a> {
    pub fn new(
        templates: &'a BTreeMap<NotificationCode, NotificationTemplate>,
        translator: &'a dyn Translator,
    ) -> Self {
        Self {
            templates,
            translator,
        }
    }

    pub fn localized_message(&self, notification: &Notification) -> Result<String, FormatError> {
        let template = self.template(notification.message)?;
        let localized = self.translator.translate(&template.message);
        format_positional(&localized, &notification.message_args())
            .map_err(|err| map_template_error(notification.message, err))
    }

    pub fn website_url(&self, notification: &Notification) -> Result<String, FormatError> {
        let template = self.template(notification.message)?;
        format_positional(&template.url, &notification.url_args())
            .map_err(|err| map_template_error(notification.message, err))
    }

    pub fn icon(&self, notification: &Notification) -> Result<String, FormatError> {
        Ok(self.template(notification.message)?.icon.clone())
    }

    pub fn render(&self, notification: &Notification) -> Result<RenderedNotification, FormatError> {
        Ok(RenderedNotification {
            message: self.localized_message(notification)?,
            url: self.website_url(notification)?,
            icon: self.icon(notification)?,
        })
    }

    fn template(&self, code: NotificationCode) -> Result<&'a NotificationTemplate, FormatError> {
        self.templates
            .get(&code)
            .ok_or(FormatError::UnknownMessage(code))
    }
}

fn map_template_error(code: NotificationCode, err: TemplateError) -> FormatError {
    match err {
        TemplateError::MissingArgument { index, provided } => FormatError::MissingArgument {
            code,
            index,
            provided,
        },
        TemplateError::Malformed(message) => FormatError::InvalidTemplate { code, message },
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatError, NotificationFormatter};
    use crate::config::NotificationTemplate;
    use crate::i18n::{CatalogTranslator, IdentityTranslator};
    use crate::model::notification::Notification;
    use std::collections::BTreeMap;

    fn templates() -> BTreeMap<u32, NotificationTemplate> {
        let mut templates = BTreeMap::new();
        templates.insert(
            1,
            NotificationTemplate {
                message: "You received {0} points".to_string(),
                url: "/points/{0}/".to_string(),
                icon: "star".to_string(),
            },
        );
        templates.insert(
            2,
            NotificationTemplate {
                message: "{} liked your activity".to_string(),
                url: "/activities/{}/".to_string(),
                icon: "heart".to_string(),
            },
        );
        templates
    }

    #[test]
    fn renders_message_url_and_icon() {
        let templates = templates();
        let formatter = NotificationFormatter::new(&templates, &IdentityTranslator);
        let notification = Notification::new(7, 1, &["10"]);

        assert_eq!(
            formatter.localized_message(&notification).unwrap(),
            "You received 10 points"
        );
        assert_eq!(formatter.website_url(&notification).unwrap(), "/points/10/");
        assert_eq!(formatter.icon(&notification).unwrap(), "star");
    }

    #[test]
    fn url_prefers_url_data() {
        let templates = templates();
        let formatter = NotificationFormatter::new(&templates, &IdentityTranslator);
        let mut notification = Notification::new(7, 2, &["ana"]);
        notification.save_url_data(&["31"]);

        let rendered = formatter.render(&notification).unwrap();
        assert_eq!(rendered.message, "ana liked your activity");
        assert_eq!(rendered.url, "/activities/31/");
        assert_eq!(rendered.icon, "heart");
    }

    #[test]
    fn message_template_is_translated_before_substitution() {
        let templates = templates();
        let mut entries = BTreeMap::new();
        entries.insert(
            "You received {0} points".to_string(),
            "Vous avez reçu {0} points".to_string(),
        );
        let translator = CatalogTranslator::new(entries);
        let formatter = NotificationFormatter::new(&templates, &translator);

        let notification = Notification::new(7, 1, &["3"]);
        assert_eq!(
            formatter.localized_message(&notification).unwrap(),
            "Vous avez reçu 3 points"
        );
    }

    #[test]
    fn unknown_code_and_missing_arguments_are_errors() {
        let templates = templates();
        let formatter = NotificationFormatter::new(&templates, &IdentityTranslator);

        let unknown = Notification::new(7, 99, &["x"]);
        assert_eq!(
            formatter.localized_message(&unknown),
            Err(FormatError::UnknownMessage(99))
        );
        assert_eq!(formatter.icon(&unknown), Err(FormatError::UnknownMessage(99)));

        let missing = Notification::new::<&str>(7, 1, &[]);
        assert_eq!(
            formatter.localized_message(&missing),
            Err(FormatError::MissingArgument {
                code: 1,
                index: 0,
                provided: 0
            })
        );
    }
}
