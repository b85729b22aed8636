//! Site configuration tables.
//!
//! # Responsibility
//! - Hold the static lookup tables used by display resolvers and formatters
//!   (favorite characters, user colors, notification templates, link URLs).
//! - Load and validate configuration from JSON.
//!
//! # Invariants
//! - Tables are read-only after construction and injected where needed.
//! - `validate()` runs on every load path before a config is handed out.

use crate::i18n::CatalogTranslator;
use crate::model::link::LinkType;
use crate::model::notification::NotificationCode;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Fallback hex color when a user has no (known) color.
pub const DEFAULT_HEX_COLOR: &str = "#4a86e8";
/// Fallback css class when a user has no (known) color.
pub const DEFAULT_CSS_COLOR: &str = "main";

/// One selectable favorite character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteCharacter {
    pub name: String,
    pub label: String,
    pub image: String,
}

/// One selectable profile color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserColor {
    pub name: String,
    pub label: String,
    pub css_class: String,
    pub hex: String,
}

/// Display templates for one notification type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    /// Positional message template, also used as the translation key.
    pub message: String,
    /// Positional URL template.
    pub url: String,
    pub icon: String,
}

/// Static configuration consumed by the data-model layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub default_color: String,
    /// Site root used in absolute links, e.g. `//example.com/`.
    pub site_url: String,
    /// Root of static assets, e.g. `//example.com/static/`.
    pub site_static_url: String,
    /// Prefix prepended to every generated upload path.
    pub uploaded_files_prefix: String,
    pub favorite_characters: Vec<FavoriteCharacter>,
    pub user_colors: Vec<UserColor>,
    pub notifications: BTreeMap<NotificationCode, NotificationTemplate>,
    pub link_urls: BTreeMap<LinkType, String>,
    /// Translation catalogs keyed by language code.
    pub translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_HEX_COLOR.to_string(),
            site_url: String::new(),
            site_static_url: String::new(),
            uploaded_files_prefix: String::new(),
            favorite_characters: Vec::new(),
            user_colors: Vec::new(),
            notifications: BTreeMap::new(),
            link_urls: default_link_urls(),
            translations: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            error!(
                "event=config_load module=config status=error path={} error={}",
                path.display(),
                err
            );
            ConfigError::Io(err)
        })?;
        let config = Self::from_json_str(&raw)?;
        info!(
            "event=config_load module=config status=ok path={} notifications={} colors={} characters={}",
            path.display(),
            config.notifications.len(),
            config.user_colors.len(),
            config.favorite_characters.len()
        );
        Ok(config)
    }

    /// Checks table-level invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_color.trim().is_empty() {
            return Err(ConfigError::Invalid("default_color cannot be empty".to_string()));
        }
        for (code, template) in &self.notifications {
            if template.message.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "notification {code} has an empty message template"
                )));
            }
        }
        for (link_type, template) in &self.link_urls {
            if !template.contains('{') {
                return Err(ConfigError::Invalid(format!(
                    "link url for `{}` has no placeholder",
                    link_type.as_code()
                )));
            }
        }
        Ok(())
    }

    /// Builds the translator for `language`; unknown languages translate to
    /// the message ids themselves.
    pub fn translator(&self, language: &str) -> CatalogTranslator {
        self.translations
            .get(language)
            .cloned()
            .map(CatalogTranslator::new)
            .unwrap_or_default()
    }
}

/// Link URL templates for every supported platform.
pub fn default_link_urls() -> BTreeMap<LinkType, String> {
    LinkType::ALL
        .iter()
        .map(|link_type| (*link_type, link_type.default_url_template().to_string()))
        .collect()
}

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SiteConfig, DEFAULT_HEX_COLOR};
    use crate::i18n::Translator;
    use crate::model::link::LinkType;

    #[test]
    fn empty_document_uses_defaults() {
        let config = SiteConfig::from_json_str("{}").unwrap();
        assert_eq!(config.default_color, DEFAULT_HEX_COLOR);
        assert!(config.user_colors.is_empty());
        assert_eq!(
            config.link_urls.get(&LinkType::Twitter).map(String::as_str),
            Some("https://twitter.com/{}")
        );
    }

    #[test]
    fn parses_tables_and_translations() {
        let config = SiteConfig::from_json_str(
            r##"{
                "default_color": "#000000",
                "user_colors": [
                    {"name": "red", "label": "Red", "css_class": "red-css", "hex": "#ff0000"}
                ],
                "notifications": {
                    "1": {"message": "You received {0} points", "url": "/points/{0}/", "icon": "star"}
                },
                "translations": {"fr": {"Red": "Rouge"}}
            }"##,
        )
        .unwrap();

        assert_eq!(config.user_colors[0].hex, "#ff0000");
        assert_eq!(config.notifications[&1].icon, "star");
        assert_eq!(config.translator("fr").translate("Red"), "Rouge");
        assert_eq!(config.translator("de").translate("Red"), "Red");
    }

    #[test]
    fn rejects_invalid_tables() {
        let err = SiteConfig::from_json_str(
            r#"{"notifications": {"2": {"message": " ", "url": "/", "icon": "x"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SiteConfig::from_json_str(r#"{"link_urls": {"twitter": "https://twitter.com/"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SiteConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r##"{"default_color": "#123456"}"##).unwrap();

        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.default_color, "#123456");

        let missing = SiteConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
