//! Profile preference resolvers.

use crate::config::{FavoriteCharacter, SiteConfig, UserColor, DEFAULT_CSS_COLOR};
use crate::i18n::Translator;
use crate::model::preferences::UserPreferences;

/// Resolves stored preference codes against the configured tables.
///
/// Lookups are a first-match linear scan; duplicate codes in the tables are
/// not rejected.
pub struct PreferenceResolver<'a> {
    config: &'a SiteConfig,
    translator: &'a dyn Translator,
}

impl<'a> PreferenceResolver<'a> {
    pub fn new(config: &'a SiteConfig, translator: &'a dyn Translator) -> Self {
        Self { config, translator }
    }

    /// Translated label of the character in `slot` (1-based), or `""`.
    pub fn localized_favorite_character(&self, prefs: &UserPreferences, slot: usize) -> String {
        self.favorite_character(prefs, slot)
            .map(|character| self.translator.translate(&character.label).into_owned())
            .unwrap_or_default()
    }

    /// Image of the character in `slot` (1-based), or `""`.
    pub fn favorite_character_image(&self, prefs: &UserPreferences, slot: usize) -> String {
        self.favorite_character(prefs, slot)
            .map(|character| character.image.clone())
            .unwrap_or_default()
    }

    pub fn localized_color(&self, prefs: &UserPreferences) -> String {
        self.color(prefs)
            .map(|color| self.translator.translate(&color.label).into_owned())
            .unwrap_or_default()
    }

    /// Hex value of the user color, or the configured default color.
    pub fn hex_color(&self, prefs: &UserPreferences) -> String {
        self.color(prefs)
            .map(|color| color.hex.clone())
            .unwrap_or_else(|| self.config.default_color.clone())
    }

    /// Css class of the user color, or `main`.
    pub fn css_color(&self, prefs: &UserPreferences) -> String {
        self.color(prefs)
            .map(|color| color.css_class.clone())
            .unwrap_or_else(|| DEFAULT_CSS_COLOR.to_string())
    }

    fn favorite_character(&self, prefs: &UserPreferences, slot: usize) -> Option<&'a FavoriteCharacter> {
        let code = prefs.favorite_character(slot)?;
        self.config
            .favorite_characters
            .iter()
            .find(|character| character.name == code)
    }

    fn color(&self, prefs: &UserPreferences) -> Option<&'a UserColor> {
        let code = prefs.color.as_deref().filter(|code| !code.is_empty())?;
        self.config.user_colors.iter().find(|color| color.name == code)
    }
}

#[cfg(test)]
mod tests {
    use super::PreferenceResolver;
    use crate::config::{FavoriteCharacter, SiteConfig, UserColor};
    use crate::i18n::{CatalogTranslator, IdentityTranslator};
    use crate::model::preferences::UserPreferences;
    use std::collections::BTreeMap;

    fn config() -> SiteConfig {
        SiteConfig {
            default_color: "#4a86e8".to_string(),
            user_colors: vec![
                UserColor {
                    name: "red".to_string(),
                    label: "Red".to_string(),
                    css_class: "red-css".to_string(),
                    hex: "#ff0000".to_string(),
                },
                UserColor {
                    name: "red".to_string(),
                    label: "Second red".to_string(),
                    css_class: "other".to_string(),
                    hex: "#aa0000".to_string(),
                },
            ],
            favorite_characters: vec![FavoriteCharacter {
                name: "honoka".to_string(),
                label: "Honoka".to_string(),
                image: "img/honoka.png".to_string(),
            }],
            ..SiteConfig::default()
        }
    }

    #[test]
    fn color_resolvers_use_first_match() {
        let config = config();
        let resolver = PreferenceResolver::new(&config, &IdentityTranslator);
        let mut prefs = UserPreferences::new(1, "en");
        prefs.color = Some("red".to_string());

        assert_eq!(resolver.hex_color(&prefs), "#ff0000");
        assert_eq!(resolver.css_color(&prefs), "red-css");
        assert_eq!(resolver.localized_color(&prefs), "Red");
    }

    #[test]
    fn color_resolvers_fall_back_when_unset_or_unknown() {
        let config = config();
        let resolver = PreferenceResolver::new(&config, &IdentityTranslator);
        let mut prefs = UserPreferences::new(1, "en");

        assert_eq!(resolver.hex_color(&prefs), "#4a86e8");
        assert_eq!(resolver.css_color(&prefs), "main");
        assert_eq!(resolver.localized_color(&prefs), "");

        prefs.color = Some("purple".to_string());
        assert_eq!(resolver.hex_color(&prefs), "#4a86e8");
        assert_eq!(resolver.css_color(&prefs), "main");

        let empty = SiteConfig::default();
        let resolver = PreferenceResolver::new(&empty, &IdentityTranslator);
        prefs.color = Some("red".to_string());
        assert_eq!(resolver.hex_color(&prefs), empty.default_color);
    }

    #[test]
    fn favorite_character_resolvers_translate_and_default() {
        let config = config();
        let mut entries = BTreeMap::new();
        entries.insert("Honoka".to_string(), "穂乃果".to_string());
        let translator = CatalogTranslator::new(entries);
        let resolver = PreferenceResolver::new(&config, &translator);

        let mut prefs = UserPreferences::new(1, "ja");
        prefs
            .set_favorite_character(1, Some("honoka".to_string()))
            .unwrap();
        prefs
            .set_favorite_character(3, Some("unknown".to_string()))
            .unwrap();

        assert_eq!(resolver.localized_favorite_character(&prefs, 1), "穂乃果");
        assert_eq!(resolver.favorite_character_image(&prefs, 1), "img/honoka.png");
        assert_eq!(resolver.localized_favorite_character(&prefs, 2), "");
        assert_eq!(resolver.favorite_character_image(&prefs, 3), "");
        assert_eq!(resolver.favorite_character_image(&prefs, 7), "");
    }
}
