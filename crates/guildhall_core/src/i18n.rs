//! Message-template localization.
//!
//! Templates are looked up by their source-language text (the message id);
//! a missing entry falls back to the id itself.

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Translation service keyed by message template strings.
pub trait Translator {
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str>;
}

/// Translator that returns every message id unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(msgid)
    }
}

/// In-memory catalog for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogTranslator {
    entries: BTreeMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for CatalogTranslator {
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str> {
        match self.entries.get(msgid) {
            Some(translated) if !translated.is_empty() => Cow::Borrowed(translated.as_str()),
            _ => Cow::Borrowed(msgid),
        }
    }
}
