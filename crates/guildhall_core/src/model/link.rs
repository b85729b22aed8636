//! Social platform links shown on user profiles.

use super::user::UserId;
use super::{require_max_chars, require_non_empty, ValidationError};
use crate::template::{format_positional, TemplateError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type UserLinkId = i64;

const LINK_VALUE_MAX_CHARS: usize = 64;
/// Twitter values are copied into the 32-char cached handle on preferences.
const TWITTER_VALUE_MAX_CHARS: usize = 32;

static LINK_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-zA-Z\-_\. ]*$").expect("valid link value regex"));

/// Supported link platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Twitter,
    Facebook,
    Reddit,
    Line,
    Tumblr,
    Twitch,
    Steam,
    Instagram,
    Youtube,
    Github,
}

impl LinkType {
    pub const ALL: [LinkType; 10] = [
        LinkType::Twitter,
        LinkType::Facebook,
        LinkType::Reddit,
        LinkType::Line,
        LinkType::Tumblr,
        LinkType::Twitch,
        LinkType::Steam,
        LinkType::Instagram,
        LinkType::Youtube,
        LinkType::Github,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Reddit => "reddit",
            Self::Line => "line",
            Self::Tumblr => "tumblr",
            Self::Twitch => "twitch",
            Self::Steam => "steam",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
            Self::Github => "github",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|link_type| link_type.as_code() == code)
    }

    pub(crate) fn default_url_template(self) -> &'static str {
        match self {
            Self::Twitter => "https://twitter.com/{}",
            Self::Facebook => "https://www.facebook.com/{}",
            Self::Reddit => "https://www.reddit.com/user/{}",
            Self::Line => "https://line.me/#{}",
            Self::Tumblr => "https://{}.tumblr.com/",
            Self::Twitch => "https://twitch.tv/{}",
            Self::Steam => "https://steamcommunity.com/id/{}",
            Self::Instagram => "https://instagram.com/{}/",
            Self::Youtube => "https://www.youtube.com/{}",
            Self::Github => "https://github.com/{}",
        }
    }
}

/// How often the user posts about the community on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRelevance {
    Never,
    Sometimes,
    Often,
    EveryDay,
}

impl LinkRelevance {
    pub fn as_code(self) -> i64 {
        match self {
            Self::Never => 0,
            Self::Sometimes => 1,
            Self::Often => 2,
            Self::EveryDay => 3,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Never),
            1 => Some(Self::Sometimes),
            2 => Some(Self::Often),
            3 => Some(Self::EveryDay),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLink {
    pub id: UserLinkId,
    pub owner_id: UserId,
    #[serde(rename = "type")]
    pub kind: LinkType,
    /// Username or id on the platform, never a full URL.
    pub value: String,
    pub relevance: Option<LinkRelevance>,
}

impl UserLink {
    pub fn new(owner_id: UserId, kind: LinkType, value: impl Into<String>) -> Self {
        Self {
            id: 0,
            owner_id,
            kind,
            value: value.into(),
            relevance: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("value", &self.value)?;
        let max_chars = match self.kind {
            LinkType::Twitter => TWITTER_VALUE_MAX_CHARS,
            _ => LINK_VALUE_MAX_CHARS,
        };
        require_max_chars("value", &self.value, max_chars)?;
        if !LINK_VALUE_RE.is_match(&self.value) {
            return Err(ValidationError::InvalidFormat {
                field: "value",
                message: "only alphanumeric and - _ . characters are allowed".to_string(),
            });
        }
        Ok(())
    }

    /// Renders the profile URL from the platform template table.
    ///
    /// Returns `None` when the platform has no configured template.
    pub fn url(
        &self,
        link_urls: &BTreeMap<LinkType, String>,
    ) -> Option<Result<String, TemplateError>> {
        link_urls
            .get(&self.kind)
            .map(|template| format_positional(template, &[self.value.as_str()]))
    }
}
