//! Gravatar URLs for profile pictures.

use crate::config::SiteConfig;
use crate::model::preferences::UserPreferences;
use crate::model::user::User;
use md5::{Digest, Md5};

const GRAVATAR_BASE_URL: &str = "http://www.gravatar.com/avatar/";

/// Gravatar URL for `user` at `size` pixels.
///
/// The fallback image is the cached twitter avatar when the user has a twitter
/// link, otherwise the static default avatar.
pub fn avatar(user: &User, prefs: &UserPreferences, size: u32, config: &SiteConfig) -> String {
    let fallback = match prefs.twitter.as_deref() {
        Some(twitter) => format!(
            "{}twitter_avatar/{}/",
            absolute_url(&config.site_url),
            twitter
        ),
        None => format!("{}img/avatar.png", absolute_url(&config.site_static_url)),
    };
    let digest = hex::encode(Md5::digest(user.email.to_lowercase().as_bytes()));
    format!(
        "{GRAVATAR_BASE_URL}{digest}?d={}&s={}",
        urlencoding::encode(&fallback),
        size
    )
}

/// Gravatar needs an absolute fallback; protocol-relative and bare hosts get `http`.
fn absolute_url(root: &str) -> String {
    if root.starts_with("http") {
        root.to_string()
    } else if root.starts_with("//") {
        format!("http:{root}")
    } else {
        format!("http://{root}")
    }
}
