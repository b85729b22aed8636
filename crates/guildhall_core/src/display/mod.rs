//! Display-side derivations over stored codes.
//!
//! # Responsibility
//! - Resolve preference codes to labels, images and colors.
//! - Render notification messages, URLs and icons.
//! - Build Gravatar avatar URLs.
//!
//! # Invariants
//! - Configuration and translation are injected at construction.
//! - Preference lookups never fail: misses resolve to defaults.
//! - Notification lookups fail loudly: misses surface as `FormatError`.

pub mod avatar;
pub mod notification;
pub mod preferences;
