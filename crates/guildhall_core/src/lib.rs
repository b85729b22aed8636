//! Core data model for the guildhall community site.
//! This crate owns profile, feed, notification and moderation records and the
//! derived values rendered from them.

pub mod codec;
pub mod config;
pub mod db;
pub mod display;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod template;

pub use codec::{decode_codes, decode_list, encode_codes, encode_list};
pub use config::{ConfigError, SiteConfig};
pub use display::avatar::avatar;
pub use display::notification::{FormatError, NotificationFormatter, RenderedNotification};
pub use display::preferences::PreferenceResolver;
pub use i18n::{CatalogTranslator, IdentityTranslator, Translator};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{Activity, ActivityId, CachedOwner, OwnerSnapshot};
pub use model::link::{LinkRelevance, LinkType, UserLink};
pub use model::notification::{Notification, NotificationCode};
pub use model::preferences::UserPreferences;
pub use model::report::{Report, ReportStatus, ReportedThing};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::activity_repo::{ActivityListQuery, ActivityRepository, SqliteActivityRepository};
pub use repo::link_repo::{LinkRepository, SqliteLinkRepository};
pub use repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
pub use repo::report_repo::{ReportRepository, SqliteReportRepository};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use service::activity_service::ActivityService;
pub use service::link_service::{LinkService, ProfileLink};
pub use service::notification_service::{NotificationService, NotifyRequest};
pub use service::report_service::{FileReportRequest, ReportService};

/// Minimal health-check API for integration checks.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
