//! User, preferences and follow repository.
//!
//! # Responsibility
//! - Persist accounts together with their one-to-one preferences row.
//! - Maintain the follow graph.
//!
//! # Invariants
//! - `create_user` inserts the user and preferences rows atomically.
//! - `update_preferences` never writes `unread_notifications` or the cached
//!   twitter handle; those are owned by notification and link writes.

use crate::db::DbError;
use crate::model::preferences::UserPreferences;
use crate::model::user::{User, UserId};
use crate::model::ValidationError;
use crate::repo::{bool_to_int, int_to_bool};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PREFERENCES_SELECT_SQL: &str = "SELECT
    user_id,
    language,
    description,
    favorite_character1,
    favorite_character2,
    favorite_character3,
    color,
    birthdate,
    location,
    location_changed,
    latitude,
    longitude,
    status,
    donation_link,
    donation_link_title,
    email_notifications_turned_off_string,
    unread_notifications,
    cache_twitter
FROM user_preferences";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every aggregate repository.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound { entity: &'static str, id: i64 },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for accounts, preferences and follows.
pub trait UserRepository {
    /// Creates the user and an empty preferences row in `language`.
    fn create_user(&self, user: &User, language: &str) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Deletes the user; owned rows cascade.
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    fn get_preferences(&self, user_id: UserId) -> RepoResult<Option<UserPreferences>>;
    fn update_preferences(&self, preferences: &UserPreferences) -> RepoResult<()>;
    /// Returns `false` when the follow already existed.
    fn follow(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    /// Returns `false` when there was nothing to remove.
    fn unfollow(&self, follower: UserId, followed: UserId) -> RepoResult<bool>;
    fn list_following(&self, follower: UserId) -> RepoResult<Vec<UserId>>;
    fn count_followers(&self, followed: UserId) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User, language: &str) -> RepoResult<UserId> {
        user.validate()?;
        UserPreferences::new(0, language).validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (username, email) VALUES (?1, ?2);",
            params![user.username.as_str(), user.email.as_str()],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO user_preferences (user_id, language) VALUES (?1, ?2);",
            params![id, language],
        )?;
        tx.commit()?;

        Ok(id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email FROM users WHERE id = ?1;",
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, username, email FROM users WHERE username = ?1;",
                [username],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "user", id });
        }
        Ok(())
    }

    fn get_preferences(&self, user_id: UserId) -> RepoResult<Option<UserPreferences>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PREFERENCES_SELECT_SQL} WHERE user_id = ?1;"))?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_preferences_row(row)?));
        }
        Ok(None)
    }

    fn update_preferences(&self, preferences: &UserPreferences) -> RepoResult<()> {
        preferences.validate()?;

        let [first, second, third] = &preferences.favorite_characters;
        let changed = self.conn.execute(
            "UPDATE user_preferences
             SET
                language = ?2,
                description = ?3,
                favorite_character1 = ?4,
                favorite_character2 = ?5,
                favorite_character3 = ?6,
                color = ?7,
                birthdate = ?8,
                location = ?9,
                location_changed = ?10,
                latitude = ?11,
                longitude = ?12,
                status = ?13,
                donation_link = ?14,
                donation_link_title = ?15,
                email_notifications_turned_off_string = ?16
             WHERE user_id = ?1;",
            params![
                preferences.user_id,
                preferences.language.as_str(),
                preferences.description.as_deref(),
                first.as_deref(),
                second.as_deref(),
                third.as_deref(),
                preferences.color.as_deref(),
                preferences.birthdate.as_deref(),
                preferences.location.as_deref(),
                bool_to_int(preferences.location_changed),
                preferences.latitude,
                preferences.longitude,
                preferences.status.as_deref(),
                preferences.donation_link.as_deref(),
                preferences.donation_link_title.as_deref(),
                preferences.email_notifications_turned_off_string.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user_preferences",
                id: preferences.user_id,
            });
        }
        Ok(())
    }

    fn follow(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        if follower == followed {
            return Err(RepoError::Validation(ValidationError::InvalidFormat {
                field: "following",
                message: "users cannot follow themselves".to_string(),
            }));
        }
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO user_following (follower_id, followed_id) VALUES (?1, ?2);",
            params![follower, followed],
        )?;
        Ok(inserted == 1)
    }

    fn unfollow(&self, follower: UserId, followed: UserId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM user_following WHERE follower_id = ?1 AND followed_id = ?2;",
            params![follower, followed],
        )?;
        Ok(removed == 1)
    }

    fn list_following(&self, follower: UserId) -> RepoResult<Vec<UserId>> {
        let mut stmt = self.conn.prepare(
            "SELECT followed_id FROM user_following
             WHERE follower_id = ?1
             ORDER BY followed_id ASC;",
        )?;
        let ids = stmt
            .query_map([follower], |row| row.get(0))?
            .collect::<Result<Vec<UserId>, _>>()?;
        Ok(ids)
    }

    fn count_followers(&self, followed: UserId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_following WHERE followed_id = ?1;",
            [followed],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
    })
}

fn parse_preferences_row(row: &Row<'_>) -> RepoResult<UserPreferences> {
    let unread: i64 = row.get("unread_notifications")?;
    let unread_notifications = u32::try_from(unread).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid counter `{unread}` in user_preferences.unread_notifications"
        ))
    })?;

    let preferences = UserPreferences {
        user_id: row.get("user_id")?,
        language: row.get("language")?,
        description: row.get("description")?,
        favorite_characters: [
            row.get("favorite_character1")?,
            row.get("favorite_character2")?,
            row.get("favorite_character3")?,
        ],
        color: row.get("color")?,
        birthdate: row.get("birthdate")?,
        location: row.get("location")?,
        location_changed: int_to_bool(
            row.get("location_changed")?,
            "user_preferences.location_changed",
        )?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        status: row.get("status")?,
        donation_link: row.get("donation_link")?,
        donation_link_title: row.get("donation_link_title")?,
        email_notifications_turned_off_string: row.get("email_notifications_turned_off_string")?,
        unread_notifications,
        twitter: row.get("cache_twitter")?,
    };
    preferences.validate()?;
    Ok(preferences)
}
