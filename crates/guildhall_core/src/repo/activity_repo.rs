//! Activity feed repository.
//!
//! # Responsibility
//! - Persist feed posts, including the denormalized owner snapshot columns.
//! - Load live owner snapshots used to refresh that cache.
//! - Maintain activity likes.
//!
//! # Invariants
//! - `update_activity` persists every snapshot column together with
//!   `cache_last_update`.
//! - `load_owner_snapshot` fails with `NotFound` when either the user or the
//!   preferences row is missing; it never returns a partial snapshot.

use crate::model::activity::{Activity, ActivityId, OwnerSnapshot};
use crate::model::user::UserId;
use crate::model::EpochMs;
use crate::repo::normalize_limit;
use crate::repo::user_repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    created_at,
    updated_at,
    message,
    language,
    image,
    tags_string,
    cache_last_update,
    cache_owner_username,
    cache_owner_email,
    cache_owner_preferences_status,
    cache_owner_preferences_twitter
FROM activities";

const FEED_DEFAULT_LIMIT: u32 = 20;
const FEED_LIMIT_MAX: u32 = 100;

/// Query options for feed listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityListQuery {
    /// Restricts the feed to one owner.
    pub owner_id: Option<UserId>,
    /// Restricts the feed to activities carrying this exact tag.
    pub tag: Option<String>,
    /// Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

pub trait ActivityRepository {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId>;
    /// Persists content, tags and owner snapshot of an existing activity.
    fn update_activity(&self, activity: &Activity) -> RepoResult<()>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    /// Lists activities newest first.
    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
    /// Reads the live owner fields mirrored by the activity owner cache.
    fn load_owner_snapshot(&self, owner_id: UserId) -> RepoResult<OwnerSnapshot>;
    fn like(&self, activity_id: ActivityId, user_id: UserId) -> RepoResult<bool>;
    fn unlike(&self, activity_id: ActivityId, user_id: UserId) -> RepoResult<bool>;
    fn count_likes(&self, activity_id: ActivityId) -> RepoResult<u64>;
}

pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId> {
        activity.validate()?;

        self.conn.execute(
            "INSERT INTO activities (
                owner_id,
                message,
                language,
                image,
                tags_string,
                cache_last_update,
                cache_owner_username,
                cache_owner_email,
                cache_owner_preferences_status,
                cache_owner_preferences_twitter
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                activity.owner_id,
                activity.message.as_str(),
                activity.language.as_str(),
                activity.image.as_deref(),
                activity.tags_string.as_deref(),
                activity.owner_cache_updated_at,
                activity.owner_cache.username.as_deref(),
                activity.owner_cache.email.as_str(),
                activity.owner_cache.status.as_deref(),
                activity.owner_cache.twitter.as_deref(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_activity(&self, activity: &Activity) -> RepoResult<()> {
        activity.validate()?;

        let changed = self.conn.execute(
            "UPDATE activities
             SET
                message = ?2,
                language = ?3,
                image = ?4,
                tags_string = ?5,
                cache_last_update = ?6,
                cache_owner_username = ?7,
                cache_owner_email = ?8,
                cache_owner_preferences_status = ?9,
                cache_owner_preferences_twitter = ?10,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                activity.id,
                activity.message.as_str(),
                activity.language.as_str(),
                activity.image.as_deref(),
                activity.tags_string.as_deref(),
                activity.owner_cache_updated_at,
                activity.owner_cache.username.as_deref(),
                activity.owner_cache.email.as_str(),
                activity.owner_cache.status.as_deref(),
                activity.owner_cache.twitter.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "activity",
                id: activity.id,
            });
        }
        Ok(())
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }
        Ok(None)
    }

    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>> {
        let mut sql = format!("{ACTIVITY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(owner_id) = query.owner_id {
            sql.push_str(" AND owner_id = ?");
            bind_values.push(Value::Integer(owner_id));
        }
        if query.tag.is_some() {
            // Tags are CSV-encoded; matching happens on decoded rows below.
            sql.push_str(" AND tags_string IS NOT NULL");
        }

        sql.push_str(" ORDER BY created_at DESC, id DESC");
        let limit = normalize_limit(query.limit, FEED_DEFAULT_LIMIT, FEED_LIMIT_MAX);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut activities = Vec::new();
        let mut skipped = 0u32;
        while let Some(row) = rows.next()? {
            let activity = parse_activity_row(row)?;
            if let Some(tag) = query.tag.as_ref() {
                if !activity.tags().iter().any(|existing| existing == tag) {
                    continue;
                }
            }
            if skipped < query.offset {
                skipped += 1;
                continue;
            }
            activities.push(activity);
            if activities.len() as u32 >= limit {
                break;
            }
        }

        Ok(activities)
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "activity",
                id,
            });
        }
        Ok(())
    }

    fn load_owner_snapshot(&self, owner_id: UserId) -> RepoResult<OwnerSnapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT
                u.username,
                u.email,
                p.user_id AS preferences_user_id,
                p.status,
                p.cache_twitter
             FROM users u
             LEFT JOIN user_preferences p ON p.user_id = u.id
             WHERE u.id = ?1;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let Some(row) = rows.next()? else {
            return Err(RepoError::NotFound {
                entity: "user",
                id: owner_id,
            });
        };

        if row.get::<_, Option<UserId>>("preferences_user_id")?.is_none() {
            return Err(RepoError::NotFound {
                entity: "user_preferences",
                id: owner_id,
            });
        }

        Ok(OwnerSnapshot {
            username: row.get("username")?,
            email: row.get("email")?,
            status: row.get("status")?,
            twitter: row.get("cache_twitter")?,
        })
    }

    fn like(&self, activity_id: ActivityId, user_id: UserId) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO activity_likes (activity_id, user_id) VALUES (?1, ?2);",
            params![activity_id, user_id],
        )?;
        Ok(inserted == 1)
    }

    fn unlike(&self, activity_id: ActivityId, user_id: UserId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM activity_likes WHERE activity_id = ?1 AND user_id = ?2;",
            params![activity_id, user_id],
        )?;
        Ok(removed == 1)
    }

    fn count_likes(&self, activity_id: ActivityId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activity_likes WHERE activity_id = ?1;",
            [activity_id],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let activity = Activity {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        created_at: row.get::<_, EpochMs>("created_at")?,
        updated_at: row.get::<_, EpochMs>("updated_at")?,
        message: row.get("message")?,
        language: row.get("language")?,
        image: row.get("image")?,
        tags_string: row.get("tags_string")?,
        owner_cache: OwnerSnapshot {
            username: row.get("cache_owner_username")?,
            email: row.get("cache_owner_email")?,
            status: row.get("cache_owner_preferences_status")?,
            twitter: row.get("cache_owner_preferences_twitter")?,
        },
        owner_cache_updated_at: row.get("cache_last_update")?,
    };
    activity.validate()?;
    Ok(activity)
}
