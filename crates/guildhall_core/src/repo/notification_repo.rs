//! Notification repository.
//!
//! # Invariants
//! - `user_preferences.unread_notifications` counts unseen notifications:
//!   inserting an unseen row increments it and `mark_seen` decrements it,
//!   never below zero, in the same transaction.

use crate::model::notification::{Notification, NotificationId};
use crate::model::user::UserId;
use crate::repo::user_repo::{RepoError, RepoResult};
use crate::repo::{bool_to_int, int_to_bool, normalize_limit};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    message,
    message_data,
    url_data,
    email_sent,
    seen,
    image
FROM notifications";

const NOTIFICATIONS_DEFAULT_LIMIT: u32 = 20;
const NOTIFICATIONS_LIMIT_MAX: u32 = 200;

pub trait NotificationRepository {
    fn create_notification(&self, notification: &Notification) -> RepoResult<NotificationId>;
    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>>;
    /// Newest first.
    fn list_for_owner(
        &self,
        owner_id: UserId,
        include_seen: bool,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Notification>>;
    /// Returns `false` when the notification was already seen.
    fn mark_seen(&self, id: NotificationId) -> RepoResult<bool>;
    fn mark_email_sent(&self, id: NotificationId) -> RepoResult<()>;
    /// Notifications with id greater than `after_id` whose e-mail was not
    /// sent yet, oldest first. Pass `0` to start from the beginning.
    fn list_email_unsent(
        &self,
        after_id: NotificationId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Notification>>;
}

pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_notification(&self, notification: &Notification) -> RepoResult<NotificationId> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO notifications (
                owner_id,
                message,
                message_data,
                url_data,
                email_sent,
                seen,
                image
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                notification.owner_id,
                notification.message,
                notification.message_data.as_deref(),
                notification.url_data.as_deref(),
                bool_to_int(notification.email_sent),
                bool_to_int(notification.seen),
                notification.image.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        if !notification.seen {
            tx.execute(
                "UPDATE user_preferences
                 SET unread_notifications = unread_notifications + 1
                 WHERE user_id = ?1;",
                [notification.owner_id],
            )?;
        }
        tx.commit()?;
        Ok(id)
    }

    fn get_notification(&self, id: NotificationId) -> RepoResult<Option<Notification>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTIFICATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_notification_row(row)?));
        }
        Ok(None)
    }

    fn list_for_owner(
        &self,
        owner_id: UserId,
        include_seen: bool,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Notification>> {
        let limit = normalize_limit(limit, NOTIFICATIONS_DEFAULT_LIMIT, NOTIFICATIONS_LIMIT_MAX);
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE owner_id = ?1
               AND (?2 = 1 OR seen = 0)
             ORDER BY id DESC
             LIMIT ?3;"
        ))?;
        let mut rows = stmt.query(params![owner_id, bool_to_int(include_seen), limit])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }

    fn mark_seen(&self, id: NotificationId) -> RepoResult<bool> {
        let tx = self.conn.unchecked_transaction()?;
        let owner_id: Option<UserId> = tx
            .query_row(
                "SELECT owner_id FROM notifications WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(owner_id) = owner_id else {
            return Err(RepoError::NotFound {
                entity: "notification",
                id,
            });
        };

        let changed = tx.execute(
            "UPDATE notifications SET seen = 1 WHERE id = ?1 AND seen = 0;",
            [id],
        )?;
        if changed == 1 {
            tx.execute(
                "UPDATE user_preferences
                 SET unread_notifications = MAX(unread_notifications - 1, 0)
                 WHERE user_id = ?1;",
                [owner_id],
            )?;
        }
        tx.commit()?;
        Ok(changed == 1)
    }

    fn mark_email_sent(&self, id: NotificationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("UPDATE notifications SET email_sent = 1 WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "notification",
                id,
            });
        }
        Ok(())
    }

    fn list_email_unsent(
        &self,
        after_id: NotificationId,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Notification>> {
        let limit = normalize_limit(limit, NOTIFICATIONS_DEFAULT_LIMIT, NOTIFICATIONS_LIMIT_MAX);
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE email_sent = 0 AND id > ?1
             ORDER BY id ASC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![after_id, limit])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    Ok(Notification {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        message: row.get("message")?,
        message_data: row.get("message_data")?,
        url_data: row.get("url_data")?,
        email_sent: int_to_bool(row.get("email_sent")?, "notifications.email_sent")?,
        seen: int_to_bool(row.get("seen")?, "notifications.seen")?,
        image: row.get("image")?,
    })
}
