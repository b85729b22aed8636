//! Notification use-case service.
//!
//! # Responsibility
//! - Create notifications with CSV-encoded template arguments.
//! - Track seen state and e-mail delivery state.
//! - Select notifications eligible for e-mail, honoring per-user opt-outs.

use crate::codec::encode_list;
use crate::model::notification::{Notification, NotificationCode, NotificationId};
use crate::model::user::UserId;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::normalize_limit;
use crate::repo::user_repo::{RepoError, RepoResult, UserRepository};
use log::{info, warn};
use std::collections::BTreeMap;

const PENDING_EMAILS_DEFAULT_LIMIT: u32 = 20;
const PENDING_EMAILS_LIMIT_MAX: u32 = 200;
const EMAIL_SCAN_PAGE_SIZE: u32 = 200;

/// Request model for creating one notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyRequest {
    pub owner_id: UserId,
    pub message: NotificationCode,
    pub message_data: Vec<String>,
    /// When absent, URLs are rendered from `message_data`.
    pub url_data: Option<Vec<String>>,
    pub image: Option<String>,
}

pub struct NotificationService<N: NotificationRepository, U: UserRepository> {
    notifications: N,
    users: U,
}

impl<N: NotificationRepository, U: UserRepository> NotificationService<N, U> {
    pub fn new(notifications: N, users: U) -> Self {
        Self {
            notifications,
            users,
        }
    }

    /// Creates an unseen notification and bumps the owner's unread counter.
    pub fn notify(&self, request: &NotifyRequest) -> RepoResult<Notification> {
        if self.users.get_user(request.owner_id)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "user",
                id: request.owner_id,
            });
        }

        let mut notification =
            Notification::new(request.owner_id, request.message, &request.message_data);
        notification.url_data = request.url_data.as_deref().map(encode_list);
        notification.image = request.image.clone();

        let id = self.notifications.create_notification(&notification)?;
        info!(
            "event=notification_create module=notification status=ok notification_id={id} owner_id={} message={}",
            request.owner_id, request.message
        );
        self.notifications
            .get_notification(id)?
            .ok_or(RepoError::NotFound {
                entity: "notification",
                id,
            })
    }

    pub fn list_for_owner(
        &self,
        owner_id: UserId,
        include_seen: bool,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Notification>> {
        self.notifications.list_for_owner(owner_id, include_seen, limit)
    }

    pub fn mark_seen(&self, id: NotificationId) -> RepoResult<bool> {
        self.notifications.mark_seen(id)
    }

    pub fn mark_email_sent(&self, id: NotificationId) -> RepoResult<()> {
        self.notifications.mark_email_sent(id)
    }

    /// Up to `limit` unsent notifications whose owner allows e-mails for
    /// their type, oldest first.
    ///
    /// Ineligible rows stay unsent, so the scan pages past them until enough
    /// eligible rows are found or the table is exhausted. Notifications of
    /// owners without preferences are skipped.
    pub fn pending_emails(&self, limit: Option<u32>) -> RepoResult<Vec<Notification>> {
        let wanted = normalize_limit(limit, PENDING_EMAILS_DEFAULT_LIMIT, PENDING_EMAILS_LIMIT_MAX);
        let mut opt_outs: BTreeMap<UserId, Option<Vec<NotificationCode>>> = BTreeMap::new();
        let mut pending = Vec::new();
        let mut after_id = 0;

        loop {
            let page = self
                .notifications
                .list_email_unsent(after_id, Some(EMAIL_SCAN_PAGE_SIZE))?;
            let exhausted = page.len() < EMAIL_SCAN_PAGE_SIZE as usize;

            for notification in page {
                after_id = notification.id;
                if self.email_allowed(&mut opt_outs, &notification)? {
                    pending.push(notification);
                    if pending.len() >= wanted as usize {
                        return Ok(pending);
                    }
                }
            }

            if exhausted {
                return Ok(pending);
            }
        }
    }

    fn email_allowed(
        &self,
        opt_outs: &mut BTreeMap<UserId, Option<Vec<NotificationCode>>>,
        notification: &Notification,
    ) -> RepoResult<bool> {
        let owner_id = notification.owner_id;
        if !opt_outs.contains_key(&owner_id) {
            let turned_off = match self.users.get_preferences(owner_id)? {
                Some(prefs) => {
                    let codes = prefs.email_notifications_turned_off().map_err(|err| {
                        RepoError::InvalidData(format!("user_preferences {owner_id}: {err}"))
                    })?;
                    Some(codes)
                }
                None => {
                    warn!(
                        "event=notification_email_skip module=notification status=skip owner_id={owner_id} reason=missing_preferences"
                    );
                    None
                }
            };
            opt_outs.insert(owner_id, turned_off);
        }

        Ok(matches!(
            opt_outs.get(&owner_id),
            Some(Some(turned_off)) if !turned_off.contains(&notification.message)
        ))
    }
}
