//! Activity feed use-case service.
//!
//! # Responsibility
//! - Post, list and tag feed activities.
//! - Serve the denormalized owner view, refreshing it lazily when stale.
//!
//! # Invariants
//! - A fresh owner cache is returned without any write.
//! - A stale owner cache is refreshed from live owner data and persisted
//!   before the view is returned; refresh failures propagate.
//! - Concurrent stale readers may refresh redundantly; last writer wins.

use crate::model::activity::{Activity, ActivityId, CachedOwner};
use crate::model::user::UserId;
use crate::model::{now_epoch_ms, EpochMs};
use crate::repo::activity_repo::{ActivityListQuery, ActivityRepository};
use crate::repo::user_repo::{RepoError, RepoResult};
use log::{debug, error, info};

/// Use-case service wrapper for feed activities.
pub struct ActivityService<R: ActivityRepository> {
    repo: R,
}

impl<R: ActivityRepository> ActivityService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an activity with an owner snapshot taken at posting time.
    pub fn post_activity(
        &self,
        owner_id: UserId,
        message: impl Into<String>,
        language: impl Into<String>,
        tags: &[String],
    ) -> RepoResult<Activity> {
        let mut activity = Activity::new(owner_id, message, language);
        if !tags.is_empty() {
            activity.save_tags(tags);
        }
        let snapshot = self.repo.load_owner_snapshot(owner_id)?;
        activity.apply_owner_snapshot(snapshot, now_epoch_ms());

        let id = self.repo.create_activity(&activity)?;
        info!("event=activity_post module=activity status=ok activity_id={id} owner_id={owner_id}");
        self.require_activity(id)
    }

    pub fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        self.repo.get_activity(id)
    }

    pub fn list_feed(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>> {
        self.repo.list_activities(query)
    }

    pub fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        self.repo.delete_activity(id)
    }

    /// Returns the cached owner view, refreshing it first when stale.
    ///
    /// This is not a pure accessor: a stale cache causes a write.
    pub fn cached_owner(&self, activity: &mut Activity) -> RepoResult<CachedOwner> {
        self.cached_owner_at(activity, now_epoch_ms())
    }

    /// `cached_owner` evaluated at an explicit point in time.
    pub fn cached_owner_at(&self, activity: &mut Activity, now: EpochMs) -> RepoResult<CachedOwner> {
        if activity.is_owner_cache_stale(now) {
            self.refresh_owner_cache(activity, now)?;
        } else {
            debug!(
                "event=owner_cache_hit module=activity activity_id={}",
                activity.id
            );
        }
        Ok(activity.owner_cache_view())
    }

    /// Refreshes and persists the owner cache regardless of freshness.
    pub fn force_cache_owner(&self, activity: &mut Activity) -> RepoResult<()> {
        self.refresh_owner_cache(activity, now_epoch_ms())
    }

    /// Appends new tags and persists the activity.
    pub fn add_tags(&self, activity: &mut Activity, tags: &[String]) -> RepoResult<()> {
        activity.add_tags(tags);
        self.repo.update_activity(activity)
    }

    pub fn remove_tags(&self, activity: &mut Activity, tags: &[String]) -> RepoResult<()> {
        activity.remove_tags(tags);
        self.repo.update_activity(activity)
    }

    /// Replaces the whole tag list and persists the activity.
    pub fn save_tags(&self, activity: &mut Activity, tags: &[String]) -> RepoResult<()> {
        activity.save_tags(tags);
        self.repo.update_activity(activity)
    }

    pub fn like(&self, activity_id: ActivityId, user_id: UserId) -> RepoResult<bool> {
        self.repo.like(activity_id, user_id)
    }

    pub fn unlike(&self, activity_id: ActivityId, user_id: UserId) -> RepoResult<bool> {
        self.repo.unlike(activity_id, user_id)
    }

    pub fn count_likes(&self, activity_id: ActivityId) -> RepoResult<u64> {
        self.repo.count_likes(activity_id)
    }

    fn refresh_owner_cache(&self, activity: &mut Activity, now: EpochMs) -> RepoResult<()> {
        let result = self
            .repo
            .load_owner_snapshot(activity.owner_id)
            .and_then(|snapshot| {
                let mut refreshed = activity.clone();
                refreshed.apply_owner_snapshot(snapshot, now);
                self.repo.update_activity(&refreshed)?;
                Ok(refreshed)
            });

        match result {
            Ok(refreshed) => {
                *activity = refreshed;
                info!(
                    "event=owner_cache_refresh module=activity status=ok activity_id={} owner_id={}",
                    activity.id, activity.owner_id
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=owner_cache_refresh module=activity status=error activity_id={} owner_id={} error={}",
                    activity.id, activity.owner_id, err
                );
                Err(err)
            }
        }
    }

    fn require_activity(&self, id: ActivityId) -> RepoResult<Activity> {
        self.repo.get_activity(id)?.ok_or(RepoError::NotFound {
            entity: "activity",
            id,
        })
    }
}
