//! Profile link use-case service.

use crate::model::link::{LinkRelevance, LinkType, UserLink, UserLinkId};
use crate::model::user::UserId;
use crate::repo::link_repo::LinkRepository;
use crate::repo::user_repo::RepoResult;
use log::{info, warn};
use std::collections::BTreeMap;

/// Link rendered with its profile URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLink {
    pub link: UserLink,
    pub url: String,
}

pub struct LinkService<R: LinkRepository> {
    repo: R,
}

impl<R: LinkRepository> LinkService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a link; the owner's cached twitter handle follows link changes.
    pub fn add_link(
        &self,
        owner_id: UserId,
        kind: LinkType,
        value: impl Into<String>,
        relevance: Option<LinkRelevance>,
    ) -> RepoResult<UserLinkId> {
        let mut link = UserLink::new(owner_id, kind, value);
        link.relevance = relevance;
        let id = self.repo.add_link(&link)?;
        info!(
            "event=link_add module=link status=ok link_id={id} owner_id={owner_id} type={}",
            kind.as_code()
        );
        Ok(id)
    }

    pub fn list_links(&self, owner_id: UserId) -> RepoResult<Vec<UserLink>> {
        self.repo.list_links(owner_id)
    }

    pub fn delete_link(&self, owner_id: UserId, link_id: UserLinkId) -> RepoResult<()> {
        self.repo.delete_link(owner_id, link_id)
    }

    /// Links with rendered URLs; links without a usable template are omitted.
    pub fn profile_links(
        &self,
        owner_id: UserId,
        link_urls: &BTreeMap<LinkType, String>,
    ) -> RepoResult<Vec<ProfileLink>> {
        let mut rendered = Vec::new();
        for link in self.repo.list_links(owner_id)? {
            match link.url(link_urls) {
                Some(Ok(url)) => rendered.push(ProfileLink { link, url }),
                Some(Err(err)) => warn!(
                    "event=link_render module=link status=error link_id={} error={}",
                    link.id, err
                ),
                None => warn!(
                    "event=link_render module=link status=skip link_id={} type={}",
                    link.id,
                    link.kind.as_code()
                ),
            }
        }
        Ok(rendered)
    }
}
