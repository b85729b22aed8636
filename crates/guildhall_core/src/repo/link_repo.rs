//! Profile link repository.
//!
//! # Invariants
//! - Every link mutation refreshes `user_preferences.cache_twitter` in the
//!   same transaction, to the oldest twitter link value or NULL.

use crate::model::link::{LinkRelevance, LinkType, UserLink, UserLinkId};
use crate::model::user::UserId;
use crate::repo::user_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction};

pub trait LinkRepository {
    fn add_link(&self, link: &UserLink) -> RepoResult<UserLinkId>;
    /// Links of `owner_id` in creation order.
    fn list_links(&self, owner_id: UserId) -> RepoResult<Vec<UserLink>>;
    fn delete_link(&self, owner_id: UserId, link_id: UserLinkId) -> RepoResult<()>;
}

pub struct SqliteLinkRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLinkRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl LinkRepository for SqliteLinkRepository<'_> {
    fn add_link(&self, link: &UserLink) -> RepoResult<UserLinkId> {
        link.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO user_links (owner_id, type, value, relevance) VALUES (?1, ?2, ?3, ?4);",
            params![
                link.owner_id,
                link.kind.as_code(),
                link.value.as_str(),
                link.relevance.map(LinkRelevance::as_code),
            ],
        )?;
        let id = tx.last_insert_rowid();
        refresh_twitter_cache(&tx, link.owner_id)?;
        tx.commit()?;

        Ok(id)
    }

    fn list_links(&self, owner_id: UserId) -> RepoResult<Vec<UserLink>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, type, value, relevance
             FROM user_links
             WHERE owner_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([owner_id])?;
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            links.push(parse_link_row(row)?);
        }
        Ok(links)
    }

    fn delete_link(&self, owner_id: UserId, link_id: UserLinkId) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "DELETE FROM user_links WHERE id = ?1 AND owner_id = ?2;",
            params![link_id, owner_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "user_link",
                id: link_id,
            });
        }
        refresh_twitter_cache(&tx, owner_id)?;
        tx.commit()?;
        Ok(())
    }
}

fn refresh_twitter_cache(tx: &Transaction<'_>, owner_id: UserId) -> RepoResult<()> {
    tx.execute(
        "UPDATE user_preferences
         SET cache_twitter = (
            SELECT value
            FROM user_links
            WHERE owner_id = ?1 AND type = ?2
            ORDER BY id ASC
            LIMIT 1
         )
         WHERE user_id = ?1;",
        params![owner_id, LinkType::Twitter.as_code()],
    )?;
    Ok(())
}

fn parse_link_row(row: &Row<'_>) -> RepoResult<UserLink> {
    let type_text: String = row.get("type")?;
    let kind = LinkType::from_code(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid link type `{type_text}` in user_links.type"))
    })?;

    let relevance = match row.get::<_, Option<i64>>("relevance")? {
        Some(code) => Some(LinkRelevance::from_code(code).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid relevance `{code}` in user_links.relevance"
            ))
        })?),
        None => None,
    };

    let link = UserLink {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        kind,
        value: row.get("value")?,
        relevance,
    };
    link.validate()?;
    Ok(link)
}
