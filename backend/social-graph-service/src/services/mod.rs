pub mod analytics;
pub mod auth;
pub mod block;
pub mod bookmark;
pub mod bookmark_collection;
pub mod comment;
pub mod dating;
pub mod follow;
pub mod interaction;
pub mod like;
pub mod message;
pub mod notification;
pub mod post;
pub mod profile;
pub mod recommendation;

use crate::db::GraphClient;
use crate::domain::edge::BlockState;
use crate::error::{AppError, Result};
use neo4rs::query;
use serde::Deserialize;
use uuid::Uuid;

/// Existence and block flags for an ordered pair of users
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PairStatus {
    pub actor_exists: bool,
    pub other_exists: bool,
    pub actor_blocked_other: bool,
    pub other_blocked_actor: bool,
}

impl PairStatus {
    pub fn blocks(&self) -> BlockState {
        BlockState {
            actor_blocked_other: self.actor_blocked_other,
            other_blocked_actor: self.other_blocked_actor,
        }
    }

    /// 404 naming the missing side
    pub fn require_users(&self) -> Result<()> {
        if !self.actor_exists {
            return Err(AppError::not_found("User not found"));
        }
        if !self.other_exists {
            return Err(AppError::not_found("Target user not found"));
        }
        Ok(())
    }
}

pub(crate) async fn pair_status(graph: &GraphClient, actor: Uuid, other: Uuid) -> Result<PairStatus> {
    graph
        .fetch_one(
            query(
                "OPTIONAL MATCH (a:User {user_id: $actor})
                 OPTIONAL MATCH (b:User {user_id: $other})
                 RETURN {
                    actor_exists: a IS NOT NULL,
                    other_exists: b IS NOT NULL,
                    actor_blocked_other: a IS NOT NULL AND b IS NOT NULL
                        AND EXISTS { (a)-[:BLOCKS]->(b) },
                    other_blocked_actor: a IS NOT NULL AND b IS NOT NULL
                        AND EXISTS { (b)-[:BLOCKS]->(a) }
                 } AS status",
            )
            .param("actor", actor.to_string())
            .param("other", other.to_string()),
            "status",
            "user pair",
        )
        .await
}

/// Fails with 404 when either user is missing and 400 naming the blocking
/// side when a block exists in either direction.
pub(crate) async fn ensure_unblocked(
    graph: &GraphClient,
    actor: Uuid,
    other: Uuid,
    action: &str,
) -> Result<PairStatus> {
    let status = pair_status(graph, actor, other).await?;
    status.require_users()?;
    if let Some(msg) = status.blocks().violation(action) {
        return Err(AppError::bad_request(msg));
    }
    Ok(status)
}

/// Stored FastRP embedding of a user; 404 when the user is missing
pub(crate) async fn user_embedding(graph: &GraphClient, user_id: Uuid) -> Result<Option<Vec<f64>>> {
    graph
        .fetch_optional::<Option<Vec<f64>>>(
            query("MATCH (u:User {user_id: $user_id}) RETURN u.embedding AS embedding")
                .param("user_id", user_id.to_string()),
            "embedding",
        )
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// Ids of the mentioned usernames that exist, excluding `author_id`
pub(crate) async fn resolve_mentions(
    graph: &GraphClient,
    author_id: Uuid,
    usernames: Vec<String>,
) -> Result<Vec<Uuid>> {
    if usernames.is_empty() {
        return Ok(Vec::new());
    }
    graph
        .fetch_all(
            query(
                "MATCH (m:User)
                 WHERE m.username IN $usernames AND m.user_id <> $author_id
                 RETURN m.user_id AS user_id",
            )
            .param("usernames", usernames)
            .param("author_id", author_id.to_string()),
            "user_id",
        )
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_status_requires_both_users() {
        let status = PairStatus {
            actor_exists: true,
            other_exists: false,
            actor_blocked_other: false,
            other_blocked_actor: false,
        };
        assert!(matches!(status.require_users(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_pair_status_block_view() {
        let status = PairStatus {
            actor_exists: true,
            other_exists: true,
            actor_blocked_other: false,
            other_blocked_actor: true,
        };
        assert!(status.blocks().any());
        assert!(status.require_users().is_ok());
    }
}
