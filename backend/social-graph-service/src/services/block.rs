use crate::db::{self, GraphClient};
use crate::domain::edge::BlockOutcome;
use crate::domain::user::User;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use neo4rs::query;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct BlockService {
    graph: GraphClient,
}

impl BlockService {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    /// Block `blocked_id`. Follows in both directions and pending follow
    /// requests are removed in the same statement that creates the BLOCKS
    /// edge.
    pub async fn block_user(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<BlockOutcome> {
        if blocker_id == blocked_id {
            return Err(AppError::bad_request("Users cannot block themselves"));
        }

        let outcome: BlockOutcome = self
            .graph
            .fetch_one(
                query(
                    "MATCH (blocker:User {user_id: $blocker_id})
                     MATCH (blockee:User {user_id: $blocked_id})
                     OPTIONAL MATCH (blocker)-[f1:FOLLOWS]->(blockee)
                     OPTIONAL MATCH (blockee)-[f2:FOLLOWS]->(blocker)
                     WITH blocker, blockee, f1, f2,
                          f1 IS NOT NULL AS had_forward,
                          f2 IS NOT NULL AS had_reverse
                     DELETE f1, f2
                     SET blocker.following_count = CASE
                            WHEN had_forward AND coalesce(blocker.following_count, 0) > 0
                            THEN blocker.following_count - 1
                            ELSE coalesce(blocker.following_count, 0) END,
                         blockee.follower_count = CASE
                            WHEN had_forward AND coalesce(blockee.follower_count, 0) > 0
                            THEN blockee.follower_count - 1
                            ELSE coalesce(blockee.follower_count, 0) END,
                         blockee.following_count = CASE
                            WHEN had_reverse AND coalesce(blockee.following_count, 0) > 0
                            THEN blockee.following_count - 1
                            ELSE coalesce(blockee.following_count, 0) END,
                         blocker.follower_count = CASE
                            WHEN had_reverse AND coalesce(blocker.follower_count, 0) > 0
                            THEN blocker.follower_count - 1
                            ELSE coalesce(blocker.follower_count, 0) END
                     WITH blocker, blockee, had_forward, had_reverse
                     OPTIONAL MATCH (blocker)-[req:REQUESTED_TO_FOLLOW]-(blockee)
                     DELETE req
                     WITH DISTINCT blocker, blockee, had_forward, had_reverse
                     MERGE (blocker)-[b:BLOCKS]->(blockee)
                     ON CREATE SET b.created_at = $now
                     RETURN {
                        success: true,
                        blocked_user_id: blockee.user_id,
                        removed_forward_follow: had_forward,
                        removed_reverse_follow: had_reverse
                     } AS outcome",
                )
                .param("blocker_id", blocker_id.to_string())
                .param("blocked_id", blocked_id.to_string())
                .param("now", db::now()),
                "outcome",
                "User not found",
            )
            .await?;

        info!(
            %blocker_id,
            %blocked_id,
            removed_forward_follow = outcome.removed_forward_follow,
            removed_reverse_follow = outcome.removed_reverse_follow,
            "User blocked"
        );
        Ok(outcome)
    }

    pub async fn unblock_user(&self, blocker_id: Uuid, blocked_id: Uuid) -> Result<()> {
        if blocker_id == blocked_id {
            return Err(AppError::bad_request("Users cannot unblock themselves"));
        }
        let removed: i64 = self
            .graph
            .fetch_one(
                query(
                    "OPTIONAL MATCH (:User {user_id: $blocker_id})-[r:BLOCKS]->(:User {user_id: $blocked_id})
                     DELETE r
                     RETURN count(r) AS removed",
                )
                .param("blocker_id", blocker_id.to_string())
                .param("blocked_id", blocked_id.to_string()),
                "removed",
                "Block does not exist",
            )
            .await?;
        if removed == 0 {
            return Err(AppError::not_found("Block does not exist"));
        }
        info!(%blocker_id, %blocked_id, "User unblocked");
        Ok(())
    }

    pub async fn get_blocked_users(&self, user_id: Uuid, page: Pagination) -> Result<Vec<User>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (:User {user_id: $user_id})-[:BLOCKS]->(blocked:User)
                     RETURN blocked {.*} AS user
                     ORDER BY blocked.username ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "user",
            )
            .await
    }

    /// True when a BLOCKS edge exists in either direction
    pub async fn is_blocked(&self, user_a: Uuid, user_b: Uuid) -> Result<bool> {
        let blocked = self
            .graph
            .fetch_optional::<bool>(
                query(
                    "RETURN EXISTS {
                        MATCH (:User {user_id: $a})-[:BLOCKS]-(:User {user_id: $b})
                     } AS blocked",
                )
                .param("a", user_a.to_string())
                .param("b", user_b.to_string()),
                "blocked",
            )
            .await?;
        Ok(blocked.unwrap_or(false))
    }
}
