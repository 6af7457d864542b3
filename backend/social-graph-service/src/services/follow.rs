use crate::db::{self, GraphClient};
use crate::domain::edge::{Follow, FollowOutcome, FollowRequest};
use crate::domain::notification::NotificationType;
use crate::domain::user::User;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::services::notification::NotificationService;
use crate::services::ensure_unblocked;
use neo4rs::query;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct FollowStatus {
    is_private: bool,
    following: bool,
    requested: bool,
}

#[derive(Clone)]
pub struct FollowService {
    graph: GraphClient,
    notifications: NotificationService,
}

impl FollowService {
    pub fn new(graph: GraphClient, notifications: NotificationService) -> Self {
        Self {
            graph,
            notifications,
        }
    }

    /// Follow a public user directly or file a request towards a private one
    pub async fn follow_user(&self, follower_id: Uuid, target_id: Uuid) -> Result<FollowOutcome> {
        if follower_id == target_id {
            return Err(AppError::bad_request("Users cannot follow themselves"));
        }
        ensure_unblocked(&self.graph, follower_id, target_id, "follow").await?;

        let status: FollowStatus = self
            .graph
            .fetch_one(
                query(
                    "MATCH (a:User {user_id: $follower_id}), (b:User {user_id: $target_id})
                     RETURN {
                        is_private: coalesce(b.is_private, false),
                        following: EXISTS { (a)-[:FOLLOWS]->(b) },
                        requested: EXISTS { (a)-[:REQUESTED_TO_FOLLOW]->(b) }
                     } AS status",
                )
                .param("follower_id", follower_id.to_string())
                .param("target_id", target_id.to_string()),
                "status",
                "User not found",
            )
            .await?;

        if status.following {
            return Err(AppError::bad_request("Already following this user"));
        }
        if status.requested {
            return Err(AppError::bad_request("Follow request already pending"));
        }

        if status.is_private {
            let created = self
                .graph
                .fetch_optional::<bool>(
                    query(
                        "MATCH (a:User {user_id: $follower_id}), (b:User {user_id: $target_id})
                         WHERE NOT EXISTS { (a)-[:REQUESTED_TO_FOLLOW]->(b) }
                           AND NOT EXISTS { (a)-[:BLOCKS]-(b) }
                         CREATE (a)-[:REQUESTED_TO_FOLLOW {status: 'PENDING', created_at: $now}]->(b)
                         RETURN true AS created",
                    )
                    .param("follower_id", follower_id.to_string())
                    .param("target_id", target_id.to_string())
                    .param("now", db::now()),
                    "created",
                )
                .await?;
            if created.is_none() {
                return Err(AppError::bad_request("Follow request already pending"));
            }

            debug!(%follower_id, %target_id, "Follow request created");
            self.notifications
                .notify(
                    NotificationType::FollowRequestCreated,
                    follower_id,
                    target_id,
                    follower_id,
                )
                .await;

            return Ok(FollowOutcome {
                success: true,
                is_direct_follow: false,
            });
        }

        let created = self
            .graph
            .fetch_optional::<bool>(
                query(
                    "MATCH (a:User {user_id: $follower_id}), (b:User {user_id: $target_id})
                     WHERE NOT EXISTS { (a)-[:FOLLOWS]->(b) }
                       AND NOT EXISTS { (a)-[:BLOCKS]-(b) }
                     CREATE (a)-[:FOLLOWS {created_at: $now}]->(b)
                     SET a.following_count = coalesce(a.following_count, 0) + 1,
                         b.follower_count = coalesce(b.follower_count, 0) + 1
                     RETURN true AS created",
                )
                .param("follower_id", follower_id.to_string())
                .param("target_id", target_id.to_string())
                .param("now", db::now()),
                "created",
            )
            .await?;
        if created.is_none() {
            return Err(AppError::bad_request("Already following this user"));
        }

        info!(%follower_id, %target_id, "User followed");
        Ok(FollowOutcome {
            success: true,
            is_direct_follow: true,
        })
    }

    pub async fn accept_follow_request(&self, target_id: Uuid, requester_id: Uuid) -> Result<Follow> {
        let follow = self
            .graph
            .fetch_optional::<Follow>(
                query(
                    "MATCH (req:User {user_id: $requester_id})-[r:REQUESTED_TO_FOLLOW]->(t:User {user_id: $target_id})
                     WHERE r.status = 'PENDING'
                     DELETE r
                     MERGE (req)-[f:FOLLOWS]->(t)
                     ON CREATE SET
                        f.created_at = $now,
                        f.request_accepted_at = $now,
                        req.following_count = coalesce(req.following_count, 0) + 1,
                        t.follower_count = coalesce(t.follower_count, 0) + 1
                     RETURN f {.*, follower_id: req.user_id, following_id: t.user_id} AS follow",
                )
                .param("requester_id", requester_id.to_string())
                .param("target_id", target_id.to_string())
                .param("now", db::now()),
                "follow",
            )
            .await?
            .ok_or_else(|| AppError::not_found("Follow request not found or already processed"))?;

        info!(%requester_id, %target_id, "Follow request accepted");
        self.notifications
            .notify(
                NotificationType::FollowRequestAccepted,
                target_id,
                requester_id,
                target_id,
            )
            .await;
        Ok(follow)
    }

    pub async fn deny_follow_request(&self, target_id: Uuid, requester_id: Uuid) -> Result<()> {
        let removed: i64 = self
            .graph
            .fetch_one(
                query(
                    "OPTIONAL MATCH (:User {user_id: $requester_id})-[r:REQUESTED_TO_FOLLOW]->(:User {user_id: $target_id})
                     WHERE r.status = 'PENDING'
                     DELETE r
                     RETURN count(r) AS removed",
                )
                .param("requester_id", requester_id.to_string())
                .param("target_id", target_id.to_string()),
                "removed",
                "Follow request",
            )
            .await?;
        if removed == 0 {
            return Err(AppError::not_found(
                "Follow request not found or already processed",
            ));
        }
        debug!(%requester_id, %target_id, "Follow request denied");
        Ok(())
    }

    pub async fn unfollow_user(&self, follower_id: Uuid, target_id: Uuid) -> Result<()> {
        let removed: i64 = self
            .graph
            .fetch_one(
                query(
                    "OPTIONAL MATCH (a:User {user_id: $follower_id})-[r:FOLLOWS]->(b:User {user_id: $target_id})
                     DELETE r
                     FOREACH (_ IN CASE WHEN r IS NULL THEN [] ELSE [1] END |
                        SET a.following_count = CASE WHEN coalesce(a.following_count, 0) > 0
                                                     THEN a.following_count - 1 ELSE 0 END,
                            b.follower_count = CASE WHEN coalesce(b.follower_count, 0) > 0
                                                    THEN b.follower_count - 1 ELSE 0 END
                     )
                     RETURN count(r) AS removed",
                )
                .param("follower_id", follower_id.to_string())
                .param("target_id", target_id.to_string()),
                "removed",
                "Follow relationship",
            )
            .await?;
        if removed == 0 {
            return Err(AppError::not_found("Follow relationship not found"));
        }
        info!(%follower_id, %target_id, "User unfollowed");
        Ok(())
    }

    pub async fn get_followers(&self, user_id: Uuid, page: Pagination) -> Result<Vec<User>> {
        self.list_users(
            "MATCH (other:User)-[:FOLLOWS]->(:User {user_id: $user_id})",
            user_id,
            page,
        )
        .await
    }

    pub async fn get_following(&self, user_id: Uuid, page: Pagination) -> Result<Vec<User>> {
        self.list_users(
            "MATCH (:User {user_id: $user_id})-[:FOLLOWS]->(other:User)",
            user_id,
            page,
        )
        .await
    }

    /// Users that follow `user_id` and are followed back
    pub async fn get_mutual_followers(&self, user_id: Uuid, page: Pagination) -> Result<Vec<User>> {
        self.list_users(
            "MATCH (u:User {user_id: $user_id})-[:FOLLOWS]->(other:User)-[:FOLLOWS]->(u)",
            user_id,
            page,
        )
        .await
    }

    async fn list_users(&self, pattern: &str, user_id: Uuid, page: Pagination) -> Result<Vec<User>> {
        let cypher = format!(
            "{pattern}
             RETURN DISTINCT other {{.*}} AS user, other.username AS username
             ORDER BY username ASC
             SKIP $offset LIMIT $limit"
        );
        self.graph
            .fetch_all(
                query(&cypher)
                    .param("user_id", user_id.to_string())
                    .param("offset", page.offset)
                    .param("limit", page.limit),
                "user",
            )
            .await
    }

    /// Pending requests addressed to `user_id`, newest first
    pub async fn get_pending_requests(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<FollowRequest>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (req:User)-[r:REQUESTED_TO_FOLLOW]->(u:User {user_id: $user_id})
                     WHERE r.status = 'PENDING'
                     RETURN r {.*, requester_id: req.user_id, target_id: u.user_id} AS request
                     ORDER BY r.created_at DESC, req.user_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "request",
            )
            .await
    }
}
