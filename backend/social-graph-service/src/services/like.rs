use crate::db::{self, GraphClient};
use crate::domain::like::{Like, LikeTarget};
use crate::domain::notification::NotificationType;
use crate::domain::post::Post;
use crate::domain::user::User;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::services::notification::NotificationService;
use chrono::{DateTime, Utc};
use neo4rs::query;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct LikeResult {
    created_at: DateTime<Utc>,
    created: bool,
    owner_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct LikeStatus {
    user_exists: bool,
    content_exists: bool,
    liked: bool,
}

#[derive(Clone)]
pub struct LikeService {
    graph: GraphClient,
    notifications: NotificationService,
}

impl LikeService {
    pub fn new(graph: GraphClient, notifications: NotificationService) -> Self {
        Self {
            graph,
            notifications,
        }
    }

    pub async fn like_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Like> {
        self.like(user_id, post_id, LikeTarget::Post).await
    }

    pub async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        self.unlike(user_id, post_id, LikeTarget::Post).await
    }

    pub async fn like_comment(&self, user_id: Uuid, comment_id: Uuid) -> Result<Like> {
        self.like(user_id, comment_id, LikeTarget::Comment).await
    }

    pub async fn unlike_comment(&self, user_id: Uuid, comment_id: Uuid) -> Result<()> {
        self.unlike(user_id, comment_id, LikeTarget::Comment).await
    }

    /// MERGE the LIKED edge; the counter only moves when the edge is new
    async fn like(&self, user_id: Uuid, content_id: Uuid, target: LikeTarget) -> Result<Like> {
        let cypher = format!(
            "MATCH (user:User {{user_id: $user_id}})
             MATCH (content:{label} {{{id_prop}: $content_id}})
             MERGE (user)-[r:LIKED]->(content)
             ON CREATE SET r.created_at = $now,
                           content.like_count = coalesce(content.like_count, 0) + 1
             RETURN {{
                created_at: r.created_at,
                created: r.created_at = $now,
                owner_id: coalesce(content.creator_id, content.user_id)
             }} AS result",
            label = target.label(),
            id_prop = target.id_property(),
        );
        let result = self
            .graph
            .fetch_optional::<LikeResult>(
                query(&cypher)
                    .param("user_id", user_id.to_string())
                    .param("content_id", content_id.to_string())
                    .param("now", db::now()),
                "result",
            )
            .await?;

        let result = match result {
            Some(r) => r,
            None => {
                let status = self.status(user_id, content_id, target).await?;
                return Err(missing(&status, target)
                    .unwrap_or_else(|| AppError::Internal("Failed to record like".into())));
            }
        };
        if !result.created {
            return Err(AppError::bad_request(format!(
                "You have already liked this {}",
                target.label().to_lowercase()
            )));
        }
        debug!(%user_id, %content_id, content_type = target.label(), "Like recorded");

        if let Some(owner_id) = result.owner_id {
            let notification_type = match target {
                LikeTarget::Post => NotificationType::LikedPost,
                LikeTarget::Comment => NotificationType::LikedComment,
            };
            self.notifications
                .notify(notification_type, user_id, owner_id, content_id)
                .await;
        }

        Ok(Like {
            user_id,
            content_id,
            content_type: target,
            created_at: result.created_at,
        })
    }

    async fn unlike(&self, user_id: Uuid, content_id: Uuid, target: LikeTarget) -> Result<()> {
        let cypher = format!(
            "MATCH (:User {{user_id: $user_id}})-[r:LIKED]->(content:{label} {{{id_prop}: $content_id}})
             DELETE r
             SET content.like_count = CASE
                WHEN coalesce(content.like_count, 0) > 0
                THEN content.like_count - 1 ELSE 0 END
             RETURN true AS removed",
            label = target.label(),
            id_prop = target.id_property(),
        );
        let removed = self
            .graph
            .fetch_optional::<bool>(
                query(&cypher)
                    .param("user_id", user_id.to_string())
                    .param("content_id", content_id.to_string()),
                "removed",
            )
            .await?;
        if removed.is_some() {
            debug!(%user_id, %content_id, content_type = target.label(), "Like removed");
            return Ok(());
        }

        let status = self.status(user_id, content_id, target).await?;
        if let Some(err) = missing(&status, target) {
            return Err(err);
        }
        if !status.liked {
            return Err(AppError::bad_request(format!(
                "You haven't liked this {}",
                target.label().to_lowercase()
            )));
        }
        Err(AppError::Internal("Failed to remove like".into()))
    }

    async fn status(&self, user_id: Uuid, content_id: Uuid, target: LikeTarget) -> Result<LikeStatus> {
        let cypher = format!(
            "OPTIONAL MATCH (user:User {{user_id: $user_id}})
             OPTIONAL MATCH (content:{label} {{{id_prop}: $content_id}})
             RETURN {{
                user_exists: user IS NOT NULL,
                content_exists: content IS NOT NULL,
                liked: user IS NOT NULL AND content IS NOT NULL
                       AND EXISTS {{ (user)-[:LIKED]->(content) }}
             }} AS status",
            label = target.label(),
            id_prop = target.id_property(),
        );
        self.graph
            .fetch_one(
                query(&cypher)
                    .param("user_id", user_id.to_string())
                    .param("content_id", content_id.to_string()),
                "status",
                "Like status",
            )
            .await
    }

    pub async fn get_post_likers(&self, post_id: Uuid, page: Pagination) -> Result<Vec<User>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (u:User)-[:LIKED]->(:Post {post_id: $post_id})
                     RETURN u {.*} AS user
                     ORDER BY u.username ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("post_id", post_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "user",
            )
            .await
    }

    /// Posts liked by `user_id`, most recently liked first
    pub async fn get_user_liked_posts(&self, user_id: Uuid, page: Pagination) -> Result<Vec<Post>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (:User {user_id: $user_id})-[r:LIKED]->(post:Post)
                     RETURN post {.*} AS post
                     ORDER BY r.created_at DESC, post.post_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "post",
            )
            .await
    }

    pub async fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let status = self.status(user_id, post_id, LikeTarget::Post).await?;
        Ok(status.liked)
    }
}

fn missing(status: &LikeStatus, target: LikeTarget) -> Option<AppError> {
    if !status.user_exists {
        Some(AppError::not_found("User not found"))
    } else if !status.content_exists {
        Some(AppError::not_found(format!("{} not found", target.label())))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_prefers_user_then_content() {
        let status = LikeStatus {
            user_exists: false,
            content_exists: false,
            liked: false,
        };
        assert!(matches!(
            missing(&status, LikeTarget::Post),
            Some(AppError::NotFound(m)) if m == "User not found"
        ));

        let status = LikeStatus {
            user_exists: true,
            content_exists: false,
            liked: false,
        };
        assert!(matches!(
            missing(&status, LikeTarget::Comment),
            Some(AppError::NotFound(m)) if m == "Comment not found"
        ));

        let status = LikeStatus {
            user_exists: true,
            content_exists: true,
            liked: true,
        };
        assert!(missing(&status, LikeTarget::Post).is_none());
    }
}
