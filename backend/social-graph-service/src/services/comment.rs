use crate::db::{self, nullable, GraphClient};
use crate::domain::comment::{Comment, CommentCreate, CommentUpdate};
use crate::domain::notification::NotificationType;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::services::notification::NotificationService;
use crate::services::resolve_mentions;
use crate::validators::extract_mentions;
use neo4rs::query;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
struct CommentTarget {
    post_exists: bool,
    allows_comments: bool,
    creator_id: Option<Uuid>,
    blocked: bool,
    parent_exists: bool,
    parent_author_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct CommentService {
    graph: GraphClient,
    notifications: NotificationService,
}

impl CommentService {
    pub fn new(graph: GraphClient, notifications: NotificationService) -> Self {
        Self {
            graph,
            notifications,
        }
    }

    async fn comment_target(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        parent_id: Option<Uuid>,
    ) -> Result<CommentTarget> {
        self.graph
            .fetch_one(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     OPTIONAL MATCH (creator:User)-[:POSTED]->(post:Post {post_id: $post_id})
                     OPTIONAL MATCH (parent:Comment {comment_id: $parent_id})-[:ON_POST]->(post)
                     OPTIONAL MATCH (parent_author:User)-[:AUTHORED]->(parent)
                     RETURN {
                        post_exists: post IS NOT NULL,
                        allows_comments: coalesce(post.allows_comments, true),
                        creator_id: creator.user_id,
                        blocked: creator IS NOT NULL AND EXISTS { (user)-[:BLOCKS]-(creator) },
                        parent_exists: parent IS NOT NULL,
                        parent_author_id: parent_author.user_id
                     } AS target",
                )
                .param("user_id", user_id.to_string())
                .param("post_id", post_id.to_string())
                .param("parent_id", nullable(parent_id.map(|id| id.to_string()))),
                "target",
                "User not found",
            )
            .await
    }

    /// Comment on a post, optionally as a reply. Mentions of existing users
    /// are linked and notified.
    pub async fn create_comment(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        payload: CommentCreate,
    ) -> Result<Comment> {
        payload.validate()?;
        let target = self
            .comment_target(user_id, post_id, payload.in_reply_to)
            .await?;
        if !target.post_exists {
            return Err(AppError::bad_request("Post not found"));
        }
        if !target.allows_comments {
            return Err(AppError::bad_request("Comments are disabled for this post"));
        }
        if target.blocked {
            return Err(AppError::forbidden("Cannot comment on this post"));
        }
        if payload.in_reply_to.is_some() && !target.parent_exists {
            return Err(AppError::not_found("Parent comment not found"));
        }

        let mentioned =
            resolve_mentions(&self.graph, user_id, extract_mentions(&payload.content)).await?;

        let comment: Comment = self
            .graph
            .fetch_one(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (post:Post {post_id: $post_id})
                     CREATE (comment:Comment {
                        comment_id: $comment_id,
                        user_id: $user_id,
                        post_id: $post_id,
                        content: $content,
                        in_reply_to: $parent_id,
                        like_count: 0,
                        reply_count: 0,
                        created_at: $now
                     })
                     CREATE (user)-[:AUTHORED]->(comment)
                     CREATE (comment)-[:ON_POST]->(post)
                     SET post.comment_count = coalesce(post.comment_count, 0) + 1
                     WITH comment
                     OPTIONAL MATCH (parent:Comment {comment_id: $parent_id})
                     FOREACH (_ IN CASE WHEN parent IS NULL THEN [] ELSE [1] END |
                        CREATE (comment)-[:REPLIES_TO]->(parent)
                        SET parent.reply_count = coalesce(parent.reply_count, 0) + 1
                     )
                     WITH comment
                     OPTIONAL MATCH (m:User) WHERE m.user_id IN $mentioned_ids
                     WITH comment, collect(m) AS mentioned
                     FOREACH (m IN mentioned | MERGE (comment)-[:MENTIONS {created_at: $now}]->(m))
                     RETURN comment {.*} AS comment",
                )
                .param("user_id", user_id.to_string())
                .param("post_id", post_id.to_string())
                .param("comment_id", Uuid::new_v4().to_string())
                .param("content", payload.content.trim().to_string())
                .param(
                    "parent_id",
                    nullable(payload.in_reply_to.map(|id| id.to_string())),
                )
                .param(
                    "mentioned_ids",
                    mentioned.iter().map(Uuid::to_string).collect::<Vec<_>>(),
                )
                .param("now", db::now()),
                "comment",
                "Post not found",
            )
            .await?;
        info!(%user_id, %post_id, comment_id = %comment.comment_id, "Comment created");

        if let Some(creator_id) = target.creator_id {
            self.notifications
                .notify(NotificationType::CommentOnPost, user_id, creator_id, comment.comment_id)
                .await;
        }
        if let Some(parent_author_id) = target.parent_author_id {
            self.notifications
                .notify(
                    NotificationType::ReplyToComment,
                    user_id,
                    parent_author_id,
                    comment.comment_id,
                )
                .await;
        }
        let mention_type = if comment.in_reply_to.is_some() {
            NotificationType::MentionedInReply
        } else {
            NotificationType::MentionedInComment
        };
        for mentioned_id in mentioned {
            self.notifications
                .notify(mention_type, user_id, mentioned_id, comment.comment_id)
                .await;
        }
        Ok(comment)
    }

    pub async fn get_comment(&self, comment_id: Uuid) -> Result<Comment> {
        self.graph
            .fetch_one(
                query("MATCH (c:Comment {comment_id: $comment_id}) RETURN c {.*} AS comment")
                    .param("comment_id", comment_id.to_string()),
                "comment",
                "Comment not found",
            )
            .await
    }

    async fn require_author(&self, comment_id: Uuid, user_id: Uuid, action: &str) -> Result<()> {
        let comment = self.get_comment(comment_id).await?;
        if comment.user_id != user_id {
            return Err(AppError::forbidden(format!(
                "Only the author can {} this comment",
                action
            )));
        }
        Ok(())
    }

    pub async fn update_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
        update: CommentUpdate,
    ) -> Result<Comment> {
        update.validate()?;
        self.require_author(comment_id, user_id, "update").await?;
        let comment = self
            .graph
            .fetch_one(
                query(
                    "MATCH (c:Comment {comment_id: $comment_id})
                     SET c.content = $content, c.updated_at = $now
                     RETURN c {.*} AS comment",
                )
                .param("comment_id", comment_id.to_string())
                .param("content", update.content.trim().to_string())
                .param("now", db::now()),
                "comment",
                "Comment not found",
            )
            .await?;
        debug!(%comment_id, "Comment updated");
        Ok(comment)
    }

    pub async fn delete_comment(&self, comment_id: Uuid, user_id: Uuid) -> Result<()> {
        self.require_author(comment_id, user_id, "delete").await?;
        self.graph
            .run(
                query(
                    "MATCH (c:Comment {comment_id: $comment_id})
                     OPTIONAL MATCH (c)-[:ON_POST]->(post:Post)
                     OPTIONAL MATCH (c)-[:REPLIES_TO]->(parent:Comment)
                     FOREACH (_ IN CASE WHEN post IS NULL THEN [] ELSE [1] END |
                        SET post.comment_count = CASE
                            WHEN coalesce(post.comment_count, 0) > 0
                            THEN post.comment_count - 1 ELSE 0 END
                     )
                     FOREACH (_ IN CASE WHEN parent IS NULL THEN [] ELSE [1] END |
                        SET parent.reply_count = CASE
                            WHEN coalesce(parent.reply_count, 0) > 0
                            THEN parent.reply_count - 1 ELSE 0 END
                     )
                     DETACH DELETE c",
                )
                .param("comment_id", comment_id.to_string()),
            )
            .await?;
        info!(%comment_id, %user_id, "Comment deleted");
        Ok(())
    }

    pub async fn get_post_comments(&self, post_id: Uuid, page: Pagination) -> Result<Vec<Comment>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (c:Comment)-[:ON_POST]->(:Post {post_id: $post_id})
                     RETURN c {.*} AS comment
                     ORDER BY c.created_at DESC, c.comment_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("post_id", post_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "comment",
            )
            .await
    }

    pub async fn get_user_comments(&self, user_id: Uuid, page: Pagination) -> Result<Vec<Comment>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (:User {user_id: $user_id})-[:AUTHORED]->(c:Comment)
                     RETURN c {.*} AS comment
                     ORDER BY c.created_at DESC, c.comment_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "comment",
            )
            .await
    }
}
