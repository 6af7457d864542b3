use crate::db::{self, nullable, GraphClient};
use crate::domain::bookmark::{Bookmark, BookmarkCreate};
use crate::domain::post::Post;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use neo4rs::query;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
struct BookmarkStatus {
    user_exists: bool,
    post_exists: bool,
    bookmarked: bool,
}

#[derive(Clone)]
pub struct BookmarkService {
    graph: GraphClient,
}

impl BookmarkService {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    async fn status(&self, user_id: Uuid, post_id: Uuid) -> Result<BookmarkStatus> {
        self.graph
            .fetch_one(
                query(
                    "OPTIONAL MATCH (user:User {user_id: $user_id})
                     OPTIONAL MATCH (post:Post {post_id: $post_id})
                     RETURN {
                        user_exists: user IS NOT NULL,
                        post_exists: post IS NOT NULL,
                        bookmarked: user IS NOT NULL AND post IS NOT NULL
                            AND EXISTS { (user)-[:BOOKMARKED]->(:Bookmark)-[:BOOKMARKS]->(post) }
                     } AS status",
                )
                .param("user_id", user_id.to_string())
                .param("post_id", post_id.to_string()),
                "status",
                "Bookmark status",
            )
            .await
    }

    /// One bookmark per user and post
    pub async fn bookmark_post(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        payload: BookmarkCreate,
    ) -> Result<Bookmark> {
        payload.validate()?;
        let created = self
            .graph
            .fetch_optional::<Bookmark>(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (post:Post {post_id: $post_id})
                     WHERE NOT EXISTS { (user)-[:BOOKMARKED]->(:Bookmark)-[:BOOKMARKS]->(post) }
                     CREATE (user)-[:BOOKMARKED]->(b:Bookmark {
                        bookmark_id: $bookmark_id,
                        user_id: $user_id,
                        post_id: $post_id,
                        notes: $notes,
                        created_at: $now
                     })-[:BOOKMARKS]->(post)
                     SET post.bookmark_count = coalesce(post.bookmark_count, 0) + 1
                     RETURN b {.*} AS bookmark",
                )
                .param("user_id", user_id.to_string())
                .param("post_id", post_id.to_string())
                .param("bookmark_id", Uuid::new_v4().to_string())
                .param("notes", nullable(payload.notes))
                .param("now", db::now()),
                "bookmark",
            )
            .await?;
        if let Some(bookmark) = created {
            debug!(%user_id, %post_id, bookmark_id = %bookmark.bookmark_id, "Bookmark created");
            return Ok(bookmark);
        }

        let status = self.status(user_id, post_id).await?;
        if !status.user_exists {
            Err(AppError::not_found("User not found"))
        } else if !status.post_exists {
            Err(AppError::not_found("Post not found"))
        } else if status.bookmarked {
            Err(AppError::bad_request("Post is already bookmarked"))
        } else {
            Err(AppError::Internal("Failed to create bookmark".into()))
        }
    }

    /// Deletes the bookmark and takes it out of every collection holding it
    pub async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> Result<()> {
        let removed = self
            .graph
            .fetch_optional::<bool>(
                query(
                    "MATCH (:User {user_id: $user_id})-[:BOOKMARKED]->(b:Bookmark)-[:BOOKMARKS]->(post:Post {post_id: $post_id})
                     OPTIONAL MATCH (col:BookmarkCollection)-[:CONTAINS]->(b)
                     WITH b, post, collect(col) AS collections
                     FOREACH (col IN collections |
                        SET col.bookmark_count = CASE
                            WHEN coalesce(col.bookmark_count, 0) > 0
                            THEN col.bookmark_count - 1 ELSE 0 END,
                            col.updated_at = $now
                     )
                     SET post.bookmark_count = CASE
                        WHEN coalesce(post.bookmark_count, 0) > 0
                        THEN post.bookmark_count - 1 ELSE 0 END
                     DETACH DELETE b
                     RETURN true AS removed",
                )
                .param("user_id", user_id.to_string())
                .param("post_id", post_id.to_string())
                .param("now", db::now()),
                "removed",
            )
            .await?;
        if removed.is_none() {
            return Err(AppError::not_found("Bookmark not found"));
        }
        debug!(%user_id, %post_id, "Bookmark removed");
        Ok(())
    }

    pub async fn is_bookmarked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        Ok(self.status(user_id, post_id).await?.bookmarked)
    }

    /// Bookmarked posts, newest bookmark first. Only the owner may list.
    pub async fn get_bookmarked_posts(
        &self,
        requester_id: Uuid,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<Post>> {
        if requester_id != user_id {
            return Err(AppError::forbidden("You can only view your own bookmarks"));
        }
        self.graph
            .fetch_all(
                query(
                    "MATCH (:User {user_id: $user_id})-[:BOOKMARKED]->(b:Bookmark)-[:BOOKMARKS]->(post:Post)
                     RETURN post {.*} AS post
                     ORDER BY b.created_at DESC, b.bookmark_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "post",
            )
            .await
    }
}
