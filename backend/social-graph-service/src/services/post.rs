use crate::db::{self, nullable, GraphClient};
use crate::domain::notification::NotificationType;
use crate::domain::post::{normalize_hashtags, Post, PostCreate, PostUpdate};
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::metrics::RankingTimer;
use crate::ranking::signals::post_text_score;
use crate::ranking::{
    cosine_similarity, engagement_rate, rank_page, recency_decay, FeedSignals, FeedWeights,
    PostSearchSignals, PostSearchWeights, Ranked,
};
use crate::services::notification::NotificationService;
use crate::services::{resolve_mentions, user_embedding};
use crate::validators::extract_mentions;
use chrono::Utc;
use neo4rs::query;
use serde::Deserialize;
use std::cmp::Ordering;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// A post plus the precomputed similarity edges between it, its creator
/// and the viewer
#[derive(Debug, Deserialize)]
struct PostCandidate {
    post: Post,
    #[serde(default)]
    node_similarity: Option<f64>,
    #[serde(default)]
    creator_similarity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PostAccess {
    post: Post,
    visible: bool,
}

#[derive(Clone)]
pub struct PostService {
    graph: GraphClient,
    notifications: NotificationService,
    candidate_limit: i64,
    feed_weights: FeedWeights,
    search_weights: PostSearchWeights,
}

/// Newest first, then post id for a stable order
fn newest_first(a: &Post, b: &Post) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| a.post_id.cmp(&b.post_id))
}

/// Visibility and block filter shared by the feed and search. `viewer`
/// and `creator` must be bound.
const VISIBLE_TO_VIEWER: &str = "(creator = viewer
            OR NOT coalesce(post.is_private, false)
            OR EXISTS { (viewer)-[:FOLLOWS]->(creator) })
       AND NOT EXISTS { (viewer)-[:BLOCKS]-(creator) }";

impl PostService {
    pub fn new(graph: GraphClient, notifications: NotificationService, candidate_limit: i64) -> Self {
        Self {
            graph,
            notifications,
            candidate_limit,
            feed_weights: FeedWeights::default(),
            search_weights: PostSearchWeights::default(),
        }
    }

    pub async fn create_post(&self, creator_id: Uuid, payload: PostCreate) -> Result<Post> {
        payload.validate()?;
        let post_id = Uuid::new_v4();
        let hashtags = normalize_hashtags(&payload.hashtags);
        let mentions = payload
            .description
            .as_deref()
            .map(extract_mentions)
            .unwrap_or_default();

        let post: Post = self
            .graph
            .fetch_one(
                query(
                    "MATCH (creator:User {user_id: $creator_id})
                     CREATE (creator)-[:POSTED]->(post:Post {
                        post_id: $post_id,
                        creator_id: $creator_id,
                        title: $title,
                        description: $description,
                        hashtags: $hashtags,
                        is_private: $is_private,
                        allows_comments: $allows_comments,
                        video_s3_key: $video_s3_key,
                        thumbnail_s3_key: $thumbnail_s3_key,
                        duration_seconds: $duration_seconds,
                        created_at: $now,
                        view_count: 0,
                        like_count: 0,
                        comment_count: 0,
                        share_count: 0,
                        bookmark_count: 0
                     })
                     SET creator.post_count = coalesce(creator.post_count, 0) + 1
                     RETURN post {.*} AS post",
                )
                .param("creator_id", creator_id.to_string())
                .param("post_id", post_id.to_string())
                .param("title", nullable(payload.title))
                .param("description", nullable(payload.description))
                .param("hashtags", hashtags)
                .param("is_private", payload.is_private)
                .param("allows_comments", payload.allows_comments)
                .param("video_s3_key", payload.video_s3_key)
                .param("thumbnail_s3_key", nullable(payload.thumbnail_s3_key))
                .param("duration_seconds", payload.duration_seconds)
                .param("now", db::now()),
                "post",
                "User not found",
            )
            .await?;
        info!(%creator_id, post_id = %post.post_id, "Post created");

        for mentioned in resolve_mentions(&self.graph, creator_id, mentions).await? {
            self.notifications
                .notify(NotificationType::MentionedInPost, creator_id, mentioned, post.post_id)
                .await;
        }
        Ok(post)
    }

    /// Private posts are visible to their creator and the creator's followers
    pub async fn get_post(&self, post_id: Uuid, viewer_id: Uuid) -> Result<Post> {
        let access: PostAccess = self
            .graph
            .fetch_one(
                query(
                    "MATCH (creator:User)-[:POSTED]->(post:Post {post_id: $post_id})
                     OPTIONAL MATCH (viewer:User {user_id: $viewer_id})
                     RETURN {
                        post: post {.*},
                        visible: NOT coalesce(post.is_private, false)
                                 OR (viewer IS NOT NULL
                                     AND (viewer = creator OR EXISTS { (viewer)-[:FOLLOWS]->(creator) }))
                     } AS access",
                )
                .param("post_id", post_id.to_string())
                .param("viewer_id", viewer_id.to_string()),
                "access",
                "Post not found",
            )
            .await?;
        if !access.visible {
            return Err(AppError::not_found("Post not found"));
        }
        Ok(access.post)
    }

    async fn require_creator(&self, post_id: Uuid, user_id: Uuid, action: &str) -> Result<()> {
        let creator_id: Uuid = self
            .graph
            .fetch_one(
                query("MATCH (post:Post {post_id: $post_id}) RETURN post.creator_id AS creator_id")
                    .param("post_id", post_id.to_string()),
                "creator_id",
                "Post not found",
            )
            .await?;
        if creator_id != user_id {
            return Err(AppError::forbidden(format!(
                "Only the creator can {} this post",
                action
            )));
        }
        Ok(())
    }

    pub async fn update_post(&self, post_id: Uuid, user_id: Uuid, update: PostUpdate) -> Result<Post> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".into()));
        }
        self.require_creator(post_id, user_id, "update").await?;

        let post = self
            .graph
            .fetch_one(
                query(
                    "MATCH (post:Post {post_id: $post_id})
                     SET post.title = coalesce($title, post.title),
                         post.description = coalesce($description, post.description),
                         post.hashtags = coalesce($hashtags, post.hashtags),
                         post.is_private = coalesce($is_private, post.is_private),
                         post.allows_comments = coalesce($allows_comments, post.allows_comments),
                         post.updated_at = $now
                     RETURN post {.*} AS post",
                )
                .param("post_id", post_id.to_string())
                .param("title", nullable(update.title))
                .param("description", nullable(update.description))
                .param(
                    "hashtags",
                    nullable(update.hashtags.as_deref().map(normalize_hashtags)),
                )
                .param("is_private", nullable(update.is_private))
                .param("allows_comments", nullable(update.allows_comments))
                .param("now", db::now()),
                "post",
                "Post not found",
            )
            .await?;
        debug!(%post_id, "Post updated");
        Ok(post)
    }

    /// Removes the post with its comments and bookmarks; collections that
    /// held those bookmarks have their counts adjusted.
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<()> {
        self.require_creator(post_id, user_id, "delete").await?;

        self.graph
            .run(
                query(
                    "MATCH (creator:User)-[:POSTED]->(post:Post {post_id: $post_id})
                     OPTIONAL MATCH (post)<-[:BOOKMARKS]-(:Bookmark)<-[:CONTAINS]-(col:BookmarkCollection)
                     WITH creator, post, col, count(col) AS contained
                     FOREACH (_ IN CASE WHEN col IS NULL THEN [] ELSE [1] END |
                        SET col.bookmark_count = CASE
                            WHEN coalesce(col.bookmark_count, 0) > contained
                            THEN col.bookmark_count - contained ELSE 0 END
                     )
                     WITH DISTINCT creator, post
                     OPTIONAL MATCH (c:Comment)-[:ON_POST]->(post)
                     OPTIONAL MATCH (b:Bookmark)-[:BOOKMARKS]->(post)
                     WITH creator, post, collect(DISTINCT c) AS comments, collect(DISTINCT b) AS bookmarks
                     FOREACH (c IN comments | DETACH DELETE c)
                     FOREACH (b IN bookmarks | DETACH DELETE b)
                     SET creator.post_count = CASE
                        WHEN coalesce(creator.post_count, 0) > 0
                        THEN creator.post_count - 1 ELSE 0 END
                     DETACH DELETE post",
                )
                .param("post_id", post_id.to_string()),
            )
            .await?;
        info!(%post_id, %user_id, "Post deleted");
        Ok(())
    }

    pub async fn get_user_posts(
        &self,
        user_id: Uuid,
        viewer_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<Post>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (owner:User {user_id: $user_id})-[:POSTED]->(post:Post)
                     OPTIONAL MATCH (viewer:User {user_id: $viewer_id})
                     WITH owner, post, viewer
                     WHERE NOT coalesce(post.is_private, false)
                        OR (viewer IS NOT NULL
                            AND (viewer = owner OR EXISTS { (viewer)-[:FOLLOWS]->(owner) }))
                     RETURN post {.*} AS post
                     ORDER BY post.created_at DESC, post.post_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("viewer_id", viewer_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "post",
            )
            .await
    }

    async fn fetch_candidates(
        &self,
        user_id: Uuid,
        extra_filter: &str,
        needle: Option<&str>,
    ) -> Result<Vec<PostCandidate>> {
        let cypher = format!(
            "MATCH (viewer:User {{user_id: $user_id}})
             MATCH (creator:User)-[:POSTED]->(post:Post)
             WHERE {VISIBLE_TO_VIEWER}
               AND {extra_filter}
             OPTIONAL MATCH (viewer)-[ps:SIMILAR]-(post)
             OPTIONAL MATCH (viewer)-[cs:SIMILAR]-(creator)
             WITH post, max(ps.similarity) AS node_similarity, max(cs.similarity) AS creator_similarity
             RETURN {{
                post: post {{.*}},
                node_similarity: node_similarity,
                creator_similarity: creator_similarity
             }} AS candidate
             ORDER BY post.created_at DESC
             LIMIT $candidate_limit"
        );
        self.graph
            .fetch_all(
                query(&cypher)
                    .param("user_id", user_id.to_string())
                    .param("needle", needle.unwrap_or_default())
                    .param("candidate_limit", self.candidate_limit),
                "candidate",
            )
            .await
    }

    /// Personalised feed: public posts and posts from followed creators,
    /// never the viewer's own.
    pub async fn get_feed(&self, user_id: Uuid, page: Pagination) -> Result<Vec<Ranked<Post>>> {
        let timer = RankingTimer::start("feed");
        let viewer_embedding = user_embedding(&self.graph, user_id).await?;
        let candidates = self
            .fetch_candidates(user_id, "creator <> viewer", None)
            .await?;
        let candidate_count = candidates.len();

        let now = Utc::now();
        let weights = self.feed_weights;
        let ranked = rank_page(
            candidates,
            &page,
            |c| {
                weights.score(&FeedSignals {
                    embedding: cosine_similarity(
                        viewer_embedding.as_deref(),
                        c.post.embedding.as_deref(),
                    ),
                    node_similarity: c.node_similarity.unwrap_or(0.0),
                    creator_similarity: c.creator_similarity.unwrap_or(0.0),
                    recency: recency_decay(c.post.created_at, now),
                    engagement: engagement_rate(
                        c.post.like_count,
                        c.post.comment_count,
                        c.post.share_count,
                        c.post.view_count,
                    ),
                })
            },
            |a, b| newest_first(&a.post, &b.post),
        );

        timer.finish(candidate_count);
        Ok(into_posts(ranked))
    }

    pub async fn search_posts(
        &self,
        user_id: Uuid,
        text: &str,
        page: Pagination,
    ) -> Result<Vec<Ranked<Post>>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::Validation("Search query cannot be empty".into()));
        }
        let timer = RankingTimer::start("post_search");
        let viewer_embedding = user_embedding(&self.graph, user_id).await?;
        let candidates = self
            .fetch_candidates(
                user_id,
                "(toLower(coalesce(post.title, '')) CONTAINS $needle
                   OR toLower(coalesce(post.description, '')) CONTAINS $needle
                   OR any(tag IN coalesce(post.hashtags, []) WHERE toLower(tag) CONTAINS $needle))",
                Some(&needle),
            )
            .await?;
        let candidate_count = candidates.len();

        let now = Utc::now();
        let weights = self.search_weights;
        let ranked = rank_page(
            candidates,
            &page,
            |c| {
                weights.score(&PostSearchSignals {
                    text: post_text_score(
                        &needle,
                        c.post.title.as_deref(),
                        c.post.description.as_deref(),
                    ),
                    embedding: cosine_similarity(
                        viewer_embedding.as_deref(),
                        c.post.embedding.as_deref(),
                    ),
                    node_similarity: c.node_similarity.unwrap_or(0.0),
                    recency: recency_decay(c.post.created_at, now),
                    engagement: engagement_rate(
                        c.post.like_count,
                        c.post.comment_count,
                        c.post.share_count,
                        c.post.view_count,
                    ),
                })
            },
            |a, b| newest_first(&a.post, &b.post),
        );

        timer.finish(candidate_count);
        Ok(into_posts(ranked))
    }

    pub async fn record_view(&self, post_id: Uuid) -> Result<Post> {
        self.bump_counter(post_id, "view_count").await
    }

    pub async fn record_share(&self, post_id: Uuid) -> Result<Post> {
        self.bump_counter(post_id, "share_count").await
    }

    async fn bump_counter(&self, post_id: Uuid, counter: &str) -> Result<Post> {
        let cypher = format!(
            "MATCH (post:Post {{post_id: $post_id}})
             SET post.{counter} = coalesce(post.{counter}, 0) + 1
             RETURN post {{.*}} AS post"
        );
        let post = self
            .graph
            .fetch_one(
                query(&cypher).param("post_id", post_id.to_string()),
                "post",
                "Post not found",
            )
            .await?;
        debug!(%post_id, counter, "Post counter incremented");
        Ok(post)
    }
}

fn into_posts(ranked: Vec<Ranked<PostCandidate>>) -> Vec<Ranked<Post>> {
    ranked
        .into_iter()
        .map(|r| Ranked {
            item: r.item.post,
            score: r.score,
        })
        .collect()
}
