use crate::db::{self, nullable, GraphClient};
use crate::domain::user::{LimitedProfile, LocationUpdate, ProfileUpdate, ProfileView, User};
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::metrics::RankingTimer;
use crate::ranking::signals::{profile_completeness, profile_engagement, profile_text_score, ProfileFacts};
use crate::ranking::{cosine_similarity, rank_page, ProfileSearchSignals, ProfileSearchWeights, Ranked};
use crate::services::user_embedding;
use neo4rs::query;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
struct ProfileAccess {
    user: User,
    is_owner: bool,
    follows: bool,
    blocked: bool,
}

#[derive(Clone)]
pub struct ProfileService {
    graph: GraphClient,
    candidate_limit: i64,
    weights: ProfileSearchWeights,
}

impl ProfileService {
    pub fn new(graph: GraphClient, candidate_limit: i64) -> Self {
        Self {
            graph,
            candidate_limit,
            weights: ProfileSearchWeights::default(),
        }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.graph
            .fetch_one(
                query("MATCH (u:User {user_id: $user_id}) RETURN u {.*} AS user")
                    .param("user_id", user_id.to_string()),
                "user",
                "User not found",
            )
            .await
    }

    /// Full profile for the owner, followers and public accounts; the
    /// limited view for private accounts the viewer does not follow.
    pub async fn get_profile(&self, user_id: Uuid, viewer_id: Option<Uuid>) -> Result<ProfileView> {
        let access: ProfileAccess = self
            .graph
            .fetch_one(
                query(
                    "MATCH (u:User {user_id: $user_id})
                     OPTIONAL MATCH (viewer:User {user_id: $viewer_id})
                     RETURN {
                        user: u {.*},
                        is_owner: viewer IS NOT NULL AND viewer = u,
                        follows: viewer IS NOT NULL AND EXISTS { (viewer)-[:FOLLOWS]->(u) },
                        blocked: viewer IS NOT NULL AND EXISTS { (viewer)-[:BLOCKS]-(u) }
                     } AS access",
                )
                .param("user_id", user_id.to_string())
                .param("viewer_id", nullable(viewer_id.map(|id| id.to_string()))),
                "access",
                "User not found",
            )
            .await?;

        if access.blocked {
            return Err(AppError::forbidden("Profile is not available"));
        }
        if access.user.is_private && !access.is_owner && !access.follows {
            return Ok(ProfileView::Limited(LimitedProfile::from(&access.user)));
        }
        Ok(ProfileView::Full(Box::new(access.user)))
    }

    pub async fn update_profile(&self, user_id: Uuid, update: ProfileUpdate) -> Result<User> {
        update.validate()?;
        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".into()));
        }

        let user = self
            .graph
            .fetch_one(
                query(
                    "MATCH (u:User {user_id: $user_id})
                     SET u.display_name = coalesce($display_name, u.display_name),
                         u.email = coalesce($email, u.email),
                         u.bio = coalesce($bio, u.bio),
                         u.is_private = coalesce($is_private, u.is_private),
                         u.profile_picture_s3_key = coalesce($profile_picture_s3_key, u.profile_picture_s3_key),
                         u.updated_at = $now
                     RETURN u {.*} AS user",
                )
                .param("user_id", user_id.to_string())
                .param("display_name", nullable(update.display_name))
                .param("email", nullable(update.email))
                .param("bio", nullable(update.bio))
                .param("is_private", nullable(update.is_private))
                .param(
                    "profile_picture_s3_key",
                    nullable(update.profile_picture_s3_key),
                )
                .param("now", db::now()),
                "user",
                "User not found",
            )
            .await?;
        debug!(%user_id, "Profile updated");
        Ok(user)
    }

    pub async fn update_location(&self, user_id: Uuid, location: LocationUpdate) -> Result<User> {
        location.validate()?;
        let user = self
            .graph
            .fetch_one(
                query(
                    "MATCH (u:User {user_id: $user_id})
                     SET u.latitude = $latitude,
                         u.longitude = $longitude,
                         u.location_updated_at = $now
                     RETURN u {.*} AS user",
                )
                .param("user_id", user_id.to_string())
                .param("latitude", location.latitude)
                .param("longitude", location.longitude)
                .param("now", db::now()),
                "user",
                "User not found",
            )
            .await?;
        debug!(%user_id, "Location updated");
        Ok(user)
    }

    /// Case-insensitive search over username, display name and bio, ranked
    /// by text match, embedding similarity to the searcher, completeness
    /// and engagement.
    pub async fn search_profiles(
        &self,
        searcher_id: Uuid,
        search: &str,
        page: Pagination,
    ) -> Result<Vec<Ranked<User>>> {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return Err(AppError::Validation("Search query cannot be empty".into()));
        }
        let timer = RankingTimer::start("profile_search");

        let searcher_embedding = user_embedding(&self.graph, searcher_id).await?;

        let candidates: Vec<User> = self
            .graph
            .fetch_all(
                query(
                    "MATCH (searcher:User {user_id: $searcher_id})
                     MATCH (u:User)
                     WHERE (toLower(u.username) CONTAINS $needle
                            OR toLower(coalesce(u.display_name, '')) CONTAINS $needle
                            OR toLower(coalesce(u.bio, '')) CONTAINS $needle)
                       AND NOT EXISTS { (searcher)-[:BLOCKS]-(u) }
                     RETURN u {.*} AS user
                     ORDER BY u.username ASC
                     LIMIT $candidate_limit",
                )
                .param("searcher_id", searcher_id.to_string())
                .param("needle", needle.clone())
                .param("candidate_limit", self.candidate_limit),
                "user",
            )
            .await?;
        let candidate_count = candidates.len();

        let weights = self.weights;
        let ranked = rank_page(
            candidates,
            &page,
            |u| {
                let facts = ProfileFacts {
                    username: &u.username,
                    display_name: &u.display_name,
                    has_bio: u.bio.as_deref().is_some_and(|b| !b.trim().is_empty()),
                    has_picture: u.profile_picture_s3_key.is_some(),
                    post_count: u.post_count,
                    follower_count: u.follower_count,
                };
                weights.score(&ProfileSearchSignals {
                    text: profile_text_score(&needle, &u.username, &u.display_name),
                    embedding: cosine_similarity(
                        searcher_embedding.as_deref(),
                        u.embedding.as_deref(),
                    ),
                    completeness: profile_completeness(&facts),
                    engagement: profile_engagement(u.follower_count, u.following_count, u.post_count),
                })
            },
            |a, b| a.username.cmp(&b.username),
        );

        timer.finish(candidate_count);
        Ok(ranked)
    }
}
