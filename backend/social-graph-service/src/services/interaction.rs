use crate::db::{self, GraphClient};
use crate::domain::interaction::{
    CreatorInteractionMetrics, InteractionType, UserSimilarityScore, VideoInteractionMetrics,
};
use crate::error::{AppError, Result};
use crate::ranking::signals::path_score;
use crate::ranking::{
    cosine_similarity, distance_between, location_score, DistanceUnit, SimilaritySignals,
    SimilarityWeights, UNKNOWN_LOCATION_SCORE,
};
use crate::services::ensure_unblocked;
use neo4rs::query;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

/// Radius, in kilometres, past which two users share no location affinity
const SIMILARITY_RADIUS_KM: f64 = 100.0;

#[derive(Debug, Deserialize)]
struct ViewTarget {
    user_exists: bool,
    post_exists: bool,
}

/// Raw inputs for pairwise similarity
#[derive(Debug, Default, Deserialize)]
struct PairFacts {
    #[serde(default)]
    a_embedding: Option<Vec<f64>>,
    #[serde(default)]
    b_embedding: Option<Vec<f64>>,
    #[serde(default)]
    similarity: Option<f64>,
    #[serde(default)]
    hops: Option<i64>,
    #[serde(default)]
    a_latitude: Option<f64>,
    #[serde(default)]
    a_longitude: Option<f64>,
    #[serde(default)]
    b_latitude: Option<f64>,
    #[serde(default)]
    b_longitude: Option<f64>,
}

impl PairFacts {
    fn a_location(&self) -> Option<(f64, f64)> {
        self.a_latitude.zip(self.a_longitude)
    }

    fn b_location(&self) -> Option<(f64, f64)> {
        self.b_latitude.zip(self.b_longitude)
    }

    fn signals(&self) -> SimilaritySignals {
        let location = distance_between(self.a_location(), self.b_location(), DistanceUnit::Kilometers)
            .map(|d| location_score(d, SIMILARITY_RADIUS_KM))
            .unwrap_or(UNKNOWN_LOCATION_SCORE);
        SimilaritySignals {
            content: cosine_similarity(self.a_embedding.as_deref(), self.b_embedding.as_deref()),
            interaction: self.similarity.unwrap_or(0.0),
            social: path_score(self.hops),
            location,
        }
    }
}

/// Viewing behaviour and the generic interaction log
#[derive(Clone)]
pub struct InteractionService {
    graph: GraphClient,
    weights: SimilarityWeights,
}

impl InteractionService {
    pub fn new(graph: GraphClient) -> Self {
        Self {
            graph,
            weights: SimilarityWeights::default(),
        }
    }

    /// Fold one viewing session into the viewer's INTERACTED_WITH edge and,
    /// unless the viewer made the post, into the viewer -> creator aggregate.
    pub async fn record_video_interaction(
        &self,
        user_id: Uuid,
        post_id: Uuid,
        metrics: VideoInteractionMetrics,
    ) -> Result<()> {
        metrics.validate()?;
        if let Some(video_id) = metrics.video_id {
            if video_id != post_id {
                return Err(AppError::bad_request("video_id does not match the post"));
            }
        }

        let recorded = self
            .graph
            .fetch_optional::<bool>(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (creator:User)-[:POSTED]->(post:Post {post_id: $post_id})
                     MERGE (user)-[r:INTERACTED_WITH]->(post)
                     ON CREATE SET r.created_at = $now,
                                   r.view_count = 0,
                                   r.total_duration_ms = 0,
                                   r.completion_rate = 0.0,
                                   r.loop_count = 0,
                                   r.engagement_signals = [],
                                   r.unregretted = false
                     WITH user, creator, r,
                          coalesce(r.view_count, 0) AS views,
                          coalesce(r.total_duration_ms, 0) AS total,
                          coalesce(r.completion_rate, 0.0) AS rate
                     SET r.view_count = views + 1,
                         r.total_duration_ms = total + $view_ms,
                         r.avg_duration_ms = (total + $view_ms) / (views + 1),
                         r.video_duration_ms = $video_ms,
                         r.completion_rate = (rate * views + $completion) / (views + 1),
                         r.loop_count = coalesce(r.loop_count, 0) + $loops,
                         r.engagement_signals = coalesce(r.engagement_signals, [])
                            + [s IN $signals WHERE NOT s IN coalesce(r.engagement_signals, [])],
                         r.unregretted = coalesce(r.unregretted, false) OR $unregretted,
                         r.updated_at = $now
                     WITH user, creator
                     FOREACH (_ IN CASE WHEN creator.user_id = user.user_id THEN [] ELSE [1] END |
                        MERGE (user)-[c:CREATOR_INTERACTION]->(creator)
                        ON CREATE SET c.created_at = $now,
                                      c.profile_view_count = 0,
                                      c.total_view_duration_ms = 0,
                                      c.video_count = 0,
                                      c.completion_rate_sum = 0.0
                        SET c.total_view_duration_ms = coalesce(c.total_view_duration_ms, 0) + $view_ms,
                            c.video_count = coalesce(c.video_count, 0) + 1,
                            c.completion_rate_sum = coalesce(c.completion_rate_sum, 0.0) + $completion,
                            c.updated_at = $now
                        SET c.completion_rate_avg = c.completion_rate_sum / c.video_count
                     )
                     RETURN true AS recorded",
                )
                .param("user_id", user_id.to_string())
                .param("post_id", post_id.to_string())
                .param("view_ms", metrics.view_duration_ms)
                .param("video_ms", metrics.video_duration_ms)
                .param("completion", metrics.completion_rate)
                .param("loops", metrics.loop_count)
                .param("signals", metrics.signal_names())
                .param("unregretted", metrics.unregretted)
                .param("now", db::now()),
                "recorded",
            )
            .await?;

        if recorded.is_none() {
            let target: ViewTarget = self
                .graph
                .fetch_one(
                    query(
                        "OPTIONAL MATCH (user:User {user_id: $user_id})
                         OPTIONAL MATCH (post:Post {post_id: $post_id})
                         RETURN {user_exists: user IS NOT NULL, post_exists: post IS NOT NULL} AS target",
                    )
                    .param("user_id", user_id.to_string())
                    .param("post_id", post_id.to_string()),
                    "target",
                    "Interaction target",
                )
                .await?;
            return Err(if !target.user_exists {
                AppError::not_found("User not found")
            } else if !target.post_exists {
                AppError::not_found("Post not found")
            } else {
                AppError::Internal("Post has no creator".into())
            });
        }

        debug!(
            %user_id,
            %post_id,
            completion_rate = metrics.completion_rate,
            "Video interaction recorded"
        );
        Ok(())
    }

    /// Bump the viewer -> creator profile view counter
    pub async fn record_profile_view(
        &self,
        viewer_id: Uuid,
        creator_id: Uuid,
    ) -> Result<CreatorInteractionMetrics> {
        if viewer_id == creator_id {
            return Err(AppError::bad_request("Cannot record a view of your own profile"));
        }
        let metrics: CreatorInteractionMetrics = self
            .graph
            .fetch_one(
                query(
                    "MATCH (viewer:User {user_id: $viewer_id})
                     MATCH (creator:User {user_id: $creator_id})
                     MERGE (viewer)-[c:CREATOR_INTERACTION]->(creator)
                     ON CREATE SET c.created_at = $now,
                                   c.profile_view_count = 0,
                                   c.total_view_duration_ms = 0,
                                   c.video_count = 0,
                                   c.completion_rate_sum = 0.0,
                                   c.completion_rate_avg = 0.0
                     SET c.profile_view_count = coalesce(c.profile_view_count, 0) + 1,
                         c.updated_at = $now
                     RETURN {
                        creator_id: creator.user_id,
                        user_id: viewer.user_id,
                        profile_view_count: c.profile_view_count,
                        total_view_duration_ms: c.total_view_duration_ms,
                        video_count: c.video_count,
                        completion_rate_avg: coalesce(c.completion_rate_avg, 0.0),
                        created_at: c.created_at,
                        updated_at: c.updated_at
                     } AS metrics",
                )
                .param("viewer_id", viewer_id.to_string())
                .param("creator_id", creator_id.to_string())
                .param("now", db::now()),
                "metrics",
                "User not found",
            )
            .await?;
        debug!(%viewer_id, %creator_id, views = metrics.profile_view_count, "Profile view recorded");
        Ok(metrics)
    }

    /// Append to the generic weighted interaction log
    pub async fn record_interaction(
        &self,
        user_id: Uuid,
        target_id: Uuid,
        interaction_type: InteractionType,
    ) -> Result<()> {
        if user_id == target_id {
            return Err(AppError::bad_request("Cannot interact with yourself"));
        }
        ensure_unblocked(&self.graph, user_id, target_id, "interact with").await?;

        self.graph
            .run(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (target:User {user_id: $target_id})
                     CREATE (user)-[:INTERACTED {
                        type: $type,
                        weight: $weight,
                        created_at: $now
                     }]->(target)",
                )
                .param("user_id", user_id.to_string())
                .param("target_id", target_id.to_string())
                .param("type", interaction_type.as_str())
                .param("weight", interaction_type.strength().weight())
                .param("now", db::now()),
            )
            .await?;
        debug!(%user_id, %target_id, interaction = interaction_type.as_str(), "Interaction recorded");
        Ok(())
    }

    pub async fn calculate_user_similarity(
        &self,
        user_id: Uuid,
        target_id: Uuid,
    ) -> Result<UserSimilarityScore> {
        if user_id == target_id {
            return Err(AppError::bad_request("Cannot compare a user with themselves"));
        }
        let facts: PairFacts = self
            .graph
            .fetch_one(
                query(
                    "MATCH (a:User {user_id: $user_id})
                     MATCH (b:User {user_id: $target_id})
                     OPTIONAL MATCH (a)-[s:SIMILAR]-(b)
                     WITH a, b, max(s.similarity) AS similarity
                     OPTIONAL MATCH p = shortestPath((a)-[:FOLLOWS*..4]-(b))
                     RETURN {
                        a_embedding: a.embedding,
                        b_embedding: b.embedding,
                        similarity: similarity,
                        hops: length(p),
                        a_latitude: a.latitude,
                        a_longitude: a.longitude,
                        b_latitude: b.latitude,
                        b_longitude: b.longitude
                     } AS facts",
                )
                .param("user_id", user_id.to_string())
                .param("target_id", target_id.to_string()),
                "facts",
                "User not found",
            )
            .await?;

        Ok(similarity_score(user_id, target_id, &facts, &self.weights))
    }
}

fn similarity_score(
    user_id: Uuid,
    target_id: Uuid,
    facts: &PairFacts,
    weights: &SimilarityWeights,
) -> UserSimilarityScore {
    let signals = facts.signals();
    UserSimilarityScore {
        user_id,
        target_id,
        content_similarity: signals.content,
        interaction_similarity: signals.interaction,
        social_similarity: signals.social,
        location_similarity: signals.location,
        total_score: weights.score(&signals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_unconnected_strangers_score_neutral_location_only() {
        let facts = PairFacts::default();
        let score = similarity_score(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &facts,
            &SimilarityWeights::default(),
        );
        assert_eq!(score.content_similarity, 0.0);
        assert_eq!(score.social_similarity, 0.0);
        assert_eq!(score.location_similarity, UNKNOWN_LOCATION_SCORE);
        assert!(approx(score.total_score, 0.1));
    }

    #[test]
    fn test_close_followers_with_shared_taste() {
        let facts = PairFacts {
            a_embedding: Some(vec![1.0, 0.0]),
            b_embedding: Some(vec![1.0, 0.0]),
            similarity: Some(0.5),
            hops: Some(1),
            a_latitude: Some(40.7128),
            a_longitude: Some(-74.0060),
            b_latitude: Some(40.7128),
            b_longitude: Some(-74.0060),
        };
        let score = similarity_score(
            Uuid::new_v4(),
            Uuid::new_v4(),
            &facts,
            &SimilarityWeights::default(),
        );
        assert!(approx(score.content_similarity, 1.0));
        assert!(approx(score.social_similarity, 0.5));
        assert!(approx(score.location_similarity, 1.0));
        // 0.3 + 0.15 + 0.1 + 0.2
        assert!(approx(score.total_score, 0.75));
    }

    #[test]
    fn test_far_apart_users_get_no_location_credit() {
        let facts = PairFacts {
            a_latitude: Some(40.7128),
            a_longitude: Some(-74.0060),
            b_latitude: Some(34.0522),
            b_longitude: Some(-118.2437),
            ..Default::default()
        };
        assert_eq!(facts.signals().location, 0.0);
    }
}
