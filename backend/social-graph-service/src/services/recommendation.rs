use crate::db::GraphClient;
use crate::domain::user::User;
use crate::domain::Pagination;
use crate::error::Result;
use crate::metrics::RankingTimer;
use crate::ranking::signals::{
    audience_overlap, interaction_engagement, saturating_ratio, ViewSample,
};
use crate::ranking::{
    cosine_similarity, distance_between, location_score, rank_page, CreatorSuggestionSignals,
    CreatorSuggestionWeights, DistanceUnit, Ranked, UserSuggestionSignals, UserSuggestionWeights,
};
use neo4rs::query;
use serde::Deserialize;
use std::cmp::Ordering;
use uuid::Uuid;

/// Mutual follows and interactions saturate at this count
const SOCIAL_SATURATION: f64 = 10.0;
/// Location affinity reaches zero at this distance
const SUGGESTION_RADIUS_MILES: f64 = 100.0;

#[derive(Debug, Deserialize)]
struct UserCandidate {
    user: User,
    #[serde(default)]
    mutual_follows: i64,
    #[serde(default)]
    interactions: i64,
}

#[derive(Debug, Deserialize)]
struct CreatorView {
    #[serde(default)]
    completion_rate: Option<f64>,
    #[serde(default)]
    signal_count: i64,
    #[serde(default)]
    unregretted: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CreatorCandidate {
    user: User,
    #[serde(default)]
    views: Vec<CreatorView>,
    #[serde(default)]
    connected_followers: i64,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    #[serde(default)]
    embedding: Option<Vec<f64>>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl Viewer {
    fn location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Larger audiences first, then id for a stable order
fn by_reach(a: &User, b: &User) -> Ordering {
    b.follower_count
        .cmp(&a.follower_count)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

fn user_suggestion_signals(viewer: &Viewer, candidate: &UserCandidate) -> UserSuggestionSignals {
    let location = distance_between(
        viewer.location(),
        candidate.user.location(),
        DistanceUnit::Miles,
    )
    .map(|d| location_score(d, SUGGESTION_RADIUS_MILES))
    .unwrap_or(0.0);
    UserSuggestionSignals {
        embedding: cosine_similarity(
            viewer.embedding.as_deref(),
            candidate.user.embedding.as_deref(),
        ),
        mutual_follows: saturating_ratio(candidate.mutual_follows as f64, SOCIAL_SATURATION),
        interactions: saturating_ratio(candidate.interactions as f64, SOCIAL_SATURATION),
        location,
    }
}

/// "People you may know" and creator suggestions
#[derive(Clone)]
pub struct RecommendationService {
    graph: GraphClient,
    candidate_limit: i64,
    user_weights: UserSuggestionWeights,
    creator_weights: CreatorSuggestionWeights,
}

impl RecommendationService {
    pub fn new(graph: GraphClient, candidate_limit: i64) -> Self {
        Self {
            graph,
            candidate_limit,
            user_weights: UserSuggestionWeights::default(),
            creator_weights: CreatorSuggestionWeights::default(),
        }
    }

    async fn viewer(&self, user_id: Uuid) -> Result<Viewer> {
        self.graph
            .fetch_one(
                query(
                    "MATCH (u:User {user_id: $user_id})
                     RETURN {
                        embedding: u.embedding,
                        latitude: u.latitude,
                        longitude: u.longitude
                     } AS viewer",
                )
                .param("user_id", user_id.to_string()),
                "viewer",
                "User not found",
            )
            .await
    }

    pub async fn get_user_suggestions(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<Ranked<User>>> {
        let timer = RankingTimer::start("user_suggestions");
        let viewer = self.viewer(user_id).await?;

        let candidates: Vec<UserCandidate> = self
            .graph
            .fetch_all(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (c:User)
                     WHERE c <> user
                       AND NOT EXISTS { (user)-[:FOLLOWS]->(c) }
                       AND NOT EXISTS { (user)-[:BLOCKS]-(c) }
                     OPTIONAL MATCH (user)-[:FOLLOWS]->(m:User)-[:FOLLOWS]->(c)
                     WITH user, c, count(DISTINCT m) AS mutual_follows
                     ORDER BY mutual_follows DESC, c.follower_count DESC, c.user_id ASC
                     LIMIT $candidate_limit
                     OPTIONAL MATCH (user)-[iw:INTERACTED_WITH]->(:Post)<-[:POSTED]-(c)
                     WITH c, mutual_follows, count(DISTINCT iw) AS interactions
                     RETURN {
                        user: c {.*},
                        mutual_follows: mutual_follows,
                        interactions: interactions
                     } AS candidate",
                )
                .param("user_id", user_id.to_string())
                .param("candidate_limit", self.candidate_limit),
                "candidate",
            )
            .await?;
        let candidate_count = candidates.len();

        let weights = self.user_weights;
        let scored: Vec<(User, f64)> = candidates
            .into_iter()
            .map(|c| {
                let score = weights.score(&user_suggestion_signals(&viewer, &c));
                (c.user, score)
            })
            .collect();

        let ranked = rank_page(scored, &page, |(_, score)| *score, |a, b| by_reach(&a.0, &b.0));
        timer.finish(candidate_count);
        Ok(ranked
            .into_iter()
            .map(|r| Ranked {
                item: r.item.0,
                score: r.score,
            })
            .collect())
    }

    pub async fn get_creator_suggestions(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<Ranked<User>>> {
        let timer = RankingTimer::start("creator_suggestions");
        let viewer = self.viewer(user_id).await?;

        let candidates: Vec<CreatorCandidate> = self
            .graph
            .fetch_all(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (c:User)
                     WHERE c <> user
                       AND EXISTS { (c)-[:POSTED]->(:Post) }
                       AND NOT EXISTS { (user)-[:FOLLOWS]->(c) }
                       AND NOT EXISTS { (user)-[:BLOCKS]-(c) }
                     WITH user, c
                     ORDER BY c.follower_count DESC, c.user_id ASC
                     LIMIT $candidate_limit
                     OPTIONAL MATCH (user)-[iw:INTERACTED_WITH]->(:Post)<-[:POSTED]-(c)
                     WITH user, c,
                          collect(CASE WHEN iw IS NULL THEN null ELSE {
                             completion_rate: iw.completion_rate,
                             signal_count: size(coalesce(iw.engagement_signals, [])),
                             unregretted: iw.unregretted
                          } END) AS views
                     OPTIONAL MATCH (f:User)-[:FOLLOWS]->(c)
                     WHERE f <> user
                       AND (EXISTS { (f)-[:FOLLOWS]->(user) } OR EXISTS { (user)-[:FOLLOWS]->(f) })
                     WITH c, views, count(DISTINCT f) AS connected_followers
                     RETURN {
                        user: c {.*},
                        views: views,
                        connected_followers: connected_followers
                     } AS candidate",
                )
                .param("user_id", user_id.to_string())
                .param("candidate_limit", self.candidate_limit),
                "candidate",
            )
            .await?;
        let candidate_count = candidates.len();

        let weights = self.creator_weights;
        let scored: Vec<(User, f64)> = candidates
            .into_iter()
            .map(|c| {
                let samples: Vec<ViewSample> = c
                    .views
                    .iter()
                    .map(|v| ViewSample {
                        completion_rate: v.completion_rate.unwrap_or(0.0),
                        signal_count: v.signal_count.max(0) as usize,
                        unregretted: v.unregretted.unwrap_or(false),
                    })
                    .collect();
                let score = weights.score(&CreatorSuggestionSignals {
                    embedding: cosine_similarity(viewer.embedding.as_deref(), c.user.embedding.as_deref()),
                    engagement: interaction_engagement(&samples),
                    audience_overlap: audience_overlap(c.connected_followers, c.user.follower_count),
                });
                (c.user, score)
            })
            .collect();

        let ranked = rank_page(scored, &page, |(_, score)| *score, |a, b| by_reach(&a.0, &b.0));
        timer.finish(candidate_count);
        Ok(ranked
            .into_iter()
            .map(|r| Ranked {
                item: r.item.0,
                score: r.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(follower_count: i64) -> User {
        User {
            user_id: Uuid::new_v4(),
            auth_id: String::new(),
            username: "u".into(),
            email: "u@example.com".into(),
            display_name: "u".into(),
            profile_picture_s3_key: None,
            bio: None,
            is_private: false,
            created_at: Utc::now(),
            updated_at: None,
            follower_count,
            following_count: 0,
            likes_count: 0,
            post_count: 0,
            latitude: None,
            longitude: None,
            location_updated_at: None,
            interests: vec![],
            embedding: None,
        }
    }

    #[test]
    fn test_reach_tie_break() {
        let big = user(100);
        let small = user(3);
        assert_eq!(by_reach(&big, &small), Ordering::Less);

        let mut twin = user(3);
        twin.user_id = Uuid::nil();
        assert_eq!(by_reach(&twin, &small), Ordering::Less);
    }

    fn candidate(mutual_follows: i64, interactions: i64) -> UserCandidate {
        UserCandidate {
            user: user(0),
            mutual_follows,
            interactions,
        }
    }

    fn blank_viewer() -> Viewer {
        Viewer {
            embedding: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_interactions_saturate_at_ten() {
        let viewer = blank_viewer();
        assert_eq!(user_suggestion_signals(&viewer, &candidate(0, 0)).interactions, 0.0);
        assert!((user_suggestion_signals(&viewer, &candidate(0, 4)).interactions - 0.4).abs() < 1e-9);
        assert_eq!(user_suggestion_signals(&viewer, &candidate(0, 10)).interactions, 1.0);
        assert_eq!(user_suggestion_signals(&viewer, &candidate(0, 25)).interactions, 1.0);
    }

    #[test]
    fn test_unknown_location_scores_zero_for_suggestions() {
        let viewer = Viewer {
            embedding: None,
            latitude: Some(40.0),
            longitude: Some(-74.0),
        };
        let signals = user_suggestion_signals(&viewer, &candidate(12, 0));
        assert_eq!(signals.location, 0.0);
        assert_eq!(signals.mutual_follows, 1.0);
    }
}
