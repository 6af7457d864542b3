use crate::db::{self, GraphClient};
use crate::domain::dating::{
    DatingAction, DatingFilter, DatingMatch, DatingProfile, DatingProfileCreate,
    DatingProfileUpdate, Gender, MutualMatch, ScoredProfile,
};
use crate::domain::interaction::InteractionType;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::metrics::{RankingTimer, DATING_MATCHES_TOTAL};
use crate::ranking::signals::{interaction_engagement, ViewSample};
use crate::ranking::{
    at_least, by_distance_asc, cosine_similarity, distance_between, location_score,
    sort_and_page, DatingSignals, DatingWeights, DistanceUnit, Ranked, UNKNOWN_LOCATION_SCORE,
};
use crate::services::ensure_unblocked;
use crate::services::interaction::InteractionService;
use chrono::{DateTime, Months, NaiveDate, Utc};
use neo4rs::query;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Radius used to score a pair when the seeker has no dating profile
const DEFAULT_MATCH_RADIUS_MILES: f64 = 50.0;
/// The database measures on a slightly larger sphere than `haversine`;
/// its bound is widened so the exact cut stays in Rust.
const DISTANCE_BOUND_SLACK: f64 = 1.01;
const METERS_PER_MILE: f64 = 1609.344;

/// Embedding and coordinates of one side of a pair
#[derive(Debug, Clone, Default, Deserialize)]
struct Side {
    #[serde(default)]
    embedding: Option<Vec<f64>>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl Side {
    fn location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// One INTERACTED_WITH edge from the seeker onto a post of the other side
#[derive(Debug, Clone, Deserialize)]
struct ViewRow {
    #[serde(default)]
    completion_rate: Option<f64>,
    #[serde(default)]
    signal_count: i64,
    #[serde(default)]
    unregretted: Option<bool>,
}

impl From<&ViewRow> for ViewSample {
    fn from(row: &ViewRow) -> Self {
        ViewSample {
            completion_rate: row.completion_rate.unwrap_or(0.0),
            signal_count: row.signal_count.max(0) as usize,
            unregretted: row.unregretted.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Seeker {
    profile: DatingProfile,
    side: Side,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    profile: DatingProfile,
    username: String,
    display_name: String,
    side: Side,
    #[serde(default)]
    node_similarity: Option<f64>,
    #[serde(default)]
    views: Vec<ViewRow>,
}

#[derive(Debug, Deserialize)]
struct PairFacts {
    seeker: Side,
    other: Side,
    #[serde(default)]
    max_distance: Option<f64>,
    #[serde(default)]
    node_similarity: Option<f64>,
    #[serde(default)]
    views: Vec<ViewRow>,
}

#[derive(Debug, Deserialize)]
struct MatchRecord {
    match_id: Uuid,
    compatibility_score: f64,
    created: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ActionOutcome {
    #[serde(default)]
    reverse: Option<InteractionType>,
    #[serde(default)]
    record: Option<MatchRecord>,
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    match_id: Uuid,
    partner_id: Uuid,
    partner_username: String,
    partner_display_name: String,
    #[serde(default)]
    partner_profile: Option<DatingProfile>,
    #[serde(default)]
    compatibility_score: Option<f64>,
    created_at: DateTime<Utc>,
    user_side: Side,
    partner_side: Side,
}

#[derive(Debug, Deserialize)]
struct ProfileSlot {
    user_exists: bool,
    has_profile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Compatibility {
    score: f64,
    distance_miles: Option<f64>,
}

/// Compatibility of `other` as seen from `seeker`, on the dating weights
fn compatibility(
    weights: &DatingWeights,
    seeker: &Side,
    other: &Side,
    node_similarity: Option<f64>,
    views: &[ViewRow],
    max_distance: f64,
) -> Compatibility {
    let distance_miles = distance_between(seeker.location(), other.location(), DistanceUnit::Miles);
    let samples: Vec<ViewSample> = views.iter().map(ViewSample::from).collect();
    let signals = DatingSignals {
        embedding: cosine_similarity(seeker.embedding.as_deref(), other.embedding.as_deref()),
        node_similarity: node_similarity.unwrap_or(0.0),
        interaction: interaction_engagement(&samples),
        location: distance_miles
            .map(|d| location_score(d, max_distance))
            .unwrap_or(UNKNOWN_LOCATION_SCORE),
    };
    Compatibility {
        score: weights.score(&signals),
        distance_miles,
    }
}

/// Birth-date bounds, as ISO strings, for ages within `[min_age, max_age]`
/// on `today`: `earliest_exclusive < birth_date <= latest`.
fn birth_date_window(today: NaiveDate, min_age: i64, max_age: i64) -> (String, String) {
    let years_back = |years: i64| {
        today
            .checked_sub_months(Months::new((years.max(0) as u32) * 12))
            .unwrap_or(NaiveDate::MIN)
    };
    let latest = years_back(min_age);
    let earliest_exclusive = years_back(max_age + 1);
    (earliest_exclusive.to_string(), latest.to_string())
}

/// Loose pre-filter radius, in meters, for the candidate query
fn distance_bound_meters(max_distance_miles: f64) -> f64 {
    max_distance_miles * METERS_PER_MILE * DISTANCE_BOUND_SLACK
}

/// Both endpoints of a pair in a fixed order, so concurrent swipes on the
/// same pair take their node locks in the same sequence
fn lock_order(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn positive_action_names() -> Vec<String> {
    [DatingAction::SwipeRight, DatingAction::SuperLike]
        .iter()
        .map(|a| a.as_str().to_string())
        .collect()
}

fn gender_names(genders: &[Gender]) -> Vec<String> {
    genders.iter().map(|g| g.as_str().to_string()).collect()
}

#[derive(Clone)]
pub struct DatingService {
    graph: GraphClient,
    interactions: InteractionService,
    candidate_limit: i64,
    weights: DatingWeights,
}

impl DatingService {
    pub fn new(graph: GraphClient, interactions: InteractionService, candidate_limit: i64) -> Self {
        Self {
            graph,
            interactions,
            candidate_limit,
            weights: DatingWeights::default(),
        }
    }

    pub async fn create_dating_profile(
        &self,
        user_id: Uuid,
        payload: DatingProfileCreate,
    ) -> Result<DatingProfile> {
        payload.check(Utc::now().date_naive())?;

        let created = self
            .graph
            .fetch_optional::<DatingProfile>(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     WHERE NOT EXISTS { (user)-[:HAS_DATING_PROFILE]->(:DatingProfile) }
                     CREATE (user)-[:HAS_DATING_PROFILE]->(p:DatingProfile {
                        user_id: $user_id,
                        bio: $bio,
                        birth_date: $birth_date,
                        gender: $gender,
                        sexuality: $sexuality,
                        photos: $photos,
                        max_distance_miles: $max_distance_miles,
                        min_age_preference: $min_age_preference,
                        max_age_preference: $max_age_preference,
                        gender_preference: $gender_preference,
                        is_visible: $is_visible,
                        created_at: $now,
                        updated_at: $now
                     })
                     RETURN p {.*} AS profile",
                )
                .param("user_id", user_id.to_string())
                .param("bio", payload.bio.trim().to_string())
                .param("birth_date", payload.birth_date.to_string())
                .param("gender", payload.gender.as_str())
                .param("sexuality", payload.sexuality.as_str())
                .param("photos", payload.photos.clone())
                .param("max_distance_miles", payload.max_distance_miles)
                .param("min_age_preference", payload.min_age_preference)
                .param("max_age_preference", payload.max_age_preference)
                .param("gender_preference", gender_names(&payload.gender_preference))
                .param("is_visible", payload.is_visible)
                .param("now", db::now()),
                "profile",
            )
            .await?;

        if let Some(profile) = created {
            info!(%user_id, "Dating profile created");
            return Ok(profile);
        }

        let slot: ProfileSlot = self
            .graph
            .fetch_one(
                query(
                    "OPTIONAL MATCH (user:User {user_id: $user_id})
                     RETURN {
                        user_exists: user IS NOT NULL,
                        has_profile: user IS NOT NULL
                            AND EXISTS { (user)-[:HAS_DATING_PROFILE]->(:DatingProfile) }
                     } AS slot",
                )
                .param("user_id", user_id.to_string()),
                "slot",
                "User not found",
            )
            .await?;
        if !slot.user_exists {
            Err(AppError::not_found("User not found"))
        } else if slot.has_profile {
            Err(AppError::bad_request("Dating profile already exists"))
        } else {
            Err(AppError::Internal("Failed to create dating profile".into()))
        }
    }

    pub async fn get_dating_profile(&self, user_id: Uuid) -> Result<DatingProfile> {
        self.graph
            .fetch_one(
                query(
                    "MATCH (:User {user_id: $user_id})-[:HAS_DATING_PROFILE]->(p:DatingProfile)
                     RETURN p {.*} AS profile",
                )
                .param("user_id", user_id.to_string()),
                "profile",
                "Dating profile not found",
            )
            .await
    }

    pub async fn update_dating_profile(
        &self,
        requester_id: Uuid,
        user_id: Uuid,
        update: DatingProfileUpdate,
    ) -> Result<DatingProfile> {
        if requester_id != user_id {
            return Err(AppError::forbidden("You can only update your own dating profile"));
        }
        let mut profile = self.get_dating_profile(user_id).await?;
        update.apply(&mut profile)?;

        let profile = self
            .graph
            .fetch_one(
                query(
                    "MATCH (:User {user_id: $user_id})-[:HAS_DATING_PROFILE]->(p:DatingProfile)
                     SET p.bio = $bio,
                         p.sexuality = $sexuality,
                         p.photos = $photos,
                         p.max_distance_miles = $max_distance_miles,
                         p.min_age_preference = $min_age_preference,
                         p.max_age_preference = $max_age_preference,
                         p.gender_preference = $gender_preference,
                         p.is_visible = $is_visible,
                         p.updated_at = $now
                     RETURN p {.*} AS profile",
                )
                .param("user_id", user_id.to_string())
                .param("bio", profile.bio.trim().to_string())
                .param("sexuality", profile.sexuality.as_str())
                .param("photos", profile.photos.clone())
                .param("max_distance_miles", profile.max_distance_miles)
                .param("min_age_preference", profile.min_age_preference)
                .param("max_age_preference", profile.max_age_preference)
                .param("gender_preference", gender_names(&profile.gender_preference))
                .param("is_visible", profile.is_visible)
                .param("now", db::now()),
                "profile",
                "Dating profile not found",
            )
            .await?;
        debug!(%user_id, "Dating profile updated");
        Ok(profile)
    }

    /// Visible profiles in the seeker's age, gender and distance window,
    /// ordered by compatibility
    pub async fn get_potential_matches(
        &self,
        user_id: Uuid,
        filter: DatingFilter,
    ) -> Result<Vec<ScoredProfile>> {
        filter.check()?;
        let page = Pagination::new(filter.limit, filter.offset)?;
        let timer = RankingTimer::start("dating");

        let seeker: Seeker = self
            .graph
            .fetch_one(
                query(
                    "MATCH (user:User {user_id: $user_id})-[:HAS_DATING_PROFILE]->(p:DatingProfile)
                     RETURN {
                        profile: p {.*},
                        side: {
                            embedding: user.embedding,
                            latitude: user.latitude,
                            longitude: user.longitude
                        }
                     } AS seeker",
                )
                .param("user_id", user_id.to_string()),
                "seeker",
                "Dating profile not found",
            )
            .await?;

        let genders = filter
            .genders()?
            .unwrap_or_else(|| seeker.profile.gender_preference.clone());
        let today = Utc::now().date_naive();
        let (earliest_birth, latest_birth) = birth_date_window(today, filter.min_age, filter.max_age);

        let candidates: Vec<Candidate> = self
            .graph
            .fetch_all(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (target:User)-[:HAS_DATING_PROFILE]->(tp:DatingProfile)
                     WHERE target <> user
                       AND tp.is_visible = true
                       AND NOT EXISTS { (user)-[:BLOCKS]-(target) }
                       AND tp.birth_date > $earliest_birth
                       AND tp.birth_date <= $latest_birth
                       AND tp.gender IN $genders
                       AND (NOT $exclude_seen OR NOT EXISTS { (user)-[:DATING_ACTION]->(target) })
                       AND (NOT $exclude_matched OR NOT EXISTS { (user)-[:DATING_MATCH]-(target) })
                     WITH user, target, tp,
                          CASE WHEN user.latitude IS NULL OR user.longitude IS NULL
                                 OR target.latitude IS NULL OR target.longitude IS NULL
                               THEN null
                               ELSE point.distance(
                                   point({latitude: user.latitude, longitude: user.longitude}),
                                   point({latitude: target.latitude, longitude: target.longitude})
                               )
                          END AS meters
                     WHERE meters IS NULL OR meters <= $max_distance_meters
                     OPTIONAL MATCH (user)-[s:SIMILAR]-(target)
                     WITH user, target, tp, meters, max(s.similarity) AS node_similarity
                     ORDER BY coalesce(node_similarity, 0.0) DESC,
                              meters IS NULL ASC,
                              meters ASC,
                              target.user_id ASC
                     LIMIT $candidate_limit
                     OPTIONAL MATCH (user)-[iw:INTERACTED_WITH]->(:Post)<-[:POSTED]-(target)
                     WITH target, tp, node_similarity,
                          collect(CASE WHEN iw IS NULL THEN null ELSE {
                             completion_rate: iw.completion_rate,
                             signal_count: size(coalesce(iw.engagement_signals, [])),
                             unregretted: iw.unregretted
                          } END) AS views
                     RETURN {
                        profile: tp {.*},
                        username: target.username,
                        display_name: target.display_name,
                        side: {
                            embedding: target.embedding,
                            latitude: target.latitude,
                            longitude: target.longitude
                        },
                        node_similarity: node_similarity,
                        views: views
                     } AS candidate",
                )
                .param("user_id", user_id.to_string())
                .param("earliest_birth", earliest_birth)
                .param("latest_birth", latest_birth)
                .param("genders", gender_names(&genders))
                .param("exclude_seen", filter.exclude_seen)
                .param("exclude_matched", filter.exclude_matched)
                .param("max_distance_meters", distance_bound_meters(filter.max_distance))
                .param("candidate_limit", self.candidate_limit),
                "candidate",
            )
            .await?;
        let candidate_count = candidates.len();

        let scored: Vec<Ranked<ScoredProfile>> = candidates
            .into_iter()
            .filter_map(|c| {
                let age = c.profile.age_on(today);
                if age < filter.min_age || age > filter.max_age {
                    return None;
                }
                let fit = compatibility(
                    &self.weights,
                    &seeker.side,
                    &c.side,
                    c.node_similarity,
                    &c.views,
                    filter.max_distance,
                );
                if fit.distance_miles.is_some_and(|d| d > filter.max_distance) {
                    return None;
                }
                Some(Ranked {
                    item: ScoredProfile {
                        profile: c.profile,
                        username: c.username,
                        display_name: c.display_name,
                        age,
                        distance_miles: fit.distance_miles,
                        compatibility_score: fit.score,
                    },
                    score: fit.score,
                })
            })
            .collect();

        let ranked = sort_and_page(
            at_least(scored, filter.min_compatibility),
            &page,
            |a, b| {
                by_distance_asc(a.distance_miles, b.distance_miles)
                    .then_with(|| a.profile.user_id.cmp(&b.profile.user_id))
            },
        );

        timer.finish(candidate_count);
        Ok(ranked.into_iter().map(|r| r.item).collect())
    }

    /// Compatibility of a concrete pair, used when a match is created
    async fn pair_compatibility(&self, user_id: Uuid, target_id: Uuid) -> Result<Compatibility> {
        let facts: PairFacts = self
            .graph
            .fetch_one(
                query(
                    "MATCH (user:User {user_id: $user_id})
                     MATCH (target:User {user_id: $target_id})
                     OPTIONAL MATCH (user)-[:HAS_DATING_PROFILE]->(p:DatingProfile)
                     OPTIONAL MATCH (user)-[s:SIMILAR]-(target)
                     WITH user, target, p, max(s.similarity) AS node_similarity
                     OPTIONAL MATCH (user)-[iw:INTERACTED_WITH]->(:Post)<-[:POSTED]-(target)
                     WITH user, target, p, node_similarity,
                          collect(CASE WHEN iw IS NULL THEN null ELSE {
                             completion_rate: iw.completion_rate,
                             signal_count: size(coalesce(iw.engagement_signals, [])),
                             unregretted: iw.unregretted
                          } END) AS views
                     RETURN {
                        seeker: {
                            embedding: user.embedding,
                            latitude: user.latitude,
                            longitude: user.longitude
                        },
                        other: {
                            embedding: target.embedding,
                            latitude: target.latitude,
                            longitude: target.longitude
                        },
                        max_distance: p.max_distance_miles,
                        node_similarity: node_similarity,
                        views: views
                     } AS facts",
                )
                .param("user_id", user_id.to_string())
                .param("target_id", target_id.to_string()),
                "facts",
                "User not found",
            )
            .await?;

        Ok(compatibility(
            &self.weights,
            &facts.seeker,
            &facts.other,
            facts.node_similarity,
            &facts.views,
            facts.max_distance.unwrap_or(DEFAULT_MATCH_RADIUS_MILES),
        ))
    }

    /// Record a swipe. Returns the match when this swipe completes a mutual
    /// positive pair.
    pub async fn record_dating_action(
        &self,
        user_id: Uuid,
        target_id: Uuid,
        action: InteractionType,
    ) -> Result<Option<DatingMatch>> {
        if user_id == target_id {
            return Err(AppError::bad_request("Cannot perform dating action on yourself"));
        }
        let dating_action = DatingAction::try_from(action)?;
        ensure_unblocked(&self.graph, user_id, target_id, "perform dating action on").await?;

        // Scored up front so the match can be written in the same statement
        // that observes the reverse swipe
        let fit = if dating_action.is_positive() {
            Some(self.pair_compatibility(user_id, target_id).await?)
        } else {
            None
        };
        let (first_id, second_id) = lock_order(user_id, target_id);

        let outcome: ActionOutcome = self
            .graph
            .fetch_one(
                query(
                    "MATCH (lo:User {user_id: $first_id})
                     SET lo._lock = true
                     REMOVE lo._lock
                     WITH lo
                     MATCH (hi:User {user_id: $second_id})
                     SET hi._lock = true
                     REMOVE hi._lock
                     WITH lo, hi
                     MATCH (user:User {user_id: $user_id})
                     MATCH (target:User {user_id: $target_id})
                     MERGE (user)-[a:DATING_ACTION]->(target)
                     ON CREATE SET a.created_at = $now
                     SET a.type = $action, a.updated_at = $now
                     WITH user, target
                     OPTIONAL MATCH (target)-[back:DATING_ACTION]->(user)
                     WITH user, target, back.type AS reverse,
                          ($action IN $positive AND back.type IN $positive) AS mutual
                     FOREACH (_ IN CASE WHEN mutual THEN [1] ELSE [] END |
                        MERGE (user)-[m:DATING_MATCH]-(target)
                        ON CREATE SET m.match_id = $match_id,
                                      m.created_at = $now,
                                      m.compatibility_score = $score
                        SET m.updated_at = $now
                     )
                     WITH user, target, reverse, mutual
                     OPTIONAL MATCH (user)-[m:DATING_MATCH]-(target)
                     RETURN {
                        reverse: reverse,
                        record: CASE WHEN mutual AND m IS NOT NULL THEN {
                            match_id: m.match_id,
                            compatibility_score: coalesce(m.compatibility_score, $score),
                            created: m.created_at = $now,
                            created_at: m.created_at,
                            updated_at: m.updated_at
                        } ELSE null END
                     } AS outcome",
                )
                .param("first_id", first_id.to_string())
                .param("second_id", second_id.to_string())
                .param("user_id", user_id.to_string())
                .param("target_id", target_id.to_string())
                .param("action", dating_action.as_str())
                .param("positive", positive_action_names())
                .param("match_id", Uuid::new_v4().to_string())
                .param("score", fit.map(|f| f.score).unwrap_or(0.0))
                .param("now", db::now()),
                "outcome",
                "User not found",
            )
            .await?;
        debug!(%user_id, %target_id, action = dating_action.as_str(), "Dating action recorded");

        let (Some(record), Some(fit)) = (outcome.record, fit) else {
            return Ok(None);
        };

        if record.created {
            DATING_MATCHES_TOTAL.inc();
            info!(%user_id, %target_id, match_id = %record.match_id, "Dating match created");
        }

        Ok(Some(DatingMatch {
            match_id: record.match_id,
            user_id_a: user_id,
            user_id_b: target_id,
            user_a_action: Some(action),
            user_b_action: outcome.reverse,
            distance_miles: fit.distance_miles,
            compatibility_score: record.compatibility_score,
            is_mutual: true,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }))
    }

    pub async fn get_mutual_matches(
        &self,
        user_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<MutualMatch>> {
        let rows: Vec<MatchRow> = self
            .graph
            .fetch_all(
                query(
                    "MATCH (user:User {user_id: $user_id})-[m:DATING_MATCH]-(partner:User)
                     OPTIONAL MATCH (partner)-[:HAS_DATING_PROFILE]->(pp:DatingProfile)
                     RETURN {
                        match_id: m.match_id,
                        partner_id: partner.user_id,
                        partner_username: partner.username,
                        partner_display_name: partner.display_name,
                        partner_profile: pp {.*},
                        compatibility_score: m.compatibility_score,
                        created_at: m.created_at,
                        user_side: {latitude: user.latitude, longitude: user.longitude},
                        partner_side: {latitude: partner.latitude, longitude: partner.longitude}
                     } AS row
                     ORDER BY m.created_at DESC, partner.user_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "row",
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MutualMatch {
                distance_miles: distance_between(
                    row.user_side.location(),
                    row.partner_side.location(),
                    DistanceUnit::Miles,
                ),
                match_id: row.match_id,
                partner_id: row.partner_id,
                partner_username: row.partner_username,
                partner_display_name: row.partner_display_name,
                partner_profile: row.partner_profile,
                compatibility_score: row.compatibility_score.unwrap_or(0.0),
                created_at: row.created_at,
            })
            .collect())
    }

    /// Count a dating profile view, mirrored onto the creator interaction
    pub async fn record_profile_view(&self, viewer_id: Uuid, target_id: Uuid) -> Result<()> {
        if viewer_id == target_id {
            return Err(AppError::bad_request("Cannot record a view of your own profile"));
        }
        let view_count: i64 = self
            .graph
            .fetch_one(
                query(
                    "MATCH (viewer:User {user_id: $viewer_id})
                     MATCH (target:User {user_id: $target_id})-[:HAS_DATING_PROFILE]->(:DatingProfile)
                     MERGE (viewer)-[v:DATING_PROFILE_VIEW]->(target)
                     ON CREATE SET v.created_at = $now, v.view_count = 0
                     SET v.view_count = coalesce(v.view_count, 0) + 1,
                         v.updated_at = $now
                     RETURN v.view_count AS view_count",
                )
                .param("viewer_id", viewer_id.to_string())
                .param("target_id", target_id.to_string())
                .param("now", db::now()),
                "view_count",
                "Dating profile not found",
            )
            .await?;
        self.interactions
            .record_profile_view(viewer_id, target_id)
            .await?;
        debug!(%viewer_id, %target_id, view_count, "Dating profile view recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_unknown_location_contributes_neutral_share() {
        let fit = compatibility(
            &DatingWeights::default(),
            &Side::default(),
            &Side::default(),
            None,
            &[],
            50.0,
        );
        assert_eq!(fit.distance_miles, None);
        assert!(approx(fit.score, 0.15));
    }

    #[test]
    fn test_compatibility_combines_all_signals() {
        let here = Side {
            embedding: Some(vec![1.0, 0.0]),
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
        };
        let views = vec![ViewRow {
            completion_rate: Some(0.5),
            signal_count: 1,
            unregretted: Some(false),
        }];
        let fit = compatibility(&DatingWeights::default(), &here, &here, Some(0.5), &views, 50.0);
        assert!(approx(fit.distance_miles.unwrap(), 0.0));
        // 0.3 + 0.1 + 0.1 + 0.3
        assert!(approx(fit.score, 0.8));
    }

    #[test]
    fn test_distant_pair_loses_location_term() {
        let nyc = Side {
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
            ..Default::default()
        };
        let la = Side {
            latitude: Some(34.0522),
            longitude: Some(-118.2437),
            ..Default::default()
        };
        let fit = compatibility(&DatingWeights::default(), &nyc, &la, None, &[], 50.0);
        assert!(fit.distance_miles.unwrap() > 2000.0);
        assert_eq!(fit.score, 0.0);
    }

    #[test]
    fn test_distance_prefilter_is_looser_than_exact_cut() {
        // Neo4j measures WGS-84 distance on a 6378.14 km sphere
        let db_sphere = 6378.14 / crate::ranking::geo::EARTH_RADIUS_KM;
        for miles in [1.0, 25.0, 50.0, 100.0] {
            let bound = distance_bound_meters(miles);
            assert!(bound >= miles * METERS_PER_MILE * db_sphere, "{miles}");
            assert!(bound < miles * METERS_PER_MILE * 1.02, "{miles}");
        }
    }

    #[test]
    fn test_lock_order_is_symmetric() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        assert_eq!(lock_order(a, b), (a, b));
        assert_eq!(lock_order(b, a), (a, b));
        assert_eq!(lock_order(a, a), (a, a));
    }

    #[test]
    fn test_positive_actions_exclude_swipe_left() {
        let names = positive_action_names();
        assert_eq!(names, vec!["SWIPE_RIGHT".to_string(), "SUPER_LIKE".to_string()]);
        assert!(!names.contains(&DatingAction::SwipeLeft.as_str().to_string()));
    }

    #[test]
    fn test_birth_date_window_bounds() {
        let (earliest, latest) = birth_date_window(date(2024, 6, 15), 18, 30);
        assert_eq!(latest, "2006-06-15");
        assert_eq!(earliest, "1993-06-15");
    }

    #[test]
    fn test_birth_date_window_leap_day() {
        let (_, latest) = birth_date_window(date(2024, 2, 29), 18, 100);
        assert_eq!(latest, "2006-02-28");
    }
}
