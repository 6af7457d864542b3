//! Individual ranking signals. Every function is total: missing inputs
//! produce a neutral value instead of an error.

use chrono::{DateTime, Utc};

/// Cosine similarity of two embeddings; 0 when either is missing, the
/// dimensions differ, or a vector has zero norm.
pub fn cosine_similarity(a: Option<&[f64]>, b: Option<&[f64]>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    if sim.is_finite() {
        sim
    } else {
        0.0
    }
}

/// Exponential decay with a 24 hour half-life
pub fn recency_decay(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - created_at).num_seconds().max(0) as f64 / 3600.0;
    (0.5_f64.ln() * age_hours / 24.0).exp()
}

pub const INTERACTION_HALF_LIFE_DAYS: f64 = 30.0;
pub const INTERACTION_DECAY_FLOOR: f64 = 0.1;

/// Weight of an interaction `age_days` old: 30 day half-life, floored at 0.1
pub fn interaction_decay(age_days: f64) -> f64 {
    let age = age_days.max(0.0);
    0.5_f64
        .powf(age / INTERACTION_HALF_LIFE_DAYS)
        .max(INTERACTION_DECAY_FLOOR)
}

/// (likes·0.4 + comments·0.3 + shares·0.3) / (1 + views)
pub fn engagement_rate(likes: i64, comments: i64, shares: i64, views: i64) -> f64 {
    let likes = likes.max(0) as f64;
    let comments = comments.max(0) as f64;
    let shares = shares.max(0) as f64;
    let views = views.max(0) as f64;
    (likes * 0.4 + comments * 0.3 + shares * 0.3) / (1.0 + views)
}

/// Social reach of a profile on a log scale
pub fn profile_engagement(followers: i64, following: i64, posts: i64) -> f64 {
    let connections = (followers.max(0) + following.max(0)) as f64;
    let posts = posts.max(0) as f64;
    ((1.0 + connections).log10() * 0.5 + (1.0 + posts).log10() * 0.5) / 4.0
}

/// Inputs for the completeness signal
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFacts<'a> {
    pub username: &'a str,
    pub display_name: &'a str,
    pub has_bio: bool,
    pub has_picture: bool,
    pub post_count: i64,
    pub follower_count: i64,
}

/// 0.2 per filled-in facet of a profile
pub fn profile_completeness(facts: &ProfileFacts<'_>) -> f64 {
    let checks = [
        facts.has_bio,
        facts.has_picture,
        facts.display_name != facts.username,
        facts.post_count > 0,
        facts.follower_count > 0,
    ];
    checks.iter().filter(|c| **c).count() as f64 * 0.2
}

/// Where the query matched on a profile, strongest first
pub fn profile_text_score(query: &str, username: &str, display_name: &str) -> f64 {
    let q = query.trim().to_lowercase();
    let username = username.to_lowercase();
    let display = display_name.to_lowercase();

    if username == q {
        1.0
    } else if username.contains(&q) {
        0.8
    } else if display == q {
        0.6
    } else if display.contains(&q) {
        0.4
    } else {
        // Candidate set only holds matches, so this is a bio hit
        0.2
    }
}

/// Where the query matched on a post, strongest first
pub fn post_text_score(query: &str, title: Option<&str>, description: Option<&str>) -> f64 {
    let q = query.trim().to_lowercase();
    let title = title.map(str::to_lowercase).unwrap_or_default();
    let description = description.map(str::to_lowercase).unwrap_or_default();

    if !title.is_empty() && title == q {
        1.0
    } else if title.contains(&q) {
        0.8
    } else if description.contains(&q) {
        0.6
    } else {
        // hashtag match
        0.4
    }
}

/// One INTERACTED_WITH edge reduced to what dating/creator scoring reads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSample {
    pub completion_rate: f64,
    pub signal_count: usize,
    pub unregretted: bool,
}

impl ViewSample {
    fn value(&self) -> f64 {
        let boost = if self.unregretted { 1.5 } else { 1.0 };
        self.completion_rate * self.signal_count as f64 * boost
    }
}

/// Mean engagement over view samples clamped to [0, 1]; 0 without samples
pub fn interaction_engagement(samples: &[ViewSample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f64 = samples.iter().map(ViewSample::value).sum();
    (total / samples.len() as f64).clamp(0.0, 1.0)
}

/// Share of a creator's audience already connected to the viewer
pub fn audience_overlap(connected_followers: i64, follower_count: i64) -> f64 {
    let denom = follower_count.max(1) as f64;
    (connected_followers.max(0) as f64 / denom).clamp(0.0, 1.0)
}

/// 1/(1+hops) for a shortest path, 0 when unconnected
pub fn path_score(hops: Option<i64>) -> f64 {
    match hops {
        Some(h) if h >= 0 => 1.0 / (1.0 + h as f64),
        _ => 0.0,
    }
}

/// min(count / cap, 1)
pub fn saturating_ratio(count: f64, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    (count.max(0.0) / cap).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_cosine_identical_and_orthogonal() {
        let a = vec![1.0, 2.0, 3.0];
        assert!(approx(cosine_similarity(Some(a.as_slice()), Some(a.as_slice())), 1.0));

        let x = vec![1.0, 0.0];
        let y = vec![0.0, 1.0];
        assert!(approx(cosine_similarity(Some(x.as_slice()), Some(y.as_slice())), 0.0));

        let neg = vec![-1.0, -2.0, -3.0];
        assert!(approx(cosine_similarity(Some(a.as_slice()), Some(neg.as_slice())), -1.0));
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        let a = vec![1.0, 2.0];
        let zero = vec![0.0, 0.0];
        let short = vec![1.0];
        assert_eq!(cosine_similarity(None, Some(a.as_slice())), 0.0);
        assert_eq!(cosine_similarity(Some(a.as_slice()), None), 0.0);
        assert_eq!(cosine_similarity(Some(a.as_slice()), Some(zero.as_slice())), 0.0);
        assert_eq!(cosine_similarity(Some(a.as_slice()), Some(short.as_slice())), 0.0);
        assert_eq!(cosine_similarity(Some(&[][..]), Some(&[][..])), 0.0);
    }

    #[test]
    fn test_recency_decay_half_life() {
        let now = Utc::now();
        assert!(approx(recency_decay(now, now), 1.0));
        assert!((recency_decay(now - Duration::hours(24), now) - 0.5).abs() < 1e-6);
        assert!((recency_decay(now - Duration::hours(48), now) - 0.25).abs() < 1e-6);
        // Clock skew never boosts above 1
        assert!(approx(recency_decay(now + Duration::hours(5), now), 1.0));
    }

    #[test]
    fn test_interaction_decay_floor() {
        assert!(approx(interaction_decay(0.0), 1.0));
        assert!((interaction_decay(30.0) - 0.5).abs() < 1e-9);
        assert!(approx(interaction_decay(365.0), INTERACTION_DECAY_FLOOR));
    }

    #[test]
    fn test_engagement_rate() {
        assert!(approx(engagement_rate(10, 10, 10, 0), 10.0));
        assert!(approx(engagement_rate(10, 0, 0, 9), 0.4));
        assert_eq!(engagement_rate(0, 0, 0, 100), 0.0);
        assert_eq!(engagement_rate(-5, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_profile_engagement() {
        assert_eq!(profile_engagement(0, 0, 0), 0.0);
        // log10(100) = 2, log10(10) = 1 -> (1 + 0.5) / 4
        assert!(approx(profile_engagement(90, 9, 9), 0.375));
    }

    #[test]
    fn test_profile_completeness() {
        let empty = ProfileFacts {
            username: "bob",
            display_name: "bob",
            ..Default::default()
        };
        assert_eq!(profile_completeness(&empty), 0.0);

        let full = ProfileFacts {
            username: "bob",
            display_name: "Bob B",
            has_bio: true,
            has_picture: true,
            post_count: 3,
            follower_count: 1,
        };
        assert!(approx(profile_completeness(&full), 1.0));
    }

    #[test]
    fn test_profile_text_score_ladder() {
        assert_eq!(profile_text_score("Alice", "alice", "Someone"), 1.0);
        assert_eq!(profile_text_score("ali", "alice", "Someone"), 0.8);
        assert_eq!(profile_text_score("wonder", "alice", "Wonder"), 0.6);
        assert_eq!(profile_text_score("wonder", "alice", "Wonderland"), 0.4);
        assert_eq!(profile_text_score("hiking", "alice", "Alice"), 0.2);
    }

    #[test]
    fn test_post_text_score_ladder() {
        assert_eq!(post_text_score("Sunset", Some("sunset"), None), 1.0);
        assert_eq!(post_text_score("sun", Some("Sunset beach"), None), 0.8);
        assert_eq!(post_text_score("beach", Some("Sunset"), Some("at the beach")), 0.6);
        assert_eq!(post_text_score("travel", None, None), 0.4);
    }

    #[test]
    fn test_interaction_engagement_mean_and_clamp() {
        assert_eq!(interaction_engagement(&[]), 0.0);

        let samples = [
            ViewSample {
                completion_rate: 0.5,
                signal_count: 1,
                unregretted: false,
            },
            ViewSample {
                completion_rate: 0.2,
                signal_count: 1,
                unregretted: true,
            },
        ];
        // (0.5 + 0.3) / 2
        assert!(approx(interaction_engagement(&samples), 0.4));

        let heavy = [ViewSample {
            completion_rate: 1.0,
            signal_count: 3,
            unregretted: true,
        }];
        assert_eq!(interaction_engagement(&heavy), 1.0);
    }

    #[test]
    fn test_audience_overlap() {
        assert_eq!(audience_overlap(0, 0), 0.0);
        assert!(approx(audience_overlap(5, 20), 0.25));
        assert_eq!(audience_overlap(3, 0), 1.0);
    }

    #[test]
    fn test_path_score() {
        assert_eq!(path_score(None), 0.0);
        assert!(approx(path_score(Some(1)), 0.5));
        assert!(approx(path_score(Some(3)), 0.25));
    }

    #[test]
    fn test_saturating_ratio() {
        assert_eq!(saturating_ratio(0.0, 10.0), 0.0);
        assert!(approx(saturating_ratio(5.0, 10.0), 0.5));
        assert_eq!(saturating_ratio(25.0, 10.0), 1.0);
        assert_eq!(saturating_ratio(5.0, 0.0), 0.0);
    }
}
