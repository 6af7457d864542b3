use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    Like,
    Comment,
    Share,
    Follow,
    Block,
    Report,
    SwipeLeft,
    SwipeRight,
    SuperLike,
    Match,
    Message,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Like => "LIKE",
            InteractionType::Comment => "COMMENT",
            InteractionType::Share => "SHARE",
            InteractionType::Follow => "FOLLOW",
            InteractionType::Block => "BLOCK",
            InteractionType::Report => "REPORT",
            InteractionType::SwipeLeft => "SWIPE_LEFT",
            InteractionType::SwipeRight => "SWIPE_RIGHT",
            InteractionType::SuperLike => "SUPER_LIKE",
            InteractionType::Match => "MATCH",
            InteractionType::Message => "MESSAGE",
        }
    }

    /// Strength used when this interaction is logged as a generic edge
    pub fn strength(&self) -> InteractionStrength {
        match self {
            InteractionType::Like => InteractionStrength::Like,
            InteractionType::Comment => InteractionStrength::Comment,
            InteractionType::Share => InteractionStrength::Share,
            InteractionType::Follow => InteractionStrength::Follow,
            InteractionType::SwipeLeft => InteractionStrength::SwipeLeft,
            InteractionType::SwipeRight => InteractionStrength::SwipeRight,
            InteractionType::SuperLike => InteractionStrength::SuperLike,
            InteractionType::Message | InteractionType::Match => InteractionStrength::EngagedView,
            // Negative signals carry the pass weight
            InteractionType::Block | InteractionType::Report => InteractionStrength::SwipeLeft,
        }
    }
}

/// Weights used for similarity and recommendation signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionStrength {
    ViewStart,
    #[serde(rename = "VIEW_25")]
    View25,
    #[serde(rename = "VIEW_50")]
    View50,
    #[serde(rename = "VIEW_75")]
    View75,
    ViewComplete,
    ViewLoop,
    Share,
    Like,
    Save,
    LongView,
    EngagedView,
    UnregrettedView,
    ProfileView,
    Follow,
    Comment,
    CommentLike,
    CommentReply,
    SwipeRight,
    SwipeLeft,
    SuperLike,
}

impl InteractionStrength {
    pub fn weight(&self) -> f64 {
        match self {
            InteractionStrength::ViewStart => 0.1,
            InteractionStrength::View25 => 0.2,
            InteractionStrength::View50 => 0.4,
            InteractionStrength::View75 => 0.6,
            InteractionStrength::ViewComplete => 1.0,
            InteractionStrength::ViewLoop => 1.2,
            InteractionStrength::Share => 2.0,
            InteractionStrength::Like => 1.5,
            InteractionStrength::Save => 1.8,
            InteractionStrength::LongView => 1.3,
            InteractionStrength::EngagedView => 1.4,
            InteractionStrength::UnregrettedView => 0.8,
            InteractionStrength::ProfileView => 0.5,
            InteractionStrength::Follow => 2.5,
            InteractionStrength::Comment => 1.6,
            InteractionStrength::CommentLike => 0.7,
            InteractionStrength::CommentReply => 1.4,
            InteractionStrength::SwipeRight => 2.0,
            InteractionStrength::SwipeLeft => -1.0,
            InteractionStrength::SuperLike => 3.0,
        }
    }

    /// View bucket for a completion rate in [0, 1]
    pub fn for_completion(completion_rate: f64) -> Self {
        if completion_rate >= 1.0 {
            InteractionStrength::ViewComplete
        } else if completion_rate >= 0.75 {
            InteractionStrength::View75
        } else if completion_rate >= 0.5 {
            InteractionStrength::View50
        } else if completion_rate >= 0.25 {
            InteractionStrength::View25
        } else {
            InteractionStrength::ViewStart
        }
    }
}

/// One viewing session of a video, as reported by the client
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VideoInteractionMetrics {
    #[serde(default)]
    pub video_id: Option<Uuid>,
    #[validate(range(min = 0))]
    pub view_duration_ms: i64,
    #[validate(range(min = 0))]
    pub video_duration_ms: i64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub completion_rate: f64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub loop_count: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub avg_view_duration_ms: i64,
    #[serde(default)]
    pub engagement_signals: Vec<InteractionType>,
    #[serde(default)]
    pub unregretted: bool,
}

impl VideoInteractionMetrics {
    pub fn signal_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for s in &self.engagement_signals {
            let name = s.as_str().to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

/// Aggregated viewer -> creator engagement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorInteractionMetrics {
    pub creator_id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub profile_view_count: i64,
    #[serde(default)]
    pub total_view_duration_ms: i64,
    #[serde(default)]
    pub video_count: i64,
    #[serde(default)]
    pub completion_rate_avg: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionRequest {
    pub interaction_type: InteractionType,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSimilarityScore {
    pub user_id: Uuid,
    pub target_id: Uuid,
    pub content_similarity: f64,
    pub interaction_similarity: f64,
    pub social_similarity: f64,
    pub location_similarity: f64,
    pub total_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_table() {
        assert_eq!(InteractionStrength::SuperLike.weight(), 3.0);
        assert_eq!(InteractionStrength::SwipeLeft.weight(), -1.0);
        assert_eq!(InteractionStrength::Follow.weight(), 2.5);
        assert_eq!(InteractionType::Comment.strength().weight(), 1.6);
    }

    #[test]
    fn test_completion_buckets() {
        assert_eq!(
            InteractionStrength::for_completion(0.1),
            InteractionStrength::ViewStart
        );
        assert_eq!(
            InteractionStrength::for_completion(0.5),
            InteractionStrength::View50
        );
        assert_eq!(
            InteractionStrength::for_completion(1.0),
            InteractionStrength::ViewComplete
        );
    }

    #[test]
    fn test_metrics_validation_and_signal_dedup() {
        let metrics: VideoInteractionMetrics = serde_json::from_value(serde_json::json!({
            "view_duration_ms": 1200,
            "video_duration_ms": 3000,
            "completion_rate": 0.4,
            "engagement_signals": ["LIKE", "SHARE", "LIKE"]
        }))
        .unwrap();
        assert!(metrics.validate().is_ok());
        assert_eq!(metrics.signal_names(), vec!["LIKE", "SHARE"]);

        let bad = VideoInteractionMetrics {
            completion_rate: 1.5,
            ..metrics
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_view_bucket_wire_names() {
        assert_eq!(
            serde_json::to_string(&InteractionStrength::View25).unwrap(),
            "\"VIEW_25\""
        );
    }
}
