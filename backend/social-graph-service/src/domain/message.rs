use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: Uuid,
    pub content: String,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    #[serde(default)]
    pub shared_post_id: Option<Uuid>,
    #[serde(default)]
    pub reply_to_message_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MessageCreate {
    pub receiver_id: Uuid,
    #[validate(
        length(min = 1, max = 5000),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub content: String,
    pub shared_post_id: Option<Uuid>,
    pub reply_to_message_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionType {
    #[serde(rename = "❤️")]
    Like,
    #[serde(rename = "😂")]
    Laugh,
    #[serde(rename = "🥲")]
    Sad,
    #[serde(rename = "😠")]
    Angry,
    #[serde(rename = "👍")]
    ThumbsUp,
    #[serde(rename = "👎")]
    ThumbsDown,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "❤️",
            ReactionType::Laugh => "😂",
            ReactionType::Sad => "🥲",
            ReactionType::Angry => "😠",
            ReactionType::ThumbsUp => "👍",
            ReactionType::ThumbsDown => "👎",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReaction {
    pub message_id: Uuid,
    pub user_id: Uuid,
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactionRequest {
    pub reaction_type: ReactionType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_round_trips_as_emoji() {
        for r in [
            ReactionType::Like,
            ReactionType::Laugh,
            ReactionType::Sad,
            ReactionType::Angry,
            ReactionType::ThumbsUp,
            ReactionType::ThumbsDown,
        ] {
            let json = serde_json::to_string(&r).unwrap();
            assert_eq!(json, format!("\"{}\"", r.as_str()));
        }
        let parsed: ReactionType = serde_json::from_str("\"👍\"").unwrap();
        assert_eq!(parsed, ReactionType::ThumbsUp);
    }

    #[test]
    fn test_blank_message_rejected() {
        let m = MessageCreate {
            receiver_id: Uuid::new_v4(),
            content: " ".to_string(),
            shared_post_id: None,
            reply_to_message_id: None,
        };
        assert!(m.validate().is_err());
    }
}
