use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub in_reply_to: Option<Uuid>,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub reply_count: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentCreate {
    #[validate(
        length(min = 1, max = 2000),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub content: String,
    pub in_reply_to: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentUpdate {
    #[validate(
        length(min = 1, max = 2000),
        custom(function = "crate::validators::validate_not_blank")
    )]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_comment_rejected() {
        let c = CommentCreate {
            content: "   ".to_string(),
            in_reply_to: None,
        };
        assert!(c.validate().is_err());
        let c = CommentCreate {
            content: "nice @bob".to_string(),
            in_reply_to: None,
        };
        assert!(c.validate().is_ok());
    }
}
