use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeTarget {
    Post,
    Comment,
}

impl LikeTarget {
    /// Node label of the liked content
    pub fn label(&self) -> &'static str {
        match self {
            LikeTarget::Post => "Post",
            LikeTarget::Comment => "Comment",
        }
    }

    /// Property holding the content id
    pub fn id_property(&self) -> &'static str {
        match self {
            LikeTarget::Post => "post_id",
            LikeTarget::Comment => "comment_id",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub content_type: LikeTarget,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_target_labels() {
        assert_eq!(LikeTarget::Post.label(), "Post");
        assert_eq!(LikeTarget::Comment.id_property(), "comment_id");
        assert_eq!(
            serde_json::to_string(&LikeTarget::Comment).unwrap(),
            "\"comment\""
        );
    }
}
