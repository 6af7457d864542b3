use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    MessageCreated,
    FollowRequestCreated,
    FollowRequestAccepted,
    LikedPost,
    LikedComment,
    CommentOnPost,
    ReplyToComment,
    MentionedInComment,
    MentionedInPost,
    MentionedInReply,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::MessageCreated => "message_created",
            NotificationType::FollowRequestCreated => "follow_request_created",
            NotificationType::FollowRequestAccepted => "follow_request_accepted",
            NotificationType::LikedPost => "liked_post",
            NotificationType::LikedComment => "liked_comment",
            NotificationType::CommentOnPost => "comment_on_post",
            NotificationType::ReplyToComment => "reply_to_comment",
            NotificationType::MentionedInComment => "mentioned_in_comment",
            NotificationType::MentionedInPost => "mentioned_in_post",
            NotificationType::MentionedInReply => "mentioned_in_reply",
        }
    }

    /// Label and id property of the node the notification hangs off
    pub fn content_node(&self) -> (&'static str, &'static str) {
        match self {
            NotificationType::MessageCreated => ("Message", "message_id"),
            NotificationType::FollowRequestCreated | NotificationType::FollowRequestAccepted => {
                ("User", "user_id")
            }
            NotificationType::LikedPost | NotificationType::MentionedInPost => ("Post", "post_id"),
            NotificationType::LikedComment
            | NotificationType::CommentOnPost
            | NotificationType::ReplyToComment
            | NotificationType::MentionedInComment
            | NotificationType::MentionedInReply => ("Comment", "comment_id"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: Uuid,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub seen_at: Option<DateTime<Utc>>,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub content_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        notification_type: NotificationType,
        from_user_id: Uuid,
        to_user_id: Uuid,
        content_id: Uuid,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4(),
            notification_type,
            seen_at: None,
            from_user_id,
            to_user_id,
            content_id,
            created_at: Utc::now(),
        }
    }

    pub fn is_self_notification(&self) -> bool {
        self.from_user_id == self.to_user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_string_matches_serde() {
        let t = NotificationType::FollowRequestAccepted;
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            format!("\"{}\"", t.as_str())
        );
    }

    #[test]
    fn test_content_node_per_type() {
        assert_eq!(
            NotificationType::MessageCreated.content_node(),
            ("Message", "message_id")
        );
        assert_eq!(NotificationType::FollowRequestCreated.content_node().0, "User");
        assert_eq!(NotificationType::MentionedInPost.content_node().0, "Post");
        assert_eq!(NotificationType::ReplyToComment.content_node().0, "Comment");
    }

    #[test]
    fn test_self_notification_detected() {
        let id = Uuid::new_v4();
        let n = Notification::new(NotificationType::LikedPost, id, id, Uuid::new_v4());
        assert!(n.is_self_notification());
        assert!(n.seen_at.is_none());
    }
}
