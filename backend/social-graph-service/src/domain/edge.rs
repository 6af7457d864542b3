use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FollowRequestStatus {
    Pending,
    Accepted,
    Denied,
}

/// FOLLOWS edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: Uuid,
    pub following_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub request_accepted_at: Option<DateTime<Utc>>,
}

/// REQUESTED_TO_FOLLOW edge, only created towards private accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowRequest {
    pub requester_id: Uuid,
    pub target_id: Uuid,
    pub status: FollowRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FollowOutcome {
    pub success: bool,
    /// false when a follow request was created instead of a FOLLOWS edge
    pub is_direct_follow: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockOutcome {
    pub success: bool,
    pub blocked_user_id: Uuid,
    pub removed_forward_follow: bool,
    pub removed_reverse_follow: bool,
}

/// Which side of a pair has a BLOCKS edge towards the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockState {
    /// actor -> other
    pub actor_blocked_other: bool,
    /// other -> actor
    pub other_blocked_actor: bool,
}

impl BlockState {
    pub fn any(&self) -> bool {
        self.actor_blocked_other || self.other_blocked_actor
    }

    /// Error text naming the side that blocked, if any
    pub fn violation(&self, action: &str) -> Option<String> {
        if self.actor_blocked_other {
            Some(format!("Cannot {} a user you have blocked", action))
        } else if self.other_blocked_actor {
            Some(format!("Cannot {} a user who has blocked you", action))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&FollowRequestStatus::Pending).unwrap(),
            "\"PENDING\""
        );
    }

    #[test]
    fn test_block_state_names_the_blocking_side() {
        let none = BlockState::default();
        assert!(!none.any());
        assert_eq!(none.violation("follow"), None);

        let mine = BlockState {
            actor_blocked_other: true,
            other_blocked_actor: true,
        };
        assert_eq!(
            mine.violation("follow").as_deref(),
            Some("Cannot follow a user you have blocked")
        );

        let theirs = BlockState {
            actor_blocked_other: false,
            other_blocked_actor: true,
        };
        assert_eq!(
            theirs.violation("message").as_deref(),
            Some("Cannot message a user who has blocked you")
        );
    }
}
