use crate::db::{self, nullable, GraphClient};
use crate::domain::message::{Message, MessageCreate, MessageReaction, ReactionType};
use crate::domain::notification::NotificationType;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::services::ensure_unblocked;
use crate::services::notification::NotificationService;
use neo4rs::query;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize)]
struct DeliveryStatus {
    receiver_private: bool,
    sender_follows_receiver: bool,
    reply_exists: bool,
    post_exists: bool,
}

impl DeliveryStatus {
    /// Why the message cannot be delivered, if anything stops it
    fn refusal(&self) -> Option<AppError> {
        if self.receiver_private && !self.sender_follows_receiver {
            Some(AppError::bad_request(
                "Cannot send message to a private account you don't follow",
            ))
        } else if !self.reply_exists {
            Some(AppError::not_found("Message to reply to not found"))
        } else if !self.post_exists {
            Some(AppError::not_found("Shared post not found"))
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct MessageService {
    graph: GraphClient,
    notifications: NotificationService,
}

impl MessageService {
    pub fn new(graph: GraphClient, notifications: NotificationService) -> Self {
        Self {
            graph,
            notifications,
        }
    }

    pub async fn send_message(&self, sender_id: Uuid, payload: MessageCreate) -> Result<Message> {
        payload.validate()?;
        let receiver_id = payload.receiver_id;
        if sender_id == receiver_id {
            return Err(AppError::bad_request("Cannot send a message to yourself"));
        }
        ensure_unblocked(&self.graph, sender_id, receiver_id, "send message to").await?;

        let reply_id = payload.reply_to_message_id.map(|id| id.to_string());
        let post_id = payload.shared_post_id.map(|id| id.to_string());
        let status: DeliveryStatus = self
            .graph
            .fetch_one(
                query(
                    "MATCH (sender:User {user_id: $sender_id})
                     MATCH (receiver:User {user_id: $receiver_id})
                     RETURN {
                        receiver_private: coalesce(receiver.is_private, false),
                        sender_follows_receiver: EXISTS { (sender)-[:FOLLOWS]->(receiver) },
                        reply_exists: $reply_id IS NULL
                            OR EXISTS { MATCH (:Message {message_id: $reply_id}) },
                        post_exists: $post_id IS NULL
                            OR EXISTS { MATCH (:Post {post_id: $post_id}) }
                     } AS status",
                )
                .param("sender_id", sender_id.to_string())
                .param("receiver_id", receiver_id.to_string())
                .param("reply_id", nullable(reply_id.clone()))
                .param("post_id", nullable(post_id.clone())),
                "status",
                "User not found",
            )
            .await?;

        if let Some(err) = status.refusal() {
            return Err(err);
        }

        let message: Message = self
            .graph
            .fetch_optional(
                query(
                    "MATCH (sender:User {user_id: $sender_id})
                     MATCH (receiver:User {user_id: $receiver_id})
                     WHERE NOT EXISTS { (sender)-[:BLOCKS]-(receiver) }
                     CREATE (sender)-[:SENT]->(msg:Message {
                        message_id: $message_id,
                        content: $content,
                        sender_id: $sender_id,
                        receiver_id: $receiver_id,
                        shared_post_id: $post_id,
                        reply_to_message_id: $reply_id,
                        created_at: $now,
                        is_deleted: false
                     })-[:RECEIVED_BY]->(receiver)
                     WITH msg
                     OPTIONAL MATCH (original:Message {message_id: $reply_id})
                     FOREACH (_ IN CASE WHEN original IS NULL THEN [] ELSE [1] END |
                        CREATE (msg)-[:REPLIES_TO]->(original)
                     )
                     WITH msg
                     OPTIONAL MATCH (post:Post {post_id: $post_id})
                     FOREACH (_ IN CASE WHEN post IS NULL THEN [] ELSE [1] END |
                        CREATE (msg)-[:SHARES]->(post)
                     )
                     RETURN msg {.*} AS message",
                )
                .param("sender_id", sender_id.to_string())
                .param("receiver_id", receiver_id.to_string())
                .param("message_id", Uuid::new_v4().to_string())
                .param("content", payload.content.trim().to_string())
                .param("reply_id", nullable(reply_id))
                .param("post_id", nullable(post_id))
                .param("now", db::now()),
                "message",
            )
            .await?
            .ok_or_else(|| AppError::bad_request("Cannot send message to this user"))?;

        info!(%sender_id, %receiver_id, message_id = %message.message_id, "Message sent");
        self.notifications
            .notify(
                NotificationType::MessageCreated,
                sender_id,
                receiver_id,
                message.message_id,
            )
            .await;
        Ok(message)
    }

    /// Messages exchanged in both directions, newest first, deleted ones
    /// left out
    pub async fn get_conversation(
        &self,
        user_id: Uuid,
        other_id: Uuid,
        page: Pagination,
    ) -> Result<Vec<Message>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (s:User)-[:SENT]->(m:Message)-[:RECEIVED_BY]->(r:User)
                     WHERE ((s.user_id = $user_id AND r.user_id = $other_id)
                            OR (s.user_id = $other_id AND r.user_id = $user_id))
                       AND NOT coalesce(m.is_deleted, false)
                     RETURN m {.*} AS message
                     ORDER BY m.created_at DESC, m.message_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("other_id", other_id.to_string())
                .param("offset", page.offset)
                .param("limit", page.limit),
                "message",
            )
            .await
    }

    async fn get_message(&self, message_id: Uuid) -> Result<Message> {
        let message: Message = self
            .graph
            .fetch_one(
                query("MATCH (m:Message {message_id: $message_id}) RETURN m {.*} AS message")
                    .param("message_id", message_id.to_string()),
                "message",
                "Message not found",
            )
            .await?;
        if message.is_deleted {
            return Err(AppError::not_found("Message not found"));
        }
        Ok(message)
    }

    /// Soft delete, sender only
    pub async fn delete_message(&self, message_id: Uuid, user_id: Uuid) -> Result<()> {
        let message = self.get_message(message_id).await?;
        if message.sender_id != user_id {
            return Err(AppError::forbidden("Only the sender can delete this message"));
        }
        self.graph
            .run(
                query(
                    "MATCH (m:Message {message_id: $message_id})
                     SET m.is_deleted = true, m.deleted_at = $now",
                )
                .param("message_id", message_id.to_string())
                .param("now", db::now()),
            )
            .await?;
        debug!(%message_id, "Message deleted");
        Ok(())
    }

    /// One reaction per participant; reacting again replaces it
    pub async fn react_to_message(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        reaction: ReactionType,
    ) -> Result<MessageReaction> {
        let message = self.get_message(message_id).await?;
        if message.sender_id != user_id && message.receiver_id != user_id {
            return Err(AppError::forbidden(
                "Only conversation participants can react to this message",
            ));
        }

        let reaction: MessageReaction = self
            .graph
            .fetch_one(
                query(
                    "MATCH (u:User {user_id: $user_id})
                     MATCH (m:Message {message_id: $message_id})
                     MERGE (u)-[r:REACTED]->(m)
                     SET r.reaction = $reaction, r.created_at = $now
                     RETURN {
                        message_id: m.message_id,
                        user_id: u.user_id,
                        reaction_type: r.reaction,
                        created_at: r.created_at
                     } AS reaction",
                )
                .param("user_id", user_id.to_string())
                .param("message_id", message_id.to_string())
                .param("reaction", reaction.as_str())
                .param("now", db::now()),
                "reaction",
                "Message not found",
            )
            .await?;
        debug!(%message_id, %user_id, reaction = reaction.reaction_type.as_str(), "Reaction recorded");
        Ok(reaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(private: bool, follows: bool) -> DeliveryStatus {
        DeliveryStatus {
            receiver_private: private,
            sender_follows_receiver: follows,
            reply_exists: true,
            post_exists: true,
        }
    }

    #[test]
    fn test_private_receiver_requires_follow() {
        assert!(matches!(
            status(true, false).refusal(),
            Some(AppError::BadRequest(_))
        ));
        assert!(status(true, true).refusal().is_none());
        assert!(status(false, false).refusal().is_none());
    }

    #[test]
    fn test_missing_reply_or_shared_post() {
        let mut s = status(false, false);
        s.reply_exists = false;
        assert!(matches!(s.refusal(), Some(AppError::NotFound(ref m)) if m.contains("reply")));

        let mut s = status(false, false);
        s.post_exists = false;
        assert!(matches!(s.refusal(), Some(AppError::NotFound(ref m)) if m.contains("post")));
    }
}
