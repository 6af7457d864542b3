use crate::db::{self, GraphClient};
use crate::domain::edge::BlockState;
use crate::domain::notification::{Notification, NotificationType};
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::metrics::NOTIFICATION_FANOUT_TOTAL;
use neo4rs::query;
use tracing::{debug, warn};
use uuid::Uuid;

/// NOTIFICATION edges hang off the content node and point at the recipient
#[derive(Clone)]
pub struct NotificationService {
    graph: GraphClient,
}

impl NotificationService {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    /// Create a notification. Returns `None` for self-notifications, which
    /// are skipped silently. Creation is idempotent per type, sender,
    /// recipient and content.
    pub async fn create(&self, notification: &Notification) -> Result<Option<Notification>> {
        if notification.is_self_notification() {
            return Ok(None);
        }

        let (label, id_prop) = notification.notification_type.content_node();
        let cypher = format!(
            "MATCH (from:User {{user_id: $from_user_id}})
             MATCH (to:User {{user_id: $to_user_id}})
             MATCH (content:{label} {{{id_prop}: $content_id}})
             WHERE NOT EXISTS {{ (from)-[:BLOCKS]-(to) }}
             MERGE (content)-[r:NOTIFICATION {{
                notification_type: $notification_type,
                from_user_id: $from_user_id,
                to_user_id: $to_user_id,
                content_id: $content_id
             }}]->(to)
             ON CREATE SET r.notification_id = $notification_id, r.created_at = $now
             RETURN r {{.*}} AS notification"
        );

        let created = self
            .graph
            .fetch_optional::<Notification>(
                query(&cypher)
                    .param("from_user_id", notification.from_user_id.to_string())
                    .param("to_user_id", notification.to_user_id.to_string())
                    .param("content_id", notification.content_id.to_string())
                    .param(
                        "notification_type",
                        notification.notification_type.as_str(),
                    )
                    .param("notification_id", notification.notification_id.to_string())
                    .param("now", db::timestamp(notification.created_at)),
                "notification",
            )
            .await?;

        match created {
            Some(n) => {
                debug!(
                    notification_id = %n.notification_id,
                    notification_type = n.notification_type.as_str(),
                    "Notification stored"
                );
                Ok(Some(n))
            }
            None => Err(self.explain_create_failure(notification).await),
        }
    }

    async fn explain_create_failure(&self, notification: &Notification) -> AppError {
        let (label, id_prop) = notification.notification_type.content_node();
        let cypher = format!(
            "OPTIONAL MATCH (from:User {{user_id: $from_user_id}})
             OPTIONAL MATCH (to:User {{user_id: $to_user_id}})
             OPTIONAL MATCH (content:{label} {{{id_prop}: $content_id}})
             RETURN from IS NOT NULL AS from_exists,
                    to IS NOT NULL AS to_exists,
                    content IS NOT NULL AS content_exists,
                    EXISTS {{ (from)-[:BLOCKS]->(to) }} AS sender_blocked,
                    EXISTS {{ (to)-[:BLOCKS]->(from) }} AS receiver_blocked"
        );
        let row = match self
            .graph
            .first_row(
                query(&cypher)
                    .param("from_user_id", notification.from_user_id.to_string())
                    .param("to_user_id", notification.to_user_id.to_string())
                    .param("content_id", notification.content_id.to_string()),
            )
            .await
        {
            Ok(Some(row)) => row,
            Ok(None) => return AppError::Internal("Notification status unavailable".into()),
            Err(e) => return e,
        };

        let flag = |name: &str| row.get::<bool>(name).unwrap_or(false);
        if !flag("from_exists") {
            return AppError::not_found("Sender not found");
        }
        if !flag("to_exists") {
            return AppError::not_found("Receiver not found");
        }
        if !flag("content_exists") {
            return AppError::not_found(format!("{} not found", label));
        }
        let blocks = BlockState {
            actor_blocked_other: flag("sender_blocked"),
            other_blocked_actor: flag("receiver_blocked"),
        };
        match blocks.violation("send notification to") {
            Some(msg) => AppError::bad_request(msg),
            None => AppError::Internal("Something went wrong when creating the notification".into()),
        }
    }

    /// Fan-out entry point for other services. Failures are logged, never
    /// returned.
    pub async fn notify(
        &self,
        notification_type: NotificationType,
        from_user_id: Uuid,
        to_user_id: Uuid,
        content_id: Uuid,
    ) {
        let notification = Notification::new(notification_type, from_user_id, to_user_id, content_id);
        match self.create(&notification).await {
            Ok(Some(_)) => NOTIFICATION_FANOUT_TOTAL.with_label_values(&["created"]).inc(),
            Ok(None) => NOTIFICATION_FANOUT_TOTAL.with_label_values(&["skipped"]).inc(),
            Err(e) => {
                NOTIFICATION_FANOUT_TOTAL.with_label_values(&["failed"]).inc();
                warn!(
                    notification_type = notification_type.as_str(),
                    from_user_id = %from_user_id,
                    to_user_id = %to_user_id,
                    "Notification fan-out failed: {}",
                    e
                );
            }
        }
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        unseen_only: bool,
        page: Pagination,
    ) -> Result<Vec<Notification>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH ()-[r:NOTIFICATION]->(u:User {user_id: $user_id})
                     WHERE NOT $unseen_only OR r.seen_at IS NULL
                     RETURN r {.*} AS notification
                     ORDER BY r.created_at DESC, r.notification_id ASC
                     SKIP $offset LIMIT $limit",
                )
                .param("user_id", user_id.to_string())
                .param("unseen_only", unseen_only)
                .param("offset", page.offset)
                .param("limit", page.limit),
                "notification",
            )
            .await
    }

    pub async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<Notification> {
        let updated = self
            .graph
            .fetch_optional::<Notification>(
                query(
                    "MATCH ()-[r:NOTIFICATION {notification_id: $notification_id}]->(:User {user_id: $user_id})
                     WHERE r.seen_at IS NULL
                     SET r.seen_at = $now
                     RETURN r {.*} AS notification",
                )
                .param("notification_id", notification_id.to_string())
                .param("user_id", user_id.to_string())
                .param("now", db::now()),
                "notification",
            )
            .await?;
        if let Some(n) = updated {
            return Ok(n);
        }

        let row = self
            .graph
            .first_row(
                query(
                    "OPTIONAL MATCH ()-[r:NOTIFICATION {notification_id: $notification_id}]->(:User {user_id: $user_id})
                     RETURN r IS NOT NULL AS found, r.seen_at IS NOT NULL AS seen",
                )
                .param("notification_id", notification_id.to_string())
                .param("user_id", user_id.to_string()),
            )
            .await?;
        let (found, seen) = match row {
            Some(row) => (
                row.get::<bool>("found").unwrap_or(false),
                row.get::<bool>("seen").unwrap_or(false),
            ),
            None => (false, false),
        };
        if !found {
            Err(AppError::not_found("Notification not found"))
        } else if seen {
            Err(AppError::bad_request(
                "Notification has already been marked as read",
            ))
        } else {
            Err(AppError::Internal(
                "Something went wrong when marking the notification as read".into(),
            ))
        }
    }
}
