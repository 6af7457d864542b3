use crate::app_state::AppState;
use crate::domain::{Pagination, DEFAULT_PAGE_SIZE};
use crate::error::Result;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unseen_only: bool,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/notification?unseen_only=
pub async fn list_notifications(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse> {
    let page = Pagination::new(query.limit, query.offset)?;
    let notifications = state
        .services
        .notifications
        .list(user.0, query.unseen_only, page)
        .await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// PUT /api/notification/{notification_id}/read
pub async fn mark_read(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let notification = state
        .services
        .notifications
        .mark_read(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(notification))
}
