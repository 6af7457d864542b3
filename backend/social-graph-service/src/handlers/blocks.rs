use crate::app_state::AppState;
use crate::domain::Pagination;
use crate::error::{AppError, Result};
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/block/user/{user_id}
pub async fn block_user(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .services
        .blocks
        .block_user(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// DELETE /api/block/user/{user_id}
pub async fn unblock_user(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .blocks
        .unblock_user(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/block/user/{user_id}/blocked
pub async fn get_blocked_users(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if user_id != user.0 {
        return Err(AppError::forbidden("You can only view your own blocked users"));
    }
    let users = state
        .services
        .blocks
        .get_blocked_users(user_id, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/block/check/{user_id}
pub async fn is_blocked(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let blocked = state
        .services
        .blocks
        .is_blocked(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(blocked))
}
