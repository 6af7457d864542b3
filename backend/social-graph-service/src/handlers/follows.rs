use crate::app_state::AppState;
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/follow/user/{user_id}
pub async fn follow_user(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .services
        .follows
        .follow_user(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// DELETE /api/follow/user/{user_id}
pub async fn unfollow_user(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .follows
        .unfollow_user(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/follow/request/{requester_id}/accept
pub async fn accept_follow_request(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .follows
        .accept_follow_request(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/follow/request/{requester_id}/deny
pub async fn deny_follow_request(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .follows
        .deny_follow_request(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/follow/requests
pub async fn get_pending_requests(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let requests = state
        .services
        .follows
        .get_pending_requests(user.0, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// GET /api/follow/user/{user_id}/followers
pub async fn get_followers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let users = state
        .services
        .follows
        .get_followers(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/follow/user/{user_id}/following
pub async fn get_following(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let users = state
        .services
        .follows
        .get_following(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/follow/user/{user_id}/mutual
pub async fn get_mutual_followers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let users = state
        .services
        .follows
        .get_mutual_followers(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}
