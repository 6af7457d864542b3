use crate::app_state::AppState;
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/like/post/{post_id}
pub async fn like_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let like = state.services.likes.like_post(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Created().json(like))
}

/// DELETE /api/like/post/{post_id}
pub async fn unlike_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.services.likes.unlike_post(user.0, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/like/post/{post_id}/users
pub async fn get_post_likers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let users = state
        .services
        .likes
        .get_post_likers(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/like/post/{post_id}/check
pub async fn has_liked(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let liked = state.services.likes.has_liked(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(liked))
}

/// GET /api/like/user/{user_id}/posts
pub async fn get_user_liked_posts(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let posts = state
        .services
        .likes
        .get_user_liked_posts(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /api/like/comment/{comment_id}
pub async fn like_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let like = state
        .services
        .likes
        .like_comment(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(like))
}

/// DELETE /api/like/comment/{comment_id}
pub async fn unlike_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .likes
        .unlike_comment(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
