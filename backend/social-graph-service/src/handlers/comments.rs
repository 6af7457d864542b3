use crate::app_state::AppState;
use crate::domain::comment::{CommentCreate, CommentUpdate};
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/comment/post/{post_id}
pub async fn create_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<CommentCreate>,
) -> Result<HttpResponse> {
    let comment = state
        .services
        .comments
        .create_comment(user.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(comment))
}

/// GET /api/comment/post/{post_id}
pub async fn get_post_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let comments = state
        .services
        .comments
        .get_post_comments(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// GET /api/comment/user/{user_id}
pub async fn get_user_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let comments = state
        .services
        .comments
        .get_user_comments(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// GET /api/comment/{comment_id}
pub async fn get_comment(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let comment = state.services.comments.get_comment(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// PUT /api/comment/{comment_id}
pub async fn update_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<CommentUpdate>,
) -> Result<HttpResponse> {
    let comment = state
        .services
        .comments
        .update_comment(path.into_inner(), user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// DELETE /api/comment/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .comments
        .delete_comment(path.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
