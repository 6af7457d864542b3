use crate::app_state::AppState;
use crate::domain::bookmark::BookmarkCreate;
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/bookmark/post/{post_id}; the `{notes}` body is optional
pub async fn bookmark_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: Option<web::Json<BookmarkCreate>>,
) -> Result<HttpResponse> {
    let payload = body.map(|b| b.into_inner()).unwrap_or_default();
    let bookmark = state
        .services
        .bookmarks
        .bookmark_post(user.0, path.into_inner(), payload)
        .await?;
    Ok(HttpResponse::Created().json(bookmark))
}

/// DELETE /api/bookmark/post/{post_id}
pub async fn remove_bookmark(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .bookmarks
        .remove_bookmark(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/bookmark/post/{post_id}/check
pub async fn is_bookmarked(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let bookmarked = state
        .services
        .bookmarks
        .is_bookmarked(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(bookmarked))
}

/// GET /api/bookmark/user/{user_id}/posts
pub async fn get_bookmarked_posts(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let posts = state
        .services
        .bookmarks
        .get_bookmarked_posts(user.0, path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}
