use crate::app_state::AppState;
use crate::domain::post::{PostCreate, PostUpdate};
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::{page, SearchQuery};
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/post
pub async fn create_post(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<PostCreate>,
) -> Result<HttpResponse> {
    let post = state
        .services
        .posts
        .create_post(user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /api/post/feed
pub async fn get_feed(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let feed = state.services.posts.get_feed(user.0, page(query)?).await?;
    Ok(HttpResponse::Ok().json(feed))
}

/// GET /api/post/search?q=
pub async fn search_posts(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let page = query.page()?;
    let results = state
        .services
        .posts
        .search_posts(user.0, &query.q, page)
        .await?;
    Ok(HttpResponse::Ok().json(results))
}

/// GET /api/post/user/{user_id}
pub async fn get_user_posts(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let posts = state
        .services
        .posts
        .get_user_posts(path.into_inner(), user.0, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/post/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.services.posts.get_post(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/post/{post_id}
pub async fn update_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<PostUpdate>,
) -> Result<HttpResponse> {
    let post = state
        .services
        .posts
        .update_post(path.into_inner(), user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// DELETE /api/post/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state.services.posts.delete_post(path.into_inner(), user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/post/{post_id}/view
pub async fn record_view(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let post = state.services.posts.record_view(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/post/{post_id}/share
pub async fn record_share(state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let post = state.services.posts.record_share(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post))
}
