use crate::app_state::AppState;
use crate::domain::bookmark::CollectionTitle;
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/bookmark/collection
pub async fn create_collection(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<CollectionTitle>,
) -> Result<HttpResponse> {
    let collection = state
        .services
        .collections
        .create_collection(user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(collection))
}

/// GET /api/bookmark/collection/{collection_id}
pub async fn get_collection(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let collection = state
        .services
        .collections
        .get_collection(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(collection))
}

/// PUT /api/bookmark/collection/{collection_id}
pub async fn update_collection(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<CollectionTitle>,
) -> Result<HttpResponse> {
    let collection = state
        .services
        .collections
        .update_collection(path.into_inner(), user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(collection))
}

/// DELETE /api/bookmark/collection/{collection_id}
pub async fn delete_collection(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .collections
        .delete_collection(path.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/bookmark/collection/{collection_id}/bookmark/{bookmark_id}
pub async fn add_bookmark(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (collection_id, bookmark_id) = path.into_inner();
    let collection = state
        .services
        .collections
        .add_bookmark(collection_id, bookmark_id, user.0)
        .await?;
    Ok(HttpResponse::Ok().json(collection))
}

/// DELETE /api/bookmark/collection/{collection_id}/bookmark/{bookmark_id}
pub async fn remove_bookmark(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (collection_id, bookmark_id) = path.into_inner();
    let collection = state
        .services
        .collections
        .remove_bookmark(collection_id, bookmark_id, user.0)
        .await?;
    Ok(HttpResponse::Ok().json(collection))
}

/// GET /api/bookmark/collection/{collection_id}/bookmarks
pub async fn get_collection_bookmarks(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let bookmarks = state
        .services
        .collections
        .get_collection_bookmarks(path.into_inner(), user.0, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(bookmarks))
}

/// GET /api/bookmark/collection/user/{user_id}
pub async fn get_user_collections(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let collections = state
        .services
        .collections
        .get_user_collections(path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(collections))
}
