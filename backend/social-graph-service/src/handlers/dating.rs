use crate::app_state::AppState;
use crate::domain::dating::{DatingActionRequest, DatingFilter, DatingProfileCreate, DatingProfileUpdate};
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/dating/profile
pub async fn create_dating_profile(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<DatingProfileCreate>,
) -> Result<HttpResponse> {
    let profile = state
        .services
        .dating
        .create_dating_profile(user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(profile))
}

/// GET /api/dating/profile/{user_id}
pub async fn get_dating_profile(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let profile = state
        .services
        .dating
        .get_dating_profile(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PUT /api/dating/profile/{user_id}
pub async fn update_dating_profile(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<DatingProfileUpdate>,
) -> Result<HttpResponse> {
    let profile = state
        .services
        .dating
        .update_dating_profile(user.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/dating/profile/{user_id}/view
pub async fn record_profile_view(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .dating
        .record_profile_view(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/dating/matches
pub async fn get_potential_matches(
    state: web::Data<AppState>,
    user: UserId,
    filter: web::Query<DatingFilter>,
) -> Result<HttpResponse> {
    let matches = state
        .services
        .dating
        .get_potential_matches(user.0, filter.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/dating/matches/mutual
pub async fn get_mutual_matches(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let matches = state
        .services
        .dating
        .get_mutual_matches(user.0, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// POST /api/dating/action/{target_id}; responds with the match or `null`
pub async fn record_dating_action(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<DatingActionRequest>,
) -> Result<HttpResponse> {
    let outcome = state
        .services
        .dating
        .record_dating_action(user.0, path.into_inner(), body.into_inner().action)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}
