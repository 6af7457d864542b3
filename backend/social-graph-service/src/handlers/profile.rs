use crate::app_state::AppState;
use crate::domain::user::{LocationUpdate, ProfileUpdate, ProfileView};
use crate::error::{AppError, Result};
use crate::handlers::SearchQuery;
use crate::middleware::{CurrentUser, UserId};
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// GET /api/me
pub async fn me(user: CurrentUser) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(user.0))
}

/// GET /api/profile/me
pub async fn get_own_profile(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let profile = state.services.profile.get_user(user.0).await?;
    Ok(HttpResponse::Ok().json(ProfileView::Full(Box::new(profile))))
}

/// PUT /api/profile/me
pub async fn update_own_profile(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse> {
    let updated = state
        .services
        .profile
        .update_profile(user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// GET /api/profile/search?q=
pub async fn search_profiles(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let page = query.page()?;
    let ranked = state
        .services
        .profile
        .search_profiles(user.0, &query.q, page)
        .await?;
    Ok(HttpResponse::Ok().json(ranked))
}

/// GET /api/profile/{user_id}
pub async fn get_profile(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let view = state
        .services
        .profile
        .get_profile(path.into_inner(), Some(user.0))
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// PUT /api/profile/{user_id}/location
pub async fn update_location(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<LocationUpdate>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    if user_id != user.0 {
        return Err(AppError::forbidden("You can only update your own location"));
    }
    let updated = state
        .services
        .profile
        .update_location(user_id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}
