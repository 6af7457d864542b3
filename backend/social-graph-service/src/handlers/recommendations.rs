use crate::app_state::AppState;
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};

/// GET /api/recommendation/users
pub async fn user_suggestions(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let users = state
        .services
        .recommendations
        .get_user_suggestions(user.0, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/recommendation/creators
pub async fn creator_suggestions(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let creators = state
        .services
        .recommendations
        .get_creator_suggestions(user.0, page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(creators))
}
