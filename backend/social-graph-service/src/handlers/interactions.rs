use crate::app_state::AppState;
use crate::domain::interaction::{InteractionRequest, VideoInteractionMetrics};
use crate::domain::Ack;
use crate::error::Result;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/interaction/video/{post_id}
pub async fn record_video_interaction(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<VideoInteractionMetrics>,
) -> Result<HttpResponse> {
    state
        .services
        .interactions
        .record_video_interaction(user.0, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// POST /api/interaction/profile/{user_id}
pub async fn record_profile_view(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let metrics = state
        .services
        .interactions
        .record_profile_view(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(metrics))
}

/// POST /api/interaction/user/{user_id}
pub async fn record_interaction(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<InteractionRequest>,
) -> Result<HttpResponse> {
    state
        .services
        .interactions
        .record_interaction(user.0, path.into_inner(), body.into_inner().interaction_type)
        .await?;
    Ok(HttpResponse::Ok().json(Ack::ok()))
}

/// GET /api/interaction/similarity/{user_id}
pub async fn calculate_user_similarity(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let score = state
        .services
        .interactions
        .calculate_user_similarity(user.0, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(score))
}
