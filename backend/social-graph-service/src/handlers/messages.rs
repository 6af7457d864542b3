use crate::app_state::AppState;
use crate::domain::message::{MessageCreate, ReactionRequest};
use crate::domain::Pagination;
use crate::error::Result;
use crate::handlers::page;
use crate::middleware::UserId;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

/// POST /api/message
pub async fn send_message(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<MessageCreate>,
) -> Result<HttpResponse> {
    let message = state
        .services
        .messages
        .send_message(user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// GET /api/message/conversation/{user_id}
pub async fn get_conversation(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    query: web::Query<Pagination>,
) -> Result<HttpResponse> {
    let messages = state
        .services
        .messages
        .get_conversation(user.0, path.into_inner(), page(query)?)
        .await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// DELETE /api/message/{message_id}
pub async fn delete_message(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .services
        .messages
        .delete_message(path.into_inner(), user.0)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/message/{message_id}/reaction
pub async fn react_to_message(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<ReactionRequest>,
) -> Result<HttpResponse> {
    let reaction = state
        .services
        .messages
        .react_to_message(path.into_inner(), user.0, body.into_inner().reaction_type)
        .await?;
    Ok(HttpResponse::Ok().json(reaction))
}
