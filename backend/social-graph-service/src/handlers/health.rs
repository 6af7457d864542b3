use crate::app_state::AppState;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
struct HealthResponse {
    success: bool,
    neo4j: bool,
}

/// Liveness plus graph connectivity; always 200 so the body carries the detail
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let neo4j = match state.graph.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(error = %e, "Neo4j health check failed");
            false
        }
    };

    HttpResponse::Ok().json(HealthResponse {
        success: true,
        neo4j,
    })
}
