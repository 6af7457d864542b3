use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use social_graph_service::config::Config;
use social_graph_service::db::GraphClient;
use social_graph_service::routes::configure_routes;
use social_graph_service::services::analytics::DEFAULT_PROJECTION;
use social_graph_service::services::auth::OidcProvider;
use social_graph_service::AppState;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting social-graph-service v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        neo4j = %config.neo4j.uri,
        candidate_limit = config.ranking.candidate_limit,
        "Configuration loaded"
    );

    let graph = GraphClient::connect(&config.neo4j.uri, &config.neo4j.user, &config.neo4j.password)
        .map_err(|e| {
            error!("Failed to connect to Neo4j: {:#}", e);
            e
        })?;
    match graph.health_check().await {
        Ok(true) => info!("Connected to Neo4j"),
        Ok(false) => warn!("Neo4j health check returned an unexpected result"),
        Err(e) => warn!(error = %e, "Neo4j not reachable yet; requests will retry"),
    }

    let provider = OidcProvider::new(&config.auth).context("Failed to build identity provider client")?;
    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let allowed_origins = config.allowed_origins();
    let refresh_on_startup = config.ranking.gds_refresh_on_startup;

    let state = AppState::new(config, graph, Arc::new(provider));

    if refresh_on_startup {
        let analytics = state.services.analytics.clone();
        actix_rt::spawn(async move {
            if let Err(e) = analytics.refresh(DEFAULT_PROJECTION).await {
                warn!(error = %e, "Startup graph analytics refresh failed");
            }
        });
    }

    info!("Starting HTTP server at {}", bind_address);

    let state = web::Data::new(state);
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in &allowed_origins {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure_routes)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output
fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "social_graph_service=info,actix_web=info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}
