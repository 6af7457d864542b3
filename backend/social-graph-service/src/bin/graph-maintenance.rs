use anyhow::{Context, Result};
use social_graph_service::db::GraphClient;
use social_graph_service::services::analytics::{AnalyticsService, DEFAULT_PROJECTION};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: graph-maintenance <command>

Commands:
  schema          Create uniqueness constraints
  refresh [name]  Recompute FastRP embeddings and SIMILAR edges
  check           Verify the Neo4j connection and report the node count
  stats           Node counts by label";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graph_maintenance=info,social_graph_service=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    if matches!(command, "help" | "--help" | "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let neo4j_uri = std::env::var("NEO4J_URI").unwrap_or_else(|_| "bolt://neo4j:7687".to_string());
    let neo4j_user = std::env::var("NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
    let neo4j_password =
        std::env::var("NEO4J_PASSWORD").context("NEO4J_PASSWORD environment variable not set")?;

    info!("Connecting to Neo4j: {}", neo4j_uri);
    let graph = GraphClient::connect(&neo4j_uri, &neo4j_user, &neo4j_password)
        .context("Failed to connect to Neo4j")?;
    let analytics = AnalyticsService::new(graph.clone());

    match command {
        "schema" => {
            analytics
                .ensure_schema()
                .await
                .context("Failed to create constraints")?;
            info!("Schema constraints created");
        }

        "refresh" => {
            let name = args.get(2).map(|s| s.as_str()).unwrap_or(DEFAULT_PROJECTION);
            match analytics.refresh(name).await {
                Ok(report) => {
                    info!("Refresh completed for projection {}", report.graph_name);
                    info!("   Nodes projected: {}", report.node_count);
                    info!("   Relationships projected: {}", report.relationship_count);
                    info!("   Embeddings written: {}", report.embeddings_written);
                    info!("   SIMILAR edges written: {}", report.similarities_written);
                }
                Err(e) => {
                    error!("Refresh failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        "check" => {
            if !graph.health_check().await? {
                error!("Neo4j health check returned an unexpected result");
                anyhow::bail!("Neo4j health check failed");
            }
            let total = analytics.node_count().await?;
            info!("Neo4j connection OK ({} nodes)", total);
        }

        "stats" => {
            let counts = analytics.label_counts().await?;
            if counts.is_empty() {
                info!("Graph is empty");
            }
            for entry in counts {
                info!("   {:<20} {}", entry.label, entry.count);
            }
        }

        other => {
            error!("Unknown command: {}", other);
            println!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}
