/// Graph Data Science refresh: the weighted projection, FastRP embeddings
/// and SIMILAR edges the ranking queries read. Also owns the schema
/// constraints.
use crate::db::GraphClient;
use crate::error::Result;
use neo4rs::query;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const DEFAULT_PROJECTION: &str = "social-graph";
pub const EMBEDDING_DIMENSION: i64 = 64;
pub const EMBEDDING_SEED: i64 = 42;
pub const SIMILARITY_CUTOFF: f64 = 0.1;
pub const SIMILARITY_TOP_K: i64 = 10;

/// (constraint name, label, unique property)
const UNIQUE_CONSTRAINTS: &[(&str, &str, &str)] = &[
    ("user_id_unique", "User", "user_id"),
    ("user_auth_id_unique", "User", "auth_id"),
    ("user_username_unique", "User", "username"),
    ("post_id_unique", "Post", "post_id"),
    ("comment_id_unique", "Comment", "comment_id"),
    ("bookmark_id_unique", "Bookmark", "bookmark_id"),
    ("collection_id_unique", "BookmarkCollection", "collection_id"),
    ("message_id_unique", "Message", "message_id"),
];

/// Cypher aggregation projecting users, posts and comments with one
/// `weight` per relationship
const PROJECTION_QUERY: &str = "
MATCH (source)
WHERE source:User OR source:Post OR source:Comment
OPTIONAL MATCH (source)-[r:FOLLOWS|POSTED|AUTHORED|LIKED|INTERACTED_WITH|DATING_ACTION|DATING_MATCH]->(target)
WHERE (target:User OR target:Post OR target:Comment)
  AND NOT (type(r) = 'DATING_ACTION' AND r.type = 'SWIPE_LEFT')
WITH gds.graph.project(
    $graph_name,
    source,
    target,
    {
        relationshipProperties: {
            weight: CASE type(r)
                WHEN 'FOLLOWS' THEN 1.0
                WHEN 'POSTED' THEN 0.8
                WHEN 'AUTHORED' THEN 0.6
                WHEN 'LIKED' THEN 0.6
                WHEN 'INTERACTED_WITH' THEN coalesce(r.completion_rate, 0.0)
                    * CASE WHEN coalesce(r.unregretted, false) THEN 1.5 ELSE 1.0 END
                WHEN 'DATING_ACTION' THEN CASE r.type
                    WHEN 'SUPER_LIKE' THEN 0.8
                    WHEN 'SWIPE_RIGHT' THEN 0.6
                    ELSE 0.0 END
                WHEN 'DATING_MATCH' THEN 1.0
                ELSE 0.0
            END
        }
    },
    {undirectedRelationshipTypes: ['*']}
) AS g
RETURN {node_count: g.nodeCount, relationship_count: g.relationshipCount} AS projection";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Projection {
    pub node_count: i64,
    pub relationship_count: i64,
}

/// Outcome of one refresh
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub graph_name: String,
    pub node_count: i64,
    pub relationship_count: i64,
    pub embeddings_written: i64,
    pub similarities_written: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Clone)]
pub struct AnalyticsService {
    graph: GraphClient,
}

impl AnalyticsService {
    pub fn new(graph: GraphClient) -> Self {
        Self { graph }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        for (name, label, property) in UNIQUE_CONSTRAINTS {
            let cypher = format!(
                "CREATE CONSTRAINT {name} IF NOT EXISTS FOR (n:{label}) REQUIRE n.{property} IS UNIQUE"
            );
            self.graph.run(query(&cypher)).await?;
            debug!(constraint = name, "Constraint ensured");
        }
        info!(count = UNIQUE_CONSTRAINTS.len(), "Schema constraints in place");
        Ok(())
    }

    /// Rebuild the projection, then rewrite embeddings and SIMILAR edges.
    /// The in-memory projection is dropped again once written back.
    pub async fn refresh(&self, graph_name: &str) -> Result<RefreshReport> {
        self.drop_projection(graph_name).await?;

        let projection: Projection = self
            .graph
            .fetch_one(
                query(PROJECTION_QUERY).param("graph_name", graph_name),
                "projection",
                "Graph projection",
            )
            .await?;
        info!(
            graph_name,
            nodes = projection.node_count,
            relationships = projection.relationship_count,
            "Graph projected"
        );

        let embeddings_written: i64 = self
            .graph
            .fetch_one(
                query(
                    "CALL gds.fastRP.write($graph_name, {
                        embeddingDimension: $dimension,
                        randomSeed: $seed,
                        relationshipWeightProperty: 'weight',
                        writeProperty: 'embedding'
                     })
                     YIELD nodePropertiesWritten
                     RETURN nodePropertiesWritten AS written",
                )
                .param("graph_name", graph_name)
                .param("dimension", EMBEDDING_DIMENSION)
                .param("seed", EMBEDDING_SEED),
                "written",
                "FastRP result",
            )
            .await?;
        debug!(graph_name, embeddings_written, "Embeddings written");

        self.graph
            .run(query("MATCH ()-[s:SIMILAR]->() DELETE s"))
            .await?;

        let similarities_written: i64 = self
            .graph
            .fetch_one(
                query(
                    "CALL gds.nodeSimilarity.write($graph_name, {
                        similarityCutoff: $cutoff,
                        topK: $top_k,
                        relationshipWeightProperty: 'weight',
                        writeRelationshipType: 'SIMILAR',
                        writeProperty: 'similarity'
                     })
                     YIELD relationshipsWritten
                     RETURN relationshipsWritten AS written",
                )
                .param("graph_name", graph_name)
                .param("cutoff", SIMILARITY_CUTOFF)
                .param("top_k", SIMILARITY_TOP_K),
                "written",
                "Node similarity result",
            )
            .await?;

        self.drop_projection(graph_name).await?;

        let report = RefreshReport {
            graph_name: graph_name.to_string(),
            node_count: projection.node_count,
            relationship_count: projection.relationship_count,
            embeddings_written,
            similarities_written,
        };
        info!(
            graph_name,
            embeddings = report.embeddings_written,
            similarities = report.similarities_written,
            "Graph analytics refreshed"
        );
        Ok(report)
    }

    async fn drop_projection(&self, graph_name: &str) -> Result<()> {
        self.graph
            .run(
                query(
                    "CALL gds.graph.drop($graph_name, false) YIELD graphName
                     RETURN graphName",
                )
                .param("graph_name", graph_name),
            )
            .await
    }

    pub async fn node_count(&self) -> Result<i64> {
        self.graph
            .fetch_one(
                query("MATCH (n) RETURN count(n) AS total"),
                "total",
                "Node count",
            )
            .await
    }

    pub async fn label_counts(&self) -> Result<Vec<LabelCount>> {
        self.graph
            .fetch_all(
                query(
                    "MATCH (n)
                     UNWIND labels(n) AS label
                     WITH label, count(*) AS count
                     RETURN {label: label, count: count} AS entry
                     ORDER BY label ASC",
                ),
                "entry",
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraints_cover_identifiers() {
        let labels: Vec<&str> = UNIQUE_CONSTRAINTS.iter().map(|(_, l, _)| *l).collect();
        for label in ["User", "Post", "Comment", "Bookmark", "BookmarkCollection", "Message"] {
            assert!(labels.contains(&label), "missing constraint for {label}");
        }
        let mut names: Vec<&str> = UNIQUE_CONSTRAINTS.iter().map(|(n, _, _)| *n).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), UNIQUE_CONSTRAINTS.len());
    }

    #[test]
    fn test_projection_weights_every_relationship() {
        for rel in [
            "FOLLOWS",
            "POSTED",
            "AUTHORED",
            "LIKED",
            "INTERACTED_WITH",
            "DATING_ACTION",
            "DATING_MATCH",
        ] {
            assert!(PROJECTION_QUERY.contains(&format!("WHEN '{rel}'")));
        }
    }
}
