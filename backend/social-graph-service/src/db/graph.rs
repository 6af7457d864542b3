use crate::error::{AppError, Result};
use anyhow::Context;
use neo4rs::{query, BoltNull, BoltType, Graph, Query, Row};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Shared Neo4j connection. Every call runs as its own auto-commit
/// transaction, so a single Cypher statement is applied atomically.
#[derive(Clone)]
pub struct GraphClient {
    graph: Arc<Graph>,
}

impl GraphClient {
    pub fn connect(uri: &str, user: &str, password: &str) -> anyhow::Result<Self> {
        let graph = Graph::new(uri, user, password).context("Failed to connect to Neo4j")?;

        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    pub fn from_graph(graph: Arc<Graph>) -> Self {
        Self { graph }
    }

    /// Health check - verify Neo4j connection
    pub async fn health_check(&self) -> Result<bool> {
        let mut result = self.graph.execute(query("RETURN 1 AS health")).await?;

        if let Some(row) = result.next().await? {
            let health: i64 = row.get("health").unwrap_or(0);
            Ok(health == 1)
        } else {
            Ok(false)
        }
    }

    /// Execute a write and drain the result stream
    pub async fn run(&self, q: Query) -> Result<()> {
        let mut result = self.graph.execute(q).await?;
        while result.next().await?.is_some() {}
        Ok(())
    }

    /// Collect every row of the result
    pub async fn rows(&self, q: Query) -> Result<Vec<Row>> {
        let mut result = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = result.next().await? {
            rows.push(row);
        }
        debug!("Graph query returned {} rows", rows.len());
        Ok(rows)
    }

    /// First row of the result, remaining rows are drained
    pub async fn first_row(&self, q: Query) -> Result<Option<Row>> {
        let mut result = self.graph.execute(q).await?;
        let first = result.next().await?;
        while result.next().await?.is_some() {}
        Ok(first)
    }

    /// Deserialize one column of every row
    pub async fn fetch_all<T: DeserializeOwned>(&self, q: Query, column: &str) -> Result<Vec<T>> {
        self.rows(q)
            .await?
            .iter()
            .map(|row| row.get::<T>(column).map_err(AppError::from))
            .collect()
    }

    /// Deserialize one column of the first row, if any
    pub async fn fetch_optional<T: DeserializeOwned>(
        &self,
        q: Query,
        column: &str,
    ) -> Result<Option<T>> {
        match self.first_row(q).await? {
            Some(row) => Ok(Some(row.get::<T>(column)?)),
            None => Ok(None),
        }
    }

    /// Like [`fetch_optional`](Self::fetch_optional) but a missing row is a 404
    pub async fn fetch_one<T: DeserializeOwned>(
        &self,
        q: Query,
        column: &str,
        what: &str,
    ) -> Result<T> {
        self.fetch_optional(q, column)
            .await?
            .ok_or_else(|| AppError::not_found(what.to_string()))
    }

    pub fn inner(&self) -> Arc<Graph> {
        self.graph.clone()
    }
}

/// Bolt value for an optional parameter, `None` becomes `null`
pub fn nullable<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    match value {
        Some(v) => v.into(),
        None => BoltType::Null(BoltNull),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullable_maps_none_to_null() {
        assert!(matches!(nullable::<String>(None), BoltType::Null(_)));
        assert!(matches!(
            nullable(Some("bio".to_string())),
            BoltType::String(_)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires Neo4j instance
    async fn test_health_check() {
        let client = GraphClient::connect("bolt://localhost:7687", "neo4j", "password")
            .expect("Failed to connect");
        assert!(client.health_check().await.unwrap());
    }
}
