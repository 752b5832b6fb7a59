//! Neo4j connection management and the shared graph client.

use neo4rs::{ConfigBuilder, Graph, Query};

use pantry_core::ValidationError;

/// Server code Neo4j reports when a write violates a uniqueness constraint.
const CONSTRAINT_VIOLATION: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

/// Errors from graph operations.
///
/// A closed enum: callers branch on the recoverable kinds (`Validation`,
/// `NotFound`, `Conflict`) and treat the rest as fatal. No kind is ever
/// retried inside this crate.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    /// Caller-input problem; the message is user-facing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No ingredient with the requested name exists.
    #[error("No ingredient named {name}")]
    NotFound { name: String },

    /// The unique-name constraint rejected a write.
    #[error("The name {name} is taken.")]
    Conflict { name: String },

    /// Any other database failure, passed through unmodified.
    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GraphError {
    /// True when the database rejected a write because the unique-name
    /// constraint already holds a node with the submitted key. The caller
    /// that knows the key turns this into [`GraphError::Conflict`].
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, GraphError::Query(neo4rs::Error::Neo4j(e)) if e.code() == CONSTRAINT_VIOLATION)
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "pantry-dev".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Thread-safe Neo4j client with connection pooling.
///
/// The single point of database access for the ingredient graph. Created
/// once at startup and injected into the repository; there is no global
/// connection state. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }
}
