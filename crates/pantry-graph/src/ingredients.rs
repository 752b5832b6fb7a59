//! The ingredient repository: validated CRUD and follow operations.
//!
//! Every operation is a single round trip to Neo4j. The repository holds no
//! locks and caches nothing; correctness under concurrent callers rests on
//! the database's transactional guarantees and the unique-name constraint.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use pantry_core::{ingredient, validate, ValidationError};

use crate::client::{GraphClient, GraphError};
use crate::cypher;

/// An immutable snapshot of a persisted ingredient node.
///
/// Snapshots are read from query responses, never assembled from local
/// state: a patch returns the refreshed snapshot of the post-write node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Every persisted property of the node, the key included.
    pub properties: BTreeMap<String, String>,
}

impl Ingredient {
    fn from_node(node: &neo4rs::Node) -> Result<Self, GraphError> {
        let name: String = node.get(ingredient::NAME).map_err(|e| {
            GraphError::Serialization(format!("Ingredient node has no name: {e}"))
        })?;

        let mut properties = BTreeMap::new();
        for spec in ingredient::fields() {
            if let Ok(value) = node.get::<String>(spec.name) {
                properties.insert(spec.name.to_string(), value);
            }
        }
        if let Ok(created) = node.get::<String>(ingredient::CREATED) {
            properties.insert(ingredient::CREATED.to_string(), created);
        }

        Ok(Self { name, properties })
    }
}

/// Every other ingredient, split by whether the subject follows it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Partition {
    pub following: Vec<Ingredient>,
    pub others: Vec<Ingredient>,
}

/// Repository for ingredient nodes, bound to an injected [`GraphClient`].
#[derive(Clone)]
pub struct IngredientStore {
    client: GraphClient,
}

impl IngredientStore {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create an ingredient from caller input and return its snapshot.
    ///
    /// All declared fields are required. Uniqueness of the name rests on the
    /// database constraint: a losing race surfaces as [`GraphError::Conflict`],
    /// never as an application-side pre-check.
    pub async fn create(&self, props: &HashMap<String, String>) -> Result<Ingredient, GraphError> {
        let mut fields = validate(ingredient::fields(), props, true)?;
        let name = match fields.get(ingredient::NAME) {
            Some(name) => name.clone(),
            None => {
                return Err(ValidationError::new("The name field is required.").into());
            }
        };
        fields.insert(ingredient::CREATED, Utc::now().to_rfc3339());

        let row = match self.client.query_one(cypher::create(&fields).into_query()).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                return Err(GraphError::Serialization(
                    "Create returned no row".to_string(),
                ))
            }
            Err(e) if e.is_unique_violation() => return Err(GraphError::Conflict { name }),
            Err(e) => return Err(e),
        };

        let created = Ingredient::from_node(&get_node(&row, "i")?)?;
        tracing::debug!(name = %created.name, "Created ingredient");
        Ok(created)
    }

    /// Fetch one ingredient by name.
    pub async fn get(&self, name: &str) -> Result<Ingredient, GraphError> {
        match self.client.query_one(cypher::get(name).into_query()).await? {
            Some(row) => Ingredient::from_node(&get_node(&row, "i")?),
            None => Err(GraphError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Fetch all ingredients. An empty store yields an empty vector.
    pub async fn get_all(&self) -> Result<Vec<Ingredient>, GraphError> {
        let rows = self.client.query_rows(cypher::all().into_query()).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(Ingredient::from_node(&get_node(&row, "i")?)?);
        }
        Ok(results)
    }

    /// Apply a partial update and return the refreshed snapshot.
    ///
    /// Only supplied fields are validated and written; an empty bag is a
    /// successful no-op. The snapshot comes from the post-write node, so a
    /// patch that matches nothing means the node vanished between the
    /// caller's read and this write: that surfaces as `NotFound` and is not
    /// retried. Renaming onto a taken name surfaces as `Conflict`.
    pub async fn patch(
        &self,
        name: &str,
        props: &HashMap<String, String>,
    ) -> Result<Ingredient, GraphError> {
        let fields = validate(ingredient::fields(), props, false)?;

        let row = match self
            .client
            .query_one(cypher::patch(name, &fields).into_query())
            .await
        {
            Ok(Some(row)) => row,
            Ok(None) => {
                return Err(GraphError::NotFound {
                    name: name.to_string(),
                })
            }
            Err(e) if e.is_unique_violation() => {
                let taken = fields
                    .get(ingredient::NAME)
                    .cloned()
                    .unwrap_or_else(|| name.to_string());
                return Err(GraphError::Conflict { name: taken });
            }
            Err(e) => return Err(e),
        };

        Ingredient::from_node(&get_node(&row, "i")?)
    }

    /// Delete an ingredient together with all of its follow edges, incoming
    /// and outgoing, in one query. Deleting an absent name is `NotFound`.
    /// The cascade covers only follow edges: a node carrying any other
    /// relationship type makes the whole delete fail with a database error.
    pub async fn delete(&self, name: &str) -> Result<(), GraphError> {
        match self.client.query_one(cypher::delete(name).into_query()).await? {
            Some(row) => {
                let deleted = row.get::<i64>("deleted").unwrap_or(0);
                if deleted == 0 {
                    return Err(GraphError::NotFound {
                        name: name.to_string(),
                    });
                }
                tracing::debug!(name, "Deleted ingredient and its follow edges");
                Ok(())
            }
            None => Err(GraphError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Record that `follower` follows `followed`.
    ///
    /// Idempotent: re-following is a no-op (MERGE). A missing endpoint is a
    /// silent no-op; a self-follow is rejected.
    pub async fn follow(&self, follower: &str, followed: &str) -> Result<(), GraphError> {
        ensure_distinct(follower, followed)?;
        self.client
            .run(cypher::follow(follower, followed).into_query())
            .await
    }

    /// Remove the follow edge from `follower` to `followed`.
    ///
    /// Unfollowing a pair with no edge succeeds silently.
    pub async fn unfollow(&self, follower: &str, followed: &str) -> Result<(), GraphError> {
        ensure_distinct(follower, followed)?;
        self.client
            .run(cypher::unfollow(follower, followed).into_query())
            .await
    }

    /// Partition every other ingredient by whether the subject follows it,
    /// in a single query. The subject appears on neither side. A missing
    /// subject is `NotFound`.
    pub async fn following_and_others(&self, name: &str) -> Result<Partition, GraphError> {
        let rows = self
            .client
            .query_rows(cypher::following_and_others(name).into_query())
            .await?;
        if rows.is_empty() {
            return Err(GraphError::NotFound {
                name: name.to_string(),
            });
        }

        let mut partition = Partition::default();
        for row in rows {
            // A null `other` means the subject exists but has no peers.
            let Ok(node) = row.get::<neo4rs::Node>("other") else {
                continue;
            };
            let other = Ingredient::from_node(&node)?;
            let follows = row.get::<i64>("follows").unwrap_or(0);
            if follows > 0 {
                partition.following.push(other);
            } else {
                partition.others.push(other);
            }
        }
        Ok(partition)
    }
}

fn ensure_distinct(follower: &str, followed: &str) -> Result<(), GraphError> {
    if follower == followed {
        return Err(ValidationError::new("An ingredient cannot follow itself.").into());
    }
    Ok(())
}

fn get_node(row: &neo4rs::Row, column: &str) -> Result<neo4rs::Node, GraphError> {
    row.get(column)
        .map_err(|e| GraphError::Serialization(format!("Failed to deserialize node: {e}")))
}
