//! Schema bootstrap: the uniqueness constraint on the ingredient key.

use neo4rs::query;

use crate::client::{GraphClient, GraphError};

/// Name of the uniqueness constraint on `Ingredient.name`.
pub const INGREDIENT_NAME_CONSTRAINT: &str = "ingredient_name";

/// Ensure the uniqueness constraint on `Ingredient.name` exists.
///
/// Returns whether the constraint was newly created (`true`) or already
/// present (`false`). This must complete before the process serves any
/// operation: global uniqueness under concurrent creates rests entirely on
/// this constraint, so callers treat any error here as fatal to startup.
pub async fn ensure_schema(client: &GraphClient) -> Result<bool, GraphError> {
    let rows = client
        .query_rows(query("SHOW CONSTRAINTS YIELD name RETURN name"))
        .await?;
    let existed = rows.iter().any(|row| {
        row.get::<String>("name")
            .map(|n| n == INGREDIENT_NAME_CONSTRAINT)
            .unwrap_or(false)
    });

    client
        .run(query(
            "CREATE CONSTRAINT ingredient_name IF NOT EXISTS \
             FOR (i:Ingredient) REQUIRE i.name IS UNIQUE",
        ))
        .await?;

    if existed {
        tracing::debug!(
            constraint = INGREDIENT_NAME_CONSTRAINT,
            "Uniqueness constraint already present"
        );
    } else {
        tracing::info!(
            constraint = INGREDIENT_NAME_CONSTRAINT,
            "Uniqueness constraint created"
        );
    }

    Ok(!existed)
}
