//! pantry-graph: Neo4j persistence for the ingredient social graph.
//!
//! All graph reads and writes flow through this crate: parameterized Cypher
//! construction, driver access, constraint-violation translation, and the
//! ingredient repository itself.

pub mod client;
pub mod cypher;
pub mod ingredients;
pub mod schema;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use ingredients::{Ingredient, IngredientStore, Partition};
