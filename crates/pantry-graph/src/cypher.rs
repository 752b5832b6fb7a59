//! Parameterized Cypher statements for every ingredient operation.
//!
//! Builders are pure: they produce a [`Statement`] (query text plus named
//! parameters) and never interpolate caller values into the text. The only
//! interpolated identifiers are the label, the relationship type, and field
//! names from the closed schema.

use std::collections::BTreeMap;

use pantry_core::ingredient::{FOLLOWS, LABEL, NAME};

/// A Cypher query with its named parameters, not yet bound to a connection.
#[derive(Debug, Clone)]
pub struct Statement {
    pub cypher: String,
    pub params: Vec<(String, String)>,
}

impl Statement {
    /// Bind the parameters and produce a driver query.
    pub fn into_query(self) -> neo4rs::Query {
        let Statement { cypher, params } = self;
        params
            .into_iter()
            .fold(neo4rs::query(&cypher), |q, (key, value)| q.param(&key, value))
    }
}

/// Create one node with the given (already validated) properties, return it.
pub fn create(props: &BTreeMap<&'static str, String>) -> Statement {
    let fields = props
        .keys()
        .map(|k| format!("{k}: ${k}"))
        .collect::<Vec<_>>()
        .join(", ");

    Statement {
        cypher: format!("CREATE (i:{LABEL} {{{fields}}}) RETURN i"),
        params: props
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    }
}

/// Match one node by key, return it.
pub fn get(name: &str) -> Statement {
    Statement {
        cypher: format!("MATCH (i:{LABEL} {{{NAME}: $name}}) RETURN i"),
        params: vec![("name".to_string(), name.to_string())],
    }
}

/// Match all ingredient nodes.
pub fn all() -> Statement {
    Statement {
        cypher: format!("MATCH (i:{LABEL}) RETURN i ORDER BY i.{NAME}"),
        params: Vec::new(),
    }
}

/// Match by key and merge-apply the supplied fields, returning the updated
/// node. Set-parameters are prefixed so a rename cannot collide with the
/// `$name` key parameter. An empty field map produces a plain read.
pub fn patch(name: &str, props: &BTreeMap<&'static str, String>) -> Statement {
    let mut params = vec![("name".to_string(), name.to_string())];
    let mut cypher = format!("MATCH (i:{LABEL} {{{NAME}: $name}})");

    if !props.is_empty() {
        let assignments = props
            .keys()
            .map(|k| format!("i.{k} = $set_{k}"))
            .collect::<Vec<_>>()
            .join(", ");
        cypher.push_str(&format!(" SET {assignments}"));
        params.extend(props.iter().map(|(k, v)| (format!("set_{k}"), v.clone())));
    }

    cypher.push_str(" RETURN i");
    Statement { cypher, params }
}

/// Match by key, delete the node together with its follow edges in either
/// direction, and report how many nodes matched. The cascade is scoped to
/// the follow relationship: a node carrying any other relationship type
/// makes the delete fail at the database.
pub fn delete(name: &str) -> Statement {
    Statement {
        cypher: format!(
            "MATCH (i:{LABEL} {{{NAME}: $name}}) \
             OPTIONAL MATCH (i)-[f:{FOLLOWS}]-() \
             DELETE f, i \
             RETURN count(DISTINCT i) AS deleted"
        ),
        params: vec![("name".to_string(), name.to_string())],
    }
}

/// Merge-create the follow edge (idempotent). A missing endpoint yields no
/// match and the merge never runs.
pub fn follow(follower: &str, followed: &str) -> Statement {
    Statement {
        cypher: format!(
            "MATCH (a:{LABEL} {{{NAME}: $follower}}) \
             MATCH (b:{LABEL} {{{NAME}: $followed}}) \
             MERGE (a)-[:{FOLLOWS}]->(b)"
        ),
        params: vec![
            ("follower".to_string(), follower.to_string()),
            ("followed".to_string(), followed.to_string()),
        ],
    }
}

/// Match the existing follow edge and delete it (no-op if absent).
pub fn unfollow(follower: &str, followed: &str) -> Statement {
    Statement {
        cypher: format!(
            "MATCH (a:{LABEL} {{{NAME}: $follower}})-[f:{FOLLOWS}]->\
             (b:{LABEL} {{{NAME}: $followed}}) \
             DELETE f"
        ),
        params: vec![
            ("follower".to_string(), follower.to_string()),
            ("followed".to_string(), followed.to_string()),
        ],
    }
}

/// Match the subject, then every other ingredient, and report each one with
/// a 0/1 count of the follow edge from the subject. One round trip for the
/// whole partition instead of one existence check per candidate. A missing
/// subject yields no rows; a subject with no peers yields a single row with
/// a null `other`.
pub fn following_and_others(name: &str) -> Statement {
    Statement {
        cypher: format!(
            "MATCH (i:{LABEL} {{{NAME}: $name}}) \
             OPTIONAL MATCH (other:{LABEL}) WHERE other.{NAME} <> $name \
             OPTIONAL MATCH (i)-[f:{FOLLOWS}]->(other) \
             RETURN other, count(f) AS follows \
             ORDER BY other.{NAME}"
        ),
        params: vec![("name".to_string(), name.to_string())],
    }
}
