//! Integration tests for pantry-graph against a live Neo4j instance.
//!
//! These tests require `docker compose up` to be running.
//! Run with: cargo test --package pantry-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available. Each test works on
//! uniquely named ingredients and cleans them up afterward.

use std::collections::HashMap;

use pantry_graph::schema;
use pantry_graph::{GraphClient, GraphConfig, GraphError, IngredientStore};
use uuid::Uuid;

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    let client = match GraphClient::connect(&config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            return None;
        }
    };
    match schema::ensure_schema(&client).await {
        Ok(_) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test (schema bootstrap failed): {e}");
            None
        }
    }
}

/// A pattern-valid name that fits the 16-char bound and will not collide
/// with anything another test created.
fn unique_name(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..8])
}

fn bag(name: &str) -> HashMap<String, String> {
    HashMap::from([("name".to_string(), name.to_string())])
}

async fn cleanup(client: &GraphClient, names: &[&str]) {
    for name in names {
        let q = neo4rs::query("MATCH (i:Ingredient {name: $name}) DETACH DELETE i")
            .param("name", name.to_string());
        let _ = client.run(q).await;
    }
}

async fn count_with_name(client: &GraphClient, name: &str) -> i64 {
    let q = neo4rs::query("MATCH (i:Ingredient {name: $name}) RETURN count(i) AS cnt")
        .param("name", name.to_string());
    match client.query_one(q).await.unwrap() {
        Some(row) => row.get::<i64>("cnt").unwrap_or(0),
        None => 0,
    }
}

async fn count_follow_edges(client: &GraphClient, follower: &str, followed: &str) -> i64 {
    let q = neo4rs::query(
        "MATCH (:Ingredient {name: $follower})-[f:FOLLOWS]->(:Ingredient {name: $followed}) \
         RETURN count(f) AS cnt",
    )
    .param("follower", follower.to_string())
    .param("followed", followed.to_string());
    match client.query_one(q).await.unwrap() {
        Some(row) => row.get::<i64>("cnt").unwrap_or(0),
        None => 0,
    }
}

#[tokio::test]
#[ignore = "requires live Neo4j — run with: cargo test --package pantry-graph --test integration -- --ignored"]
async fn create_then_get_round_trip() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let name = unique_name("flour");

    let created = store.create(&bag(&name)).await.unwrap();
    assert_eq!(created.name, name);

    let fetched = store.get(&name).await.unwrap();
    assert_eq!(fetched.name, name);
    assert_eq!(
        fetched.properties.get("name").map(String::as_str),
        Some(name.as_str())
    );
    assert!(fetched.properties.contains_key("created"));

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn duplicate_create_conflicts_and_leaves_one_node() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let name = unique_name("salt");

    store.create(&bag(&name)).await.unwrap();
    let err = store.create(&bag(&name)).await.unwrap_err();
    assert!(matches!(err, GraphError::Conflict { name: ref n } if *n == name));

    assert_eq!(count_with_name(&client, &name).await, 1);

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn create_rejects_invalid_input() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());

    for bad in ["", "f", "sea salt", "a_17_char_name___"] {
        let err = store.create(&bag(bad)).await.unwrap_err();
        assert!(matches!(err, GraphError::Validation(_)), "{bad:?}");
    }
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn get_missing_is_not_found() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client);
    let name = unique_name("ghost");

    let err = store.get(&name).await.unwrap_err();
    assert!(matches!(err, GraphError::NotFound { name: ref n } if *n == name));
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn patch_with_empty_bag_is_a_noop() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let name = unique_name("rye");

    let created = store.create(&bag(&name)).await.unwrap();
    let patched = store.patch(&name, &HashMap::new()).await.unwrap();
    assert_eq!(patched, created);

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn patch_with_invalid_name_does_not_mutate() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let name = unique_name("oat");

    store.create(&bag(&name)).await.unwrap();
    let err = store.patch(&name, &bag("sea salt")).await.unwrap_err();
    assert!(matches!(err, GraphError::Validation(_)));

    // Stored entity unchanged.
    let fetched = store.get(&name).await.unwrap();
    assert_eq!(fetched.name, name);

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn patch_renames_and_refreshes_the_snapshot() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let old = unique_name("spelt");
    let new = unique_name("emmer");

    store.create(&bag(&old)).await.unwrap();
    let patched = store.patch(&old, &bag(&new)).await.unwrap();
    assert_eq!(patched.name, new);

    assert!(matches!(
        store.get(&old).await.unwrap_err(),
        GraphError::NotFound { .. }
    ));
    assert_eq!(store.get(&new).await.unwrap().name, new);

    cleanup(&client, &[&old, &new]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn patch_rename_onto_taken_name_conflicts() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let a = unique_name("miso");
    let b = unique_name("dashi");

    store.create(&bag(&a)).await.unwrap();
    store.create(&bag(&b)).await.unwrap();

    let err = store.patch(&a, &bag(&b)).await.unwrap_err();
    assert!(matches!(err, GraphError::Conflict { name: ref n } if *n == b));

    cleanup(&client, &[&a, &b]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn patch_on_vanished_node_is_not_found() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client);
    let name = unique_name("gone");

    let err = store.patch(&name, &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, GraphError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn follow_twice_leaves_exactly_one_edge() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let a = unique_name("bread");
    let b = unique_name("yeast");

    store.create(&bag(&a)).await.unwrap();
    store.create(&bag(&b)).await.unwrap();

    store.follow(&a, &b).await.unwrap();
    store.follow(&a, &b).await.unwrap();
    assert_eq!(count_follow_edges(&client, &a, &b).await, 1);

    cleanup(&client, &[&a, &b]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn unfollow_without_edge_is_silent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let a = unique_name("stock");
    let b = unique_name("bone");

    store.create(&bag(&a)).await.unwrap();
    store.create(&bag(&b)).await.unwrap();

    store.unfollow(&a, &b).await.unwrap();

    // And a real edge comes off cleanly.
    store.follow(&a, &b).await.unwrap();
    store.unfollow(&a, &b).await.unwrap();
    assert_eq!(count_follow_edges(&client, &a, &b).await, 0);

    cleanup(&client, &[&a, &b]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn self_follow_is_rejected() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let name = unique_name("ouro");

    store.create(&bag(&name)).await.unwrap();
    let err = store.follow(&name, &name).await.unwrap_err();
    assert!(matches!(err, GraphError::Validation(_)));
    assert_eq!(count_follow_edges(&client, &name, &name).await, 0);

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn partition_splits_followed_from_others() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let a = unique_name("roux");
    let b = unique_name("fat");
    let c = unique_name("whea");
    let d = unique_name("milk");

    for name in [&a, &b, &c, &d] {
        store.create(&bag(name)).await.unwrap();
    }
    store.follow(&a, &b).await.unwrap();
    store.follow(&a, &c).await.unwrap();

    let partition = store.following_and_others(&a).await.unwrap();
    let following: Vec<&str> = partition.following.iter().map(|i| i.name.as_str()).collect();
    let others: Vec<&str> = partition.others.iter().map(|i| i.name.as_str()).collect();

    assert!(following.contains(&b.as_str()));
    assert!(following.contains(&c.as_str()));
    assert!(!following.contains(&d.as_str()));
    assert!(others.contains(&d.as_str()));

    // The subject appears on neither side.
    assert!(!following.contains(&a.as_str()));
    assert!(!others.contains(&a.as_str()));

    cleanup(&client, &[&a, &b, &c, &d]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn partition_for_missing_subject_is_not_found() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client);
    let name = unique_name("none");

    let err = store.following_and_others(&name).await.unwrap_err();
    assert!(matches!(err, GraphError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn delete_removes_node_and_both_edge_directions() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let a = unique_name("brine");
    let b = unique_name("kraut");

    store.create(&bag(&a)).await.unwrap();
    store.create(&bag(&b)).await.unwrap();
    store.follow(&a, &b).await.unwrap();
    store.follow(&b, &a).await.unwrap();

    store.delete(&a).await.unwrap();

    assert!(matches!(
        store.get(&a).await.unwrap_err(),
        GraphError::NotFound { .. }
    ));
    // No dangling edges reference the deleted node from either side.
    assert_eq!(count_follow_edges(&client, &a, &b).await, 0);
    assert_eq!(count_follow_edges(&client, &b, &a).await, 0);
    // The peer survives.
    assert_eq!(store.get(&b).await.unwrap().name, b);

    cleanup(&client, &[&b]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn delete_of_absent_name_is_not_found() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client);
    let name = unique_name("void");

    let err = store.delete(&name).await.unwrap_err();
    assert!(matches!(err, GraphError::NotFound { name: ref n } if *n == name));
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn schema_bootstrap_reports_existing_constraint() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    // connect_or_skip already ensured the schema once.
    let newly_created = schema::ensure_schema(&client).await.unwrap();
    assert!(!newly_created);
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn get_all_includes_created_ingredients() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let store = IngredientStore::new(client.clone());
    let name = unique_name("herb");

    store.create(&bag(&name)).await.unwrap();
    let all = store.get_all().await.unwrap();
    assert!(all.iter().any(|i| i.name == name));

    cleanup(&client, &[&name]).await;
}
