//! CLI entry point for the Pantry ingredient graph.
//!
//! Thin glue only: wires configuration, logging, the Neo4j connection, and
//! the blocking schema bootstrap, then dispatches to the repository.

use std::collections::HashMap;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use pantry_graph::{schema, GraphClient, GraphConfig, IngredientStore};

#[derive(Parser)]
#[command(name = "pantry")]
#[command(about = "Manage ingredients and their follow graph")]
struct Cli {
    /// Config file prefix (default: pantry).
    #[arg(short, long, default_value = "pantry")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an ingredient.
    Create { name: String },

    /// Show one ingredient.
    Get { name: String },

    /// List all ingredients.
    List,

    /// Apply a partial update, e.g. `pantry patch flour name=rye_flour`.
    Patch {
        name: String,
        /// Fields to set, as key=value pairs.
        props: Vec<String>,
    },

    /// Delete an ingredient and all of its follow edges.
    Delete { name: String },

    /// Make one ingredient follow another.
    Follow { follower: String, followed: String },

    /// Remove a follow edge.
    Unfollow { follower: String, followed: String },

    /// Show which ingredients one follows, and which it does not.
    Following { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();

    let graph_config = load_graph_config(&cli.config);
    let client = GraphClient::connect(&graph_config).await?;

    // Readiness gates on the uniqueness constraint: a bootstrap failure
    // aborts the process before any operation runs.
    schema::ensure_schema(&client).await?;

    let store = IngredientStore::new(client);

    match cli.command {
        Command::Create { name } => {
            let created = store.create(&single_prop("name", &name)).await?;
            print_json(&created)?;
        }
        Command::Get { name } => {
            let ingredient = store.get(&name).await?;
            print_json(&ingredient)?;
        }
        Command::List => {
            let all = store.get_all().await?;
            print_json(&all)?;
        }
        Command::Patch { name, props } => {
            let patched = store.patch(&name, &parse_props(&props)?).await?;
            print_json(&patched)?;
        }
        Command::Delete { name } => {
            store.delete(&name).await?;
            println!("Deleted {name}");
        }
        Command::Follow { follower, followed } => {
            store.follow(&follower, &followed).await?;
            println!("{follower} now follows {followed}");
        }
        Command::Unfollow { follower, followed } => {
            store.unfollow(&follower, &followed).await?;
            println!("{follower} no longer follows {followed}");
        }
        Command::Following { name } => {
            let partition = store.following_and_others(&name).await?;
            print_json(&partition)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn single_prop(key: &str, value: &str) -> HashMap<String, String> {
    HashMap::from([(key.to_string(), value.to_string())])
}

/// Parse `key=value` arguments into a property bag.
fn parse_props(pairs: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut props = HashMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("Invalid property {pair:?}: expected key=value");
        };
        props.insert(key.to_string(), value.to_string());
    }
    Ok(props)
}

fn load_graph_config(file_prefix: &str) -> GraphConfig {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(
            config::Environment::with_prefix("PANTRY")
                .separator("__")
                .try_parsing(true),
        )
        .build();

    match cfg {
        Ok(c) => GraphConfig {
            uri: c
                .get_string("neo4j.uri")
                .unwrap_or_else(|_| "bolt://localhost:7687".to_string()),
            user: c
                .get_string("neo4j.user")
                .unwrap_or_else(|_| "neo4j".to_string()),
            password: c
                .get_string("neo4j.password")
                .unwrap_or_else(|_| "pantry-dev".to_string()),
            ..Default::default()
        },
        Err(_) => GraphConfig::default(),
    }
}
