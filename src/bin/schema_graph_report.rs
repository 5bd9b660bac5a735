//! Schema Graph Report Binary
//!
//! Loads a graph document (`{"nodes": [...], "edges": [...]}`) and prints
//! analysis results as JSON on stdout. Logs go to stderr.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//! - `RIPPLE_MAX_DEPTH`: Default ripple depth limit when `--max-depth` is not given (default: 10)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin schema_graph_report --features cli -- graph.json ripple field_12
//! cargo run --bin schema_graph_report --features cli -- graph.json cycles --edge-type derivesFrom
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use schema_graph_kernel::{
    build_field_ripple, build_object_ripple, compute_complexity, compute_object_complexity_rollup,
    rank_fields, ComplexityConfig, EdgeType, EdgeTypeSet, GraphDocument, GraphStore, NodeKind,
    NodeRef, Orientation, RippleOptions, DEFAULT_MAX_DEPTH,
};

#[derive(Debug, Parser)]
#[command(name = "schema_graph_report", version, about = "Analyse a schema dependency graph")]
struct Cli {
    /// Graph document (JSON).
    graph: PathBuf,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Entities affected by a change to a field.
    Ripple {
        /// Field key.
        field: String,
        #[command(flatten)]
        edges: RippleArgs,
    },
    /// Entities affected by a change to any field of an object.
    ObjectRipple {
        /// Object key.
        object: String,
        #[command(flatten)]
        edges: RippleArgs,
    },
    /// Complexity score with breakdown for one node.
    Complexity {
        /// Node kind.
        #[arg(value_parser = parse_node_kind)]
        kind: NodeKind,
        /// Node key.
        key: String,
    },
    /// Flat sum of field complexity for one object.
    Rollup {
        /// Object key.
        object: String,
    },
    /// Highest-complexity fields.
    Rank {
        /// Number of fields to list.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Strongly connected components of size > 1 (or with a self-loop).
    Cycles {
        /// Edge types to consider (repeatable).
        #[arg(long = "edge-type", value_parser = parse_edge_type, default_value = "derivesFrom")]
        edge_types: Vec<EdgeType>,
    },
    /// Topological depth layers.
    Layers {
        /// Edge types to consider (repeatable).
        #[arg(long = "edge-type", value_parser = parse_edge_type, default_value = "derivesFrom")]
        edge_types: Vec<EdgeType>,
        /// Put base inputs at depth 0.
        #[arg(long)]
        dependencies_first: bool,
    },
    /// Content fingerprint of the graph.
    Snapshot,
}

#[derive(Debug, clap::Args)]
struct RippleArgs {
    /// Hop limit.
    #[arg(long, env = "RIPPLE_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,
    /// Allow-list of edge types (repeatable).
    #[arg(long = "include", value_parser = parse_edge_type)]
    include: Vec<EdgeType>,
    /// Extra excluded edge types (repeatable).
    #[arg(long = "exclude", value_parser = parse_edge_type)]
    exclude: Vec<EdgeType>,
}

impl RippleArgs {
    fn options(&self) -> RippleOptions {
        RippleOptions {
            include_edge_types: EdgeTypeSet::of(&self.include),
            exclude_edge_types: EdgeTypeSet::of(&self.exclude),
            max_depth: self.max_depth,
        }
    }
}

fn parse_edge_type(s: &str) -> Result<EdgeType, String> {
    EdgeType::parse(s).ok_or_else(|| format!("unknown edge type: {s}"))
}

fn parse_node_kind(s: &str) -> Result<NodeKind, String> {
    NodeKind::parse(s).ok_or_else(|| format!("unknown node kind: {s}"))
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "schema_graph_report=info,schema_graph_kernel=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .flatten_event(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

fn load(path: &PathBuf) -> Result<GraphStore, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let doc = GraphDocument::from_reader(BufReader::new(file))?;
    let store = GraphStore::from_document(doc);
    info!(
        path = %path.display(),
        nodes = store.num_nodes(),
        edges = store.num_edges(),
        "graph loaded"
    );
    Ok(store)
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<(), Box<dyn std::error::Error>> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let graph = load(&cli.graph)?;
    let config = ComplexityConfig::default();

    match &cli.command {
        Command::Ripple { field, edges } => {
            emit(&build_field_ripple(&graph, field, &edges.options()), cli.pretty)
        }
        Command::ObjectRipple { object, edges } => {
            emit(&build_object_ripple(&graph, object, &edges.options()), cli.pretty)
        }
        Command::Complexity { kind, key } => {
            let node = NodeRef::new(*kind, key.clone());
            emit(&compute_complexity(&graph, &node, &config), cli.pretty)
        }
        Command::Rollup { object } => {
            emit(&compute_object_complexity_rollup(&graph, object, &config), cli.pretty)
        }
        Command::Rank { limit } => emit(&rank_fields(&graph, &config, *limit), cli.pretty),
        Command::Cycles { edge_types } => {
            let cycles = graph.cyclic_components(edge_types);
            if !cycles.is_empty() {
                info!(count = cycles.len(), "cyclic components found");
            }
            emit(&cycles, cli.pretty)
        }
        Command::Layers { edge_types, dependencies_first } => {
            let orientation = if *dependencies_first {
                Orientation::DependenciesFirst
            } else {
                Orientation::AsStored
            };
            let layers = graph.depth_layers(edge_types, orientation)?;
            emit(&layers, cli.pretty)
        }
        Command::Snapshot => emit(&graph.snapshot(), cli.pretty),
    }
}
