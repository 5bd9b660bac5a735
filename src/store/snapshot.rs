//! Graph snapshot identity.
//!
//! A `GraphSnapshot` fingerprints the content of a built graph so that
//! results computed against it can name the exact graph they came from.

use serde::{Deserialize, Serialize};

use crate::canonical::{canonical_hash_hex, to_canonical_bytes};
use crate::SCHEMA_GRAPH_VERSION;

use super::GraphStore;

/// A deterministic fingerprint of the graph content.
///
/// Independent of insertion order: node ids and edge tuples are sorted
/// before hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Unique identifier for this snapshot (xxh64 of all components).
    pub snapshot_id: String,
    /// Total number of nodes.
    pub node_count: u64,
    /// Total number of edges.
    pub edge_count: u64,
    /// Schema version of the kernel types.
    pub schema_version: String,
    /// Hash of sorted node ids.
    pub node_id_hash: String,
    /// Hash of sorted `(from, to, type, location_path)` tuples.
    pub edge_hash: String,
}

/// Internal struct for computing snapshot_id hash.
#[derive(Serialize)]
struct SnapshotIdInput<'a> {
    node_count: u64,
    edge_count: u64,
    schema_version: &'a str,
    node_id_hash: &'a str,
    edge_hash: &'a str,
}

impl GraphSnapshot {
    /// Compute the snapshot of a store.
    pub fn compute(store: &GraphStore) -> Self {
        let mut node_ids: Vec<String> = store
            .all_nodes()
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        node_ids.sort_unstable();
        let node_id_hash = canonical_hash_hex(&node_ids);

        let mut edge_tuples: Vec<(String, String, &'static str, &str)> = store
            .all_edges()
            .iter()
            .map(|e| {
                (
                    e.from_id().to_string(),
                    e.to_id().to_string(),
                    e.edge_type().as_str(),
                    e.location_path.as_str(),
                )
            })
            .collect();
        edge_tuples.sort_unstable();
        let edge_hash = canonical_hash_hex(&edge_tuples);

        let node_count = store.num_nodes() as u64;
        let edge_count = store.num_edges() as u64;
        let snapshot_id = canonical_hash_hex(&SnapshotIdInput {
            node_count,
            edge_count,
            schema_version: SCHEMA_GRAPH_VERSION,
            node_id_hash: &node_id_hash,
            edge_hash: &edge_hash,
        });

        Self {
            snapshot_id,
            node_count,
            edge_count,
            schema_version: SCHEMA_GRAPH_VERSION.to_string(),
            node_id_hash,
            edge_hash,
        }
    }

    /// Serialize to canonical JSON bytes.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        to_canonical_bytes(self)
    }

    /// Check that this snapshot still describes `store`.
    pub fn verify(&self, store: &GraphStore) -> bool {
        Self::compute(store).snapshot_id == self.snapshot_id
    }
}

impl GraphStore {
    /// Fingerprint the current content of the store.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::compute(self)
    }
}
