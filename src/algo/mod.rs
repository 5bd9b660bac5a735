//! Graph algorithms over edge-type restricted projections of the store.
//!
//! Every algorithm here first projects the store onto a `petgraph` digraph
//! holding *all* store nodes (same positions as insertion order) and only the
//! edges whose type was requested. Topological order lists nodes without a
//! requested edge as depth-0 sources; components leave them out.

pub mod scc;
pub mod topo;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::policy::EdgeTypeSet;
use crate::store::GraphStore;
use crate::types::{EdgeType, NodeId};

pub use topo::{DepthLayers, Orientation};

/// Error type for graph algorithms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphAlgoError {
    /// The restricted subgraph has a cycle; no order exists.
    #[error("Cyclic input: cycle among {members:?}")]
    CyclicInput {
        /// Members of the strongly connected component closing the cycle.
        members: Vec<NodeId>,
    },
}

/// Direction in which projected edges are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum Direction {
    /// `from → to`, as stored (dependent → dependency).
    #[default]
    Stored,
    /// `to → from` (dependency → dependent).
    Reversed,
}

/// Project the store onto the given edge types.
///
/// Node weights are store positions; `NodeIndex::new(i)` is the i-th node.
pub(crate) fn project(
    store: &GraphStore,
    edge_types: &[EdgeType],
    direction: Direction,
) -> DiGraph<usize, EdgeType> {
    let allowed = EdgeTypeSet::of(edge_types);
    let mut graph = DiGraph::with_capacity(store.num_nodes(), store.num_edges());

    for pos in 0..store.num_nodes() {
        graph.add_node(pos);
    }

    for edge in store.all_edges() {
        let edge_type = edge.edge_type();
        if !allowed.contains(edge_type) {
            continue;
        }
        // Both endpoints were registered by add_edge.
        let (Some(from), Some(to)) = (
            store.position(edge.from_id().as_str()),
            store.position(edge.to_id().as_str()),
        ) else {
            continue;
        };
        let (a, b) = match direction {
            Direction::Stored => (from, to),
            Direction::Reversed => (to, from),
        };
        graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), edge_type);
    }

    graph
}

/// Identity of the node behind a projection index.
pub(crate) fn node_id(store: &GraphStore, idx: NodeIndex) -> NodeId {
    store.all_nodes()[idx.index()].id()
}
