//! Strongly connected components.
//!
//! A component of size > 1 (or a single node with a self-loop) is a genuine
//! cycle, e.g. a circular formula among derived fields.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::store::GraphStore;
use crate::types::{EdgeType, NodeId};

use super::{node_id, project, Direction};

fn has_self_loop(graph: &DiGraph<usize, EdgeType>, node: NodeIndex) -> bool {
    graph.find_edge(node, node).is_some()
}

fn has_selected_edge(graph: &DiGraph<usize, EdgeType>, node: NodeIndex) -> bool {
    graph.neighbors_undirected(node).next().is_some()
}

/// Components over the endpoints of the selected edges.
///
/// The projection holds every store node; nodes without a selected edge are
/// dropped here so they do not show up as singletons.
fn components(
    store: &GraphStore,
    edge_types: &[EdgeType],
) -> (DiGraph<usize, EdgeType>, Vec<Vec<NodeIndex>>) {
    let graph = project(store, edge_types, Direction::Stored);
    let mut comps: Vec<Vec<NodeIndex>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|comp| comp.len() > 1 || comp.iter().any(|&n| has_selected_edge(&graph, n)))
        .collect();
    for comp in &mut comps {
        comp.sort_unstable();
    }
    (graph, comps)
}

impl GraphStore {
    /// Partition the endpoints of edges whose type is in `edge_types` into
    /// maximal mutually-reachable sets.
    ///
    /// Nodes with no such edge are not part of the partition. An acyclic
    /// endpoint is its own singleton component.
    ///
    /// Members of each component are in insertion order; components are in
    /// reverse topological order of the condensation.
    pub fn strongly_connected_components(&self, edge_types: &[EdgeType]) -> Vec<Vec<NodeId>> {
        let (_, comps) = components(self, edge_types);
        comps
            .into_iter()
            .map(|comp| comp.into_iter().map(|idx| node_id(self, idx)).collect())
            .collect()
    }

    /// Only the components that are cycles.
    ///
    /// Each component is sorted by id and the list is sorted, so the output
    /// is stable across insertion orders.
    pub fn cyclic_components(&self, edge_types: &[EdgeType]) -> Vec<Vec<NodeId>> {
        let (graph, comps) = components(self, edge_types);
        let mut cycles: Vec<Vec<NodeId>> = comps
            .into_iter()
            .filter(|comp| {
                comp.len() > 1 || comp.first().is_some_and(|&n| has_self_loop(&graph, n))
            })
            .map(|comp| {
                let mut ids: Vec<NodeId> = comp.into_iter().map(|idx| node_id(self, idx)).collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        cycles.sort_unstable();

        if !cycles.is_empty() {
            tracing::warn!(
                cycles = cycles.len(),
                edge_types = ?edge_types,
                "cyclic dependencies detected"
            );
        }
        cycles
    }
}

/// Component of the restricted projection containing `idx`.
pub(crate) fn component_of(
    store: &GraphStore,
    graph: &DiGraph<usize, EdgeType>,
    idx: NodeIndex,
) -> Vec<NodeId> {
    tarjan_scc(graph)
        .into_iter()
        .find(|comp| comp.contains(&idx))
        .map(|mut comp| {
            comp.sort_unstable();
            comp.into_iter().map(|i| node_id(store, i)).collect()
        })
        .unwrap_or_else(|| vec![node_id(store, idx)])
}
