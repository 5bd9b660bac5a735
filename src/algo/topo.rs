//! Topological ordering and depth layering.
//!
//! # Edge Direction
//!
//! Stored edges point `dependent → dependency`. A plain topological sort
//! therefore lists dependents before what they depend on. Callers that want
//! inputs first (derivation bands) ask for [`Orientation::DependenciesFirst`],
//! which reverses the projected edges.

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::store::GraphStore;
use crate::types::{EdgeType, NodeId};

use super::scc::component_of;
use super::{node_id, project, Direction, GraphAlgoError};

/// Which end of an edge comes first in the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// For every edge `u → v`, `u` precedes `v`.
    #[default]
    AsStored,
    /// For every edge `u → v`, `v` precedes `u`.
    DependenciesFirst,
}

impl Orientation {
    fn direction(self) -> Direction {
        match self {
            Self::AsStored => Direction::Stored,
            Self::DependenciesFirst => Direction::Reversed,
        }
    }
}

/// Topological order plus longest-path depth of every node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLayers {
    /// All nodes in topological order.
    pub order: Vec<NodeId>,
    /// Longest path length from any source to each node.
    pub depth: BTreeMap<NodeId, u32>,
}

impl DepthLayers {
    /// Depth of one node.
    pub fn depth_of(&self, id: &str) -> Option<u32> {
        self.depth.get(id).copied()
    }

    /// Deepest layer, or `None` for an empty graph.
    pub fn max_depth(&self) -> Option<u32> {
        self.depth.values().copied().max()
    }

    /// Nodes grouped by depth; members keep topological order.
    pub fn bands(&self) -> Vec<Vec<NodeId>> {
        let mut bands: Vec<Vec<NodeId>> = match self.max_depth() {
            Some(max) => vec![Vec::new(); max as usize + 1],
            None => return Vec::new(),
        };
        for id in &self.order {
            if let Some(&d) = self.depth.get(id) {
                bands[d as usize].push(id.clone());
            }
        }
        bands
    }
}

impl GraphStore {
    /// Order all nodes so that for every edge `u → v` of the given types,
    /// `u` comes before `v`.
    ///
    /// Returns [`GraphAlgoError::CyclicInput`] when those edges form a cycle.
    pub fn topological_sort(&self, edge_types: &[EdgeType]) -> Result<Vec<NodeId>, GraphAlgoError> {
        self.topological_order(edge_types, Orientation::AsStored)
    }

    /// Topological order with an explicit orientation.
    pub fn topological_order(
        &self,
        edge_types: &[EdgeType],
        orientation: Orientation,
    ) -> Result<Vec<NodeId>, GraphAlgoError> {
        Ok(self.depth_layers(edge_types, orientation)?.order)
    }

    /// Topological order and longest-path depth per node.
    ///
    /// Sources (no incoming projected edge) sit at depth 0; every edge
    /// `u → v` processed in order applies `depth[v] = max(depth[v], depth[u] + 1)`.
    pub fn depth_layers(
        &self,
        edge_types: &[EdgeType],
        orientation: Orientation,
    ) -> Result<DepthLayers, GraphAlgoError> {
        let graph = project(self, edge_types, orientation.direction());

        let sorted = toposort(&graph, None).map_err(|cycle| {
            let members = component_of(self, &graph, cycle.node_id());
            tracing::warn!(
                members = members.len(),
                first = %members.first().map(NodeId::as_str).unwrap_or_default(),
                "topological sort over cyclic input"
            );
            GraphAlgoError::CyclicInput { members }
        })?;

        let mut depth = vec![0u32; graph.node_count()];
        for &u in &sorted {
            for edge in graph.edges(u) {
                let v = edge.target().index();
                depth[v] = depth[v].max(depth[u.index()] + 1);
            }
        }

        let order: Vec<NodeId> = sorted.iter().map(|&idx| node_id(self, idx)).collect();
        let depth = sorted
            .iter()
            .map(|&idx| (node_id(self, idx), depth[idx.index()]))
            .collect();

        Ok(DepthLayers { order, depth })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, NodeRef};

    fn position(order: &[NodeId], key: &str) -> usize {
        order.iter().position(|id| id.as_str() == format!("field:{key}")).unwrap()
    }

    fn chain() -> GraphStore {
        // total -> subtotal -> price, total -> tax -> price
        let mut store = GraphStore::new();
        let pairs = [
            ("total", "subtotal"),
            ("subtotal", "price"),
            ("total", "tax"),
            ("tax", "price"),
        ];
        for (dependent, input) in pairs {
            store.add_edge(Edge::derives_from(
                NodeRef::field(dependent),
                NodeRef::field(input),
                format!("fields.{dependent}"),
            ));
        }
        store
    }

    #[test]
    fn test_as_stored_puts_dependents_first() {
        let store = chain();
        let order = store.topological_sort(&[EdgeType::DerivesFrom]).unwrap();
        assert_eq!(order.len(), 4);
        assert!(position(&order, "total") < position(&order, "subtotal"));
        assert!(position(&order, "subtotal") < position(&order, "price"));
        assert!(position(&order, "tax") < position(&order, "price"));
    }

    #[test]
    fn test_dependencies_first_depths() {
        let store = chain();
        let layers = store
            .depth_layers(&[EdgeType::DerivesFrom], Orientation::DependenciesFirst)
            .unwrap();

        assert_eq!(layers.depth_of("field:price"), Some(0));
        assert_eq!(layers.depth_of("field:subtotal"), Some(1));
        assert_eq!(layers.depth_of("field:tax"), Some(1));
        assert_eq!(layers.depth_of("field:total"), Some(2));

        let bands = layers.bands();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[1].len(), 2);
    }

    #[test]
    fn test_longest_path_wins_under_fan_in() {
        // d depends on a directly and through b -> c.
        let mut store = GraphStore::new();
        for (dependent, input) in [("d", "a"), ("d", "c"), ("c", "b"), ("b", "a")] {
            store.add_edge(Edge::derives_from(
                NodeRef::field(dependent),
                NodeRef::field(input),
                "",
            ));
        }
        let layers = store
            .depth_layers(&[EdgeType::DerivesFrom], Orientation::DependenciesFirst)
            .unwrap();
        assert_eq!(layers.depth_of("field:d"), Some(3));
    }

    #[test]
    fn test_cycle_is_an_error() {
        let mut store = chain();
        store.add_edge(Edge::derives_from(NodeRef::field("price"), NodeRef::field("total"), ""));

        let err = store.topological_sort(&[EdgeType::DerivesFrom]).unwrap_err();
        let GraphAlgoError::CyclicInput { members } = err;
        assert_eq!(members.len(), 4);

        // Restricting to an edge type without the cycle succeeds.
        assert!(store.topological_sort(&[EdgeType::FiltersBy]).is_ok());
    }

    #[test]
    fn test_unrelated_nodes_are_sources() {
        let mut store = chain();
        store.add_node(NodeRef::view("v"));
        let layers = store.depth_layers(&[EdgeType::DerivesFrom], Orientation::AsStored).unwrap();
        assert_eq!(layers.depth_of("view:v"), Some(0));
        assert_eq!(layers.order.len(), 5);
    }
}
