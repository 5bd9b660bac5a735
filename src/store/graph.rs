//! In-memory graph store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Edge, EdgeType, NodeId, NodeKind, NodeRef};

/// Position of an edge in the store's insertion order.
///
/// Stable for the lifetime of the store; used to tell apart edges that are
/// structurally equal but were declared at different sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    /// Raw position.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Directed multigraph of schema entities.
///
/// Built once per schema snapshot, then queried read-only. Nodes and edges
/// keep insertion order; there is no removal.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    /// Canonical node copies in insertion order.
    nodes: Vec<NodeRef>,
    /// Identity -> position in `nodes`.
    node_index: HashMap<NodeId, usize>,
    /// All edges in insertion order.
    edges: Vec<Edge>,
    /// Source identity -> outgoing edges.
    outgoing: HashMap<NodeId, Vec<EdgeIndex>>,
    /// Target identity -> incoming edges.
    incoming: HashMap<NodeId, Vec<EdgeIndex>>,
}

impl GraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, or refresh its label if the identity already exists.
    ///
    /// Identity and insertion position never change once assigned.
    pub fn add_node(&mut self, node: NodeRef) -> NodeId {
        let id = node.id();
        match self.node_index.get(&id) {
            Some(&pos) => {
                if node.name.is_some() {
                    self.nodes[pos].name = node.name;
                }
            }
            None => {
                self.node_index.insert(id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
        id
    }

    /// Add an edge, registering either endpoint that is not yet a node.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeIndex {
        let from = self.ensure_node(&edge.from);
        let to = self.ensure_node(&edge.to);
        let idx = EdgeIndex(self.edges.len());

        self.outgoing.entry(from).or_default().push(idx);
        self.incoming.entry(to).or_default().push(idx);
        self.edges.push(edge);

        idx
    }

    fn ensure_node(&mut self, node: &NodeRef) -> NodeId {
        let id = node.id();
        if !self.node_index.contains_key(&id) {
            self.node_index.insert(id.clone(), self.nodes.len());
            self.nodes.push(node.clone());
        }
        id
    }

    /// Look up a node by identity string.
    pub fn get_node(&self, id: &str) -> Option<&NodeRef> {
        self.node_index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// Look up a node by kind and key.
    pub fn find(&self, kind: NodeKind, key: &str) -> Option<&NodeRef> {
        self.get_node(NodeId::new(kind, key).as_str())
    }

    /// Check whether an identity is present.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Get all nodes in insertion order.
    pub fn all_nodes(&self) -> &[NodeRef] {
        &self.nodes
    }

    /// Get all edges in insertion order.
    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Get an edge by index.
    pub fn edge(&self, idx: EdgeIndex) -> Option<&Edge> {
        self.edges.get(idx.0)
    }

    /// Edges whose `to` is `id`, in insertion order.
    ///
    /// Empty for unknown nodes.
    pub fn get_incoming<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.incoming_indexed(id).map(|(_, e)| e)
    }

    /// Edges whose `from` is `id`, in insertion order.
    ///
    /// Empty for unknown nodes.
    pub fn get_outgoing<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.outgoing_indexed(id).map(|(_, e)| e)
    }

    /// Incoming edges together with their indices.
    pub fn incoming_indexed<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = (EdgeIndex, &'a Edge)> + 'a {
        Self::resolve(&self.edges, self.incoming.get(id))
    }

    /// Outgoing edges together with their indices.
    pub fn outgoing_indexed<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = (EdgeIndex, &'a Edge)> + 'a {
        Self::resolve(&self.edges, self.outgoing.get(id))
    }

    fn resolve<'a>(
        edges: &'a [Edge],
        list: Option<&'a Vec<EdgeIndex>>,
    ) -> impl Iterator<Item = (EdgeIndex, &'a Edge)> + 'a {
        list.into_iter()
            .flatten()
            .map(move |&idx| (idx, &edges[idx.0]))
    }

    /// Nodes of one kind, in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NodeRef> + '_ {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Object owning a field, via the first incoming `contains` edge.
    pub fn object_of_field(&self, field_id: &str) -> Option<&NodeRef> {
        self.get_incoming(field_id)
            .find(|e| e.edge_type() == EdgeType::Contains && e.from.kind == NodeKind::Object)
            .map(|e| &e.from)
    }

    /// Position of a node in insertion order.
    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Get number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Get number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }
}
