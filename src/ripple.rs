//! Ripple (impact) analysis.
//!
//! Answers "what else is affected if this field changes?" by walking
//! *incoming* edges outward from the changed entity: since edges point
//! `dependent → dependency`, the sources of a node's incoming edges are
//! exactly the entities that depend on it.
//!
//! ## Algorithm
//!
//! 1. Start with the root at depth 0
//! 2. Pop the oldest queued node (breadth-first)
//! 3. If its depth is below `max_depth`, walk its allowed incoming edges:
//!    - record every walked edge
//!    - enqueue each unvisited source at depth + 1
//! 4. Partition everything reached by kind
//!
//! A node is recorded at the depth of its first discovery, which BFS makes
//! the shortest hop count along allowed edges. Later paths to an already
//! visited node never revisit it, so cycles terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::policy::{is_generic_field_list, EdgeContext, EdgeFilter, EdgeSelection, EdgeTypeSet};
use crate::store::{EdgeIndex, GraphStore};
use crate::types::{Edge, EdgeType, NodeId, NodeKind, NodeRef};

/// Default hop limit for ripple traversal.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

/// Caller options for ripple traversal.
///
/// Edge filtering starts from the `rippleBuild` context defaults
/// (`displays`, `contains`, `sortsBy` excluded) and applies these on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RippleOptions {
    /// Allow-list of edge types; empty means no allow-list.
    #[serde(default)]
    pub include_edge_types: EdgeTypeSet,
    /// Extra edge types to ignore.
    #[serde(default)]
    pub exclude_edge_types: EdgeTypeSet,
    /// Nodes at this depth are reported but not expanded.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

impl RippleOptions {
    /// Options with a given depth limit and no overrides.
    pub fn with_max_depth(max_depth: u32) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Caller overrides as an edge selection.
    pub fn selection(&self) -> EdgeSelection {
        EdgeSelection {
            include: self.include_edge_types,
            exclude: self.exclude_edge_types,
        }
    }

    fn filter(&self) -> EdgeFilter {
        EdgeFilter::for_context(EdgeContext::RippleBuild, &self.selection())
    }
}

impl Default for RippleOptions {
    fn default() -> Self {
        Self {
            include_edge_types: EdgeTypeSet::EMPTY,
            exclude_edge_types: EdgeTypeSet::EMPTY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// An entity reached by a ripple, with its hop distance from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedNode {
    /// The entity.
    pub node: NodeRef,
    /// BFS depth of first discovery.
    pub depth: u32,
}

/// Result of a ripple traversal.
///
/// Impacted lists are in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RippleResult {
    /// The changed entity.
    pub root: NodeRef,
    /// Impacted fields (never includes the root).
    pub impacted_fields: Vec<ImpactedNode>,
    /// Impacted views.
    pub impacted_views: Vec<ImpactedNode>,
    /// Impacted objects.
    pub impacted_objects: Vec<ImpactedNode>,
    /// Impacted scenes.
    pub impacted_scenes: Vec<ImpactedNode>,
    /// Every allowed edge walked, in walk order.
    pub edges: Vec<Edge>,
    #[serde(skip)]
    edge_indices: Vec<EdgeIndex>,
}

impl RippleResult {
    fn empty(root: NodeRef) -> Self {
        Self {
            root,
            impacted_fields: Vec::new(),
            impacted_views: Vec::new(),
            impacted_objects: Vec::new(),
            impacted_scenes: Vec::new(),
            edges: Vec::new(),
            edge_indices: Vec::new(),
        }
    }

    fn bucket_mut(&mut self, kind: NodeKind) -> &mut Vec<ImpactedNode> {
        match kind {
            NodeKind::Field => &mut self.impacted_fields,
            NodeKind::View => &mut self.impacted_views,
            NodeKind::Object => &mut self.impacted_objects,
            NodeKind::Scene => &mut self.impacted_scenes,
        }
    }

    /// All impacted entities, fields first, then views, objects, scenes.
    pub fn impacted(&self) -> impl Iterator<Item = &ImpactedNode> {
        self.impacted_fields
            .iter()
            .chain(&self.impacted_views)
            .chain(&self.impacted_objects)
            .chain(&self.impacted_scenes)
    }

    /// Number of impacted entities.
    pub fn total_impacted(&self) -> usize {
        self.impacted_fields.len()
            + self.impacted_views.len()
            + self.impacted_objects.len()
            + self.impacted_scenes.len()
    }

    /// Whether an entity was reached.
    pub fn contains(&self, id: &str) -> bool {
        self.impacted().any(|n| n.node.id().as_str() == id)
    }

    /// Depth of an impacted entity.
    pub fn depth_of(&self, id: &str) -> Option<u32> {
        self.impacted()
            .find(|n| n.node.id().as_str() == id)
            .map(|n| n.depth)
    }

    /// Store indices of the walked edges.
    pub fn edge_indices(&self) -> &[EdgeIndex] {
        &self.edge_indices
    }
}

/// Impact of changing one field.
///
/// An unknown key yields an empty result.
pub fn build_field_ripple(
    graph: &GraphStore,
    field_key: &str,
    options: &RippleOptions,
) -> RippleResult {
    let root = graph
        .find(NodeKind::Field, field_key)
        .cloned()
        .unwrap_or_else(|| NodeRef::field(field_key));
    ripple_from(graph, root, options)
}

/// Impact of changing any field of an object.
///
/// Unions the field ripples of every member reached through the object's
/// outgoing `contains` edges. Depths are relative to the member field and
/// the minimum is kept when several members reach the same entity.
pub fn build_object_ripple(
    graph: &GraphStore,
    object_key: &str,
    options: &RippleOptions,
) -> RippleResult {
    let root = graph
        .find(NodeKind::Object, object_key)
        .cloned()
        .unwrap_or_else(|| NodeRef::object(object_key));
    let root_id = root.id();

    let members: Vec<&NodeRef> = graph
        .get_outgoing(root_id.as_str())
        .filter(|e| e.edge_type() == EdgeType::Contains && e.to.kind == NodeKind::Field)
        .map(|e| &e.to)
        .collect();

    let mut order: Vec<NodeId> = Vec::new();
    let mut best: HashMap<NodeId, ImpactedNode> = HashMap::new();
    let mut seen_edges: HashSet<EdgeIndex> = HashSet::new();
    let mut result = RippleResult::empty(root);

    for member in members {
        let ripple = ripple_from(graph, member.clone(), options);

        for impacted in ripple.impacted() {
            let id = impacted.node.id();
            if id == root_id {
                continue;
            }
            match best.get_mut(&id) {
                Some(existing) => existing.depth = existing.depth.min(impacted.depth),
                None => {
                    order.push(id.clone());
                    best.insert(id, impacted.clone());
                }
            }
        }

        for (&idx, edge) in ripple.edge_indices.iter().zip(&ripple.edges) {
            if seen_edges.insert(idx) {
                result.edge_indices.push(idx);
                result.edges.push(edge.clone());
            }
        }
    }

    for id in order {
        if let Some(impacted) = best.remove(&id) {
            result.bucket_mut(impacted.node.kind).push(impacted);
        }
    }

    tracing::debug!(
        object = %root_id,
        impacted = result.total_impacted(),
        edges = result.edges.len(),
        "object ripple built"
    );
    result
}

fn ripple_from(graph: &GraphStore, root: NodeRef, options: &RippleOptions) -> RippleResult {
    let root_id = root.id();
    let mut result = RippleResult::empty(root);

    if !graph.contains_node(root_id.as_str()) {
        tracing::debug!(root = %root_id, "ripple root not in graph");
        return result;
    }

    let filter = options.filter();
    let mut visited: HashSet<NodeId> = HashSet::from([root_id.clone()]);
    let mut queue: VecDeque<(NodeId, u32)> = VecDeque::from([(root_id.clone(), 0)]);

    while let Some((id, depth)) = queue.pop_front() {
        if depth >= options.max_depth {
            continue;
        }
        tracing::trace!(node = %id, depth, "expanding ripple node");

        for (idx, edge) in graph.incoming_indexed(id.as_str()) {
            if !filter.allows(edge) {
                continue;
            }
            // Column lists and similar references would flag every shown field.
            if edge.edge_type() == EdgeType::Uses && is_generic_field_list(&edge.location_path) {
                continue;
            }

            result.edge_indices.push(idx);
            result.edges.push(edge.clone());

            let from = edge.from_id();
            if visited.insert(from.clone()) {
                let node = graph
                    .get_node(from.as_str())
                    .cloned()
                    .unwrap_or_else(|| edge.from.clone());
                result.bucket_mut(node.kind).push(ImpactedNode {
                    node,
                    depth: depth + 1,
                });
                queue.push_back((from, depth + 1));
            }
        }
    }

    tracing::debug!(
        root = %root_id,
        max_depth = options.max_depth,
        impacted = result.total_impacted(),
        edges = result.edges.len(),
        "ripple built"
    );
    result
}

/// Edges to draw for a ripple result.
///
/// Every store edge with both endpoints among the root and the impacted
/// entities, filtered through the `rippleDisplay` context plus `selection`.
pub fn display_edges<'g>(
    graph: &'g GraphStore,
    result: &RippleResult,
    selection: &EdgeSelection,
) -> Vec<&'g Edge> {
    let filter = EdgeFilter::for_context(EdgeContext::RippleDisplay, selection);
    let mut members: HashSet<NodeId> = result.impacted().map(|n| n.node.id()).collect();
    members.insert(result.root.id());

    graph
        .all_edges()
        .iter()
        .filter(|e| filter.allows(e))
        .filter(|e| members.contains(&e.from_id()) && members.contains(&e.to_id()))
        .collect()
}
