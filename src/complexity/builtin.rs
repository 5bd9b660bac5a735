//! Built-in complexity features.
//!
//! | id | applies to | weight |
//! |----|-----------|--------|
//! | `derived_dependents` | field | 2.0 |
//! | `cross_object_derived_dependents` | field | 4.0 |
//! | `filtering_views` | field | 1.5 |
//! | `record_rules` | field | 3.0 |
//! | `conditional_rules` | field | 2.0 |
//! | `validation_rules` | field | 1.5 |
//! | `email_rules` | field | 1.0 |
//! | `display_rules` | field | 0.5 |
//! | `derivation_depth` | field | 1.0 |
//! | `weighted_derivation_depth` | field | 0.5 |
//! | `connection_aggregations` | field, object | 1.0 |
//! | `member_fields` | object | 0.25 |
//! | `view_field_references` | view | 0.5 |
//! | `scene_views` | scene | 0.5 |

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::policy::EdgeFilter;
use crate::store::GraphStore;
use crate::types::{Edge, EdgeType, NodeId, NodeKind, NodeRef, RuleCategory};

use super::feature::ComplexityFeature;

const FIELD: &[NodeKind] = &[NodeKind::Field];
const FIELD_AND_OBJECT: &[NodeKind] = &[NodeKind::Field, NodeKind::Object];
const OBJECT: &[NodeKind] = &[NodeKind::Object];
const VIEW: &[NodeKind] = &[NodeKind::View];
const SCENE: &[NodeKind] = &[NodeKind::Scene];

static BUILTINS: OnceLock<Vec<Arc<dyn ComplexityFeature>>> = OnceLock::new();

/// The built-in feature set, in evaluation order.
pub fn builtin_features() -> &'static [Arc<dyn ComplexityFeature>] {
    BUILTINS.get_or_init(|| {
        vec![
            Arc::new(DerivedDependents),
            Arc::new(CrossObjectDerivedDependents),
            Arc::new(FilteringViews),
            Arc::new(RuleReferences::new(RuleCategory::Record)),
            Arc::new(RuleReferences::new(RuleCategory::Conditional)),
            Arc::new(RuleReferences::new(RuleCategory::Validation)),
            Arc::new(RuleReferences::new(RuleCategory::Email)),
            Arc::new(RuleReferences::new(RuleCategory::Display)),
            Arc::new(DerivationDepth::plain()),
            Arc::new(DerivationDepth::weighted()),
            Arc::new(ConnectionAggregations),
            Arc::new(MemberFields),
            Arc::new(ViewFieldReferences),
            Arc::new(SceneViews),
        ]
    })
}

fn allowed_incoming<'g>(
    graph: &'g GraphStore,
    node: &NodeRef,
    filter: &'g EdgeFilter,
    edge_type: EdgeType,
) -> impl Iterator<Item = &'g Edge> + 'g {
    graph
        .get_incoming(node.id().as_str())
        .filter(move |e| e.edge_type() == edge_type && filter.allows(e))
}

fn allowed_outgoing<'g>(
    graph: &'g GraphStore,
    node: &NodeRef,
    filter: &'g EdgeFilter,
    edge_type: EdgeType,
) -> impl Iterator<Item = &'g Edge> + 'g {
    graph
        .get_outgoing(node.id().as_str())
        .filter(move |e| e.edge_type() == edge_type && filter.allows(e))
}

/// Whether two fields belong to different, known objects.
fn crosses_objects(graph: &GraphStore, a: &NodeRef, b: &NodeRef) -> bool {
    match (
        graph.object_of_field(a.id().as_str()),
        graph.object_of_field(b.id().as_str()),
    ) {
        (Some(oa), Some(ob)) => oa != ob,
        _ => false,
    }
}

/// Distinct fields deriving from this field.
pub struct DerivedDependents;

impl ComplexityFeature for DerivedDependents {
    fn id(&self) -> &str {
        "derived_dependents"
    }
    fn label(&self) -> &str {
        "Fields deriving from this field"
    }
    fn weight(&self) -> f64 {
        2.0
    }
    fn applies_to(&self) -> &[NodeKind] {
        FIELD
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        let dependents: HashSet<NodeId> =
            allowed_incoming(graph, node, filter, EdgeType::DerivesFrom)
                .filter(|e| e.from.kind == NodeKind::Field)
                .map(|e| e.from_id())
                .collect();
        dependents.len() as f64
    }
}

/// Distinct dependents living in a different object than this field.
pub struct CrossObjectDerivedDependents;

impl ComplexityFeature for CrossObjectDerivedDependents {
    fn id(&self) -> &str {
        "cross_object_derived_dependents"
    }
    fn label(&self) -> &str {
        "Cross-object fields deriving from this field"
    }
    fn weight(&self) -> f64 {
        4.0
    }
    fn applies_to(&self) -> &[NodeKind] {
        FIELD
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        let dependents: HashSet<NodeId> =
            allowed_incoming(graph, node, filter, EdgeType::DerivesFrom)
                .filter(|e| e.from.kind == NodeKind::Field && crosses_objects(graph, &e.from, node))
                .map(|e| e.from_id())
                .collect();
        dependents.len() as f64
    }
}

/// Distinct views filtering or sorting by this field.
///
/// `sortsBy` only counts when the filter lets it through; the complexity
/// context excludes it by default.
pub struct FilteringViews;

impl ComplexityFeature for FilteringViews {
    fn id(&self) -> &str {
        "filtering_views"
    }
    fn label(&self) -> &str {
        "Views filtering or sorting by this field"
    }
    fn weight(&self) -> f64 {
        1.5
    }
    fn applies_to(&self) -> &[NodeKind] {
        FIELD
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        let views: HashSet<NodeId> = graph
            .get_incoming(node.id().as_str())
            .filter(|e| matches!(e.edge_type(), EdgeType::FiltersBy | EdgeType::SortsBy))
            .filter(|e| e.from.kind == NodeKind::View && filter.allows(e))
            .map(|e| e.from_id())
            .collect();
        views.len() as f64
    }
}

/// Rule usages of this field in one rule category.
pub struct RuleReferences {
    category: RuleCategory,
    id: String,
    label: String,
}

impl RuleReferences {
    /// Feature counting rules of `category`.
    pub fn new(category: RuleCategory) -> Self {
        Self {
            category,
            id: format!("{category}_rules"),
            label: format!("{category} rules referencing this field"),
        }
    }

    /// Weight per category, record rules highest, display rules lowest.
    pub fn category_weight(category: RuleCategory) -> f64 {
        match category {
            RuleCategory::Record => 3.0,
            RuleCategory::Conditional => 2.0,
            RuleCategory::Validation => 1.5,
            RuleCategory::Email => 1.0,
            RuleCategory::Display => 0.5,
        }
    }
}

impl ComplexityFeature for RuleReferences {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.label
    }
    fn weight(&self) -> f64 {
        Self::category_weight(self.category)
    }
    fn applies_to(&self) -> &[NodeKind] {
        FIELD
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        allowed_incoming(graph, node, filter, EdgeType::Uses)
            .filter(|e| e.rule_category() == Some(self.category))
            .count() as f64
    }
}

/// Longest chain of `derivesFrom` hops starting at this field.
pub struct DerivationDepth {
    weighted: bool,
}

impl DerivationDepth {
    /// One step per hop.
    pub fn plain() -> Self {
        Self { weighted: false }
    }

    /// Hops crossing an object boundary cost two steps.
    pub fn weighted() -> Self {
        Self { weighted: true }
    }
}

impl ComplexityFeature for DerivationDepth {
    fn id(&self) -> &str {
        if self.weighted {
            "weighted_derivation_depth"
        } else {
            "derivation_depth"
        }
    }
    fn label(&self) -> &str {
        if self.weighted {
            "Derivation chain depth (cross-object hops count double)"
        } else {
            "Derivation chain depth"
        }
    }
    fn weight(&self) -> f64 {
        if self.weighted {
            0.5
        } else {
            1.0
        }
    }
    fn applies_to(&self) -> &[NodeKind] {
        FIELD
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        let weighted = self.weighted;
        f64::from(longest_chain(graph, node, filter, |edge| {
            if weighted && crosses_objects(graph, &edge.from, &edge.to) {
                2
            } else {
                1
            }
        }))
    }
}

enum Visit {
    InProgress,
    Done(u32),
}

struct Frame {
    node: NodeRef,
    next: Vec<(NodeRef, u32)>,
    cursor: usize,
    best: u32,
    cost_in: u32,
}

/// Longest weighted path along outgoing allowed `derivesFrom` edges.
///
/// Iterative DFS with an explicit frame stack and a per-traversal state map.
/// An edge into a node still on the stack closes a cycle and is ignored, so
/// cyclic input terminates with a finite depth instead of an error.
pub(crate) fn longest_chain<F>(
    graph: &GraphStore,
    start: &NodeRef,
    filter: &EdgeFilter,
    hop_cost: F,
) -> u32
where
    F: Fn(&Edge) -> u32,
{
    let successors = |node: &NodeRef| -> Vec<(NodeRef, u32)> {
        allowed_outgoing(graph, node, filter, EdgeType::DerivesFrom)
            .filter(|e| e.to.kind == NodeKind::Field)
            .map(|e| (e.to.clone(), hop_cost(e)))
            .collect()
    };

    let mut state: HashMap<NodeId, Visit> = HashMap::new();
    state.insert(start.id(), Visit::InProgress);
    let mut stack = vec![Frame {
        next: successors(start),
        node: start.clone(),
        cursor: 0,
        best: 0,
        cost_in: 0,
    }];
    let mut result = 0;

    while let Some(frame) = stack.last_mut() {
        if frame.cursor < frame.next.len() {
            let (child, cost) = frame.next[frame.cursor].clone();
            frame.cursor += 1;

            match state.get(&child.id()) {
                Some(Visit::Done(depth)) => frame.best = frame.best.max(depth + cost),
                Some(Visit::InProgress) => {}
                None => {
                    state.insert(child.id(), Visit::InProgress);
                    stack.push(Frame {
                        next: successors(&child),
                        node: child,
                        cursor: 0,
                        best: 0,
                        cost_in: cost,
                    });
                }
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        state.insert(done.node.id(), Visit::Done(done.best));
        match stack.last_mut() {
            Some(parent) => parent.best = parent.best.max(done.best + done.cost_in),
            None => result = done.best,
        }
    }

    result
}

/// Outgoing connection-aggregation edges.
pub struct ConnectionAggregations;

impl ComplexityFeature for ConnectionAggregations {
    fn id(&self) -> &str {
        "connection_aggregations"
    }
    fn label(&self) -> &str {
        "Aggregations over connections"
    }
    fn weight(&self) -> f64 {
        1.0
    }
    fn applies_to(&self) -> &[NodeKind] {
        FIELD_AND_OBJECT
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        allowed_outgoing(graph, node, filter, EdgeType::ConnectsTo).count() as f64
    }
}

/// Fields an object contains.
pub struct MemberFields;

impl ComplexityFeature for MemberFields {
    fn id(&self) -> &str {
        "member_fields"
    }
    fn label(&self) -> &str {
        "Fields on this object"
    }
    fn weight(&self) -> f64 {
        0.25
    }
    fn applies_to(&self) -> &[NodeKind] {
        OBJECT
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        allowed_outgoing(graph, node, filter, EdgeType::Contains).count() as f64
    }
}

/// Field references made by a view.
pub struct ViewFieldReferences;

impl ComplexityFeature for ViewFieldReferences {
    fn id(&self) -> &str {
        "view_field_references"
    }
    fn label(&self) -> &str {
        "Fields filtered, sorted, or used by this view"
    }
    fn weight(&self) -> f64 {
        0.5
    }
    fn applies_to(&self) -> &[NodeKind] {
        VIEW
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        graph
            .get_outgoing(node.id().as_str())
            .filter(|e| {
                matches!(e.edge_type(), EdgeType::FiltersBy | EdgeType::SortsBy | EdgeType::Uses)
                    && filter.allows(e)
            })
            .count() as f64
    }
}

/// Views a scene displays.
pub struct SceneViews;

impl ComplexityFeature for SceneViews {
    fn id(&self) -> &str {
        "scene_views"
    }
    fn label(&self) -> &str {
        "Views displayed by this scene"
    }
    fn weight(&self) -> f64 {
        0.5
    }
    fn applies_to(&self) -> &[NodeKind] {
        SCENE
    }
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64 {
        allowed_outgoing(graph, node, filter, EdgeType::Displays)
            .filter(|e| e.to.kind == NodeKind::View)
            .count() as f64
    }
}
