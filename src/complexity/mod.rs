//! Weighted complexity scoring.
//!
//! A score is the aggregation of every applicable [`ComplexityFeature`]
//! evaluated under the complexity edge context. The breakdown is kept so
//! callers can explain a score, not just rank by it.

pub mod builtin;
pub mod config;
pub mod feature;

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::store::GraphStore;
use crate::types::{EdgeType, NodeId, NodeKind, NodeRef};

pub use builtin::builtin_features;
pub use config::{Aggregation, Aggregator, ComplexityConfig, ConfigError};
pub use feature::{ComplexityFeature, FeatureScore};

/// Score of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    /// Scored node.
    pub node: NodeRef,
    /// Aggregated score.
    pub score: f64,
    /// Per-feature contributions, in feature order.
    pub breakdown: Vec<FeatureScore>,
}

impl ComplexityScore {
    /// Contribution of one feature.
    pub fn feature(&self, id: &str) -> Option<&FeatureScore> {
        self.breakdown.iter().find(|f| f.id == id)
    }
}

/// Flat sum of the field scores of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectComplexityRollup {
    /// The object.
    pub object: NodeRef,
    /// Sum of field scores.
    pub total_score: f64,
    /// Field scores, in `contains` declaration order.
    pub fields: Vec<ComplexityScore>,
}

/// Score a node.
///
/// Features whose `applies_to` is empty are skipped with a warning.
pub fn compute_complexity(
    graph: &GraphStore,
    node: &NodeRef,
    config: &ComplexityConfig,
) -> ComplexityScore {
    let filter = config.filter();

    let breakdown: Vec<FeatureScore> = config
        .features()
        .iter()
        .filter(|feature| {
            if feature.applies_to().is_empty() {
                tracing::warn!(
                    feature = feature.id(),
                    "complexity feature applies to no node kind"
                );
                return false;
            }
            feature.applies(node.kind)
        })
        .map(|feature| FeatureScore::evaluate(feature.as_ref(), graph, node, &filter))
        .collect();

    let score = config.aggregation.aggregate(&breakdown);

    tracing::trace!(node = %node.id(), score, features = breakdown.len(), "complexity scored");

    ComplexityScore {
        node: graph.get_node(node.id().as_str()).cloned().unwrap_or_else(|| node.clone()),
        score,
        breakdown,
    }
}

/// Sum the complexity of every field the object contains.
///
/// Only `contains` targets that are fields are scored. A field declared
/// twice is counted once. An unknown object yields an empty rollup.
pub fn compute_object_complexity_rollup(
    graph: &GraphStore,
    object_key: &str,
    config: &ComplexityConfig,
) -> ObjectComplexityRollup {
    let object = graph
        .find(NodeKind::Object, object_key)
        .cloned()
        .unwrap_or_else(|| NodeRef::object(object_key));

    let mut seen: HashSet<NodeId> = HashSet::new();
    let fields: Vec<ComplexityScore> = graph
        .get_outgoing(object.id().as_str())
        .filter(|e| e.edge_type() == EdgeType::Contains && e.to.kind == NodeKind::Field)
        .filter(|e| seen.insert(e.to_id()))
        .map(|e| compute_complexity(graph, &e.to, config))
        .collect();

    let total_score = fields.iter().map(|f| f.score).sum();

    tracing::debug!(
        object = object_key,
        fields = fields.len(),
        total_score,
        "object complexity rollup"
    );

    ObjectComplexityRollup {
        object,
        total_score,
        fields,
    }
}

/// Highest-scoring fields, ties broken by node id.
pub fn rank_fields(
    graph: &GraphStore,
    config: &ComplexityConfig,
    limit: usize,
) -> Vec<ComplexityScore> {
    let mut scores: Vec<ComplexityScore> = graph
        .nodes_of_kind(NodeKind::Field)
        .map(|field| compute_complexity(graph, field, config))
        .collect();

    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.node.id().cmp(&b.node.id()))
    });
    scores.truncate(limit);
    scores
}
