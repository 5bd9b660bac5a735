//! Complexity feature interface.

use serde::{Deserialize, Serialize};

use crate::policy::EdgeFilter;
use crate::store::GraphStore;
use crate::types::{NodeKind, NodeRef};

/// One weighted measurement of graph shape around a node.
///
/// Built-in features and caller extensions implement the same trait and
/// are scored identically.
pub trait ComplexityFeature: Send + Sync {
    /// Stable identifier, unique within a feature set.
    fn id(&self) -> &str;

    /// Human-readable label.
    fn label(&self) -> &str;

    /// Static multiplier applied to the raw value.
    fn weight(&self) -> f64;

    /// Node kinds this feature is evaluated for.
    fn applies_to(&self) -> &[NodeKind];

    /// Raw value for `node`. Only edges accepted by `filter` may be counted.
    fn compute(&self, graph: &GraphStore, node: &NodeRef, filter: &EdgeFilter) -> f64;

    /// Whether the feature is evaluated for nodes of `kind`.
    fn applies(&self, kind: NodeKind) -> bool {
        self.applies_to().contains(&kind)
    }
}

/// Contribution of one feature to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    /// Feature id.
    pub id: String,
    /// Feature label.
    pub label: String,
    /// Raw value before weighting.
    pub raw: f64,
    /// Weight applied.
    pub weight: f64,
    /// `raw * weight`.
    pub weighted: f64,
}

impl FeatureScore {
    /// Evaluate a feature for a node.
    pub fn evaluate(
        feature: &dyn ComplexityFeature,
        graph: &GraphStore,
        node: &NodeRef,
        filter: &EdgeFilter,
    ) -> Self {
        let raw = feature.compute(graph, node, filter);
        let weight = feature.weight();
        Self {
            id: feature.id().to_string(),
            label: feature.label().to_string(),
            raw,
            weight,
            weighted: raw * weight,
        }
    }
}
