//! # schema-graph-kernel
//!
//! Dependency graph engine for declarative application schemas.
//!
//! Objects, fields, views and scenes become nodes; formulas, filters, rules
//! and containment become typed edges. The kernel answers three questions:
//!
//! > What else is affected if this field changes?
//! > How operationally complex is this field or object?
//! > Are there circular or layered dependencies?
//!
//! ## Architecture
//!
//! ```text
//! GraphDocument → GraphStore ──┬─→ ripple      (impact sets)
//!                    │         ├─→ complexity  (weighted scores)
//!              EdgeContext     └─→ algo        (SCC, topological layers)
//! ```
//!
//! ## Edge Direction
//!
//! Edges point from the dependent entity to the entity it depends on.
//! `contains` is the exception and points from object to field.
//!
//! ## Determinism Guarantees
//!
//! - Nodes and edges keep insertion order; every traversal visits them in it
//! - Same content in any insertion order → same `GraphSnapshot::snapshot_id`
//! - Same graph + same options → identical ripple and complexity results

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod policy;
pub mod store;
pub mod algo;
pub mod ripple;
pub mod complexity;
pub mod canonical;

// Re-exports
pub use types::{Edge, EdgeDetails, EdgeType, NodeId, NodeKind, NodeRef, RuleCategory, SortOrder};
pub use policy::{
    is_edge_allowed, is_generic_field_list, EdgeContext, EdgeFilter, EdgeSelection, EdgeTypeSet,
};
pub use store::{
    CacheConfig, CacheStats, DocumentError, EdgeIndex, GraphCache, GraphDocument, GraphSnapshot,
    GraphStore,
};
pub use algo::{DepthLayers, GraphAlgoError, Orientation};
pub use ripple::{
    build_field_ripple, build_object_ripple, display_edges, ImpactedNode, RippleOptions,
    RippleResult, DEFAULT_MAX_DEPTH,
};
pub use complexity::{
    builtin_features, compute_complexity, compute_object_complexity_rollup, rank_fields,
    Aggregation, Aggregator, ComplexityConfig, ComplexityFeature, ComplexityScore, ConfigError,
    FeatureScore, ObjectComplexityRollup,
};
pub use canonical::{canonical_hash, canonical_hash_hex, to_canonical_bytes};

/// Schema version for all serialized kernel types.
/// Increment on breaking changes to any serialized type.
pub const SCHEMA_GRAPH_VERSION: &str = "1.0.0";
