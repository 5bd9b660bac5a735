//! Core types for the schema graph.

pub mod node;
pub mod edge;

pub use node::{NodeId, NodeKind, NodeRef};
pub use edge::{Edge, EdgeDetails, EdgeType, RuleCategory, SortOrder};
