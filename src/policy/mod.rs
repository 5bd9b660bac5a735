//! Edge visibility policy.
//!
//! Different consumers look at the same graph through different edge
//! filters. Each consumer names a context; the context supplies default
//! exclusions and the caller may narrow further.

pub mod edge;
pub mod location;

pub use edge::{is_edge_allowed, EdgeContext, EdgeFilter, EdgeSelection, EdgeTypeSet};
pub use location::is_generic_field_list;
