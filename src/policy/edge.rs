//! Edge filtering rules per consumer context.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Edge, EdgeType};

/// Compact set of edge types.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<EdgeType>", into = "Vec<EdgeType>")]
pub struct EdgeTypeSet(u8);

impl EdgeTypeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Build a set from a slice.
    pub fn of(types: &[EdgeType]) -> Self {
        types.iter().copied().collect()
    }

    /// Every edge type.
    pub fn all() -> Self {
        Self::of(&EdgeType::ALL)
    }

    /// Membership test.
    pub fn contains(&self, edge_type: EdgeType) -> bool {
        self.0 & edge_type.bit() != 0
    }

    /// Add a type.
    pub fn insert(&mut self, edge_type: EdgeType) {
        self.0 |= edge_type.bit();
    }

    /// Set union.
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// True when no type is present.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = EdgeType> + '_ {
        EdgeType::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<EdgeType> for EdgeTypeSet {
    fn from_iter<I: IntoIterator<Item = EdgeType>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl From<Vec<EdgeType>> for EdgeTypeSet {
    fn from(types: Vec<EdgeType>) -> Self {
        types.into_iter().collect()
    }
}

impl From<EdgeTypeSet> for Vec<EdgeType> {
    fn from(set: EdgeTypeSet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for EdgeTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Named consumer of the graph, each with its own default exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeContext {
    /// Complexity scoring.
    Complexity,
    /// Building ripple (impact) sets.
    RippleBuild,
    /// Rendering ripple results.
    RippleDisplay,
}

impl EdgeContext {
    /// Edge types this context never sees.
    pub fn default_exclusions(&self) -> EdgeTypeSet {
        match self {
            Self::Complexity => EdgeTypeSet::of(&[EdgeType::SortsBy]),
            Self::RippleBuild => {
                EdgeTypeSet::of(&[EdgeType::Displays, EdgeType::Contains, EdgeType::SortsBy])
            }
            Self::RippleDisplay => EdgeTypeSet::of(&[EdgeType::Contains, EdgeType::SortsBy]),
        }
    }
}

/// Caller overrides on top of a context's defaults.
///
/// An empty `include` means "no allow-list".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSelection {
    /// Allow-list; ignored when empty.
    #[serde(default)]
    pub include: EdgeTypeSet,
    /// Extra exclusions, added to the context defaults.
    #[serde(default)]
    pub exclude: EdgeTypeSet,
}

impl EdgeSelection {
    /// Selection with only an allow-list.
    pub fn including(types: &[EdgeType]) -> Self {
        Self {
            include: EdgeTypeSet::of(types),
            exclude: EdgeTypeSet::EMPTY,
        }
    }

    /// Selection with only extra exclusions.
    pub fn excluding(types: &[EdgeType]) -> Self {
        Self {
            include: EdgeTypeSet::EMPTY,
            exclude: EdgeTypeSet::of(types),
        }
    }
}

/// Decide whether an edge is visible.
///
/// False if the edge type is in `defaults ∪ selection.exclude`; otherwise,
/// when `selection.include` is non-empty, the type must also be in it.
pub fn is_edge_allowed(edge: &Edge, selection: &EdgeSelection, defaults: EdgeTypeSet) -> bool {
    EdgeFilter::new(selection, defaults).allows(edge)
}

/// Precompiled edge filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeFilter {
    excluded: EdgeTypeSet,
    include: EdgeTypeSet,
}

impl EdgeFilter {
    /// Compile a selection against explicit defaults.
    pub fn new(selection: &EdgeSelection, defaults: EdgeTypeSet) -> Self {
        Self {
            excluded: defaults.union(selection.exclude),
            include: selection.include,
        }
    }

    /// Compile a selection against a context's defaults.
    pub fn for_context(context: EdgeContext, selection: &EdgeSelection) -> Self {
        Self::new(selection, context.default_exclusions())
    }

    /// Filter that lets every edge through.
    pub fn allow_all() -> Self {
        Self::new(&EdgeSelection::default(), EdgeTypeSet::EMPTY)
    }

    /// Type-level check.
    pub fn allows_type(&self, edge_type: EdgeType) -> bool {
        if self.excluded.contains(edge_type) {
            return false;
        }
        self.include.is_empty() || self.include.contains(edge_type)
    }

    /// Edge-level check.
    pub fn allows(&self, edge: &Edge) -> bool {
        self.allows_type(edge.edge_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeRef;

    fn edge(edge_type: EdgeType) -> Edge {
        Edge::bare(NodeRef::view("v"), NodeRef::field("f"), edge_type, "p")
    }

    #[test]
    fn test_context_defaults() {
        let none = EdgeSelection::default();
        let complexity = EdgeFilter::for_context(EdgeContext::Complexity, &none);
        assert!(!complexity.allows(&edge(EdgeType::SortsBy)));
        assert!(complexity.allows(&edge(EdgeType::FiltersBy)));
        assert!(complexity.allows(&edge(EdgeType::Contains)));

        let build = EdgeFilter::for_context(EdgeContext::RippleBuild, &none);
        for t in [EdgeType::Displays, EdgeType::Contains, EdgeType::SortsBy] {
            assert!(!build.allows_type(t), "{t} should be excluded");
        }
        assert!(build.allows_type(EdgeType::DerivesFrom));

        let display = EdgeFilter::for_context(EdgeContext::RippleDisplay, &none);
        assert!(display.allows_type(EdgeType::Displays));
        assert!(!display.allows_type(EdgeType::Contains));
    }

    #[test]
    fn test_include_is_allow_list() {
        let selection = EdgeSelection::including(&[EdgeType::DerivesFrom]);
        let defaults = EdgeContext::Complexity.default_exclusions();
        assert!(is_edge_allowed(&edge(EdgeType::DerivesFrom), &selection, defaults));
        assert!(!is_edge_allowed(&edge(EdgeType::FiltersBy), &selection, defaults));
    }

    #[test]
    fn test_exclusion_beats_inclusion() {
        let selection = EdgeSelection {
            include: EdgeTypeSet::of(&[EdgeType::SortsBy, EdgeType::Uses]),
            exclude: EdgeTypeSet::of(&[EdgeType::Uses]),
        };
        let defaults = EdgeContext::Complexity.default_exclusions();
        assert!(!is_edge_allowed(&edge(EdgeType::SortsBy), &selection, defaults));
        assert!(!is_edge_allowed(&edge(EdgeType::Uses), &selection, defaults));
    }

    #[test]
    fn test_set_serde_as_list() {
        let set = EdgeTypeSet::of(&[EdgeType::Uses, EdgeType::DerivesFrom]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["derivesFrom","uses"]"#);
        let back: EdgeTypeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);

        let selection: EdgeSelection = serde_json::from_str(r#"{"exclude":["displays"]}"#).unwrap();
        assert!(selection.include.is_empty());
        assert!(selection.exclude.contains(EdgeType::Displays));
    }
}
