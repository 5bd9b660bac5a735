//! Edge types for the schema graph.
//!
//! Edges point from the *dependent* entity to the entity it *depends on*.
//! `contains` is the one exception and points `object → field`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{NodeId, NodeRef};

/// Type of a relationship between two schema entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeType {
    /// Derived field reads an input field (formula, equation, concatenation).
    DerivesFrom,
    /// View filters records by a field.
    FiltersBy,
    /// View sorts records by a field.
    SortsBy,
    /// Rule or view references a field.
    Uses,
    /// Object owns a field (`object → field`).
    Contains,
    /// Scene or view renders another entity.
    Displays,
    /// Field aggregates over a connection.
    ConnectsTo,
}

impl EdgeType {
    /// All edge types, in declaration order.
    pub const ALL: [EdgeType; 7] = [
        Self::DerivesFrom,
        Self::FiltersBy,
        Self::SortsBy,
        Self::Uses,
        Self::Contains,
        Self::Displays,
        Self::ConnectsTo,
    ];

    /// Parse edge type from its camelCase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "derivesFrom" => Some(Self::DerivesFrom),
            "filtersBy" => Some(Self::FiltersBy),
            "sortsBy" => Some(Self::SortsBy),
            "uses" => Some(Self::Uses),
            "contains" => Some(Self::Contains),
            "displays" => Some(Self::Displays),
            "connectsTo" => Some(Self::ConnectsTo),
            _ => None,
        }
    }

    /// camelCase name, as used in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DerivesFrom => "derivesFrom",
            Self::FiltersBy => "filtersBy",
            Self::SortsBy => "sortsBy",
            Self::Uses => "uses",
            Self::Contains => "contains",
            Self::Displays => "displays",
            Self::ConnectsTo => "connectsTo",
        }
    }

    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a rule that references a field.
///
/// Ordered from highest to lowest operational weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleCategory {
    /// Record rule: writes values on submit.
    Record,
    /// Conditional rule: sets a field value when criteria match.
    Conditional,
    /// Validation rule: blocks submission.
    Validation,
    /// Email rule: sends notifications.
    Email,
    /// Display rule: toggles visibility or styling.
    Display,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => write!(f, "record"),
            Self::Conditional => write!(f, "conditional"),
            Self::Validation => write!(f, "validation"),
            Self::Email => write!(f, "email"),
            Self::Display => write!(f, "display"),
        }
    }
}

/// Sort direction for `sortsBy` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Edge-type specific metadata.
///
/// The variant *is* the edge type, so a payload can never disagree with the
/// type it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeDetails {
    /// See [`EdgeType::DerivesFrom`].
    DerivesFrom {
        /// Formula or equation text, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        formula: Option<String>,
    },
    /// See [`EdgeType::FiltersBy`].
    FiltersBy {
        /// Filter operator (`is`, `contains`, ...).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<String>,
    },
    /// See [`EdgeType::SortsBy`].
    SortsBy {
        /// Sort direction.
        #[serde(default)]
        order: SortOrder,
    },
    /// See [`EdgeType::Uses`].
    Uses {
        /// Rule category when the usage comes from a rule.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule: Option<RuleCategory>,
    },
    /// See [`EdgeType::Contains`].
    Contains,
    /// See [`EdgeType::Displays`].
    Displays,
    /// See [`EdgeType::ConnectsTo`].
    ConnectsTo {
        /// Aggregation function (`sum`, `count`, ...), when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        aggregation: Option<String>,
    },
}

impl EdgeDetails {
    /// Edge type this payload belongs to.
    pub fn edge_type(&self) -> EdgeType {
        match self {
            Self::DerivesFrom { .. } => EdgeType::DerivesFrom,
            Self::FiltersBy { .. } => EdgeType::FiltersBy,
            Self::SortsBy { .. } => EdgeType::SortsBy,
            Self::Uses { .. } => EdgeType::Uses,
            Self::Contains => EdgeType::Contains,
            Self::Displays => EdgeType::Displays,
            Self::ConnectsTo { .. } => EdgeType::ConnectsTo,
        }
    }

    /// Payload with no metadata for the given type.
    pub fn bare(edge_type: EdgeType) -> Self {
        match edge_type {
            EdgeType::DerivesFrom => Self::DerivesFrom { formula: None },
            EdgeType::FiltersBy => Self::FiltersBy { operator: None },
            EdgeType::SortsBy => Self::SortsBy { order: SortOrder::Asc },
            EdgeType::Uses => Self::Uses { rule: None },
            EdgeType::Contains => Self::Contains,
            EdgeType::Displays => Self::Displays,
            EdgeType::ConnectsTo => Self::ConnectsTo { aggregation: None },
        }
    }
}

/// Directed, typed relationship between two nodes.
///
/// Several edges may share `(from, to)`; each declaration site produces
/// its own edge, even when all fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Dependent entity (container for `contains`).
    pub from: NodeRef,
    /// Dependency (member for `contains`).
    pub to: NodeRef,
    /// Where in the source schema this relationship was declared.
    #[serde(default)]
    pub location_path: String,
    /// Type-specific metadata; determines [`Edge::edge_type`].
    #[serde(flatten)]
    pub details: EdgeDetails,
}

impl Edge {
    /// Create a new edge.
    pub fn new(
        from: NodeRef,
        to: NodeRef,
        location_path: impl Into<String>,
        details: EdgeDetails,
    ) -> Self {
        Self {
            from,
            to,
            location_path: location_path.into(),
            details,
        }
    }

    /// Create an edge of the given type with no metadata.
    pub fn bare(
        from: NodeRef,
        to: NodeRef,
        edge_type: EdgeType,
        location_path: impl Into<String>,
    ) -> Self {
        Self::new(from, to, location_path, EdgeDetails::bare(edge_type))
    }

    /// `dependent derivesFrom input`.
    pub fn derives_from(
        dependent: NodeRef,
        input: NodeRef,
        location_path: impl Into<String>,
    ) -> Self {
        Self::bare(dependent, input, EdgeType::DerivesFrom, location_path)
    }

    /// `object contains field`.
    pub fn contains(object: NodeRef, field: NodeRef) -> Self {
        let location_path = format!("objects.{}.fields.{}", object.key, field.key);
        Self::new(object, field, location_path, EdgeDetails::Contains)
    }

    /// `view filtersBy field`.
    pub fn filters_by(view: NodeRef, field: NodeRef, location_path: impl Into<String>) -> Self {
        Self::bare(view, field, EdgeType::FiltersBy, location_path)
    }

    /// Rule usage of a field.
    pub fn rule_use(
        user: NodeRef,
        field: NodeRef,
        rule: RuleCategory,
        location_path: impl Into<String>,
    ) -> Self {
        Self::new(user, field, location_path, EdgeDetails::Uses { rule: Some(rule) })
    }

    /// Edge type.
    pub fn edge_type(&self) -> EdgeType {
        self.details.edge_type()
    }

    /// Identity of the source node.
    pub fn from_id(&self) -> NodeId {
        self.from.id()
    }

    /// Identity of the target node.
    pub fn to_id(&self) -> NodeId {
        self.to.id()
    }

    /// Rule category for rule-originated `uses` edges.
    pub fn rule_category(&self) -> Option<RuleCategory> {
        match &self.details {
            EdgeDetails::Uses { rule } => *rule,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_determine_type() {
        let edge = Edge::rule_use(
            NodeRef::view("view_1"),
            NodeRef::field("field_2"),
            RuleCategory::Record,
            "views.view_1.rules.records[0]",
        );
        assert_eq!(edge.edge_type(), EdgeType::Uses);
        assert_eq!(edge.rule_category(), Some(RuleCategory::Record));

        for edge_type in EdgeType::ALL {
            assert_eq!(EdgeDetails::bare(edge_type).edge_type(), edge_type);
        }
    }

    #[test]
    fn test_edge_json_shape() {
        let json = r#"{
            "from": {"kind": "field", "key": "field_2"},
            "to": {"kind": "field", "key": "field_1"},
            "locationPath": "objects.object_1.fields.field_2.format.equation",
            "type": "derivesFrom",
            "formula": "{field_1} * 2"
        }"#;
        let edge: Edge = serde_json::from_str(json).unwrap();
        assert_eq!(edge.edge_type(), EdgeType::DerivesFrom);
        assert_eq!(edge.from_id().as_str(), "field:field_2");
        assert_eq!(
            edge.details,
            EdgeDetails::DerivesFrom { formula: Some("{field_1} * 2".to_string()) }
        );

        let back = serde_json::to_value(&edge).unwrap();
        assert_eq!(back["type"], "derivesFrom");
        assert_eq!(back["locationPath"], "objects.object_1.fields.field_2.format.equation");
    }

    #[test]
    fn test_parse_names() {
        for edge_type in EdgeType::ALL {
            assert_eq!(EdgeType::parse(edge_type.as_str()), Some(edge_type));
        }
        assert_eq!(EdgeType::parse("derives_from"), None);
    }

    #[test]
    fn test_contains_location_path() {
        let edge = Edge::contains(NodeRef::object("object_1"), NodeRef::field("field_9"));
        assert_eq!(edge.location_path, "objects.object_1.fields.field_9");
        assert_eq!(edge.edge_type(), EdgeType::Contains);
    }
}
