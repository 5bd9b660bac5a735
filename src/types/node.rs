//! Node types for the schema graph.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Kind of schema entity a node refers to.
///
/// The set is closed: every node in the graph is one of these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A record type (table).
    Object,
    /// A field belonging to an object.
    Field,
    /// A view rendering or querying fields.
    View,
    /// A scene (page) hosting views.
    Scene,
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 4] = [Self::Object, Self::Field, Self::View, Self::Scene];

    /// Parse a kind from its identity prefix.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "object" => Some(Self::Object),
            "field" => Some(Self::Field),
            "view" => Some(Self::View),
            "scene" => Some(Self::Scene),
            _ => None,
        }
    }

    /// Identity prefix used in `"{kind}:{key}"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Field => "field",
            Self::View => "view",
            Self::Scene => "scene",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a node: `"{kind}:{key}"`.
///
/// Used as map key across every component. Borrows as `str` so lookups
/// can be done with plain string slices.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Build the identity for a kind and key.
    pub fn new(kind: NodeKind, key: &str) -> Self {
        Self(format!("{}:{}", kind.as_str(), key))
    }

    /// Identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the identity back into kind and key.
    ///
    /// Returns `None` for strings that were not produced by [`NodeId::new`].
    pub fn parts(&self) -> Option<(NodeKind, &str)> {
        let (kind, key) = self.0.split_once(':')?;
        Some((NodeKind::parse(kind)?, key))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Reference to one schema entity.
///
/// Two refs denote the same node iff `kind` and `key` match; `name` is a
/// display label and takes no part in equality or hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRef {
    /// Entity kind.
    pub kind: NodeKind,
    /// Stable key from the source schema, unique within `kind`.
    pub key: String,
    /// Optional human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NodeRef {
    /// Create a node ref without a label.
    pub fn new(kind: NodeKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            name: None,
        }
    }

    /// Attach a label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Shorthand for an object node.
    pub fn object(key: impl Into<String>) -> Self {
        Self::new(NodeKind::Object, key)
    }

    /// Shorthand for a field node.
    pub fn field(key: impl Into<String>) -> Self {
        Self::new(NodeKind::Field, key)
    }

    /// Shorthand for a view node.
    pub fn view(key: impl Into<String>) -> Self {
        Self::new(NodeKind::View, key)
    }

    /// Shorthand for a scene node.
    pub fn scene(key: impl Into<String>) -> Self {
        Self::new(NodeKind::Scene, key)
    }

    /// Identity string of this node.
    pub fn id(&self) -> NodeId {
        NodeId::new(self.kind, &self.key)
    }

    /// Label if present, otherwise the key.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.key == other.key
    }
}

impl Eq for NodeRef {}

impl std::hash::Hash for NodeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.key.hash(state);
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}
