//! Serialized graph documents.
//!
//! A document carries nodes and edges that the ingestion side has already
//! resolved. Loading one only replays `add_node` / `add_edge`.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::types::{Edge, NodeRef};

use super::GraphStore;

/// Error type for document loading.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Malformed JSON or unexpected shape.
    #[error("Invalid graph document: {0}")]
    Json(#[from] serde_json::Error),
    /// Reader failure.
    #[error("Failed to read graph document: {0}")]
    Io(#[from] std::io::Error),
}

/// Nodes and edges of one schema snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes, inserted first and in order.
    #[serde(default)]
    pub nodes: Vec<NodeRef>,
    /// Edges, inserted after all nodes and in order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    /// Parse a document from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a document from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DocumentError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }
}

impl GraphStore {
    /// Build a store from a document.
    pub fn from_document(doc: GraphDocument) -> Self {
        let mut store = Self::new();
        for node in doc.nodes {
            store.add_node(node);
        }
        for edge in doc.edges {
            store.add_edge(edge);
        }
        tracing::debug!(
            nodes = store.num_nodes(),
            edges = store.num_edges(),
            "graph store built from document"
        );
        store
    }

    /// Export the store back into a document.
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.all_nodes().to_vec(),
            edges: self.all_edges().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EdgeType;

    const DOC: &str = r#"{
        "nodes": [
            {"kind": "object", "key": "object_1", "name": "Orders"},
            {"kind": "field", "key": "field_1", "name": "Price"},
            {"kind": "field", "key": "field_2", "name": "Total"}
        ],
        "edges": [
            {"from": {"kind": "object", "key": "object_1"},
             "to": {"kind": "field", "key": "field_1"},
             "locationPath": "objects.object_1.fields.field_1", "type": "contains"},
            {"from": {"kind": "field", "key": "field_2"},
             "to": {"kind": "field", "key": "field_1"},
             "locationPath": "objects.object_1.fields.field_2.format.equation",
             "type": "derivesFrom"},
            {"from": {"kind": "view", "key": "view_4"},
             "to": {"kind": "field", "key": "field_2"},
             "locationPath": "scenes.scene_1.views.view_4.source.criteria[0]",
             "type": "filtersBy", "operator": "is"}
        ]
    }"#;

    #[test]
    fn test_load_document() {
        let doc = GraphDocument::from_json_str(DOC).unwrap();
        let store = GraphStore::from_document(doc);

        // view_4 is registered implicitly by its edge.
        assert_eq!(store.num_nodes(), 4);
        assert_eq!(store.num_edges(), 3);
        assert_eq!(store.get_node("object:object_1").unwrap().display_name(), "Orders");
        assert_eq!(
            store.get_outgoing("view:view_4").next().unwrap().edge_type(),
            EdgeType::FiltersBy
        );
    }

    #[test]
    fn test_document_roundtrip_preserves_snapshot() {
        let store = GraphStore::from_document(GraphDocument::from_json_str(DOC).unwrap());
        let again = GraphStore::from_document(store.to_document());
        assert_eq!(store.snapshot(), again.snapshot());
    }

    #[test]
    fn test_malformed_document() {
        let err = GraphDocument::from_json_str(r#"{"edges": [{"type": "bogus"}]}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }
}
