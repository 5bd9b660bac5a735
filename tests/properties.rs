//! Property tests over randomly generated schema graphs.

use std::collections::HashSet;

use proptest::prelude::*;
use schema_graph_kernel::{
    build_field_ripple, compute_complexity, ComplexityConfig, Edge, EdgeDetails, EdgeType,
    GraphStore, NodeId, NodeKind, NodeRef, RippleOptions,
};

const KEYS: usize = 6;

fn node(kind: usize, key: usize) -> NodeRef {
    NodeRef::new(NodeKind::ALL[kind % NodeKind::ALL.len()], format!("k{key}"))
}

fn arb_edge() -> impl Strategy<Value = Edge> {
    (0..4usize, 0..KEYS, 0..4usize, 0..KEYS, 0..EdgeType::ALL.len(), prop::bool::ANY).prop_map(
        |(fk, fkey, tk, tkey, t, generic)| {
            let path = if generic {
                format!("views.k{fkey}.columns[{tkey}]")
            } else {
                format!("views.k{fkey}.rules.records[{tkey}]")
            };
            Edge::new(
                node(fk, fkey),
                node(tk, tkey),
                path,
                EdgeDetails::bare(EdgeType::ALL[t]),
            )
        },
    )
}

/// Derivation-only graphs among fields, cycles allowed.
fn arb_derivations() -> impl Strategy<Value = Vec<Edge>> {
    prop::collection::vec((0..KEYS, 0..KEYS), 0..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(a, b)| {
                Edge::derives_from(
                    NodeRef::field(format!("k{a}")),
                    NodeRef::field(format!("k{b}")),
                    "",
                )
            })
            .collect()
    })
}

fn build(edges: &[Edge]) -> GraphStore {
    let mut store = GraphStore::new();
    for edge in edges {
        store.add_edge(edge.clone());
    }
    store
}

fn impacted_ids(store: &GraphStore, key: &str, max_depth: u32) -> HashSet<NodeId> {
    build_field_ripple(store, key, &RippleOptions::with_max_depth(max_depth))
        .impacted()
        .map(|n| n.node.id())
        .collect()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn identity_collapses_duplicates(kind in 0..4usize, key in 0..KEYS, name in "[a-z]{1,8}") {
        let mut store = GraphStore::new();
        let first = store.add_node(node(kind, key));
        let second = store.add_node(node(kind, key).with_name(name.clone()));
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(store.num_nodes(), 1);
        prop_assert_eq!(store.all_nodes()[0].name.as_deref(), Some(name.as_str()));
    }

    #[test]
    fn incoming_outgoing_symmetry(edges in prop::collection::vec(arb_edge(), 0..30)) {
        let store = build(&edges);

        for (i, edge) in store.all_edges().iter().enumerate() {
            let out: Vec<usize> = store
                .outgoing_indexed(edge.from_id().as_str())
                .map(|(idx, _)| idx.index())
                .collect();
            let inc: Vec<usize> = store
                .incoming_indexed(edge.to_id().as_str())
                .map(|(idx, _)| idx.index())
                .collect();
            prop_assert!(out.contains(&i));
            prop_assert!(inc.contains(&i));
        }

        let total_out: usize = store
            .all_nodes()
            .iter()
            .map(|n| store.get_outgoing(n.id().as_str()).count())
            .sum();
        let total_in: usize = store
            .all_nodes()
            .iter()
            .map(|n| store.get_incoming(n.id().as_str()).count())
            .sum();
        prop_assert_eq!(total_out, store.num_edges());
        prop_assert_eq!(total_in, store.num_edges());
    }

    #[test]
    fn ripple_depth_is_bounded(
        edges in prop::collection::vec(arb_edge(), 0..40),
        key in 0..KEYS,
        max_depth in 0..6u32,
    ) {
        let store = build(&edges);
        let options = RippleOptions::with_max_depth(max_depth);
        let result = build_field_ripple(&store, &format!("k{key}"), &options);

        for impacted in result.impacted() {
            prop_assert!(impacted.depth >= 1);
            prop_assert!(impacted.depth <= max_depth);
        }
        prop_assert!(!result.contains(result.root.id().as_str()));
        prop_assert!(result.total_impacted() < store.num_nodes().max(1));
    }

    #[test]
    fn ripple_is_monotone_in_depth(
        edges in prop::collection::vec(arb_edge(), 0..40),
        key in 0..KEYS,
        k in 0..5u32,
    ) {
        let store = build(&edges);
        let key = format!("k{key}");
        let smaller = impacted_ids(&store, &key, k);
        let larger = impacted_ids(&store, &key, k + 1);
        prop_assert!(smaller.is_subset(&larger));
    }

    #[test]
    fn scc_partitions_selected_endpoints(edges in prop::collection::vec(arb_edge(), 0..40)) {
        let store = build(&edges);
        let comps = store.strongly_connected_components(&[EdgeType::DerivesFrom]);

        let endpoints: HashSet<NodeId> = store
            .all_edges()
            .iter()
            .filter(|e| e.edge_type() == EdgeType::DerivesFrom)
            .flat_map(|e| [e.from_id(), e.to_id()])
            .collect();

        let mut seen = HashSet::new();
        for comp in &comps {
            prop_assert!(!comp.is_empty());
            for id in comp {
                prop_assert!(seen.insert(id.clone()), "{} in two components", id);
            }
        }
        prop_assert_eq!(seen, endpoints);
    }

    #[test]
    fn topological_order_respects_edges(edges in arb_derivations()) {
        let store = build(&edges);
        match store.topological_sort(&[EdgeType::DerivesFrom]) {
            Ok(order) => {
                prop_assert_eq!(order.len(), store.num_nodes());
                let pos = |id: &NodeId| order.iter().position(|o| o == id);
                for edge in store.all_edges() {
                    prop_assert!(pos(&edge.from_id()) < pos(&edge.to_id()));
                }
                prop_assert!(store.cyclic_components(&[EdgeType::DerivesFrom]).is_empty());
            }
            Err(_) => {
                prop_assert!(!store.cyclic_components(&[EdgeType::DerivesFrom]).is_empty());
            }
        }
    }

    #[test]
    fn chain_depth_terminates_and_is_bounded(edges in arb_derivations(), key in 0..KEYS) {
        let store = build(&edges);
        let config = ComplexityConfig::default();
        let score = compute_complexity(&store, &NodeRef::field(format!("k{key}")), &config);
        let depth = score.feature("derivation_depth").map(|f| f.raw).unwrap_or(0.0);
        prop_assert!(depth <= store.num_nodes() as f64);
        prop_assert!(score.score.is_finite());
    }

    #[test]
    fn snapshot_ignores_insertion_order(edges in prop::collection::vec(arb_edge(), 0..30)) {
        let forward = build(&edges);
        let reversed: Vec<Edge> = edges.iter().rev().cloned().collect();
        let backward = build(&reversed);
        prop_assert_eq!(forward.snapshot().snapshot_id, backward.snapshot().snapshot_id);
    }
}
