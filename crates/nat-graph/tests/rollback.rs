use nat_core::errors::GraphError;
use nat_core::{EdgeRef, Graph, GraphKind, NodeId};
use nat_graph::{GraphStore, StoreConfig};

fn n(raw: i64) -> NodeId {
    NodeId::from_raw(raw)
}

/// Undirected store whose neighbor lists can never hold more than one entry.
fn single_slot_store(ids: &[i64]) -> GraphStore {
    let config = StoreConfig {
        neighbor_capacity: 1,
        max_neighbor_capacity: Some(1),
        ..StoreConfig::default()
    };
    let mut store = GraphStore::with_config(config).unwrap();
    for raw in ids {
        store.insert_node(n(*raw), 0).unwrap();
    }
    store
}

fn snapshot(store: &GraphStore) -> Vec<Vec<EdgeRef>> {
    store
        .node_ids()
        .iter()
        .map(|id| store.neighbors(*id).unwrap().to_vec())
        .collect()
}

#[test]
fn mirror_out_of_memory_rolls_back_forward_half() {
    let mut store = single_slot_store(&[1, 2, 3]);
    store.insert_edge(n(2), n(3), 1.0).unwrap();
    let before = snapshot(&store);

    // 1 has room, 2 does not: the forward half lands, the mirror half fails.
    let err = store.insert_edge(n(1), n(2), 7.0).unwrap_err();
    assert!(matches!(err, GraphError::OutOfMemory(_)));
    assert!(!err.is_fatal());
    let context = &err.info().context;
    assert_eq!(context.get("phase"), Some(&"mirror".to_string()));
    assert_eq!(context.get("rollback"), Some(&"applied".to_string()));
    assert_eq!(context.get("operation"), Some(&"insert_edge".to_string()));

    assert_eq!(snapshot(&store), before);
    assert_eq!(store.edge_count(), 1);
    assert!(!store.is_corrupted());
    store.check_symmetry().unwrap();

    // The store stays usable after a rolled-back call.
    store.remove_edge(n(2), n(3)).unwrap();
    store.insert_edge(n(1), n(2), 7.0).unwrap();
    assert_eq!(store.edge_weight(n(2), n(1)), Some(7.0));
}

#[test]
fn forward_out_of_memory_changes_nothing() {
    let mut store = single_slot_store(&[1, 2, 3]);
    store.insert_edge(n(1), n(2), 1.0).unwrap();
    let before = snapshot(&store);

    let err = store.insert_edge(n(1), n(3), 1.0).unwrap_err();
    assert!(matches!(err, GraphError::OutOfMemory(_)));
    assert_eq!(err.info().context.get("phase"), None);
    assert_eq!(snapshot(&store), before);
}

#[test]
fn directed_store_has_no_mirror_to_fail() {
    let config = StoreConfig {
        kind: GraphKind::Directed,
        neighbor_capacity: 1,
        max_neighbor_capacity: Some(1),
        ..StoreConfig::default()
    };
    let mut store = GraphStore::with_config(config).unwrap();
    for raw in 1..=2 {
        store.insert_node(n(raw), 0).unwrap();
    }
    store.insert_edge(n(2), n(1), 1.0).unwrap();
    store.insert_edge(n(1), n(2), 1.0).unwrap();
    assert_eq!(store.edge_count(), 2);
}

#[test]
fn neighbor_lists_grow_up_to_the_budget() {
    let config = StoreConfig {
        neighbor_capacity: 1,
        max_neighbor_capacity: Some(3),
        ..StoreConfig::default()
    };
    let mut store = GraphStore::with_config(config).unwrap();
    for raw in 0..5 {
        store.insert_node(n(raw), 0).unwrap();
    }
    for raw in 1..=3 {
        store.insert_edge(n(0), n(raw), 1.0).unwrap();
    }
    assert_eq!(store.find(n(0)).unwrap().neighbors().capacity(), 3);

    let err = store.insert_edge(n(0), n(4), 1.0).unwrap_err();
    assert!(matches!(err, GraphError::OutOfMemory(_)));
    assert_eq!(err.info().context.get("limit"), Some(&"3".to_string()));
    assert_eq!(store.degree(n(4)), Some(0));
}
