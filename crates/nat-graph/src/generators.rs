use nat_core::errors::{ErrorInfo, GraphError};
use nat_core::rng::RngHandle;
use nat_core::{Graph, GraphKind, NodeId};

use crate::store::GraphStore;

/// Builds a store with nodes `0..n_nodes` and up to `n_edges` random edges.
///
/// Endpoints are drawn uniformly without self-loops; duplicates are skipped
/// and retried up to a fixed attempt budget, so dense requests may yield fewer
/// edges. Weights come from an independent substream in `[0.1, 10.0)`.
pub fn gen_random_graph(
    kind: GraphKind,
    n_nodes: usize,
    n_edges: usize,
    rng: &mut RngHandle,
) -> Result<GraphStore, GraphError> {
    if n_nodes < 2 {
        return Err(GraphError::InvalidArgument(
            ErrorInfo::new("too-few-nodes", "random graphs need at least two nodes")
                .with_context("nodes", n_nodes),
        ));
    }
    let mut weights = rng.substream(1);
    let mut graph = GraphStore::new(kind, n_nodes)?;
    for raw in 0..n_nodes {
        graph.insert_node(NodeId::from_raw(raw as i64), 0)?;
    }

    let max_attempts = n_edges.saturating_mul(8).max(16);
    let mut added = 0usize;
    for _ in 0..max_attempts {
        if added == n_edges {
            break;
        }
        let from = rng.index(n_nodes);
        let to = rng.index(n_nodes);
        if from == to {
            continue;
        }
        let weight = weights.weight(0.1, 10.0);
        match graph.insert_edge(
            NodeId::from_raw(from as i64),
            NodeId::from_raw(to as i64),
            weight,
        ) {
            Ok(()) => added += 1,
            Err(GraphError::AlreadyExists(_)) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(graph)
}
