use nat_core::errors::{ErrorInfo, GraphError};
use nat_core::GraphKind;
use serde::{Deserialize, Serialize};

/// Bucket count used when a store is created with a capacity of zero.
pub const DEFAULT_NODE_CAPACITY: usize = 4;

/// Neighbor-list capacity used when a node is inserted with a capacity of zero.
pub const DEFAULT_NEIGHBOR_CAPACITY: usize = 4;

/// Load factor at which the bucket table doubles.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.75;

/// Configuration options that control the behaviour of [`GraphStore`](crate::GraphStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directedness of the store.
    pub kind: GraphKind,
    /// Initial number of buckets. Zero selects [`DEFAULT_NODE_CAPACITY`].
    pub initial_capacity: usize,
    /// Neighbor-list capacity for nodes inserted with a capacity of zero.
    pub neighbor_capacity: usize,
    /// Ratio of live nodes to buckets that triggers a resize. Must lie in `(0, 1]`.
    pub load_factor: f64,
    /// Upper bound on the bucket count; growth past it reports `OutOfMemory`.
    pub max_node_capacity: Option<usize>,
    /// Upper bound on any neighbor-list capacity; growth past it reports `OutOfMemory`.
    pub max_neighbor_capacity: Option<usize>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: GraphKind::Undirected,
            initial_capacity: DEFAULT_NODE_CAPACITY,
            neighbor_capacity: DEFAULT_NEIGHBOR_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
            max_node_capacity: None,
            max_neighbor_capacity: None,
        }
    }
}

impl StoreConfig {
    /// Returns the default configuration for the given kind and bucket count.
    pub fn new(kind: GraphKind, initial_capacity: usize) -> Self {
        Self {
            kind,
            initial_capacity,
            ..Self::default()
        }
    }

    /// Bucket count actually allocated at creation.
    pub fn effective_capacity(&self) -> usize {
        if self.initial_capacity == 0 {
            DEFAULT_NODE_CAPACITY
        } else {
            self.initial_capacity
        }
    }

    /// Neighbor capacity actually allocated for a requested capacity.
    pub fn effective_neighbor_capacity(&self, requested: usize) -> usize {
        match (requested, self.neighbor_capacity) {
            (0, 0) => DEFAULT_NEIGHBOR_CAPACITY,
            (0, configured) => configured,
            (requested, _) => requested,
        }
    }

    /// Checks that the configuration describes a usable store.
    pub fn validate(&self) -> Result<(), GraphError> {
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(GraphError::InvalidArgument(
                ErrorInfo::new("invalid-load-factor", "load factor must lie in (0, 1]")
                    .with_context("load_factor", self.load_factor),
            ));
        }
        if let Some(max) = self.max_node_capacity {
            if max < self.effective_capacity() {
                return Err(GraphError::InvalidArgument(
                    ErrorInfo::new(
                        "invalid-node-budget",
                        "node capacity budget is smaller than the initial capacity",
                    )
                    .with_context("max_node_capacity", max)
                    .with_context("initial_capacity", self.effective_capacity()),
                ));
            }
        }
        Ok(())
    }
}
