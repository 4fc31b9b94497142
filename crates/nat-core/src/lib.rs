#![deny(missing_docs)]
#![doc = "Identifiers, error taxonomy and the mutation contract shared by the NAT graph store."]

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod rng;

pub use errors::{ErrorInfo, GraphError, Severity};
pub use rng::{derive_substream_seed, RngHandle};

/// Caller-chosen identifier of a node. Unique within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(i64);

impl NodeId {
    /// Creates a new identifier from its raw integer representation.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub const fn as_raw(&self) -> i64 {
        self.0
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directedness of a store, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    /// Every edge is mirrored into both endpoints' neighbor lists.
    #[default]
    Undirected,
    /// Edges are stored only on their source node.
    Directed,
}

impl GraphKind {
    /// Returns true for [`GraphKind::Directed`].
    pub fn is_directed(&self) -> bool {
        matches!(self, GraphKind::Directed)
    }
}

/// One live entry of a neighbor list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeRef {
    /// Node the edge points at.
    pub target: NodeId,
    /// Edge weight. Always finite for live entries.
    pub weight: f64,
}

impl EdgeRef {
    /// Creates a new edge entry.
    pub const fn new(target: NodeId, weight: f64) -> Self {
        Self { target, weight }
    }
}

/// Public mutation and count contract of a weighted adjacency store.
///
/// Every mutation is all-or-nothing: an `Err` other than
/// [`GraphError::Corrupted`] leaves the store exactly as it was before the call.
pub trait Graph {
    /// Returns the directedness of the store.
    fn kind(&self) -> GraphKind;

    /// Returns true when a node with this identifier is live.
    fn contains_node(&self, id: NodeId) -> bool;

    /// Inserts an isolated node. A `neighbor_capacity` of zero selects the store default.
    fn insert_node(&mut self, id: NodeId, neighbor_capacity: usize) -> Result<(), GraphError>;

    /// Removes a node and every edge touching it.
    fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError>;

    /// Inserts a new edge; mirrored in undirected stores.
    fn insert_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<(), GraphError>;

    /// Overwrites the weight of an existing edge and returns the previous weight.
    fn update_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<f64, GraphError>;

    /// Removes an existing edge and returns its weight.
    fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Result<f64, GraphError>;

    /// Returns the number of live nodes.
    fn node_count(&self) -> usize;

    /// Returns the number of logical edges.
    fn edge_count(&self) -> usize;
}
