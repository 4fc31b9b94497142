#![deny(missing_docs)]

//! Hash-indexed weighted adjacency store implementing the `nat-core` contract.
//!
//! Nodes live in a separate-chaining [`BucketTable`] that doubles at a 0.75
//! load factor. Each node owns a [`NeighborList`] of `(target, weight)`
//! entries. [`GraphStore`] composes the two and, for undirected graphs, keeps
//! both halves of every edge in lockstep: a mutation whose second half fails
//! is undone, and a failed undo poisons the store with
//! [`GraphError::Corrupted`](nat_core::GraphError::Corrupted).

mod flags;
mod generators;
mod hash;
pub mod loader;
mod mirror;
mod neighbors;
mod store;
mod table;

pub use flags::{
    StoreConfig, DEFAULT_LOAD_FACTOR, DEFAULT_NEIGHBOR_CAPACITY, DEFAULT_NODE_CAPACITY,
};
pub use generators::gen_random_graph;
pub use hash::bucket_index;
pub use loader::{load_edge_list, load_edge_list_path, LoadError, LoadReport};
pub use mirror::MirrorOutcome;
pub use neighbors::{NeighborList, RemovedEdge, UpsertMode};
pub use store::GraphStore;
pub use table::{BucketTable, NodeRecord};
