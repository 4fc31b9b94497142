use nat_core::errors::{ErrorInfo, GraphError};
use nat_core::{EdgeRef, Graph, GraphKind, NodeId};
use tracing::{debug, error, warn};

use crate::flags::StoreConfig;
use crate::mirror::{apply_mirrored, MirrorOutcome};
use crate::neighbors::{NeighborList, UpsertMode};
use crate::table::{BucketTable, NodeRecord};

/// Hash-indexed weighted adjacency store.
///
/// Undirected stores keep every edge as two mirrored entries, one in each
/// endpoint's neighbor list, and every mutation either applies both halves
/// or neither. When neither can be guaranteed the store reports
/// [`GraphError::Corrupted`] and refuses all further mutations.
#[derive(Debug, Clone)]
pub struct GraphStore {
    config: StoreConfig,
    table: BucketTable,
    node_ids: Vec<NodeId>,
    poisoned: Option<ErrorInfo>,
}

impl GraphStore {
    /// Creates an empty store of the given kind. A capacity of zero selects the default.
    pub fn new(kind: GraphKind, initial_capacity: usize) -> Result<Self, GraphError> {
        Self::with_config(StoreConfig::new(kind, initial_capacity))
    }

    /// Creates an empty store from a full configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self, GraphError> {
        config.validate()?;
        let table = BucketTable::with_capacity(config.effective_capacity())?;
        Ok(Self {
            config,
            table,
            node_ids: Vec::new(),
            poisoned: None,
        })
    }

    /// Returns the configuration used by this store.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of buckets currently allocated.
    pub fn node_capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Live node identifiers in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    /// Returns true when the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Read access to the underlying bucket table.
    pub fn table(&self) -> &BucketTable {
        &self.table
    }

    /// Looks up the record of a live node.
    pub fn find(&self, id: NodeId) -> Option<&NodeRecord> {
        self.table.find(id)
    }

    /// Outgoing edges of a node, or `None` when the node is absent.
    pub fn neighbors(&self, id: NodeId) -> Option<&[EdgeRef]> {
        self.table.find(id).map(|record| record.neighbors().as_slice())
    }

    /// Weight of the edge `from -> to`, if present.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<f64> {
        self.table.find(from)?.neighbors().weight_of(to)
    }

    /// Number of entries in a node's neighbor list.
    pub fn degree(&self, id: NodeId) -> Option<usize> {
        self.table.find(id).map(|record| record.neighbors().len())
    }

    /// Returns true once a mutation has reported [`GraphError::Corrupted`].
    pub fn is_corrupted(&self) -> bool {
        self.poisoned.is_some()
    }

    /// Audits the mirrored-edge invariant across the whole store.
    ///
    /// Directed stores always pass. The first entry without an identical
    /// mirror is reported as [`GraphError::Corrupted`].
    pub fn check_symmetry(&self) -> Result<(), GraphError> {
        if self.config.kind.is_directed() {
            return Ok(());
        }
        for record in self.table.records() {
            for edge in record.neighbors().as_slice() {
                if edge.target == record.id() {
                    continue;
                }
                let mirrored = self
                    .table
                    .find(edge.target)
                    .and_then(|other| other.neighbors().weight_of(record.id()));
                if mirrored != Some(edge.weight) {
                    return Err(GraphError::Corrupted(
                        ErrorInfo::new("asymmetric-edge", "edge has no identical mirror")
                            .with_context("from", record.id())
                            .with_context("to", edge.target)
                            .with_context("weight", edge.weight),
                    ));
                }
            }
        }
        Ok(())
    }

    fn ensure_healthy(&self) -> Result<(), GraphError> {
        match &self.poisoned {
            None => Ok(()),
            Some(cause) => Err(GraphError::Corrupted(
                ErrorInfo::new("store-poisoned", "store was corrupted by an earlier call")
                    .with_context("cause", &cause.code)
                    .with_hint("drop the store and rebuild it"),
            )),
        }
    }

    fn poison(&mut self, err: GraphError) -> GraphError {
        error!(code = %err.code(), error = %err, "store.corrupted");
        self.poisoned = Some(err.info().clone());
        err
    }

    fn ensure_node(&self, id: NodeId, role: &str) -> Result<(), GraphError> {
        if self.table.find(id).is_some() {
            return Ok(());
        }
        Err(GraphError::NotFound(
            ErrorInfo::new("unknown-node", "node does not exist")
                .with_context("node", id)
                .with_context("endpoint", role),
        ))
    }

    fn has_entry(&self, from: NodeId, to: NodeId) -> bool {
        self.table
            .find(from)
            .is_some_and(|record| record.neighbors().contains(to))
    }

    fn resize_if_needed(&mut self) -> Result<(), GraphError> {
        if !self.table.needs_resize(self.config.load_factor) {
            return Ok(());
        }
        let current = self.table.capacity();
        let doubled = current.saturating_mul(2);
        let target = match self.config.max_node_capacity {
            Some(max) if current >= max => {
                return Err(GraphError::OutOfMemory(
                    ErrorInfo::new("node-budget", "node capacity budget exhausted")
                        .with_context("capacity", current)
                        .with_context("limit", max),
                ));
            }
            Some(max) => doubled.min(max),
            None => doubled,
        };
        self.table.rehash(target)?;
        debug!(from = current, to = target, nodes = self.table.len(), "store.resize");
        Ok(())
    }

    fn settle<T>(
        &mut self,
        operation: &'static str,
        from: NodeId,
        to: NodeId,
        outcome: MirrorOutcome<T>,
    ) -> Result<T, GraphError> {
        match outcome {
            MirrorOutcome::Committed(value) => Ok(value),
            MirrorOutcome::RolledBack(GraphError::AlreadyExists(info)) => {
                // The forward side was free but the mirror side was not.
                let err = GraphError::Corrupted(
                    ErrorInfo::new("one-sided-duplicate", "mirror entry exists without its pair")
                        .with_context("operation", operation)
                        .with_context("from", from)
                        .with_context("to", to)
                        .with_context("mirror_code", info.code)
                        .with_context("rollback", "applied"),
                );
                Err(self.poison(err))
            }
            MirrorOutcome::RolledBack(mirror) => {
                warn!(
                    operation,
                    from = %from,
                    to = %to,
                    error = %mirror,
                    "store.mirror.rolled_back"
                );
                Err(mirror
                    .with_context("operation", operation)
                    .with_context("phase", "mirror")
                    .with_context("rollback", "applied"))
            }
            MirrorOutcome::Corrupted { mirror, rollback } => {
                let err = GraphError::Corrupted(
                    ErrorInfo::new("rollback-failed", "could not undo the forward half")
                        .with_context("operation", operation)
                        .with_context("from", from)
                        .with_context("to", to)
                        .with_context("phase", "rollback")
                        .with_context("mirror_code", mirror.code())
                        .with_context("rollback_code", rollback.code()),
                );
                Err(self.poison(err))
            }
        }
    }
}

impl Graph for GraphStore {
    fn kind(&self) -> GraphKind {
        self.config.kind
    }

    fn contains_node(&self, id: NodeId) -> bool {
        self.table.find(id).is_some()
    }

    fn insert_node(&mut self, id: NodeId, neighbor_capacity: usize) -> Result<(), GraphError> {
        self.ensure_healthy()?;
        if self.table.find(id).is_some() {
            return Err(GraphError::AlreadyExists(
                ErrorInfo::new("duplicate-node", "node already exists").with_context("node", id),
            ));
        }
        self.resize_if_needed()?;
        let capacity = self.config.effective_neighbor_capacity(neighbor_capacity);
        let neighbors = NeighborList::with_capacity(capacity, self.config.max_neighbor_capacity)
            .map_err(|err| err.with_context("node", id))?;
        self.node_ids.try_reserve(1).map_err(|err| {
            GraphError::OutOfMemory(
                ErrorInfo::new("node-index-alloc", "failed to grow node index")
                    .with_context("node", id)
                    .with_context("reason", err),
            )
        })?;
        self.table.insert(NodeRecord::new(id, neighbors))?;
        self.node_ids.push(id);
        Ok(())
    }

    fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        self.ensure_healthy()?;
        let record = self.table.find(id).ok_or_else(|| {
            GraphError::NotFound(
                ErrorInfo::new("unknown-node", "node does not exist").with_context("node", id),
            )
        })?;

        if self.config.kind.is_directed() {
            for other in self.table.records_mut() {
                other.neighbors_mut().purge(id);
            }
            self.table.delete(id)?;
        } else {
            // Every back-edge must be present before any is touched.
            for edge in record.neighbors().as_slice() {
                if edge.target == id {
                    continue;
                }
                let mirrored = self
                    .table
                    .find(edge.target)
                    .is_some_and(|other| other.neighbors().contains(id));
                if !mirrored {
                    let err = GraphError::Corrupted(
                        ErrorInfo::new("asymmetric-edge", "back-edge missing during node removal")
                            .with_context("node", id)
                            .with_context("neighbor", edge.target),
                    );
                    return Err(self.poison(err));
                }
            }
            let removed = self.table.delete(id)?;
            for edge in removed.neighbors().as_slice() {
                if edge.target == id {
                    continue;
                }
                let outcome = match self.table.find_mut(edge.target) {
                    Some(other) => other.neighbors_mut().remove(id).map(|_| ()),
                    None => Err(GraphError::NotFound(
                        ErrorInfo::new("unknown-node", "node does not exist")
                            .with_context("node", edge.target),
                    )),
                };
                if let Err(cause) = outcome {
                    let err = GraphError::Corrupted(
                        ErrorInfo::new("back-edge-removal", "failed to remove a validated back-edge")
                            .with_context("node", id)
                            .with_context("neighbor", edge.target)
                            .with_context("cause", cause.code()),
                    );
                    return Err(self.poison(err));
                }
            }
        }
        self.node_ids.retain(|live| *live != id);
        Ok(())
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<(), GraphError> {
        self.ensure_healthy()?;
        ensure_weight(weight)?;
        self.ensure_node(from, "from")?;
        self.ensure_node(to, "to")?;
        let mirrored = !self.config.kind.is_directed() && from != to;
        let outcome = match apply_mirrored(
            &mut self.table,
            mirrored,
            |table| list_mut(table, from)?.upsert(to, weight, UpsertMode::InsertOnly),
            |table, _| list_mut(table, to)?.upsert(from, weight, UpsertMode::InsertOnly),
            |table, _| list_mut(table, from)?.remove(to).map(|_| ()),
        ) {
            Ok(outcome) => outcome,
            Err(GraphError::AlreadyExists(info)) if mirrored && !self.has_entry(to, from) => {
                // The forward side is taken but its mirror is missing.
                let err = GraphError::Corrupted(
                    ErrorInfo::new("one-sided-duplicate", "edge entry exists without its mirror")
                        .with_context("operation", "insert_edge")
                        .with_context("from", from)
                        .with_context("to", to)
                        .with_context("forward_code", info.code),
                );
                return Err(self.poison(err));
            }
            Err(err) => return Err(err.with_context("from", from).with_context("to", to)),
        };
        self.settle("insert_edge", from, to, outcome).map(|_| ())
    }

    fn update_edge(&mut self, from: NodeId, to: NodeId, weight: f64) -> Result<f64, GraphError> {
        self.ensure_healthy()?;
        ensure_weight(weight)?;
        self.ensure_node(from, "from")?;
        self.ensure_node(to, "to")?;
        let mirrored = !self.config.kind.is_directed() && from != to;
        let outcome = apply_mirrored(
            &mut self.table,
            mirrored,
            |table| {
                let previous = list_mut(table, from)?.upsert(to, weight, UpsertMode::UpdateOnly)?;
                Ok(previous.unwrap_or(weight))
            },
            |table, _| list_mut(table, to)?.upsert(from, weight, UpsertMode::UpdateOnly),
            |table, previous| {
                list_mut(table, from)?
                    .upsert(to, *previous, UpsertMode::UpdateOnly)
                    .map(|_| ())
            },
        )
        .map_err(|err| err.with_context("from", from).with_context("to", to))?;
        self.settle("update_edge", from, to, outcome)
    }

    fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Result<f64, GraphError> {
        self.ensure_healthy()?;
        self.ensure_node(from, "from")?;
        self.ensure_node(to, "to")?;
        let mirrored = !self.config.kind.is_directed() && from != to;
        let outcome = apply_mirrored(
            &mut self.table,
            mirrored,
            |table| list_mut(table, from)?.remove(to),
            |table, _| list_mut(table, to)?.remove(from),
            |table, removed| list_mut(table, from)?.restore(to, *removed),
        )
        .map_err(|err| err.with_context("from", from).with_context("to", to))?;
        self.settle("remove_edge", from, to, outcome)
            .map(|removed| removed.weight)
    }

    fn node_count(&self) -> usize {
        self.table.len()
    }

    fn edge_count(&self) -> usize {
        let mut entries = 0usize;
        let mut loops = 0usize;
        for record in self.table.records() {
            let neighbors = record.neighbors();
            entries += neighbors.len();
            if neighbors.contains(record.id()) {
                loops += 1;
            }
        }
        match self.config.kind {
            GraphKind::Directed => entries,
            GraphKind::Undirected => (entries - loops) / 2 + loops,
        }
    }
}

fn list_mut(table: &mut BucketTable, id: NodeId) -> Result<&mut NeighborList, GraphError> {
    table
        .find_mut(id)
        .map(NodeRecord::neighbors_mut)
        .ok_or_else(|| {
            GraphError::NotFound(
                ErrorInfo::new("unknown-node", "node does not exist").with_context("node", id),
            )
        })
}

fn ensure_weight(weight: f64) -> Result<(), GraphError> {
    if weight.is_finite() {
        return Ok(());
    }
    Err(GraphError::InvalidArgument(
        ErrorInfo::new("non-finite-weight", "edge weight must be finite")
            .with_context("weight", weight),
    ))
}

#[cfg(test)]
mod tests {
    use nat_core::errors::{ErrorInfo, GraphError};
    use nat_core::{Graph, GraphKind, NodeId};

    use super::{list_mut, GraphStore};
    use crate::mirror::MirrorOutcome;

    fn n(raw: i64) -> NodeId {
        NodeId::from_raw(raw)
    }

    /// Undirected triangle 1-2-3 whose 1 -> 2 half has been dropped behind the store's back.
    fn asymmetric_store() -> GraphStore {
        let mut store = GraphStore::new(GraphKind::Undirected, 0).unwrap();
        for raw in 1..=3 {
            store.insert_node(n(raw), 0).unwrap();
        }
        store.insert_edge(n(1), n(2), 1.5).unwrap();
        store.insert_edge(n(2), n(3), 2.0).unwrap();
        store.insert_edge(n(3), n(1), 0.8).unwrap();
        list_mut(&mut store.table, n(1)).unwrap().remove(n(2)).unwrap();
        store
    }

    fn snapshot(store: &GraphStore) -> Vec<(NodeId, Vec<(NodeId, f64)>)> {
        store
            .node_ids()
            .iter()
            .map(|id| {
                let edges = store
                    .neighbors(*id)
                    .unwrap()
                    .iter()
                    .map(|edge| (edge.target, edge.weight))
                    .collect();
                (*id, edges)
            })
            .collect()
    }

    #[test]
    fn audit_finds_the_missing_half() {
        let store = asymmetric_store();
        let err = store.check_symmetry().unwrap_err();
        assert_eq!(err.code(), "asymmetric-edge");
        assert_eq!(err.info().context.get("from"), Some(&"2".to_string()));
        assert_eq!(err.info().context.get("to"), Some(&"1".to_string()));
    }

    #[test]
    fn update_with_missing_mirror_restores_previous_weight() {
        let mut store = asymmetric_store();
        let before = snapshot(&store);
        let err = store.update_edge(n(2), n(1), 9.0).unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
        assert_eq!(err.info().context.get("rollback"), Some(&"applied".to_string()));
        assert_eq!(err.info().context.get("phase"), Some(&"mirror".to_string()));
        assert_eq!(snapshot(&store), before);
        assert_eq!(store.edge_weight(n(2), n(1)), Some(1.5));
        assert!(!store.is_corrupted());
    }

    #[test]
    fn remove_with_missing_mirror_restores_entry_in_place() {
        let mut store = asymmetric_store();
        let before = snapshot(&store);
        let err = store.remove_edge(n(2), n(1)).unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
        assert_eq!(err.info().context.get("rollback"), Some(&"applied".to_string()));
        assert_eq!(snapshot(&store), before);
        assert!(!store.is_corrupted());
    }

    #[test]
    fn one_sided_duplicate_on_insert_poisons_the_store() {
        let mut store = asymmetric_store();
        let before = snapshot(&store);
        let err = store.insert_edge(n(1), n(2), 4.0).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "one-sided-duplicate");
        assert_eq!(snapshot(&store), before);
        assert!(store.is_corrupted());

        let next = store.insert_node(n(4), 0).unwrap_err();
        assert_eq!(next.code(), "store-poisoned");
        assert_eq!(next.info().context.get("cause"), Some(&"one-sided-duplicate".to_string()));
        assert_eq!(store.node_count(), 3);
    }

    #[test]
    fn one_sided_duplicate_on_forward_side_poisons_the_store() {
        let mut store = asymmetric_store();
        let before = snapshot(&store);
        let err = store.insert_edge(n(2), n(1), 4.0).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.code(), "one-sided-duplicate");
        assert_eq!(err.info().context.get("forward_code"), Some(&"duplicate-edge".to_string()));
        assert_eq!(snapshot(&store), before);
        assert!(store.is_corrupted());
        assert_eq!(store.insert_node(n(4), 0).unwrap_err().code(), "store-poisoned");
    }

    #[test]
    fn symmetric_duplicate_is_only_a_warning() {
        let mut store = asymmetric_store();
        let err = store.insert_edge(n(2), n(3), 4.0).unwrap_err();
        assert!(matches!(err, GraphError::AlreadyExists(_)));
        assert!(!store.is_corrupted());
        assert_eq!(store.edge_weight(n(3), n(2)), Some(2.0));
    }

    #[test]
    fn remove_node_with_missing_back_edge_changes_nothing() {
        let mut store = asymmetric_store();
        let before = snapshot(&store);
        let err = store.remove_node(n(2)).unwrap_err();
        assert_eq!(err.code(), "asymmetric-edge");
        assert_eq!(err.info().context.get("neighbor"), Some(&"1".to_string()));
        assert_eq!(snapshot(&store), before);
        assert!(store.contains_node(n(2)));
        assert!(store.is_corrupted());
    }

    #[test]
    fn failed_rollback_is_fatal_and_sticky() {
        let mut store = GraphStore::new(GraphKind::Undirected, 0).unwrap();
        store.insert_node(n(1), 0).unwrap();
        let outcome: MirrorOutcome<()> = MirrorOutcome::Corrupted {
            mirror: GraphError::OutOfMemory(ErrorInfo::new("neighbor-alloc", "forced")),
            rollback: GraphError::NotFound(ErrorInfo::new("unknown-edge", "forced")),
        };
        let err = store.settle("insert_edge", n(1), n(2), outcome).unwrap_err();
        assert_eq!(err.code(), "rollback-failed");
        assert_eq!(err.info().context.get("phase"), Some(&"rollback".to_string()));
        assert_eq!(
            err.info().context.get("rollback_code"),
            Some(&"unknown-edge".to_string())
        );
        assert!(store.is_corrupted());
        assert!(store.remove_node(n(1)).unwrap_err().is_fatal());
        assert_eq!(store.node_count(), 1);
    }
}
