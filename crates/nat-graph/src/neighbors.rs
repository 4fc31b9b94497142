use nat_core::errors::{ErrorInfo, GraphError};
use nat_core::{EdgeRef, NodeId};

/// Selects how [`NeighborList::upsert`] treats an existing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertMode {
    /// Append a new entry; fail with `AlreadyExists` if the target is present.
    InsertOnly,
    /// Overwrite an existing entry; fail with `NotFound` if the target is absent.
    UpdateOnly,
}

/// Entry removed from a [`NeighborList`], with the slot it occupied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovedEdge {
    /// Index the entry occupied before removal.
    pub position: usize,
    /// Weight the entry carried.
    pub weight: f64,
}

/// Growable per-node sequence of outgoing edges.
///
/// Tracks a logical capacity separately from the backing vector so growth
/// follows a strict doubling schedule and can be bounded by a budget.
/// Entries keep their relative order across removals.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborList {
    entries: Vec<EdgeRef>,
    capacity: usize,
    limit: Option<usize>,
}

impl NeighborList {
    /// Allocates an empty list. `capacity` is clamped to `limit` when one is set.
    pub fn with_capacity(capacity: usize, limit: Option<usize>) -> Result<Self, GraphError> {
        let capacity = match limit {
            Some(limit) => capacity.min(limit),
            None => capacity,
        };
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(capacity)
            .map_err(|err| out_of_memory(capacity, err.to_string()))?;
        Ok(Self {
            entries,
            capacity,
            limit,
        })
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Logical capacity. Always at least [`len`](Self::len).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live entries in insertion order.
    pub fn as_slice(&self) -> &[EdgeRef] {
        &self.entries
    }

    /// Returns the position of the entry pointing at `target`.
    pub fn find(&self, target: NodeId) -> Option<usize> {
        self.entries.iter().position(|edge| edge.target == target)
    }

    /// Returns the weight of the entry pointing at `target`.
    pub fn weight_of(&self, target: NodeId) -> Option<f64> {
        self.find(target).map(|idx| self.entries[idx].weight)
    }

    /// Returns true when an entry points at `target`.
    pub fn contains(&self, target: NodeId) -> bool {
        self.find(target).is_some()
    }

    /// Guarantees room for one more entry, doubling the capacity when full.
    ///
    /// On failure the list is left unchanged.
    pub fn ensure_capacity(&mut self) -> Result<(), GraphError> {
        if self.entries.len() < self.capacity {
            return Ok(());
        }
        let doubled = self.capacity.saturating_mul(2).max(1);
        let grown = match self.limit {
            Some(limit) if self.capacity >= limit => {
                return Err(out_of_memory(doubled, "neighbor budget exhausted")
                    .with_context("limit", limit));
            }
            Some(limit) => doubled.min(limit),
            None => doubled,
        };
        self.entries
            .try_reserve_exact(grown - self.entries.len())
            .map_err(|err| out_of_memory(grown, err.to_string()))?;
        self.capacity = grown;
        Ok(())
    }

    /// Inserts or overwrites the entry for `target` according to `mode`.
    ///
    /// `UpdateOnly` returns the weight that was overwritten; `InsertOnly`
    /// returns `None`.
    pub fn upsert(
        &mut self,
        target: NodeId,
        weight: f64,
        mode: UpsertMode,
    ) -> Result<Option<f64>, GraphError> {
        match (mode, self.find(target)) {
            (UpsertMode::InsertOnly, Some(_)) => Err(GraphError::AlreadyExists(
                ErrorInfo::new("duplicate-edge", "edge already exists")
                    .with_context("target", target),
            )),
            (UpsertMode::InsertOnly, None) => {
                self.ensure_capacity()?;
                self.entries.push(EdgeRef::new(target, weight));
                Ok(None)
            }
            (UpsertMode::UpdateOnly, Some(idx)) => {
                let previous = self.entries[idx].weight;
                self.entries[idx].weight = weight;
                Ok(Some(previous))
            }
            (UpsertMode::UpdateOnly, None) => Err(missing_edge(target)),
        }
    }

    /// Removes the entry for `target`, shifting later entries left by one.
    pub fn remove(&mut self, target: NodeId) -> Result<RemovedEdge, GraphError> {
        let position = self.find(target).ok_or_else(|| missing_edge(target))?;
        let removed = self.entries.remove(position);
        Ok(RemovedEdge {
            position,
            weight: removed.weight,
        })
    }

    /// Puts a previously removed entry back at `position`.
    ///
    /// Positions past the end append. Fails like an `InsertOnly` upsert.
    pub fn restore(&mut self, target: NodeId, removed: RemovedEdge) -> Result<(), GraphError> {
        if self.contains(target) {
            return Err(GraphError::AlreadyExists(
                ErrorInfo::new("duplicate-edge", "edge already exists")
                    .with_context("target", target),
            ));
        }
        self.ensure_capacity()?;
        let position = removed.position.min(self.entries.len());
        self.entries
            .insert(position, EdgeRef::new(target, removed.weight));
        Ok(())
    }

    /// Drops every entry pointing at `target`. Returns how many were dropped.
    pub(crate) fn purge(&mut self, target: NodeId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|edge| edge.target != target);
        before - self.entries.len()
    }
}

fn missing_edge(target: NodeId) -> GraphError {
    GraphError::NotFound(
        ErrorInfo::new("unknown-edge", "edge does not exist").with_context("target", target),
    )
}

fn out_of_memory(requested: usize, reason: impl Into<String>) -> GraphError {
    GraphError::OutOfMemory(
        ErrorInfo::new("neighbor-alloc", "failed to grow neighbor list")
            .with_context("requested", requested)
            .with_context("reason", reason.into()),
    )
}
