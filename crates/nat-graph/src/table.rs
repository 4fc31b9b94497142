use nat_core::errors::{ErrorInfo, GraphError};
use nat_core::NodeId;

use crate::hash::bucket_index;
use crate::neighbors::NeighborList;

/// A live node: its identity, its outgoing edges and its bucket-chain link.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    id: NodeId,
    neighbors: NeighborList,
    chain_next: Option<usize>,
}

impl NodeRecord {
    /// Creates an unlinked record owning the given neighbor list.
    pub fn new(id: NodeId, neighbors: NeighborList) -> Self {
        Self {
            id,
            neighbors,
            chain_next: None,
        }
    }

    /// Identifier of the node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Outgoing edges of the node.
    pub fn neighbors(&self) -> &NeighborList {
        &self.neighbors
    }

    pub(crate) fn neighbors_mut(&mut self) -> &mut NeighborList {
        &mut self.neighbors
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(NodeRecord),
    Vacant { next_free: Option<usize> },
}

/// Separate-chaining hash table from [`NodeId`] to [`NodeRecord`].
///
/// Records live in an arena of slots that the table exclusively owns.
/// Buckets hold the arena index of the chain head and each record holds the
/// index of the next record in its chain, so rehashing only rewrites links.
#[derive(Debug, Clone)]
pub struct BucketTable {
    heads: Vec<Option<usize>>,
    slots: Vec<Slot>,
    free_head: Option<usize>,
    len: usize,
}

impl BucketTable {
    /// Allocates a table with `capacity` empty buckets. Zero is `InvalidArgument`.
    pub fn with_capacity(capacity: usize) -> Result<Self, GraphError> {
        Ok(Self {
            heads: alloc_heads(capacity)?,
            slots: Vec::new(),
            free_head: None,
            len: 0,
        })
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.heads.len()
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when the next insert would push the table past `load_factor`.
    pub fn needs_resize(&self, load_factor: f64) -> bool {
        self.len as f64 >= load_factor * self.capacity() as f64
    }

    /// Walks the chain for `id` and returns its arena slot.
    fn locate(&self, id: NodeId) -> Option<usize> {
        let mut cursor = self.heads[bucket_index(id, self.capacity())];
        while let Some(slot) = cursor {
            match &self.slots[slot] {
                Slot::Occupied(record) if record.id == id => return Some(slot),
                Slot::Occupied(record) => cursor = record.chain_next,
                Slot::Vacant { .. } => return None,
            }
        }
        None
    }

    /// Looks up the record for `id`.
    pub fn find(&self, id: NodeId) -> Option<&NodeRecord> {
        let slot = self.locate(id)?;
        match &self.slots[slot] {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        }
    }

    /// Looks up the record for `id` for mutation.
    pub fn find_mut(&mut self, id: NodeId) -> Option<&mut NodeRecord> {
        let slot = self.locate(id)?;
        match &mut self.slots[slot] {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        }
    }

    /// Stores a record at the head of its bucket chain.
    ///
    /// Fails with `AlreadyExists` when the identifier is present and with
    /// `OutOfMemory` when the arena cannot grow; the table is unchanged on failure.
    pub fn insert(&mut self, mut record: NodeRecord) -> Result<(), GraphError> {
        if self.locate(record.id).is_some() {
            return Err(GraphError::AlreadyExists(
                ErrorInfo::new("duplicate-node", "node already exists")
                    .with_context("node", record.id),
            ));
        }
        let bucket = bucket_index(record.id, self.capacity());
        record.chain_next = self.heads[bucket];
        let slot = match self.free_head {
            Some(slot) => {
                self.free_head = match self.slots[slot] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => None,
                };
                self.slots[slot] = Slot::Occupied(record);
                slot
            }
            None => {
                self.slots.try_reserve(1).map_err(|err| {
                    GraphError::OutOfMemory(
                        ErrorInfo::new("node-alloc", "failed to grow node arena")
                            .with_context("node", record.id)
                            .with_context("reason", err),
                    )
                })?;
                self.slots.push(Slot::Occupied(record));
                self.slots.len() - 1
            }
        };
        self.heads[bucket] = Some(slot);
        self.len += 1;
        Ok(())
    }

    /// Unlinks the record for `id` and hands it back to the caller.
    pub fn delete(&mut self, id: NodeId) -> Result<NodeRecord, GraphError> {
        let bucket = bucket_index(id, self.capacity());
        let mut prev: Option<usize> = None;
        let mut cursor = self.heads[bucket];
        let found = loop {
            let Some(slot) = cursor else {
                break None;
            };
            match &self.slots[slot] {
                Slot::Occupied(record) if record.id == id => break Some(slot),
                Slot::Occupied(record) => {
                    prev = Some(slot);
                    cursor = record.chain_next;
                }
                Slot::Vacant { .. } => break None,
            }
        };
        let slot = found.ok_or_else(|| {
            GraphError::NotFound(
                ErrorInfo::new("unknown-node", "node does not exist").with_context("node", id),
            )
        })?;
        let vacated = std::mem::replace(
            &mut self.slots[slot],
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        let Slot::Occupied(mut record) = vacated else {
            return Err(GraphError::Corrupted(
                ErrorInfo::new("vacant-chain-slot", "bucket chain points at a vacant slot")
                    .with_context("node", id)
                    .with_context("slot", slot),
            ));
        };
        match prev {
            None => self.heads[bucket] = record.chain_next,
            Some(prev) => {
                if let Slot::Occupied(prev) = &mut self.slots[prev] {
                    prev.chain_next = record.chain_next;
                }
            }
        }
        record.chain_next = None;
        self.free_head = Some(slot);
        self.len -= 1;
        Ok(record)
    }

    /// Rehashes every record into `new_capacity` buckets.
    ///
    /// Only the bucket array is allocated. If that allocation fails the
    /// table is untouched; once it succeeds relinking cannot fail.
    pub fn rehash(&mut self, new_capacity: usize) -> Result<(), GraphError> {
        let mut heads = alloc_heads(new_capacity)?;
        for bucket in 0..self.heads.len() {
            let mut cursor = self.heads[bucket].take();
            while let Some(slot) = cursor {
                let Slot::Occupied(record) = &mut self.slots[slot] else {
                    break;
                };
                cursor = record.chain_next;
                let target = bucket_index(record.id, new_capacity);
                record.chain_next = heads[target];
                heads[target] = Some(slot);
            }
        }
        self.heads = heads;
        Ok(())
    }

    /// Iterates over every stored record in arena order.
    pub fn records(&self) -> impl Iterator<Item = &NodeRecord> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        })
    }

    /// Iterates mutably over every stored record in arena order.
    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut NodeRecord> + '_ {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        })
    }

    /// Length of the longest bucket chain.
    pub fn longest_chain(&self) -> usize {
        self.heads
            .iter()
            .map(|head| {
                let mut length = 0;
                let mut cursor = *head;
                while let Some(Slot::Occupied(record)) = cursor.map(|slot| &self.slots[slot]) {
                    length += 1;
                    cursor = record.chain_next;
                }
                length
            })
            .max()
            .unwrap_or(0)
    }
}

fn alloc_heads(capacity: usize) -> Result<Vec<Option<usize>>, GraphError> {
    if capacity == 0 {
        return Err(GraphError::InvalidArgument(ErrorInfo::new(
            "zero-capacity",
            "bucket table needs at least one bucket",
        )));
    }
    let mut heads = Vec::new();
    heads.try_reserve_exact(capacity).map_err(|err| {
        GraphError::OutOfMemory(
            ErrorInfo::new("table-alloc", "failed to allocate bucket array")
                .with_context("capacity", capacity)
                .with_context("reason", err),
        )
    })?;
    heads.resize(capacity, None);
    Ok(heads)
}
