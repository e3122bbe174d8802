//! Index
//!
//! An unbalanced binary search tree over fixed-size node slots in the index
//! region. Slot 0 is the root. The region header holds `next_node_id`, the
//! number of slots in use; 0 means the tree is empty.
//!
//! ## Descent
//! Starting at the root, compare the key with each node: equal stops on an
//! exact match, smaller goes `low`, larger goes `high`. Reaching a child id
//! of 0 stops on the attachment point for a new key on that side.
//!
//! There is no rebalancing. Random ids give O(log n) depth on average;
//! ascending ids degrade the tree into a list.

use std::cmp::Ordering;
use std::path::Path;

use tracing::trace;

use crate::error::{DbError, RegionKind, Result};
use crate::id::Id;

use super::node::{DataLocation, IndexNode, NODE_SIZE, NO_CHILD, TOMBSTONE};
use super::region::Region;

/// Which child pointer of a node to follow or set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Low,
    High,
}

/// Result of a descent
#[derive(Debug, Clone, Copy)]
enum Closest {
    /// No nodes yet
    Empty,
    /// Exact match at the given slot
    Match(u64, IndexNode),
    /// No match; a new node for the key hangs off this slot on `Side`
    Attach(u64, Side),
}

/// Where a pending insert will link its node. Obtained from
/// [`Index::prepare_insert`], consumed by [`Index::insert_at`].
#[derive(Debug)]
pub struct InsertPoint {
    key: Id,
    parent: Option<(u64, Side)>,
}

/// Slots and header touched by a mutation, still to be flushed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dirty {
    pub slots: Vec<u64>,
    pub header: bool,
}

/// Binary-search-tree index of record locations
pub struct Index {
    region: Region,
}

impl Index {
    /// Create a fresh index region with `capacity` node slots
    pub fn create(path: &Path, capacity: u64) -> Result<Self> {
        let body_len = capacity.checked_mul(NODE_SIZE).ok_or_else(|| {
            DbError::Config(format!("index capacity {} too large", capacity))
        })?;
        let region = Region::create(path, body_len)?;
        Ok(Self { region })
    }

    /// Attach to an existing index region
    pub fn open(path: &Path) -> Result<Self> {
        let region = Region::open(path)?;

        if region.body_len() % NODE_SIZE != 0 {
            return Err(DbError::Corrupted(format!(
                "{}: {} body bytes is not a whole number of {}-byte slots",
                path.display(),
                region.body_len(),
                NODE_SIZE
            )));
        }

        let index = Self { region };
        if index.len() > index.capacity() {
            return Err(DbError::Corrupted(format!(
                "{}: {} nodes in use but only {} slots",
                path.display(),
                index.len(),
                index.capacity()
            )));
        }

        Ok(index)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// The live node for `key`
    ///
    /// Returns:
    /// - `Err(NotFound)`: no node carries the key
    /// - `Err(Deleted)`: the node is tombstoned
    pub fn find(&self, key: &Id) -> Result<IndexNode> {
        self.find_slot(key).map(|(_, node)| node)
    }

    /// Like [`Index::find`], also returning the slot id
    pub fn find_slot(&self, key: &Id) -> Result<(u64, IndexNode)> {
        match self.closest_node(key)? {
            Closest::Match(_, node) if node.is_deleted() => Err(DbError::Deleted(*key)),
            Closest::Match(slot, node) => Ok((slot, node)),
            Closest::Empty | Closest::Attach(..) => Err(DbError::NotFound(*key)),
        }
    }

    /// Read a slot as-is
    pub fn node(&self, slot: u64) -> Result<IndexNode> {
        if slot >= self.capacity() {
            return Err(DbError::Corrupted(format!(
                "slot {} outside index of {} slots",
                slot,
                self.capacity()
            )));
        }
        let mut buf = [0u8; NODE_SIZE as usize];
        self.region.read_into(slot * NODE_SIZE, &mut buf)?;
        IndexNode::decode(&buf)
    }

    /// Walk from the root towards `key`. Average O(log n), worst O(n).
    fn closest_node(&self, key: &Id) -> Result<Closest> {
        let len = self.len();
        if len == 0 {
            return Ok(Closest::Empty);
        }

        let mut slot = 0;
        let mut visited = 1;
        loop {
            let node = self.node(slot)?;

            let (next, side) = match key.cmp(&node.key) {
                Ordering::Equal => return Ok(Closest::Match(slot, node)),
                Ordering::Less => (node.low, Side::Low),
                Ordering::Greater => (node.high, Side::High),
            };

            if next == NO_CHILD {
                return Ok(Closest::Attach(slot, side));
            }

            if next >= len || visited >= len {
                return Err(DbError::Corrupted(format!(
                    "index node {} links to invalid child {}",
                    slot, next
                )));
            }

            slot = next;
            visited += 1;
        }
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Check that `key` can be inserted and find where it will attach.
    /// Writes nothing.
    pub fn prepare_insert(&self, key: &Id) -> Result<InsertPoint> {
        let parent = match self.closest_node(key)? {
            Closest::Match(..) => return Err(DbError::DuplicateKey(*key)),
            Closest::Empty => None,
            Closest::Attach(slot, side) => Some((slot, side)),
        };

        if self.len() >= self.capacity() {
            return Err(DbError::CapacityExceeded {
                region: RegionKind::Index,
                requested: self.len() + 1,
                capacity: self.capacity(),
            });
        }

        Ok(InsertPoint { key: *key, parent })
    }

    /// Write the node for a prepared insert and link it into the tree
    pub fn insert_at(&mut self, point: InsertPoint, location: DataLocation) -> Result<Dirty> {
        let node = IndexNode::new(point.key, location);

        let Some((parent_slot, side)) = point.parent else {
            // First insert establishes the root
            self.region.set_header(1);
            self.write_node(0, &node)?;
            trace!(key = %point.key, "index root created");
            return Ok(Dirty {
                slots: vec![0],
                header: true,
            });
        };

        let new_slot = self.len();
        self.region.set_header(new_slot + 1);
        self.write_node(new_slot, &node)?;

        let mut parent = self.node(parent_slot)?;
        match side {
            Side::Low => parent.low = new_slot,
            Side::High => parent.high = new_slot,
        }
        self.write_node(parent_slot, &parent)?;

        trace!(key = %point.key, slot = new_slot, parent = parent_slot, ?side, "index node linked");
        Ok(Dirty {
            slots: vec![new_slot, parent_slot],
            header: true,
        })
    }

    /// Insert `key` pointing at `location`
    ///
    /// Fails with `DuplicateKey` if the key has a node, live or tombstoned.
    pub fn insert(&mut self, key: &Id, location: DataLocation) -> Result<Dirty> {
        let point = self.prepare_insert(key)?;
        self.insert_at(point, location)
    }

    // =========================================================================
    // Update / Delete
    // =========================================================================

    /// Point the live node for `key` at a new location
    pub fn update(&mut self, key: &Id, location: DataLocation) -> Result<Dirty> {
        let (slot, _) = self.find_slot(key)?;
        self.relocate(slot, location)
    }

    /// Overwrite the location of the node in `slot`
    pub fn relocate(&mut self, slot: u64, location: DataLocation) -> Result<Dirty> {
        let mut node = self.node(slot)?;
        node.data_offset = location.offset as i64;
        node.data_size = location.size;
        self.write_node(slot, &node)?;

        Ok(Dirty {
            slots: vec![slot],
            header: false,
        })
    }

    /// Tombstone the node for `key`, keeping its size. Returns the node as it
    /// was before the delete.
    pub fn delete(&mut self, key: &Id) -> Result<(IndexNode, Dirty)> {
        let (slot, previous) = match self.closest_node(key)? {
            Closest::Match(slot, node) => (slot, node),
            Closest::Empty | Closest::Attach(..) => return Err(DbError::NotFound(*key)),
        };

        let mut node = previous;
        node.data_offset = TOMBSTONE;
        self.write_node(slot, &node)?;

        let dirty = Dirty {
            slots: vec![slot],
            header: false,
        };
        Ok((previous, dirty))
    }

    fn write_node(&mut self, slot: u64, node: &IndexNode) -> Result<()> {
        self.region.write(slot * NODE_SIZE, &node.encode())
    }

    // =========================================================================
    // Durability
    // =========================================================================

    /// Flush the slots and header a mutation touched
    pub fn flush_dirty(&self, dirty: &Dirty) -> Result<()> {
        for &slot in &dirty.slots {
            self.region.flush_body(slot * NODE_SIZE, NODE_SIZE)?;
        }
        if dirty.header {
            self.region.flush_header()?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.region.flush_all()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of slots in use (`next_node_id`)
    pub fn len(&self) -> u64 {
        self.region.header()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u64 {
        self.region.body_len() / NODE_SIZE
    }
}
