//! Datastore
//!
//! Append-only byte log over the data region. Records are opaque byte
//! ranges; nothing is ever moved, overwritten or reclaimed.

use std::path::Path;

use tracing::trace;

use crate::error::{DbError, RegionKind, Result};

use super::node::DataLocation;
use super::region::Region;

/// Receipt of an append, used to flush exactly what was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appended {
    pub offset: u64,
    pub len: u64,
}

impl Appended {
    pub fn location(&self) -> DataLocation {
        DataLocation {
            offset: self.offset,
            size: self.len,
        }
    }
}

/// Append-only data log
///
/// The region header holds `next_offset`, the number of body bytes in use.
pub struct Datastore {
    region: Region,
}

impl Datastore {
    /// Create a fresh data region with a budget of `capacity` bytes
    pub fn create(path: &Path, capacity: u64) -> Result<Self> {
        let region = Region::create(path, capacity)?;
        Ok(Self { region })
    }

    /// Attach to an existing data region
    pub fn open(path: &Path) -> Result<Self> {
        let region = Region::open(path)?;

        let next_offset = region.header();
        if next_offset > region.body_len() {
            return Err(DbError::Corrupted(format!(
                "{}: next offset {} beyond capacity {}",
                path.display(),
                next_offset,
                region.body_len()
            )));
        }

        Ok(Self { region })
    }

    /// Write `data` at the end of the log and advance `next_offset`.
    ///
    /// Nothing is flushed here; see [`Datastore::flush_appended`].
    pub fn append(&mut self, data: &[u8]) -> Result<Appended> {
        let offset = self.next_offset();
        let len = data.len() as u64;

        let end = offset.checked_add(len).filter(|&end| end <= self.capacity());
        let Some(end) = end else {
            return Err(DbError::CapacityExceeded {
                region: RegionKind::Data,
                requested: offset.saturating_add(len),
                capacity: self.capacity(),
            });
        };

        self.region.write(offset, data)?;
        self.region.set_header(end);

        trace!(offset, len, "appended record bytes");
        Ok(Appended { offset, len })
    }

    /// Copy the record at `offset..offset + size`
    pub fn read(&self, offset: u64, size: u64) -> Result<Vec<u8>> {
        let in_use = offset
            .checked_add(size)
            .is_some_and(|end| end <= self.next_offset());
        if !in_use {
            return Err(DbError::Corrupted(format!(
                "record {}+{} past end of data log ({})",
                offset,
                size,
                self.next_offset()
            )));
        }

        Ok(self.region.slice(offset, size)?.to_vec())
    }

    /// Space is never reclaimed; superseded ranges stay where they are.
    pub fn delete(&mut self, offset: u64, size: u64) {
        trace!(offset, size, "record bytes orphaned");
    }

    /// Flush an appended range together with the header
    pub fn flush_appended(&self, appended: Appended) -> Result<()> {
        self.region.flush_body(appended.offset, appended.len)?;
        self.region.flush_header()
    }

    pub fn flush(&self) -> Result<()> {
        self.region.flush_all()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn next_offset(&self) -> u64 {
        self.region.header()
    }

    pub fn capacity(&self) -> u64 {
        self.region.body_len()
    }

    pub fn remaining(&self) -> u64 {
        self.capacity() - self.next_offset()
    }
}
