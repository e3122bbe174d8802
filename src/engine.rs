//! Engine Module
//!
//! The storage engine that composes the index and the datastore.
//!
//! ## Responsibilities
//! - Create and open the two backing regions of a database
//! - Insert / Read / Update / Delete records by id
//! - Run the durability barrier at the end of every write
//!
//! ## Write path
//! 1. Check the index (duplicate key, missing key, free slots); nothing
//!    has been written if this fails
//! 2. Append the record bytes to the datastore
//! 3. Write the index node(s)
//! 4. Flush the data region and the index region, then return
//!
//! A crash between the two flushes of step 4 can leave record bytes that no
//! node points at, or a node pointing at bytes that never reached the disk.
//! There is no recovery pass.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, trace};

use crate::backend::StorageEngine;
use crate::config::{Config, FlushStrategy};
use crate::error::{DbError, Result};
use crate::id::{Id, IdGenerator, RandomIds};
use crate::storage::{
    Appended, Datastore, Dirty, Index, IndexNode, DATA_FILENAME, INDEX_FILENAME,
};

/// Snapshot of space usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Node slots in use
    pub nodes: u64,
    /// Total node slots
    pub node_capacity: u64,
    /// Data bytes appended so far, including superseded records
    pub data_bytes: u64,
    /// Data byte budget
    pub data_capacity: u64,
}

/// The file-backed storage engine
///
/// ## Concurrency Model: Single Writer
///
/// Mutations take `&mut self` and reads take `&self`, so the borrow checker
/// rules out concurrent writers. There is no internal locking.
pub struct Engine {
    /// Engine configuration (capacities reflect the files on disk)
    config: Config,

    /// Binary-search-tree index over node slots
    index: Index,

    /// Append-only record bytes
    datastore: Datastore,

    /// Source of ids for `insert_new`
    ids: Box<dyn IdGenerator>,
}

impl Engine {
    /// Create a new database at `config.path`, sized from the configured
    /// capacities. Existing region files at that path are truncated.
    pub fn create(mut config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.path)?;

        let index = Index::create(&config.path.join(INDEX_FILENAME), config.index_capacity)?;
        let datastore = Datastore::create(&config.path.join(DATA_FILENAME), config.data_capacity)?;

        info!(
            path = %config.path.display(),
            index_capacity = index.capacity(),
            data_capacity = datastore.capacity(),
            "created database"
        );

        config.index_capacity = index.capacity();
        config.data_capacity = datastore.capacity();
        Ok(Self::assemble(config, index, datastore))
    }

    /// Open an existing database at `config.path`. Capacities are read from
    /// the files; the configured ones are ignored.
    pub fn open(mut config: Config) -> Result<Self> {
        config.validate()?;

        let index = Index::open(&config.path.join(INDEX_FILENAME))?;
        let datastore = Datastore::open(&config.path.join(DATA_FILENAME))?;

        info!(
            path = %config.path.display(),
            nodes = index.len(),
            data_bytes = datastore.next_offset(),
            "opened database"
        );

        config.index_capacity = index.capacity();
        config.data_capacity = datastore.capacity();
        Ok(Self::assemble(config, index, datastore))
    }

    /// Create with default settings apart from path and capacities
    pub fn create_at(path: impl Into<PathBuf>, data_capacity: u64, index_capacity: u64) -> Result<Self> {
        let config = Config::builder()
            .path(path)
            .data_capacity(data_capacity)
            .index_capacity(index_capacity)
            .build();
        Self::create(config)
    }

    /// Open with default settings
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(Config::builder().path(path).build())
    }

    fn assemble(config: Config, index: Index, datastore: Datastore) -> Self {
        Self {
            config,
            index,
            datastore,
            ids: Box::new(RandomIds),
        }
    }

    /// Replace the id generator used by [`Engine::insert_new`]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Store `data` under `id`
    ///
    /// Fails with `DuplicateKey` if `id` was ever inserted, even if it has
    /// since been deleted.
    pub fn insert(&mut self, id: Id, data: &[u8]) -> Result<()> {
        let point = self.index.prepare_insert(&id)?;
        let appended = self.datastore.append(data)?;
        let dirty = self.index.insert_at(point, appended.location())?;

        self.sync(Some(appended), &dirty)?;

        debug!(%id, offset = appended.offset, len = appended.len, "inserted");
        Ok(())
    }

    /// Store `data` under a fresh id from the generator
    pub fn insert_new(&mut self, data: &[u8]) -> Result<Id> {
        let id = self.ids.next_id();
        self.insert(id, data)?;
        Ok(id)
    }

    /// Read the record stored under `id`
    ///
    /// Fails with `NotFound` if `id` was never inserted and `Deleted` if it
    /// was deleted.
    pub fn read(&self, id: Id) -> Result<Vec<u8>> {
        let node = self.index.find(&id)?;
        let location = node.location().ok_or(DbError::Deleted(id))?;
        self.datastore.read(location.offset, location.size)
    }

    /// Replace the record under `id` with `data`
    ///
    /// The new bytes are appended; the old bytes stay in the data region
    /// and become unreachable.
    pub fn update(&mut self, id: Id, data: &[u8]) -> Result<()> {
        let (slot, previous) = self.index.find_slot(&id)?;
        let appended = self.datastore.append(data)?;
        let dirty = self.index.relocate(slot, appended.location())?;

        if let Some(old) = previous.location() {
            self.datastore.delete(old.offset, old.size);
        }

        self.sync(Some(appended), &dirty)?;

        debug!(%id, offset = appended.offset, len = appended.len, "updated");
        Ok(())
    }

    /// Delete the record under `id`. The id can not be inserted again.
    pub fn delete(&mut self, id: Id) -> Result<()> {
        let (previous, dirty) = self.index.delete(&id)?;

        if let Some(old) = previous.location() {
            self.datastore.delete(old.offset, old.size);
        }

        self.sync(None, &dirty)?;

        debug!(%id, "deleted");
        Ok(())
    }

    // =========================================================================
    // Durability
    // =========================================================================

    /// Make the writes of one operation durable in both regions
    fn sync(&self, appended: Option<Appended>, dirty: &Dirty) -> Result<()> {
        let started = Instant::now();
        let datastore = &self.datastore;
        let index = &self.index;

        let result = match (self.config.flush_strategy, appended) {
            (FlushStrategy::Concurrent, Some(appended)) => {
                let outcome = crossbeam::thread::scope(|s| {
                    let data = s.spawn(move |_| datastore.flush_appended(appended));
                    let index_result = index.flush_dirty(dirty);
                    let data_result = data.join().unwrap_or_else(|_| Err(flush_panicked()));
                    data_result.and(index_result)
                });
                outcome.unwrap_or_else(|_| Err(flush_panicked()))
            }
            (_, appended) => {
                if let Some(appended) = appended {
                    datastore.flush_appended(appended)?;
                }
                index.flush_dirty(dirty)
            }
        };

        trace!(elapsed_us = started.elapsed().as_micros() as u64, "write barrier");
        result
    }

    /// Flush both regions in full
    pub fn flush(&self) -> Result<()> {
        self.datastore.flush()?;
        self.index.flush()
    }

    /// Flush and release both regions
    pub fn close(self) -> Result<()> {
        self.flush()?;
        info!(path = %self.config.path.display(), "closed database");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the database directory
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read an index slot as stored
    pub fn index_node(&self, slot: u64) -> Result<IndexNode> {
        self.index.node(slot)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            nodes: self.index.len(),
            node_capacity: self.index.capacity(),
            data_bytes: self.datastore.next_offset(),
            data_capacity: self.datastore.capacity(),
        }
    }
}

fn flush_panicked() -> DbError {
    DbError::Io(io::Error::new(io::ErrorKind::Other, "flush thread panicked"))
}

impl StorageEngine for Engine {
    fn insert(&mut self, id: Id, data: &[u8]) -> Result<()> {
        Engine::insert(self, id, data)
    }

    fn read(&self, id: Id) -> Result<Vec<u8>> {
        Engine::read(self, id)
    }

    fn update(&mut self, id: Id, data: &[u8]) -> Result<()> {
        Engine::update(self, id, data)
    }

    fn delete(&mut self, id: Id) -> Result<()> {
        Engine::delete(self, id)
    }
}
