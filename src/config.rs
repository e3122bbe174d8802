//! Configuration for objdb
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{DbError, Result};

/// Default node slots in a new index
pub const DEFAULT_INDEX_CAPACITY: u64 = 64;

/// Default data byte budget of a new datastore (1 GiB)
pub const DEFAULT_DATA_CAPACITY: u64 = 1024 * 1024 * 1024;

/// Main configuration for an objdb database
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding both backing regions
    /// Internal structure:
    ///   {path}/
    ///     ├── index        (BST node slots)
    ///     └── data         (append-only record bytes)
    pub path: PathBuf,

    /// Byte budget of the data region, excluding its header.
    /// Only used when creating a database.
    pub data_capacity: u64,

    /// Number of node slots in the index region.
    /// Only used when creating a database.
    pub index_capacity: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// How the two regions are flushed at the end of a write
    pub flush_strategy: FlushStrategy,
}

/// Flush strategy for the per-write durability barrier.
///
/// Both strategies flush both regions before the write returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushStrategy {
    /// Flush data and index regions on two threads and join them
    #[default]
    Concurrent,

    /// Flush the data region, then the index region, on the caller's thread
    Sequential,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./objdb_data"),
            data_capacity: DEFAULT_DATA_CAPACITY,
            index_capacity: DEFAULT_INDEX_CAPACITY,
            flush_strategy: FlushStrategy::Concurrent,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(DbError::Config("path must not be empty".into()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the database directory
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the data region byte budget
    pub fn data_capacity(mut self, bytes: u64) -> Self {
        self.config.data_capacity = bytes;
        self
    }

    /// Set the number of index node slots
    pub fn index_capacity(mut self, nodes: u64) -> Self {
        self.config.index_capacity = nodes;
        self
    }

    /// Set the flush strategy
    pub fn flush_strategy(mut self, strategy: FlushStrategy) -> Self {
        self.config.flush_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.index_capacity, 64);
        assert_eq!(config.data_capacity, 1 << 30);
        assert_eq!(config.flush_strategy, FlushStrategy::Concurrent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let config = Config::builder().path("").build();
        assert!(matches!(config.validate(), Err(DbError::Config(_))));
    }
}
