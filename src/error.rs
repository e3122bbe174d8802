//! Error types for objdb
//!
//! Provides a unified error type for all operations.

use std::fmt;

use thiserror::Error;

use crate::id::Id;

/// Result type alias using DbError
pub type Result<T> = std::result::Result<T, DbError>;

/// Which backing region an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// The append-only data log
    Data,
    /// The binary-search-tree node slots
    Index,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Data => f.write_str("data"),
            RegionKind::Index => f.write_str("index"),
        }
    }
}

/// Unified error type for objdb operations
#[derive(Debug, Error)]
pub enum DbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("entry for id {0} not found")]
    NotFound(Id),

    #[error("entry {0} deleted")]
    Deleted(Id),

    #[error("id {0} already exists")]
    DuplicateKey(Id),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("{region} region full: need {requested}, capacity {capacity}")]
    CapacityExceeded {
        region: RegionKind,
        requested: u64,
        capacity: u64,
    },

    #[error("Corrupted region: {0}")]
    Corrupted(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// True for both "never existed" and "existed, now gone"
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_) | DbError::Deleted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_is_a_not_found() {
        let id = Id::from_bytes([7; 16]);
        assert!(DbError::NotFound(id).is_not_found());
        assert!(DbError::Deleted(id).is_not_found());
        assert!(!DbError::DuplicateKey(id).is_not_found());
    }

    #[test]
    fn test_capacity_display_names_region() {
        let err = DbError::CapacityExceeded {
            region: RegionKind::Index,
            requested: 5,
            capacity: 4,
        };
        let display = err.to_string();
        assert!(display.starts_with("index region full"));
        assert!(display.contains('5'));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DbError = io_err.into();
        assert!(matches!(err, DbError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
