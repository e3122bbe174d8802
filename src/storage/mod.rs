//! Storage Module
//!
//! Persistent storage layer over two memory-mapped regions.
//!
//! ## Responsibilities
//! - Append record bytes to the data log
//! - Index record locations in a binary search tree of node slots
//! - Persist the next-free counters of both regions
//!
//! ## File Format
//! ```text
//! {path}/index
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                             │
//! │   NextNodeId: u64                                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Node slot 0 (root) ... Node slot capacity-1  (48 bytes each) │
//! │   Key (16) | DataOffset i64 (8) | DataSize (8)               │
//! │   LowChild (8) | HighChild (8)                               │
//! │   (DataOffset = -1 means tombstone, child 0 means none)      │
//! └──────────────────────────────────────────────────────────────┘
//!
//! {path}/data
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (8 bytes)                                             │
//! │   NextOffset: u64                                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record bytes, appended back to back (data capacity bytes)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian. Offsets in node slots are relative to the
//! start of the data body, so `NextOffset` is also the number of bytes used.

mod datastore;
mod index;
mod node;
mod region;

pub use datastore::{Appended, Datastore};
pub use index::{Dirty, Index, InsertPoint, Side};
pub use node::{DataLocation, IndexNode, NODE_SIZE, NO_CHILD, TOMBSTONE};
pub use region::Region;

// =============================================================================
// Shared Constants
// =============================================================================

/// Size of the `u64` metadata header at the start of each region
pub const HEADER_SIZE: u64 = 8;

/// File name of the index region inside a database directory
pub const INDEX_FILENAME: &str = "index";

/// File name of the data region inside a database directory
pub const DATA_FILENAME: &str = "data";

/// Size of the index file for `capacity` node slots
pub fn index_file_size(capacity: u64) -> u64 {
    HEADER_SIZE + capacity * NODE_SIZE
}

/// Size of the data file for a budget of `capacity` bytes
pub fn data_file_size(capacity: u64) -> u64 {
    HEADER_SIZE + capacity
}
