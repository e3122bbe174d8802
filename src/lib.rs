//! # objdb
//!
//! An embedded, single-process key-value storage engine with:
//! - Variable-length byte records under 128-bit ids
//! - Memory-mapped files as the only I/O path
//! - An unbalanced binary-search-tree index over fixed-size node slots
//! - An append-only data log (no in-place updates, no compaction)
//! - A flush barrier at the end of every write
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  ObjectDb (typed values)                     │
//! │                 Serializer ⇄ byte buffers                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  StorageEngine
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                                │
//! │           Insert / Read / Update / Delete by Id              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Index    │          │  Datastore  │
//!   │ (BST slots) │─offset──▶│  (Append)   │
//!   └─────────────┘          └─────────────┘
//!      {path}/index             {path}/data
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use objdb::Engine;
//!
//! let mut engine = Engine::create_at("./mydb", 1024 * 1024, 64)?;
//! let id = engine.insert_new(&[1, 2, 3, 4])?;
//! engine.close()?;
//!
//! let engine = Engine::open_at("./mydb")?;
//! assert_eq!(engine.read(id)?, vec![1, 2, 3, 4]);
//! # Ok::<(), objdb::DbError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod id;

pub mod storage;
pub mod backend;
pub mod engine;
pub mod object;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use backend::{MemoryEngine, StorageEngine};
pub use config::{Config, FlushStrategy};
pub use engine::{Engine, EngineStats};
pub use error::{DbError, RegionKind, Result};
pub use id::{Id, IdGenerator, RandomIds, SequentialIds};
pub use object::{BincodeSerializer, ObjectDb, Serializer};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of objdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
