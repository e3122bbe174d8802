//! Backend Module
//!
//! The byte-level contract every storage engine offers to the layers above
//! it. Engines store opaque byte buffers under [`Id`]s; turning typed values
//! into bytes is the job of a [`Serializer`](crate::object::Serializer).
//!
//! ## Implementations
//! - [`Engine`](crate::engine::Engine): memory-mapped files on disk
//! - [`MemoryEngine`]: a hash map, for tests and throwaway databases

mod memory;

pub use memory::MemoryEngine;

use crate::error::Result;
use crate::id::Id;

/// Insert / Read / Update / Delete of byte records by id
///
/// All implementations share the same error semantics:
/// - `insert` fails with `DuplicateKey` if the id was ever inserted
/// - `read` fails with `NotFound` for unknown ids and `Deleted` for deleted ones
/// - `update` and `delete` fail with `NotFound` for unknown ids
pub trait StorageEngine {
    fn insert(&mut self, id: Id, data: &[u8]) -> Result<()>;

    fn read(&self, id: Id) -> Result<Vec<u8>>;

    fn update(&mut self, id: Id, data: &[u8]) -> Result<()>;

    fn delete(&mut self, id: Id) -> Result<()>;
}

impl<E: StorageEngine + ?Sized> StorageEngine for Box<E> {
    fn insert(&mut self, id: Id, data: &[u8]) -> Result<()> {
        (**self).insert(id, data)
    }

    fn read(&self, id: Id) -> Result<Vec<u8>> {
        (**self).read(id)
    }

    fn update(&mut self, id: Id, data: &[u8]) -> Result<()> {
        (**self).update(id, data)
    }

    fn delete(&mut self, id: Id) -> Result<()> {
        (**self).delete(id)
    }
}
