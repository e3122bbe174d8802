//! Object Module
//!
//! Typed records on top of a byte-level [`StorageEngine`].
//!
//! ```text
//!   value ──Serializer──▶ bytes ──StorageEngine──▶ regions
//! ```
//!
//! The serializer and the engine are independent: any [`Serializer`] works
//! with any [`StorageEngine`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::StorageEngine;
use crate::error::{DbError, Result};
use crate::id::{Id, IdGenerator, RandomIds};

/// Converts values to and from the byte buffers an engine stores
pub trait Serializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;
}

/// Compact binary encoding via bincode
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeSerializer;

impl Serializer for BincodeSerializer {
    fn serialize<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
    }

    fn deserialize<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
    }
}

/// Object database: serializes values and stores them under generated ids
pub struct ObjectDb<E, S = BincodeSerializer> {
    engine: E,
    serializer: S,
    ids: Box<dyn IdGenerator>,
}

impl<E: StorageEngine> ObjectDb<E, BincodeSerializer> {
    /// Bincode-encoded objects with random ids
    pub fn new(engine: E) -> Self {
        Self::with_serializer(engine, BincodeSerializer)
    }
}

impl<E: StorageEngine, S: Serializer> ObjectDb<E, S> {
    pub fn with_serializer(engine: E, serializer: S) -> Self {
        Self {
            engine,
            serializer,
            ids: Box::new(RandomIds),
        }
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Store `value` under a fresh id and return the id
    pub fn insert<T: Serialize>(&mut self, value: &T) -> Result<Id> {
        let id = self.ids.next_id();
        let bytes = self.serializer.serialize(value)?;
        self.engine.insert(id, &bytes)?;
        Ok(id)
    }

    pub fn read<T: DeserializeOwned>(&self, id: Id) -> Result<T> {
        let bytes = self.engine.read(id)?;
        self.serializer.deserialize(&bytes)
    }

    pub fn update<T: Serialize>(&mut self, id: Id, value: &T) -> Result<()> {
        let bytes = self.serializer.serialize(value)?;
        self.engine.update(id, &bytes)
    }

    pub fn delete(&mut self, id: Id) -> Result<()> {
        self.engine.delete(id)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Give back the engine, e.g. to close it
    pub fn into_inner(self) -> E {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_bincode_roundtrip() {
        let bytes = BincodeSerializer.serialize(&Point { x: 1, y: -2 }).unwrap();
        let point: Point = BincodeSerializer.deserialize(&bytes).unwrap();
        assert_eq!(point, Point { x: 1, y: -2 });
    }

    #[test]
    fn test_bincode_short_input() {
        let result: Result<Point> = BincodeSerializer.deserialize(&[1, 0]);
        assert!(matches!(result, Err(DbError::Serialization(_))));
    }
}
