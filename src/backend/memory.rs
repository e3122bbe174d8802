//! In-memory storage engine

use std::collections::HashMap;

use crate::error::{DbError, Result};
use crate::id::Id;

use super::StorageEngine;

/// Records held in a `HashMap`; a `None` value is a tombstone
#[derive(Debug, Default)]
pub struct MemoryEngine {
    records: HashMap<Id, Option<Vec<u8>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids ever inserted, deleted ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn live_mut(&mut self, id: Id) -> Result<&mut Vec<u8>> {
        match self.records.get_mut(&id) {
            Some(Some(data)) => Ok(data),
            Some(None) => Err(DbError::Deleted(id)),
            None => Err(DbError::NotFound(id)),
        }
    }
}

impl StorageEngine for MemoryEngine {
    fn insert(&mut self, id: Id, data: &[u8]) -> Result<()> {
        if self.records.contains_key(&id) {
            return Err(DbError::DuplicateKey(id));
        }
        self.records.insert(id, Some(data.to_vec()));
        Ok(())
    }

    fn read(&self, id: Id) -> Result<Vec<u8>> {
        match self.records.get(&id) {
            Some(Some(data)) => Ok(data.clone()),
            Some(None) => Err(DbError::Deleted(id)),
            None => Err(DbError::NotFound(id)),
        }
    }

    fn update(&mut self, id: Id, data: &[u8]) -> Result<()> {
        *self.live_mut(id)? = data.to_vec();
        Ok(())
    }

    fn delete(&mut self, id: Id) -> Result<()> {
        match self.records.get_mut(&id) {
            Some(slot) => {
                *slot = None;
                Ok(())
            }
            None => Err(DbError::NotFound(id)),
        }
    }
}
