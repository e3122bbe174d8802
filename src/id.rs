//! Record identifiers
//!
//! Every record is named by a 128-bit [`Id`]. Ids order byte-wise over their
//! 16 bytes, which is the order the index tree is built on.
//!
//! Ids are either supplied by the caller or drawn from an [`IdGenerator`].
//! The generator is injected into the engine rather than being global state,
//! so tests can use [`SequentialIds`] to get a known insertion order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 128-bit record identifier with byte-wise total order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Id([u8; 16]);

impl Id {
    /// Size of an id on disk
    pub const SIZE: usize = 16;

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The all-zero id
    pub const fn nil() -> Self {
        Self([0; 16])
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Interpret the id as a big-endian integer (same order as the bytes)
    pub fn to_u128(self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    pub fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl From<Uuid> for Id {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }
}

impl From<Id> for Uuid {
    fn from(id: Id) -> Self {
        Uuid::from_bytes(id.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Uuid::from_bytes(self.0).hyphenated(), f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Id::from)
    }
}

// =============================================================================
// Id Generation
// =============================================================================

/// Source of fresh ids for inserts that do not name their own key
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> Id;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> Id + Send,
{
    fn next_id(&mut self) -> Id {
        self()
    }
}

/// Random version 4 UUIDs (the default)
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Id {
        Uuid::new_v4().into()
    }
}

/// Strictly ascending ids starting at a given value
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new(start: u128) -> Self {
        Self { next: start }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Id {
        let id = Id::from_u128(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}
