//! Index node slots
//!
//! A node is a fixed 48-byte record. Nodes live in a flat array of slots and
//! refer to their children by slot id, never by address.

use crate::error::{DbError, Result};
use crate::id::Id;

/// Encoded size of one node slot
pub const NODE_SIZE: u64 = 48;

/// `data_offset` value marking a deleted record
pub const TOMBSTONE: i64 = -1;

/// Child id meaning "no child". Slot 0 is the root, so it is never a child.
pub const NO_CHILD: u64 = 0;

/// Where a record's bytes live in the datastore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataLocation {
    pub offset: u64,
    pub size: u64,
}

/// One binary-search-tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexNode {
    pub key: Id,
    /// Offset in the datastore body, or [`TOMBSTONE`]
    pub data_offset: i64,
    pub data_size: u64,
    /// Slot id of the subtree with smaller keys
    pub low: u64,
    /// Slot id of the subtree with larger keys
    pub high: u64,
}

impl IndexNode {
    /// A leaf node for `key` pointing at `location`
    pub fn new(key: Id, location: DataLocation) -> Self {
        Self {
            key,
            data_offset: location.offset as i64,
            data_size: location.size,
            low: NO_CHILD,
            high: NO_CHILD,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.data_offset == TOMBSTONE
    }

    /// Location of the live record, `None` once tombstoned
    pub fn location(&self) -> Option<DataLocation> {
        u64::try_from(self.data_offset).ok().map(|offset| DataLocation {
            offset,
            size: self.data_size,
        })
    }

    /// Layout: `key (16) | data_offset i64 (8) | data_size (8) | low (8) | high (8)`,
    /// integers little-endian.
    pub fn encode(&self) -> [u8; NODE_SIZE as usize] {
        let mut buf = [0u8; NODE_SIZE as usize];
        buf[0..16].copy_from_slice(self.key.as_bytes());
        buf[16..24].copy_from_slice(&self.data_offset.to_le_bytes());
        buf[24..32].copy_from_slice(&self.data_size.to_le_bytes());
        buf[32..40].copy_from_slice(&self.low.to_le_bytes());
        buf[40..48].copy_from_slice(&self.high.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != NODE_SIZE as usize {
            return Err(DbError::Corrupted(format!(
                "node slot is {} bytes, expected {}",
                bytes.len(),
                NODE_SIZE
            )));
        }

        let mut key = [0u8; 16];
        key.copy_from_slice(&bytes[0..16]);

        Ok(Self {
            key: Id::from_bytes(key),
            data_offset: i64::from_le_bytes(le8(&bytes[16..24])),
            data_size: u64::from_le_bytes(le8(&bytes[24..32])),
            low: u64::from_le_bytes(le8(&bytes[32..40])),
            high: u64::from_le_bytes(le8(&bytes[40..48])),
        })
    }
}

fn le8(bytes: &[u8]) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let node = IndexNode {
            key: Id::from_bytes([0xab; 16]),
            data_offset: 0x0102,
            data_size: 7,
            low: 3,
            high: 4,
        };

        let bytes = node.encode();

        assert_eq!(&bytes[0..16], &[0xab; 16]);
        assert_eq!(&bytes[16..24], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[24], 7);
        assert_eq!(bytes[32], 3);
        assert_eq!(bytes[40], 4);
        assert_eq!(IndexNode::decode(&bytes).unwrap(), node);
    }

    #[test]
    fn test_tombstone_encoding() {
        let mut node = IndexNode::new(Id::nil(), DataLocation { offset: 10, size: 5 });
        node.data_offset = TOMBSTONE;

        let bytes = node.encode();

        assert_eq!(&bytes[16..24], &[0xff; 8]);
        let decoded = IndexNode::decode(&bytes).unwrap();
        assert!(decoded.is_deleted());
        assert_eq!(decoded.location(), None);
        assert_eq!(decoded.data_size, 5);
    }

    #[test]
    fn test_new_node_is_leaf() {
        let node = IndexNode::new(Id::from_u128(9), DataLocation { offset: 0, size: 0 });
        assert_eq!(node.low, NO_CHILD);
        assert_eq!(node.high, NO_CHILD);
        assert_eq!(node.location(), Some(DataLocation { offset: 0, size: 0 }));
    }

    #[test]
    fn test_decode_wrong_length() {
        assert!(matches!(IndexNode::decode(&[0u8; 47]), Err(DbError::Corrupted(_))));
    }
}
