//! Tests for the on-disk index layout
//!
//! These tests verify:
//! - Tree shape for a known insertion order
//! - Slot encoding as it lands in the index file
//! - Header counters in both files

use objdb::storage::{IndexNode, NODE_SIZE, NO_CHILD};
use objdb::{Engine, Id, IdGenerator, SequentialIds};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

/// Decode slot `slot` straight from the index file
fn raw_slot(raw: &[u8], slot: u64) -> IndexNode {
    let start = 8 + (slot * NODE_SIZE) as usize;
    IndexNode::decode(&raw[start..start + NODE_SIZE as usize]).unwrap()
}

// =============================================================================
// Tree Shape Tests
// =============================================================================

#[test]
fn test_ascending_ids_build_right_spine() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let mut engine = Engine::create_at(&path, 1024 * 1024, 64)
        .unwrap()
        .with_id_generator(SequentialIds::new(1));

    let k0 = engine.insert_new(&u64::MAX.to_le_bytes()).unwrap();
    let k1 = engine.insert_new(&i64::MIN.to_le_bytes()).unwrap();
    let k2 = engine.insert_new(&i64::MAX.to_le_bytes()).unwrap();
    assert!(k0 < k1 && k1 < k2);

    let root = engine.index_node(0).unwrap();
    assert_eq!(root.key, k0);
    assert_eq!((root.low, root.high), (0, 1));

    let high = engine.index_node(1).unwrap();
    assert_eq!(high.key, k1);
    assert_eq!((high.low, high.high), (0, 2));

    let high_high = engine.index_node(2).unwrap();
    assert_eq!(high_high.key, k2);
    assert_eq!((high_high.low, high_high.high), (0, 0));
}

#[test]
fn test_descending_ids_build_left_spine() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = Engine::create_at(temp_dir.path().join("db"), 1024, 8).unwrap();

    for n in [30u128, 20, 10] {
        engine.insert(Id::from_u128(n), &[n as u8]).unwrap();
    }

    assert_eq!(engine.index_node(0).unwrap().low, 1);
    assert_eq!(engine.index_node(1).unwrap().low, 2);
    assert_eq!(engine.index_node(2).unwrap().low, NO_CHILD);
    assert_eq!(engine.index_node(0).unwrap().high, NO_CHILD);
}

#[test]
fn test_mixed_order_tree() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = Engine::create_at(temp_dir.path().join("db"), 1024, 8).unwrap();

    //        50(0)
    //       /     \
    //    30(1)   70(2)
    //       \    /
    //     40(3) 60(4)
    for n in [50u128, 30, 70, 40, 60] {
        engine.insert(Id::from_u128(n), &[n as u8]).unwrap();
    }

    let shape: Vec<(u64, u64)> = (0..5)
        .map(|slot| {
            let node = engine.index_node(slot).unwrap();
            (node.low, node.high)
        })
        .collect();
    assert_eq!(shape, vec![(1, 2), (0, 3), (4, 0), (0, 0), (0, 0)]);

    for n in [50u128, 30, 70, 40, 60] {
        assert_eq!(engine.read(Id::from_u128(n)).unwrap(), vec![n as u8]);
    }
}

// =============================================================================
// Raw File Tests
// =============================================================================

#[test]
fn test_index_file_layout_after_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");

    let mut ids = SequentialIds::new(0x0100);
    let k0 = ids.next_id();
    let k1 = ids.next_id();
    {
        let mut engine = Engine::create_at(&path, 64, 4).unwrap();
        engine.insert(k0, b"abc").unwrap();
        engine.insert(k1, b"defgh").unwrap();
        engine.delete(k0).unwrap();
        engine.close().unwrap();
    }

    let index = std::fs::read(path.join("index")).unwrap();
    assert_eq!(index.len(), 8 + 4 * 48);
    assert_eq!(read_u64(&index, 0), 2);

    let root = raw_slot(&index, 0);
    assert_eq!(root.key, k0);
    assert_eq!(root.data_offset, -1);
    assert_eq!(root.data_size, 3);
    assert_eq!(root.high, 1);

    let child = raw_slot(&index, 1);
    assert_eq!(&index[8 + 48..8 + 48 + 16], k1.as_bytes());
    assert_eq!(child.data_offset, 3);
    assert_eq!(child.data_size, 5);
    assert_eq!((child.low, child.high), (0, 0));

    // Unused slots stay zeroed
    assert!(index[8 + 2 * 48..].iter().all(|&b| b == 0));

    let data = std::fs::read(path.join("data")).unwrap();
    assert_eq!(read_u64(&data, 0), 8);
    assert_eq!(&data[8..16], b"abcdefgh");
}

#[test]
fn test_fresh_files_have_zero_headers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("db");

    Engine::create_at(&path, 16, 2).unwrap().close().unwrap();

    let index = std::fs::read(path.join("index")).unwrap();
    let data = std::fs::read(path.join("data")).unwrap();
    assert_eq!(read_u64(&index, 0), 0);
    assert_eq!(read_u64(&data, 0), 0);
}
