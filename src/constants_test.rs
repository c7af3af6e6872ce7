use super::*;

/// Every (x, y, z) in the block maps to a unique index and back.
#[test]
fn test_voxel_index_bijection() {
  let mut seen = [false; BLOCK_SIZE3];

  for z in 0..BLOCK_EDGE {
    for y in 0..BLOCK_EDGE {
      for x in 0..BLOCK_EDGE {
        let idx = voxel_index(x, y, z);
        assert!(idx < BLOCK_SIZE3, "index {} out of range", idx);
        assert!(!seen[idx], "index {} produced twice", idx);
        seen[idx] = true;

        assert_eq!(voxel_coord(idx), (x, y, z), "roundtrip failed at {}", idx);
      }
    }
  }
}

/// X is the innermost axis, matching the storage layout contract.
#[test]
fn test_voxel_index_x_innermost() {
  assert_eq!(voxel_index(0, 0, 0), 0);
  assert_eq!(voxel_index(1, 0, 0), 1);
  assert_eq!(voxel_index(0, 1, 0), BLOCK_EDGE);
  assert_eq!(voxel_index(0, 0, 1), BLOCK_EDGE_SQ);
  assert_eq!(voxel_index(7, 7, 7), BLOCK_SIZE3 - 1);
}

/// All 8 corner offsets are distinct unit-cube corners.
#[test]
fn test_corner_offsets_distinct() {
  for (i, a) in CORNER_OFFSETS.iter().enumerate() {
    assert!(a.min_element() >= 0.0 && a.max_element() <= 1.0);
    for b in &CORNER_OFFSETS[i + 1..] {
      assert_ne!(a, b);
    }
  }
}
