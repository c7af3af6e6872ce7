use super::*;
use crate::types::BlockCoord;

fn small_params() -> HashParams {
  HashParams::new(64, 16, 32).unwrap()
}

/// hash_index stays in [0, bucket_count) and is deterministic, including
/// for negative coordinates.
#[test]
fn test_hash_index_range_and_determinism() {
  let mask = 63u32;
  for x in -20i16..20 {
    for y in -20i16..20 {
      let pos = BlockCoord::new(x, y, (x as i32 * y as i32 % 17) as i16);
      let h = hash_index(pos, mask);
      assert!(h < 64);
      assert_eq!(h, hash_index(pos, mask));
    }
  }
}

/// Lookup on an empty table reports a missing entry rooted at the bucket.
#[test]
fn test_lookup_empty() {
  let hash = VoxelBlockHash::new(small_params());
  let pos = BlockCoord::new(1, 2, 3);

  match hash.lookup(pos) {
    Lookup::Missing {
      chain_end,
      in_chain,
    } => {
      assert_eq!(chain_end, hash.bucket_of(pos));
      assert!(!in_chain);
    }
    other => panic!("expected Missing, got {:?}", other),
  }
}

/// A manually written entry is found at its bucket.
#[test]
fn test_lookup_found_in_bucket() {
  let mut hash = VoxelBlockHash::new(small_params());
  let pos = BlockCoord::new(-3, 7, 1);
  let bucket = hash.bucket_of(pos);

  *hash.entry_mut(bucket) = HashEntry {
    pos,
    offset: 0,
    ptr: 5,
  };

  assert_eq!(
    hash.lookup(pos),
    Lookup::Found(
      bucket,
      HashEntry {
        pos,
        offset: 0,
        ptr: 5
      }
    )
  );
}

/// Find two distinct coordinates sharing a bucket.
pub fn colliding_pair(hash: &VoxelBlockHash) -> (BlockCoord, BlockCoord) {
  let a = BlockCoord::new(0, 0, 0);
  let bucket = hash.bucket_of(a);
  for x in 1i16..100 {
    for y in 0i16..100 {
      let b = BlockCoord::new(x, y, 0);
      if b != a && hash.bucket_of(b) == bucket {
        return (a, b);
      }
    }
  }
  panic!("no collision found in search range");
}

/// A chained entry in the excess region is reachable from the root bucket,
/// and both entries stay independently lookup-able.
#[test]
fn test_lookup_follows_collision_chain() {
  let mut hash = VoxelBlockHash::new(small_params());
  let (a, b) = colliding_pair(&hash);
  let bucket = hash.bucket_of(a);
  let excess_slot = hash.params().excess_slot(4);

  *hash.entry_mut(bucket) = HashEntry {
    pos: a,
    offset: 5, // 1-based: excess index 4
    ptr: 0,
  };
  *hash.entry_mut(excess_slot) = HashEntry {
    pos: b,
    offset: 0,
    ptr: 1,
  };

  match hash.lookup(a) {
    Lookup::Found(slot, entry) => {
      assert_eq!(slot, bucket);
      assert_eq!(entry.ptr, 0);
    }
    other => panic!("expected Found for root, got {:?}", other),
  }

  match hash.lookup(b) {
    Lookup::Found(slot, entry) => {
      assert_eq!(slot, excess_slot);
      assert_eq!(entry.ptr, 1);
    }
    other => panic!("expected Found for chained, got {:?}", other),
  }

  // A third collider reports the chain end, flagged for the excess region.
  let bucket_mask = hash.params().bucket_mask();
  let c = (0i16..)
    .flat_map(|x| (0i16..200).map(move |y| BlockCoord::new(x, y, 1)))
    .find(|&c| hash_index(c, bucket_mask) == bucket && c != a && c != b)
    .unwrap();

  match hash.lookup(c) {
    Lookup::Missing {
      chain_end,
      in_chain,
    } => {
      assert_eq!(chain_end, excess_slot);
      assert!(in_chain);
    }
    other => panic!("expected Missing at chain end, got {:?}", other),
  }
}

/// Swapped-out entries (ptr == -1) still match on lookup.
#[test]
fn test_lookup_matches_swapped_out() {
  let mut hash = VoxelBlockHash::new(small_params());
  let pos = BlockCoord::new(9, 9, 9);
  let bucket = hash.bucket_of(pos);

  *hash.entry_mut(bucket) = HashEntry {
    pos,
    offset: 0,
    ptr: crate::constants::PTR_SWAPPED_OUT,
  };

  match hash.lookup(pos) {
    Lookup::Found(_, entry) => assert!(!entry.is_active()),
    other => panic!("expected Found, got {:?}", other),
  }
}

/// Reset returns every slot to the unallocated sentinel and refills the
/// excess pool.
#[test]
fn test_reset() {
  let mut hash = VoxelBlockHash::new(small_params());
  let pos = BlockCoord::new(2, 2, 2);
  let bucket = hash.bucket_of(pos);
  *hash.entry_mut(bucket) = HashEntry {
    pos,
    offset: 0,
    ptr: 3,
  };
  hash.excess_list_mut().allocate();

  hash.reset();

  assert!(matches!(hash.lookup(pos), Lookup::Missing { .. }));
  assert_eq!(
    hash.excess_list().free_count(),
    hash.params().excess_capacity()
  );
}
