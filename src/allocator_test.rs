use super::*;
use crate::config::HashParams;
use crate::hash::Lookup;
use crate::scratch::AllocType;
use crate::types::{BlockCoord, VoxelI16};

fn small_setup() -> (VoxelBlockHash, VoxelBlockArray<VoxelI16>, FrameVisibility) {
  let params = HashParams::new(64, 16, 8).unwrap();
  (
    VoxelBlockHash::new(params),
    VoxelBlockArray::new(params.block_capacity()),
    FrameVisibility::new(params.total_entries()),
  )
}

/// Committing a main-bucket request creates a lookup-able entry and marks
/// it visible.
#[test]
fn test_commit_main_slot_roundtrip() {
  let (mut hash, mut blocks, vis) = small_setup();
  let pos = BlockCoord::new(4, -2, 9);
  let bucket = hash.bucket_of(pos);

  vis.request_alloc(bucket, AllocType::MainSlot, pos);
  let stats = commit(&mut hash, &mut blocks, &vis);

  assert_eq!(stats, AllocationStats { allocated: 1, failures: 0 });

  match hash.lookup(pos) {
    Lookup::Found(slot, entry) => {
      assert_eq!(slot, bucket);
      assert_eq!(entry.pos, pos);
      assert_eq!(entry.offset, 0);
      assert!(entry.is_active());
    }
    other => panic!("expected Found, got {:?}", other),
  }

  assert_eq!(vis.visibility(bucket), Visibility::Visible);
  assert_eq!(blocks.free_list().free_count(), 7);
}

/// No two committed entries ever share a block-storage slot.
#[test]
fn test_commit_claims_distinct_storage() {
  let (mut hash, mut blocks, vis) = small_setup();
  // Four coordinates with pairwise-distinct buckets, so every request
  // survives the shared scratch slots.
  let mut coords: Vec<BlockCoord> = Vec::new();
  let mut buckets = std::collections::HashSet::new();
  for x in 1i16.. {
    let pos = BlockCoord::new(x, 0, 0);
    if buckets.insert(hash.bucket_of(pos)) {
      coords.push(pos);
      if coords.len() == 4 {
        break;
      }
    }
  }
  for &pos in &coords {
    match hash.lookup(pos) {
      Lookup::Missing {
        chain_end,
        in_chain,
      } => {
        let t = if in_chain { AllocType::ExcessSlot } else { AllocType::MainSlot };
        vis.request_alloc(chain_end, t, pos);
      }
      _ => unreachable!(),
    }
  }

  let stats = commit(&mut hash, &mut blocks, &vis);
  assert_eq!(stats.allocated, coords.len());

  let mut ptrs = Vec::new();
  for &pos in &coords {
    match hash.lookup(pos) {
      Lookup::Found(_, entry) => ptrs.push(entry.ptr),
      other => panic!("missing {:?}: {:?}", pos, other),
    }
  }
  ptrs.sort_unstable();
  ptrs.dedup();
  assert_eq!(ptrs.len(), coords.len(), "duplicate storage pointer");
}

/// A second coordinate hashing to an occupied bucket lands in the excess
/// region, linked from the root entry, and both stay lookup-able.
#[test]
fn test_commit_excess_chain() {
  let (mut hash, mut blocks, mut vis) = small_setup();
  let (a, b) = crate::hash::hash_test::colliding_pair(&hash);
  let bucket = hash.bucket_of(a);

  vis.request_alloc(bucket, AllocType::MainSlot, a);
  commit(&mut hash, &mut blocks, &vis);

  // Re-plan the collider: the bucket is taken now.
  vis.begin_frame();
  match hash.lookup(b) {
    Lookup::Missing {
      chain_end,
      in_chain,
    } => {
      assert_eq!(chain_end, bucket);
      assert!(in_chain);
      vis.request_alloc(chain_end, AllocType::ExcessSlot, b);
    }
    other => panic!("expected Missing, got {:?}", other),
  }
  let stats = commit(&mut hash, &mut blocks, &vis);
  assert_eq!(stats, AllocationStats { allocated: 1, failures: 0 });

  let root = *hash.entry(bucket);
  assert!(root.has_excess_offset(), "root must link its chain");
  let excess_slot = hash.params().excess_slot(root.next_excess_index());

  match hash.lookup(b) {
    Lookup::Found(slot, entry) => {
      assert_eq!(slot, excess_slot);
      assert_eq!(entry.pos, b);
      assert_eq!(vis.visibility(slot), Visibility::Visible);
    }
    other => panic!("expected chained Found, got {:?}", other),
  }
  assert!(matches!(hash.lookup(a), Lookup::Found(s, _) if s == bucket));
}

/// Block-storage exhaustion drops the request without touching the table.
#[test]
fn test_exhaustion_drops_allocation() {
  let (mut hash, mut blocks, vis) = small_setup();
  while blocks.free_list().allocate().is_some() {}

  let pos = BlockCoord::new(5, 5, 5);
  let bucket = hash.bucket_of(pos);
  vis.request_alloc(bucket, AllocType::MainSlot, pos);

  let stats = commit(&mut hash, &mut blocks, &vis);

  assert_eq!(stats, AllocationStats { allocated: 0, failures: 1 });
  assert!(matches!(hash.lookup(pos), Lookup::Missing { .. }));
  assert_eq!(vis.visibility(bucket), Visibility::NotVisible);
}

/// When the excess list is exhausted, the already-claimed block slot is
/// released back instead of leaking.
#[test]
fn test_orphaned_block_slot_released() {
  let (mut hash, mut blocks, vis) = small_setup();
  while hash.excess_list().allocate().is_some() {}
  let free_before = blocks.free_list().free_count();

  let (a, b) = crate::hash::hash_test::colliding_pair(&hash);
  let bucket = hash.bucket_of(a);
  *hash.entry_mut(bucket) = HashEntry { pos: a, offset: 0, ptr: 0 };

  vis.request_alloc(bucket, AllocType::ExcessSlot, b);
  let stats = commit(&mut hash, &mut blocks, &vis);

  assert_eq!(stats, AllocationStats { allocated: 0, failures: 1 });
  assert_eq!(
    blocks.free_list().free_count(),
    free_before,
    "orphaned slot must return to the free list"
  );
  assert_eq!(hash.entry(bucket).offset, 0, "no dangling chain link");
  assert!(matches!(hash.lookup(b), Lookup::Missing { .. }));
}
