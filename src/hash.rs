//! Spatial hash index: block coordinate → storage slot.
//!
//! A fixed-size bucket table plus an overflow ("excess") region. Each entry
//! carries a block coordinate, a pointer into the voxel block storage array,
//! and a 1-based link into the excess region forming a singly linked
//! collision chain rooted at a main bucket.

use crate::config::HashParams;
use crate::constants::{PTR_SWAPPED_OUT, PTR_UNALLOCATED};
use crate::freelist::AllocationList;
use crate::types::BlockCoord;

/// One slot of the hash table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashEntry {
  /// Block coordinate identifying the entry. Multiply by `BLOCK_EDGE` for
  /// voxel coordinates, then by the voxel size for world coordinates.
  pub pos: BlockCoord,

  /// 1-based link to the next entry in the excess region; 0 terminates the
  /// collision chain.
  pub offset: i32,

  /// Index into the voxel block storage array.
  /// - `>= 0`: allocated and resident
  /// - `-1`: allocated but swapped out (reserved, never written here)
  /// - `< -1`: unallocated
  pub ptr: i32,
}

impl HashEntry {
  /// The unallocated sentinel entry.
  pub fn unallocated() -> Self {
    Self {
      pos: BlockCoord::ZERO,
      offset: 0,
      ptr: PTR_UNALLOCATED,
    }
  }

  /// Allocated now or in the past (storage permanently reserved).
  #[inline(always)]
  pub fn is_allocated(&self) -> bool {
    self.ptr >= PTR_SWAPPED_OUT
  }

  /// Allocated with resident voxel data.
  #[inline(always)]
  pub fn is_active(&self) -> bool {
    self.ptr >= 0
  }

  /// Whether a chained successor exists in the excess region.
  #[inline(always)]
  pub fn has_excess_offset(&self) -> bool {
    self.offset >= 1
  }

  /// Excess-region index of the chained successor.
  #[inline(always)]
  pub fn next_excess_index(&self) -> usize {
    (self.offset - 1) as usize
  }
}

/// Deterministic bucket hash: coordinate-mixing multiply-xor, masked down to
/// the bucket range. Pure, so every phase (and every thread) agrees on it.
#[inline(always)]
pub fn hash_index(pos: BlockCoord, bucket_mask: u32) -> usize {
  let x = (pos.x as i32 as u32).wrapping_mul(73_856_093);
  let y = (pos.y as i32 as u32).wrapping_mul(19_349_669);
  let z = (pos.z as i32 as u32).wrapping_mul(83_492_791);
  ((x ^ y ^ z) & bucket_mask) as usize
}

/// Result of [`VoxelBlockHash::lookup`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lookup {
  /// Entry exists; carries its hash-slot index and the entry itself.
  Found(usize, HashEntry),

  /// No entry for this coordinate. `chain_end` is the slot where the walk
  /// terminated (the root bucket, or the last entry of its collision
  /// chain); `in_chain` is true when that slot is occupied by a different
  /// coordinate, meaning a new entry would go to the excess region.
  Missing { chain_end: usize, in_chain: bool },
}

/// The spatial hash table: main buckets, excess region, and the free list
/// handing out excess slots.
pub struct VoxelBlockHash {
  params: HashParams,
  entries: Vec<HashEntry>,
  excess_list: AllocationList,
}

impl VoxelBlockHash {
  pub fn new(params: HashParams) -> Self {
    Self {
      params,
      entries: vec![HashEntry::unallocated(); params.total_entries()],
      excess_list: AllocationList::new(params.excess_capacity()),
    }
  }

  #[inline]
  pub fn params(&self) -> &HashParams {
    &self.params
  }

  /// Main bucket index for a block coordinate.
  #[inline(always)]
  pub fn bucket_of(&self, pos: BlockCoord) -> usize {
    hash_index(pos, self.params.bucket_mask())
  }

  #[inline(always)]
  pub fn entry(&self, slot: usize) -> &HashEntry {
    &self.entries[slot]
  }

  #[inline(always)]
  pub fn entry_mut(&mut self, slot: usize) -> &mut HashEntry {
    &mut self.entries[slot]
  }

  /// All hash slots, main buckets first, then the excess region.
  #[inline]
  pub fn entries(&self) -> &[HashEntry] {
    &self.entries
  }

  #[inline]
  pub fn excess_list(&self) -> &AllocationList {
    &self.excess_list
  }

  #[inline]
  pub fn excess_list_mut(&mut self) -> &mut AllocationList {
    &mut self.excess_list
  }

  /// Find the entry for a block coordinate.
  ///
  /// Reads the root bucket; on a position mismatch follows the collision
  /// chain through the excess region until the match or a zero offset. The
  /// chain is acyclic by construction (links only ever point at freshly
  /// claimed excess slots), so the walk always terminates.
  pub fn lookup(&self, pos: BlockCoord) -> Lookup {
    let mut slot = self.bucket_of(pos);
    let mut entry = self.entries[slot];

    if entry.pos == pos && entry.is_allocated() {
      return Lookup::Found(slot, entry);
    }

    // Search the excess chain only if the root bucket is taken.
    let in_chain = entry.is_allocated();
    if in_chain {
      while entry.has_excess_offset() {
        slot = self.params.excess_slot(entry.next_excess_index());
        entry = self.entries[slot];
        if entry.pos == pos && entry.is_allocated() {
          return Lookup::Found(slot, entry);
        }
      }
    }

    Lookup::Missing {
      chain_end: slot,
      in_chain,
    }
  }

  /// Restore every entry to the unallocated sentinel and refill the excess
  /// free list.
  pub fn reset(&mut self) {
    self.entries.fill(HashEntry::unallocated());
    self.excess_list.reset();
  }
}

#[cfg(test)]
#[path = "hash_test.rs"]
pub mod hash_test;
