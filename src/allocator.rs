//! Allocation commit: turn planner requests into live hash entries.
//!
//! Runs in two passes. The claim pass is parallel — exactly one task per
//! hash slot — and only touches the atomic free lists, so concurrent claims
//! can never hand out the same storage slot. The apply pass is exclusive
//! and writes the hash entries, wires collision links, and recovers any
//! main-storage slot orphaned by excess-list exhaustion.
//!
//! Resource exhaustion is not an error: the affected block is simply absent
//! this frame and will be re-proposed by the planner while it stays
//! observed.

use rayon::prelude::*;

use crate::block_array::VoxelBlockArray;
use crate::hash::{HashEntry, VoxelBlockHash};
use crate::scratch::{AllocType, FrameVisibility, Visibility};
use crate::types::TsdfVoxel;

/// Outcome of per-frame allocation commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocationStats {
  /// Entries committed this frame.
  pub allocated: usize,

  /// Requests dropped because a free list was exhausted.
  pub failures: usize,
}

enum Claim {
  /// Slots claimed; write `entry` at `target`, optionally linking the
  /// existing entry at `parent` to the new excess entry.
  Commit {
    target: usize,
    parent_link: Option<(usize, i32)>,
    entry: HashEntry,
  },

  /// Block storage was claimed but the excess list was empty; the block
  /// slot must go back to the free list.
  Orphan(i32),

  /// Block storage itself was exhausted.
  Exhausted,
}

/// Commit every allocation flagged in the scratch arrays.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "allocator::commit")
)]
pub fn commit<V: TsdfVoxel>(
  hash: &mut VoxelBlockHash,
  blocks: &mut VoxelBlockArray<V>,
  vis: &FrameVisibility,
) -> AllocationStats {
  let params = *hash.params();
  let total = params.total_entries();

  // Claim pass: parallel, one task per slot index. Free-list claims are
  // atomic; nothing else is written.
  let claims: Vec<Claim> = {
    let hash = &*hash;
    let blocks = &*blocks;
    (0..total)
      .into_par_iter()
      .filter_map(|slot| {
        let alloc_type = vis.alloc_type(slot);
        if alloc_type == AllocType::None {
          return None;
        }

        let ptr = match blocks.free_list().allocate() {
          Some(ptr) => ptr,
          None => return Some(Claim::Exhausted),
        };

        let entry = HashEntry {
          pos: vis.pending_coord(slot),
          offset: 0,
          ptr,
        };

        Some(match alloc_type {
          AllocType::MainSlot => Claim::Commit {
            target: slot,
            parent_link: None,
            entry,
          },
          AllocType::ExcessSlot => match hash.excess_list().allocate() {
            Some(excess_index) => Claim::Commit {
              target: params.excess_slot(excess_index as usize),
              parent_link: Some((slot, excess_index + 1)),
              entry,
            },
            None => Claim::Orphan(ptr),
          },
          AllocType::None => unreachable!(),
        })
      })
      .collect()
  };

  // Apply pass: exclusive. Every target slot is distinct (main slots were
  // flagged once each, excess slots are freshly claimed), so ordering
  // between commits does not matter.
  let mut stats = AllocationStats::default();
  for claim in claims {
    match claim {
      Claim::Commit {
        target,
        parent_link,
        entry,
      } => {
        if let Some((parent, offset)) = parent_link {
          hash.entry_mut(parent).offset = offset;
        }
        *hash.entry_mut(target) = entry;
        vis.set_visibility(target, Visibility::Visible);
        stats.allocated += 1;
      }
      Claim::Orphan(ptr) => {
        blocks.free_list_mut().release(ptr);
        stats.failures += 1;
      }
      Claim::Exhausted => {
        stats.failures += 1;
      }
    }
  }

  stats
}

#[cfg(test)]
#[path = "allocator_test.rs"]
mod allocator_test;
