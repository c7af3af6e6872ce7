//! LIFO free-slot pools with a lock-free claim path.
//!
//! Two of these back the scene: one hands out voxel-block storage slots, the
//! other hands out excess hash slots. The allocation commit phase claims
//! slots from many rayon tasks at once, so `allocate` takes `&self` and
//! claims by atomically decrementing the top-of-stack index; each successful
//! claimant reads a distinct stack cell. `release` requires `&mut self` —
//! returning slots (eviction, orphan recovery) happens only between frames
//! or in the exclusive apply pass, never concurrently with claims.

use std::sync::atomic::{AtomicI32, Ordering};

/// LIFO stack of free slot indices.
pub struct AllocationList {
  /// Stack cells. Cells at positions `0..=top` hold free slot ids.
  ids: Vec<i32>,

  /// Index of the topmost free cell; negative when exhausted.
  top: AtomicI32,
}

impl AllocationList {
  /// Create a full list handing out slots `capacity-1, capacity-2, .., 0`.
  pub fn new(capacity: usize) -> Self {
    assert!(capacity <= i32::MAX as usize);
    Self {
      ids: (0..capacity as i32).collect(),
      top: AtomicI32::new(capacity as i32 - 1),
    }
  }

  /// Pop a free slot. Returns `None` when the pool is exhausted — a defined
  /// failure, never a block or a panic.
  ///
  /// Safe to call from many threads at once: `fetch_sub` hands each caller
  /// a distinct stack position, and the cells themselves are never written
  /// while claims are in flight (`release` needs `&mut self`).
  pub fn allocate(&self) -> Option<i32> {
    let top = self.top.fetch_sub(1, Ordering::AcqRel);
    if top < 0 {
      // Undo the decrement so exhaustion does not drift further negative
      // across frames.
      self.top.fetch_add(1, Ordering::AcqRel);
      return None;
    }
    Some(self.ids[top as usize])
  }

  /// Push a slot back onto the stack.
  ///
  /// Exclusive access: callers must be past the parallel claim phase.
  pub fn release(&mut self, slot: i32) {
    let top = self.top.get_mut();
    debug_assert!((*top + 1) < self.ids.len() as i32, "free list overfull");
    *top += 1;
    self.ids[*top as usize] = slot;
  }

  /// Number of free slots currently available.
  pub fn free_count(&self) -> usize {
    (self.top.load(Ordering::Acquire) + 1).max(0) as usize
  }

  /// Refill with every slot free again (scene reset).
  pub fn reset(&mut self) {
    let capacity = self.ids.len();
    for (i, id) in self.ids.iter_mut().enumerate() {
      *id = i as i32;
    }
    *self.top.get_mut() = capacity as i32 - 1;
  }
}

#[cfg(test)]
#[path = "freelist_test.rs"]
mod freelist_test;
