//! Per-frame scratch state: allocation requests, visibility marks, and the
//! compacted visible-entry list.
//!
//! One element per hash slot. The planner writes these from one task per
//! depth pixel; different pixels proposing the same block write identical
//! values, so the races are benign — but to keep them defined in Rust the
//! cells are relaxed atomics. Pending block coordinates are packed into a
//! single `AtomicU64` so the three components can never tear.
//!
//! The visible-entry list is the one piece that survives the frame: it is
//! what a renderer iterates, and what seeds the visible-previous-frame marks
//! at the start of the next frame.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::types::BlockCoord;

/// Per-slot allocation request produced by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AllocType {
  /// No request.
  None = 0,
  /// New entry fits directly in its main bucket.
  MainSlot = 1,
  /// Bucket taken by another coordinate; entry goes to the excess region.
  ExcessSlot = 2,
}

impl AllocType {
  #[inline(always)]
  fn from_u8(v: u8) -> Self {
    match v {
      1 => AllocType::MainSlot,
      2 => AllocType::ExcessSlot,
      _ => AllocType::None,
    }
  }
}

/// Per-slot visibility classification.
///
/// Only meaningful for slots holding an allocated entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Visibility {
  NotVisible = 0,
  /// Detected by the planner (or freshly allocated) this frame.
  Visible = 1,
  /// Visible last frame, not yet re-detected; awaits revalidation.
  VisiblePrevious = 3,
}

impl Visibility {
  #[inline(always)]
  fn from_u8(v: u8) -> Self {
    match v {
      1 => Visibility::Visible,
      3 => Visibility::VisiblePrevious,
      _ => Visibility::NotVisible,
    }
  }
}

#[inline(always)]
fn pack_coord(pos: BlockCoord) -> u64 {
  (pos.x as u16 as u64) | ((pos.y as u16 as u64) << 16) | ((pos.z as u16 as u64) << 32)
}

#[inline(always)]
fn unpack_coord(packed: u64) -> BlockCoord {
  BlockCoord::new(
    packed as u16 as i16,
    (packed >> 16) as u16 as i16,
    (packed >> 32) as u16 as i16,
  )
}

/// Scratch arrays plus the visible-entry list, sized to the hash table.
pub struct FrameVisibility {
  alloc_type: Vec<AtomicU8>,
  visible_type: Vec<AtomicU8>,
  pending_coords: Vec<AtomicU64>,
  visible_slots: Vec<u32>,
}

impl FrameVisibility {
  pub fn new(total_entries: usize) -> Self {
    Self {
      alloc_type: (0..total_entries).map(|_| AtomicU8::new(0)).collect(),
      visible_type: (0..total_entries).map(|_| AtomicU8::new(0)).collect(),
      pending_coords: (0..total_entries).map(|_| AtomicU64::new(0)).collect(),
      visible_slots: Vec::new(),
    }
  }

  #[inline]
  pub fn total_entries(&self) -> usize {
    self.alloc_type.len()
  }

  /// Start a new frame: clear allocation requests, age last frame's
  /// visible entries to `VisiblePrevious`, and reset the list.
  pub fn begin_frame(&mut self) {
    for a in &mut self.alloc_type {
      *a.get_mut() = AllocType::None as u8;
    }
    for slot in self.visible_slots.drain(..) {
      let v = self.visible_type[slot as usize].get_mut();
      if *v == Visibility::Visible as u8 {
        *v = Visibility::VisiblePrevious as u8;
      }
    }
  }

  /// Record an allocation request at `slot` (planner, parallel phase).
  /// Idempotent: concurrent writers for the same block store equal values.
  #[inline(always)]
  pub fn request_alloc(&self, slot: usize, alloc_type: AllocType, pos: BlockCoord) {
    self.pending_coords[slot].store(pack_coord(pos), Ordering::Relaxed);
    self.alloc_type[slot].store(alloc_type as u8, Ordering::Relaxed);
  }

  #[inline(always)]
  pub fn alloc_type(&self, slot: usize) -> AllocType {
    AllocType::from_u8(self.alloc_type[slot].load(Ordering::Relaxed))
  }

  #[inline(always)]
  pub fn pending_coord(&self, slot: usize) -> BlockCoord {
    unpack_coord(self.pending_coords[slot].load(Ordering::Relaxed))
  }

  #[inline(always)]
  pub fn visibility(&self, slot: usize) -> Visibility {
    Visibility::from_u8(self.visible_type[slot].load(Ordering::Relaxed))
  }

  /// Mark `slot` visible this frame (planner/allocator/revalidator).
  #[inline(always)]
  pub fn set_visibility(&self, slot: usize, v: Visibility) {
    self.visible_type[slot].store(v as u8, Ordering::Relaxed);
  }

  /// Slot indices of every entry visible this frame, compacted after
  /// revalidation. Exposed for rendering and tracking collaborators.
  #[inline]
  pub fn visible_slots(&self) -> &[u32] {
    &self.visible_slots
  }

  #[inline]
  pub fn visible_count(&self) -> usize {
    self.visible_slots.len()
  }

  pub(crate) fn set_visible_slots(&mut self, slots: Vec<u32>) {
    self.visible_slots = slots;
  }

  /// Full reset (scene reset): everything not-visible, no requests.
  pub fn reset(&mut self) {
    for a in &mut self.alloc_type {
      *a.get_mut() = 0;
    }
    for v in &mut self.visible_type {
      *v.get_mut() = 0;
    }
    for c in &mut self.pending_coords {
      *c.get_mut() = 0;
    }
    self.visible_slots.clear();
  }
}

#[cfg(test)]
#[path = "scratch_test.rs"]
mod scratch_test;
