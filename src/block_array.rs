//! Voxel block storage arena.
//!
//! One contiguous allocation holding every voxel of every block, plus the
//! free list handing out block slots. Hash entries point into this array by
//! block index; a block's voxels live at `ptr * BLOCK_SIZE3 ..`.

use crate::constants::BLOCK_SIZE3;
use crate::freelist::AllocationList;
use crate::types::TsdfVoxel;

pub struct VoxelBlockArray<V: TsdfVoxel> {
  voxels: Vec<V>,
  free_list: AllocationList,
  capacity: usize,
}

impl<V: TsdfVoxel> VoxelBlockArray<V> {
  pub fn new(block_capacity: usize) -> Self {
    Self {
      voxels: vec![V::empty(); block_capacity * BLOCK_SIZE3],
      free_list: AllocationList::new(block_capacity),
      capacity: block_capacity,
    }
  }

  #[inline]
  pub fn capacity(&self) -> usize {
    self.capacity
  }

  #[inline]
  pub fn free_list(&self) -> &AllocationList {
    &self.free_list
  }

  #[inline]
  pub fn free_list_mut(&mut self) -> &mut AllocationList {
    &mut self.free_list
  }

  /// Voxels of block `ptr`, in `voxel_index` order.
  #[inline]
  pub fn block(&self, ptr: i32) -> &[V] {
    let start = ptr as usize * BLOCK_SIZE3;
    &self.voxels[start..start + BLOCK_SIZE3]
  }

  #[inline]
  pub fn block_mut(&mut self, ptr: i32) -> &mut [V] {
    let start = ptr as usize * BLOCK_SIZE3;
    &mut self.voxels[start..start + BLOCK_SIZE3]
  }

  /// The whole arena as one slice (for rendering collaborators and for the
  /// fusion engine's chunked parallel pass).
  #[inline]
  pub fn voxels(&self) -> &[V] {
    &self.voxels
  }

  #[inline]
  pub fn voxels_mut(&mut self) -> &mut [V] {
    &mut self.voxels
  }

  /// Clear every voxel and refill the free list.
  pub fn reset(&mut self) {
    self.voxels.fill(V::empty());
    self.free_list.reset();
  }
}
