//! Scene: the persistent volumetric model.
//!
//! Owns the spatial hash, the voxel block arena, and the fusion parameters.
//! Generic over the voxel payload; pick a payload type once at construction
//! and every phase specializes to it.

use crate::block_array::VoxelBlockArray;
use crate::config::{FusionParams, HashParams};
use crate::hash::VoxelBlockHash;
use crate::types::TsdfVoxel;

pub struct Scene<V: TsdfVoxel> {
  params: FusionParams,
  hash: VoxelBlockHash,
  blocks: VoxelBlockArray<V>,
}

impl<V: TsdfVoxel> Scene<V> {
  pub fn new(params: FusionParams, hash_params: HashParams) -> Self {
    Self {
      params,
      hash: VoxelBlockHash::new(hash_params),
      blocks: VoxelBlockArray::new(hash_params.block_capacity()),
    }
  }

  #[inline]
  pub fn params(&self) -> &FusionParams {
    &self.params
  }

  #[inline]
  pub fn hash(&self) -> &VoxelBlockHash {
    &self.hash
  }

  #[inline]
  pub fn hash_mut(&mut self) -> &mut VoxelBlockHash {
    &mut self.hash
  }

  #[inline]
  pub fn blocks(&self) -> &VoxelBlockArray<V> {
    &self.blocks
  }

  #[inline]
  pub fn blocks_mut(&mut self) -> &mut VoxelBlockArray<V> {
    &mut self.blocks
  }

  /// Split borrow for the allocation commit, which mutates the hash table
  /// and both free lists in one pass.
  #[inline]
  pub fn hash_and_blocks_mut(&mut self) -> (&mut VoxelBlockHash, &mut VoxelBlockArray<V>) {
    (&mut self.hash, &mut self.blocks)
  }

  /// Drop the whole model: every hash entry unallocated, every voxel empty,
  /// both free lists full.
  pub fn reset(&mut self) {
    self.hash.reset();
    self.blocks.reset();
  }
}
