//! Layout constants for 8³ voxel blocks and the spatial hash table.
//!
//! The voxel block is the unit of sparse allocation: a contiguous run of
//! `BLOCK_SIZE3` voxels inside the block storage array. Hash entries address
//! blocks by an integer block coordinate; multiply by `BLOCK_EDGE` to get
//! voxel coordinates and then by the configured voxel size to get world
//! coordinates.
//!
//! # Memory Layout
//!
//! ```text
//! Voxel index within a block (x innermost):
//!
//! index = x + y * 8 + z * 64
//!
//! Address:  0      1     ...   7      8     ...   63     64    ...
//! Content: [0,0,0][1,0,0]...[7,0,0][0,1,0]...[7,7,0][0,0,1]...
//! ```

use glam::Vec3;

/// Voxels per block edge.
pub const BLOCK_EDGE: usize = 8;

/// Voxels per block face slice.
pub const BLOCK_EDGE_SQ: usize = BLOCK_EDGE * BLOCK_EDGE;

/// Voxels per block (8³ = 512), the unit of allocation.
pub const BLOCK_SIZE3: usize = BLOCK_EDGE * BLOCK_EDGE * BLOCK_EDGE;

/// Storage pointer for an entry that was allocated but is not resident.
/// Reserved for host/accelerator swapping; this core never writes it.
pub const PTR_SWAPPED_OUT: i32 = -1;

/// Storage pointer marking an unallocated hash slot.
pub const PTR_UNALLOCATED: i32 = -2;

/// Convert block-local voxel coordinates to an index into the block's
/// voxel run.
#[inline(always)]
pub fn voxel_index(x: usize, y: usize, z: usize) -> usize {
  x + y * BLOCK_EDGE + z * BLOCK_EDGE_SQ
}

/// Inverse of [`voxel_index`].
#[inline(always)]
pub fn voxel_coord(index: usize) -> (usize, usize, usize) {
  (
    index % BLOCK_EDGE,
    (index / BLOCK_EDGE) % BLOCK_EDGE,
    index / BLOCK_EDGE_SQ,
  )
}

/// Unit offsets of the 8 corners of a block, in corner-index order
/// (bit 2 = x, bit 1 = y, bit 0 = z).
pub const CORNER_OFFSETS: [Vec3; 8] = [
  Vec3::new(0.0, 0.0, 0.0),
  Vec3::new(0.0, 0.0, 1.0),
  Vec3::new(0.0, 1.0, 0.0),
  Vec3::new(0.0, 1.0, 1.0),
  Vec3::new(1.0, 0.0, 0.0),
  Vec3::new(1.0, 0.0, 1.0),
  Vec3::new(1.0, 1.0, 0.0),
  Vec3::new(1.0, 1.0, 1.0),
];

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
