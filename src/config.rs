//! Scene configuration, validated at construction.
//!
//! The hash geometry and fusion scalars were compile-time macros in older
//! TSDF systems; here they are explicit immutable structs so a scene can be
//! sized to the workload (and tests can run tiny tables).

use thiserror::Error;

use crate::constants::BLOCK_EDGE;

/// Configuration rejected by [`HashParams::new`] or [`FusionParams::new`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
  #[error("bucket count {0} is not a power of two")]
  BucketCountNotPowerOfTwo(usize),

  #[error("excess capacity {excess} must be smaller than bucket count {buckets}")]
  ExcessCapacityTooLarge { excess: usize, buckets: usize },

  #[error("excess capacity {0} does not fit the collision-offset width")]
  ExcessCapacityUnrepresentable(usize),

  #[error("block capacity must be nonzero")]
  ZeroBlockCapacity,

  #[error("voxel size must be positive, got {0}")]
  InvalidVoxelSize(f32),

  #[error("truncation half-width must be positive, got {0}")]
  InvalidTruncationBand(f32),

  #[error("view frustum [{near}, {far}] must satisfy 0 < near < far")]
  InvalidFrustum { near: f32, far: f32 },
}

/// Geometry of the spatial hash: main bucket table, excess (collision
/// overflow) region, and block storage capacity.
///
/// Total addressable hash slots = `bucket_count + excess_capacity`. Bucket
/// indices are computed by masking, so `bucket_count` must be a power of two.
#[derive(Clone, Copy, Debug)]
pub struct HashParams {
  bucket_count: usize,
  excess_capacity: usize,
  block_capacity: usize,
}

impl HashParams {
  pub fn new(
    bucket_count: usize,
    excess_capacity: usize,
    block_capacity: usize,
  ) -> Result<Self, ConfigError> {
    if !bucket_count.is_power_of_two() {
      return Err(ConfigError::BucketCountNotPowerOfTwo(bucket_count));
    }
    if excess_capacity >= bucket_count {
      return Err(ConfigError::ExcessCapacityTooLarge {
        excess: excess_capacity,
        buckets: bucket_count,
      });
    }
    // Collision offsets are 1-based i32 values.
    if excess_capacity >= i32::MAX as usize {
      return Err(ConfigError::ExcessCapacityUnrepresentable(excess_capacity));
    }
    if block_capacity == 0 {
      return Err(ConfigError::ZeroBlockCapacity);
    }

    Ok(Self {
      bucket_count,
      excess_capacity,
      block_capacity,
    })
  }

  /// Number of main hash buckets.
  #[inline]
  pub fn bucket_count(&self) -> usize {
    self.bucket_count
  }

  /// Number of overflow slots for collision chains.
  #[inline]
  pub fn excess_capacity(&self) -> usize {
    self.excess_capacity
  }

  /// Number of voxel blocks the storage array can hold.
  #[inline]
  pub fn block_capacity(&self) -> usize {
    self.block_capacity
  }

  /// Total addressable hash slots (buckets + excess region).
  #[inline]
  pub fn total_entries(&self) -> usize {
    self.bucket_count + self.excess_capacity
  }

  /// Mask for reducing a raw hash value to a bucket index.
  #[inline]
  pub fn bucket_mask(&self) -> u32 {
    (self.bucket_count - 1) as u32
  }

  /// Hash-slot index of excess entry `excess_index`.
  #[inline]
  pub fn excess_slot(&self, excess_index: usize) -> usize {
    self.bucket_count + excess_index
  }
}

impl Default for HashParams {
  /// Room-scale defaults: 2²⁰ buckets, 2¹⁷ excess slots, 2¹⁸ blocks.
  fn default() -> Self {
    Self {
      bucket_count: 0x100000,
      excess_capacity: 0x20000,
      block_capacity: 0x40000,
    }
  }
}

/// Fusion scalars: metric sizes, truncation band, weight caps, frustum.
///
/// Fields stay private so a value can only come out of the validating
/// constructor, same as [`HashParams`].
#[derive(Clone, Copy, Debug)]
pub struct FusionParams {
  voxel_size: f32,
  mu: f32,
  max_depth_weight: u8,
  max_color_weight: u8,
  view_frustum_min: f32,
  view_frustum_max: f32,
}

impl FusionParams {
  pub fn new(
    voxel_size: f32,
    mu: f32,
    max_depth_weight: u8,
    max_color_weight: u8,
    view_frustum_min: f32,
    view_frustum_max: f32,
  ) -> Result<Self, ConfigError> {
    if !(voxel_size > 0.0) {
      return Err(ConfigError::InvalidVoxelSize(voxel_size));
    }
    if !(mu > 0.0) {
      return Err(ConfigError::InvalidTruncationBand(mu));
    }
    if !(view_frustum_min > 0.0 && view_frustum_min < view_frustum_max) {
      return Err(ConfigError::InvalidFrustum {
        near: view_frustum_min,
        far: view_frustum_max,
      });
    }

    Ok(Self {
      voxel_size,
      mu,
      max_depth_weight,
      max_color_weight,
      view_frustum_min,
      view_frustum_max,
    })
  }

  /// Voxel edge length in world units.
  #[inline]
  pub fn voxel_size(&self) -> f32 {
    self.voxel_size
  }

  /// Truncation half-width `mu` in world units.
  #[inline]
  pub fn mu(&self) -> f32 {
    self.mu
  }

  /// Saturation cap for the depth observation weight.
  #[inline]
  pub fn max_depth_weight(&self) -> u8 {
    self.max_depth_weight
  }

  /// Saturation cap for the color observation weight.
  #[inline]
  pub fn max_color_weight(&self) -> u8 {
    self.max_color_weight
  }

  /// Near plane of the valid viewing volume.
  #[inline]
  pub fn view_frustum_min(&self) -> f32 {
    self.view_frustum_min
  }

  /// Far plane of the valid viewing volume.
  #[inline]
  pub fn view_frustum_max(&self) -> f32 {
    self.view_frustum_max
  }

  /// World-space edge length of one voxel block.
  #[inline]
  pub fn block_world_size(&self) -> f32 {
    self.voxel_size * BLOCK_EDGE as f32
  }
}

impl Default for FusionParams {
  /// 5 mm voxels, 2 cm truncation band, frustum 0.2–3.0 m.
  fn default() -> Self {
    Self {
      voxel_size: 0.005,
      mu: 0.02,
      max_depth_weight: 100,
      max_color_weight: 100,
      view_frustum_min: 0.2,
      view_frustum_max: 3.0,
    }
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
