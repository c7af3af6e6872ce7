//! Voxel payload types for TSDF fusion.
//!
//! The stored SDF is normalized to [-1, 1] in units of the truncation
//! half-width `mu`. Storage precision and color support are selected once,
//! at scene construction, through the [`TsdfVoxel`] type parameter — every
//! component is generic over it, so the no-color variants carry no color
//! code path at all.

use glam::{I16Vec3, Vec3};

/// Integer block coordinate, identifying an 8³ voxel block in
/// block-granularity world space.
pub type BlockCoord = I16Vec3;

/// Observation weight counter (saturating at a configured cap).
pub type Weight = u8;

/// SDF quantization for the i16 storage variants.
///
/// Maps the normalized SDF range [-1, 1] to [-32767, 32767].
/// Precision: ~3.1e-5 of the truncation band per level.
pub mod sdf_quantization {
  /// Scale factor between normalized SDF and i16 storage.
  pub const SCALE: f32 = 32767.0;

  /// Convert a normalized SDF value to quantized storage.
  #[inline(always)]
  pub fn to_storage(sdf: f32) -> i16 {
    (sdf * SCALE).clamp(-SCALE, SCALE) as i16
  }

  /// Convert quantized storage back to a normalized SDF value.
  #[inline(always)]
  pub fn to_float(value: i16) -> f32 {
    value as f32 / SCALE
  }
}

/// Capability trait for voxel payloads.
///
/// `HAS_COLOR` is a compile-time flag, not a separate code path: the fusion
/// engine consults it before doing any color work, and the setters on
/// colorless payloads are no-ops.
pub trait TsdfVoxel: Copy + Send + Sync + 'static {
  /// Whether this payload stores color.
  const HAS_COLOR: bool;

  /// A freshly allocated voxel: SDF at the far end of the truncation band
  /// (+1), zero observations.
  fn empty() -> Self;

  /// Stored SDF as a normalized float in [-1, 1].
  fn sdf(&self) -> f32;

  /// Store a normalized SDF value (quantized if the payload is quantized).
  fn set_sdf(&mut self, sdf: f32);

  fn depth_weight(&self) -> Weight;

  fn set_depth_weight(&mut self, w: Weight);

  /// Stored color, channels in [0, 255]. Zero for colorless payloads.
  fn color(&self) -> Vec3 {
    Vec3::ZERO
  }

  fn set_color(&mut self, _clr: Vec3) {}

  fn color_weight(&self) -> Weight {
    0
  }

  fn set_color_weight(&mut self, _w: Weight) {}
}

/// Float SDF, no color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelF32 {
  pub sdf: f32,
  pub w_depth: Weight,
}

impl TsdfVoxel for VoxelF32 {
  const HAS_COLOR: bool = false;

  fn empty() -> Self {
    Self {
      sdf: 1.0,
      w_depth: 0,
    }
  }

  #[inline(always)]
  fn sdf(&self) -> f32 {
    self.sdf
  }

  #[inline(always)]
  fn set_sdf(&mut self, sdf: f32) {
    self.sdf = sdf;
  }

  #[inline(always)]
  fn depth_weight(&self) -> Weight {
    self.w_depth
  }

  #[inline(always)]
  fn set_depth_weight(&mut self, w: Weight) {
    self.w_depth = w;
  }
}

/// Quantized i16 SDF, no color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelI16 {
  pub sdf: i16,
  pub w_depth: Weight,
}

impl TsdfVoxel for VoxelI16 {
  const HAS_COLOR: bool = false;

  fn empty() -> Self {
    Self {
      sdf: sdf_quantization::to_storage(1.0),
      w_depth: 0,
    }
  }

  #[inline(always)]
  fn sdf(&self) -> f32 {
    sdf_quantization::to_float(self.sdf)
  }

  #[inline(always)]
  fn set_sdf(&mut self, sdf: f32) {
    self.sdf = sdf_quantization::to_storage(sdf);
  }

  #[inline(always)]
  fn depth_weight(&self) -> Weight {
    self.w_depth
  }

  #[inline(always)]
  fn set_depth_weight(&mut self, w: Weight) {
    self.w_depth = w;
  }
}

/// Float SDF with RGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelF32Rgb {
  pub sdf: f32,
  pub w_depth: Weight,
  pub clr: [u8; 3],
  pub w_color: Weight,
}

impl TsdfVoxel for VoxelF32Rgb {
  const HAS_COLOR: bool = true;

  fn empty() -> Self {
    Self {
      sdf: 1.0,
      w_depth: 0,
      clr: [0; 3],
      w_color: 0,
    }
  }

  #[inline(always)]
  fn sdf(&self) -> f32 {
    self.sdf
  }

  #[inline(always)]
  fn set_sdf(&mut self, sdf: f32) {
    self.sdf = sdf;
  }

  #[inline(always)]
  fn depth_weight(&self) -> Weight {
    self.w_depth
  }

  #[inline(always)]
  fn set_depth_weight(&mut self, w: Weight) {
    self.w_depth = w;
  }

  #[inline(always)]
  fn color(&self) -> Vec3 {
    Vec3::new(self.clr[0] as f32, self.clr[1] as f32, self.clr[2] as f32)
  }

  #[inline(always)]
  fn set_color(&mut self, clr: Vec3) {
    let c = clr.clamp(Vec3::ZERO, Vec3::splat(255.0));
    self.clr = [c.x as u8, c.y as u8, c.z as u8];
  }

  #[inline(always)]
  fn color_weight(&self) -> Weight {
    self.w_color
  }

  #[inline(always)]
  fn set_color_weight(&mut self, w: Weight) {
    self.w_color = w;
  }
}

/// Quantized i16 SDF with RGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoxelI16Rgb {
  pub sdf: i16,
  pub w_depth: Weight,
  pub clr: [u8; 3],
  pub w_color: Weight,
}

impl TsdfVoxel for VoxelI16Rgb {
  const HAS_COLOR: bool = true;

  fn empty() -> Self {
    Self {
      sdf: sdf_quantization::to_storage(1.0),
      w_depth: 0,
      clr: [0; 3],
      w_color: 0,
    }
  }

  #[inline(always)]
  fn sdf(&self) -> f32 {
    sdf_quantization::to_float(self.sdf)
  }

  #[inline(always)]
  fn set_sdf(&mut self, sdf: f32) {
    self.sdf = sdf_quantization::to_storage(sdf);
  }

  #[inline(always)]
  fn depth_weight(&self) -> Weight {
    self.w_depth
  }

  #[inline(always)]
  fn set_depth_weight(&mut self, w: Weight) {
    self.w_depth = w;
  }

  #[inline(always)]
  fn color(&self) -> Vec3 {
    Vec3::new(self.clr[0] as f32, self.clr[1] as f32, self.clr[2] as f32)
  }

  #[inline(always)]
  fn set_color(&mut self, clr: Vec3) {
    let c = clr.clamp(Vec3::ZERO, Vec3::splat(255.0));
    self.clr = [c.x as u8, c.y as u8, c.z as u8];
  }

  #[inline(always)]
  fn color_weight(&self) -> Weight {
    self.w_color
  }

  #[inline(always)]
  fn set_color_weight(&mut self, w: Weight) {
    self.w_color = w;
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
