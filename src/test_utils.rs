//! Shared fixtures for phase tests: small scenes and synthetic frames.

use glam::UVec2;

use crate::camera::Intrinsics;
use crate::config::{FusionParams, HashParams};
use crate::scene::Scene;
use crate::scratch::FrameVisibility;
use crate::types::TsdfVoxel;

/// 64×48 test frame.
pub const IMG_SIZE: UVec2 = UVec2::new(64, 48);

/// Centered pinhole for [`IMG_SIZE`].
pub fn test_intrinsics() -> Intrinsics {
  Intrinsics::new(50.0, 50.0, 32.0, 24.0)
}

/// 1 cm voxels (8 cm blocks), 2 cm truncation band, wide frustum.
pub fn test_fusion_params() -> FusionParams {
  FusionParams::new(0.01, 0.02, 100, 100, 0.1, 10.0).unwrap()
}

/// Scene sized for a full synthetic frame without exhaustion.
pub fn test_scene<V: TsdfVoxel>() -> (Scene<V>, FrameVisibility) {
  let hash_params = HashParams::new(4096, 128, 1024).unwrap();
  let scene = Scene::new(test_fusion_params(), hash_params);
  let vis = FrameVisibility::new(hash_params.total_entries());
  (scene, vis)
}

/// Scene with almost no block storage, for exhaustion scenarios.
pub fn starved_scene<V: TsdfVoxel>(block_capacity: usize) -> (Scene<V>, FrameVisibility) {
  let hash_params = HashParams::new(4096, 128, block_capacity).unwrap();
  let scene = Scene::new(test_fusion_params(), hash_params);
  let vis = FrameVisibility::new(hash_params.total_entries());
  (scene, vis)
}

/// Constant-depth frame; `invalid_margin` pixels around the border are 0
/// (invalid) so tests can also exercise the skip path.
pub fn flat_depth(depth: f32, invalid_margin: u32) -> Vec<f32> {
  let mut data = vec![0.0f32; (IMG_SIZE.x * IMG_SIZE.y) as usize];
  for y in invalid_margin..(IMG_SIZE.y - invalid_margin) {
    for x in invalid_margin..(IMG_SIZE.x - invalid_margin) {
      data[(x + y * IMG_SIZE.x) as usize] = depth;
    }
  }
  data
}

/// Solid-color frame.
pub fn flat_color(rgb: [u8; 3]) -> Vec<[u8; 4]> {
  vec![[rgb[0], rgb[1], rgb[2], 255]; (IMG_SIZE.x * IMG_SIZE.y) as usize]
}
