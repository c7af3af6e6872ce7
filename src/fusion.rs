//! Fusion engine: weighted-average integration of a frame into the volume.
//!
//! One task per voxel block; voxels within a block are walked serially by
//! the owning task, so no voxel is touched twice per frame. The parallel
//! pass chunks the storage arena block-by-block and consults a job table
//! (block pointer → block coordinate) built from the visible-entry list, so
//! only blocks observed this frame do any work.
//!
//! Per-voxel failures (behind camera, outside image, invalid depth sample)
//! are expected and silent: branch and early-return, never an error. A
//! projection failure returns the dedicated sentinel -1.0, which is
//! observationally ambiguous with a legitimate eta of -1 at the exact
//! boundary; the color gate below inherits that ambiguity.

use glam::{IVec3, Mat4, Vec3};
use rayon::prelude::*;

use crate::block_array::VoxelBlockArray;
use crate::camera::{project_to_pixel, ColorImage, DepthImage, Intrinsics};
use crate::config::FusionParams;
use crate::constants::{voxel_index, BLOCK_EDGE, BLOCK_SIZE3};
use crate::types::{BlockCoord, TsdfVoxel};
use crate::view::FrameView;

/// "No valid projection" sentinel returned by [`update_voxel_depth`].
pub const ETA_INVALID: f32 = -1.0;

/// Project a voxel into the depth image and merge the observation into its
/// SDF and weight.
///
/// Returns `eta` (measured depth minus the voxel's camera-space depth) when
/// the voxel was projected, even if it lies beyond the truncation band and
/// was skipped; returns [`ETA_INVALID`] when the projection or the depth
/// sample was invalid.
pub fn update_voxel_depth<V: TsdfVoxel>(
  voxel: &mut V,
  pt_world: Vec3,
  world_to_camera: &Mat4,
  intrinsics: &Intrinsics,
  depth: &DepthImage,
  mu: f32,
  max_weight: u8,
) -> f32 {
  let (pt_camera, pt_image) =
    match project_to_pixel(intrinsics, world_to_camera, depth.size(), pt_world) {
      Some(p) => p,
      None => return ETA_INVALID,
    };

  // Measured depth at the projected pixel, no interpolation.
  let depth_measure = depth.sample_nearest(pt_image);
  if depth_measure <= 0.0 {
    return ETA_INVALID;
  }

  let eta = depth_measure - pt_camera.z;
  // Far behind the observed surface: outside the truncation band, skip.
  if eta < -mu {
    return eta;
  }

  let old_f = voxel.sdf();
  let old_w = voxel.depth_weight() as f32;

  let new_f = (eta / mu).min(1.0);
  let new_w = 1.0;

  let merged_f = (old_f * old_w + new_f * new_w) / (old_w + new_w);
  let merged_w = (old_w + new_w).min(max_weight as f32);

  voxel.set_sdf(merged_f);
  voxel.set_depth_weight(merged_w as u8);

  eta
}

/// Project a voxel into the color image and merge a bilinear color sample,
/// with the same weighted-average rule as depth.
pub fn update_voxel_color<V: TsdfVoxel>(
  voxel: &mut V,
  pt_world: Vec3,
  world_to_camera: &Mat4,
  intrinsics: &Intrinsics,
  rgb: &ColorImage,
  max_weight: u8,
) {
  let (_, pt_image) = match project_to_pixel(intrinsics, world_to_camera, rgb.size(), pt_world) {
    Some(p) => p,
    None => return,
  };

  let old_c = voxel.color();
  let old_w = voxel.color_weight() as f32;

  let new_c = rgb.sample_bilinear(pt_image);
  let new_w = 1.0;

  let merged_c = (old_c * old_w + new_c * new_w) / (old_w + new_w);
  let merged_w = (old_w + new_w).min(max_weight as f32);

  voxel.set_color(merged_c);
  voxel.set_color_weight(merged_w as u8);
}

/// Depth update plus near-surface-gated color update for one voxel.
#[inline]
fn update_voxel<V: TsdfVoxel>(
  voxel: &mut V,
  pt_world: Vec3,
  frame: &FrameView,
  params: &FusionParams,
) {
  let eta = update_voxel_depth(
    voxel,
    pt_world,
    &frame.depth_pose,
    &frame.depth_intrinsics,
    &frame.depth,
    params.mu(),
    params.max_depth_weight(),
  );

  if !V::HAS_COLOR {
    return;
  }
  let rgb = match &frame.color {
    Some(rgb) => rgb,
    None => return,
  };

  // Only voxels within ±25% of mu around the surface get color; looser
  // matches would smear color across the band.
  if eta > params.mu() || (eta / params.mu()).abs() > 0.25 {
    return;
  }

  update_voxel_color(
    voxel,
    pt_world,
    &frame.color_pose,
    &frame.color_intrinsics,
    rgb,
    params.max_color_weight(),
  );
}

/// Fuse one voxel block.
fn integrate_block<V: TsdfVoxel>(
  voxels: &mut [V],
  pos: BlockCoord,
  frame: &FrameView,
  params: &FusionParams,
) {
  let global_voxel = IVec3::new(pos.x as i32, pos.y as i32, pos.z as i32) * BLOCK_EDGE as i32;

  for z in 0..BLOCK_EDGE {
    for y in 0..BLOCK_EDGE {
      for x in 0..BLOCK_EDGE {
        let pt_world = (global_voxel.as_vec3() + Vec3::new(x as f32, y as f32, z as f32))
          * params.voxel_size();

        update_voxel(
          &mut voxels[voxel_index(x, y, z)],
          pt_world,
          frame,
          params,
        );
      }
    }
  }
}

/// Build the job table: block storage pointer → block coordinate, for every
/// active entry in the visible list.
pub fn build_job_table(
  block_capacity: usize,
  visible_slots: &[u32],
  entries: &[crate::hash::HashEntry],
) -> Vec<Option<BlockCoord>> {
  let mut jobs = vec![None; block_capacity];
  for &slot in visible_slots {
    let entry = &entries[slot as usize];
    if entry.is_active() {
      jobs[entry.ptr as usize] = Some(entry.pos);
    }
  }
  jobs
}

/// Integrate the frame into every block listed in the job table.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "fusion::integrate")
)]
pub fn integrate<V: TsdfVoxel>(
  blocks: &mut VoxelBlockArray<V>,
  jobs: &[Option<BlockCoord>],
  frame: &FrameView,
  params: &FusionParams,
) {
  blocks
    .voxels_mut()
    .par_chunks_mut(BLOCK_SIZE3)
    .zip(jobs.par_iter())
    .for_each(|(block_voxels, job)| {
      if let Some(pos) = job {
        integrate_block(block_voxels, *pos, frame, params);
      }
    });
}

#[cfg(test)]
#[path = "fusion_test.rs"]
mod fusion_test;
