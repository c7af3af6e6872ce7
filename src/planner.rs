//! Visibility & allocation planning: one task per depth pixel.
//!
//! Each valid depth sample spans a short segment of its viewing ray covering
//! the truncation band. Every block the segment crosses is either marked
//! visible (already in the hash) or flagged for allocation. The phase only
//! reads the hash table and writes idempotent marks into the scratch
//! arrays, so pixels race harmlessly.

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use crate::camera::{DepthImage, Intrinsics};
use crate::config::FusionParams;
use crate::hash::{Lookup, VoxelBlockHash};
use crate::scratch::{AllocType, FrameVisibility, Visibility};
use crate::types::BlockCoord;

/// Block coordinate containing a point given in block-granularity space.
#[inline(always)]
pub fn block_coord_of_point(point_blocks: Vec3) -> BlockCoord {
  BlockCoord::new(
    point_blocks.x.floor() as i16,
    point_blocks.y.floor() as i16,
    point_blocks.z.floor() as i16,
  )
}

/// Walk the truncation-band segment for every depth pixel, marking visible
/// blocks and recording allocation requests.
///
/// `camera_to_world` is the inverse depth-camera pose.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "planner::plan")
)]
pub fn plan(
  hash: &VoxelBlockHash,
  vis: &FrameVisibility,
  depth: &DepthImage,
  camera_to_world: &Mat4,
  depth_intrinsics: &Intrinsics,
  params: &FusionParams,
) {
  let size = depth.size();
  let one_over_block_size = 1.0 / params.block_world_size();

  (0..size.y).into_par_iter().for_each(|y| {
    for x in 0..size.x {
      plan_pixel(
        hash,
        vis,
        depth,
        camera_to_world,
        depth_intrinsics,
        params,
        one_over_block_size,
        x,
        y,
      );
    }
  });
}

#[allow(clippy::too_many_arguments)]
#[inline]
fn plan_pixel(
  hash: &VoxelBlockHash,
  vis: &FrameVisibility,
  depth: &DepthImage,
  camera_to_world: &Mat4,
  depth_intrinsics: &Intrinsics,
  params: &FusionParams,
  one_over_block_size: f32,
  x: u32,
  y: u32,
) {
  let mu = params.mu();

  let depth_measure = depth.get(x, y);
  if depth_measure <= 0.0
    || (depth_measure - mu) < 0.0
    || (depth_measure - mu) < params.view_frustum_min()
    || (depth_measure + mu) > params.view_frustum_max()
  {
    return;
  }

  let pt_camera = depth_intrinsics.unproject(x, y, depth_measure);
  let dist_from_camera = pt_camera.length();

  // Segment endpoints at ±mu along the ray, scaled by 1/distance. The
  // scaling shrinks the walked segment at range, damping over-allocation
  // for far samples.
  let point = camera_to_world.transform_point3(pt_camera * (1.0 - mu / dist_from_camera))
    * one_over_block_size;
  let point_e = camera_to_world.transform_point3(pt_camera * (1.0 + mu / dist_from_camera))
    * one_over_block_size;

  // Step so that consecutive samples land in the same or an adjacent block.
  let direction = point_e - point;
  let no_steps = (2.0 * direction.length()).ceil() as i32;
  let step = if no_steps > 1 {
    direction / (no_steps - 1) as f32
  } else {
    Vec3::ZERO
  };

  let mut point = point;
  for _ in 0..no_steps {
    let block_pos = block_coord_of_point(point);

    match hash.lookup(block_pos) {
      Lookup::Found(slot, _) => {
        vis.set_visibility(slot, Visibility::Visible);
      }
      Lookup::Missing {
        chain_end,
        in_chain,
      } => {
        let alloc_type = if in_chain {
          AllocType::ExcessSlot
        } else {
          AllocType::MainSlot
        };
        vis.request_alloc(chain_end, alloc_type, block_pos);
      }
    }

    point += step;
  }
}

#[cfg(test)]
#[path = "planner_test.rs"]
mod planner_test;
