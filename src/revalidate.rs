//! Visibility revalidation and visible-list compaction.
//!
//! Blocks visible last frame but not re-detected by the planner get a cheap
//! second chance: project their 8 corners through the current depth camera.
//! If any corner lands in the image the block stays visible; otherwise it is
//! demoted. Afterwards the slot indices of everything still visible are
//! compacted into the list consumed by rendering and tracking.

use glam::{Mat4, UVec2, Vec3};
use rayon::prelude::*;

use crate::camera::{project_to_pixel, Intrinsics};
use crate::constants::CORNER_OFFSETS;
use crate::hash::VoxelBlockHash;
use crate::scratch::{FrameVisibility, Visibility};
use crate::types::BlockCoord;

/// Project the eight corners of a block's world-space bounding cube; the
/// block counts as visible if any corner projects into the image in front
/// of the camera.
pub fn check_block_visibility(
  pos: BlockCoord,
  world_to_camera: &Mat4,
  intrinsics: &Intrinsics,
  img_size: UVec2,
  block_world_size: f32,
) -> bool {
  let base = Vec3::new(pos.x as f32, pos.y as f32, pos.z as f32) * block_world_size;

  CORNER_OFFSETS.iter().any(|corner| {
    project_to_pixel(
      intrinsics,
      world_to_camera,
      img_size,
      base + *corner * block_world_size,
    )
    .is_some()
  })
}

/// Re-check stale `VisiblePrevious` slots, then compact all visible slot
/// indices into the frame's visible-entry list. One independent task per
/// hash slot; each touches only its own scratch cell.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "revalidate::revalidate_and_compact")
)]
pub fn revalidate_and_compact(
  hash: &VoxelBlockHash,
  vis: &mut FrameVisibility,
  world_to_camera: &Mat4,
  depth_intrinsics: &Intrinsics,
  depth_img_size: UVec2,
  block_world_size: f32,
) {
  let total = hash.params().total_entries();

  (0..total).into_par_iter().for_each(|slot| {
    if vis.visibility(slot) == Visibility::VisiblePrevious {
      let entry = hash.entry(slot);
      let still_visible = check_block_visibility(
        entry.pos,
        world_to_camera,
        depth_intrinsics,
        depth_img_size,
        block_world_size,
      );
      if !still_visible {
        vis.set_visibility(slot, Visibility::NotVisible);
      }
    }
  });

  let visible: Vec<u32> = (0..total as u32)
    .into_par_iter()
    .filter(|&slot| vis.visibility(slot as usize) != Visibility::NotVisible)
    .collect();

  vis.set_visible_slots(visible);
}

#[cfg(test)]
#[path = "revalidate_test.rs"]
mod revalidate_test;
