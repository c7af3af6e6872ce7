//! Reconstruction engine: the per-frame four-phase pipeline.
//!
//! ```text
//! ┌──────────┐    ┌────────────┐    ┌─────────────┐    ┌────────┐
//! │ Planner  ├───►│ Allocator  ├───►│ Revalidator ├───►│ Fusion │
//! └──────────┘    └────────────┘    └─────────────┘    └────────┘
//!  per pixel       per hash slot     per stale slot     per voxel
//! ```
//!
//! Each phase is internally parallel, but phases never overlap: allocation
//! reads the planner's finished scratch arrays, and fusion reads the hash
//! table only after every new entry is committed. A frame either completes
//! fully or the caller drops it; no partial state is exposed mid-frame.

use web_time::Instant;

use crate::allocator::{self, AllocationStats};
use crate::fusion;
use crate::planner;
use crate::revalidate;
use crate::scene::Scene;
use crate::scratch::FrameVisibility;
use crate::types::TsdfVoxel;
use crate::view::FrameView;

/// Per-frame outcome and phase timings.
#[derive(Clone, Copy, Debug, Default)]
pub struct FusionStats {
  pub allocation: AllocationStats,

  /// Entries in the visible list after revalidation.
  pub visible_blocks: usize,

  pub plan_us: u64,
  pub allocate_us: u64,
  pub revalidate_us: u64,
  pub fuse_us: u64,
  pub total_us: u64,
}

/// Drives the per-frame pipeline against a [`Scene`].
///
/// Stateless; per-frame state lives in the [`FrameVisibility`] the caller
/// owns (a renderer typically keeps one per camera).
#[derive(Default)]
pub struct ReconstructionEngine;

impl ReconstructionEngine {
  pub fn new() -> Self {
    Self
  }

  /// Phases 1-3: plan allocations and visibility from the depth frame,
  /// commit them, and revalidate stale visibility.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "engine::allocate_from_depth")
  )]
  pub fn allocate_from_depth<V: TsdfVoxel>(
    &self,
    scene: &mut Scene<V>,
    vis: &mut FrameVisibility,
    frame: &FrameView,
  ) -> AllocationStats {
    let mut stats = FusionStats::default();
    self.run_alloc_phases(scene, vis, frame, &mut stats);
    stats.allocation
  }

  /// The single plan → commit → revalidate sequence, with phase timings
  /// recorded into `stats`. Both public entry points go through here.
  fn run_alloc_phases<V: TsdfVoxel>(
    &self,
    scene: &mut Scene<V>,
    vis: &mut FrameVisibility,
    frame: &FrameView,
    stats: &mut FusionStats,
  ) {
    debug_assert_eq!(vis.total_entries(), scene.hash().params().total_entries());

    let t = Instant::now();
    vis.begin_frame();
    planner::plan(
      scene.hash(),
      vis,
      &frame.depth,
      &frame.depth_pose_inv,
      &frame.depth_intrinsics,
      scene.params(),
    );
    stats.plan_us = t.elapsed().as_micros() as u64;

    let t = Instant::now();
    let (hash, blocks) = scene.hash_and_blocks_mut();
    stats.allocation = allocator::commit(hash, blocks, vis);
    stats.allocate_us = t.elapsed().as_micros() as u64;

    let t = Instant::now();
    let block_world_size = scene.params().block_world_size();
    revalidate::revalidate_and_compact(
      scene.hash(),
      vis,
      &frame.depth_pose,
      &frame.depth_intrinsics,
      frame.depth.size(),
      block_world_size,
    );
    stats.revalidate_us = t.elapsed().as_micros() as u64;
    stats.visible_blocks = vis.visible_count();
  }

  /// Phase 4: fuse the frame into every visible block.
  #[cfg_attr(
    feature = "tracing",
    tracing::instrument(skip_all, name = "engine::integrate_into_scene")
  )]
  pub fn integrate_into_scene<V: TsdfVoxel>(
    &self,
    scene: &mut Scene<V>,
    vis: &FrameVisibility,
    frame: &FrameView,
  ) {
    let jobs = fusion::build_job_table(
      scene.blocks().capacity(),
      vis.visible_slots(),
      scene.hash().entries(),
    );

    let params = *scene.params();
    fusion::integrate(scene.blocks_mut(), &jobs, frame, &params);
  }

  /// Run the full frame: plan → commit → revalidate → fuse.
  pub fn process_frame<V: TsdfVoxel>(
    &self,
    scene: &mut Scene<V>,
    vis: &mut FrameVisibility,
    frame: &FrameView,
  ) -> FusionStats {
    let frame_start = Instant::now();
    let mut stats = FusionStats::default();

    self.run_alloc_phases(scene, vis, frame, &mut stats);

    let t = Instant::now();
    self.integrate_into_scene(scene, vis, frame);
    stats.fuse_us = t.elapsed().as_micros() as u64;

    stats.total_us = frame_start.elapsed().as_micros() as u64;
    stats
  }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
