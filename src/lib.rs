//! tsdf_plugin - Framework/engine independent sparse TSDF fusion
//!
//! This crate incrementally builds a dense 3D surface model from a stream of
//! depth/color frames. Each frame is fused into a persistent truncated
//! signed distance field stored sparsely: the world is carved into 8³ voxel
//! blocks, and a spatially hashed key→block map allocates storage only for
//! blocks the sensor has actually observed.
//!
//! # Features
//!
//! - **Spatial hashing**: O(1) expected block lookup over millions of
//!   potential block positions, with bounded memory and an excess region
//!   for collision chains
//! - **Four-phase frame pipeline**: per-pixel visibility/allocation
//!   planning, per-slot allocation commit, stale-visibility revalidation,
//!   per-voxel weighted fusion — each phase data-parallel via rayon
//! - **Generic voxel payloads**: float or quantized i16 SDF, with or
//!   without color, selected once at scene construction
//! - **Graceful exhaustion**: empty free lists drop allocations for a frame
//!   instead of failing; blocks are re-proposed while still observed
//!
//! # Example
//!
//! ```ignore
//! use glam::{Mat4, UVec2};
//! use tsdf_plugin::{
//!   DepthImage, FrameView, FrameVisibility, FusionParams, HashParams,
//!   Intrinsics, ReconstructionEngine, Scene, VoxelI16Rgb,
//! };
//!
//! let mut scene = Scene::<VoxelI16Rgb>::new(FusionParams::default(), HashParams::default());
//! let mut vis = FrameVisibility::new(scene.hash().params().total_entries());
//! let engine = ReconstructionEngine::new();
//!
//! // Per frame, with pose from an external tracker:
//! let depth = DepthImage::new(&depth_pixels, UVec2::new(640, 480));
//! let frame = FrameView::depth_only(depth, pose, Intrinsics::new(525.0, 525.0, 320.0, 240.0));
//! let stats = engine.process_frame(&mut scene, &mut vis, &frame);
//!
//! println!("{} blocks visible, {} newly allocated",
//!   stats.visible_blocks, stats.allocation.allocated);
//! ```

pub mod constants;
pub mod types;

// Re-export commonly used items
pub use constants::{voxel_coord, voxel_index, BLOCK_EDGE, BLOCK_SIZE3};
pub use types::{
  sdf_quantization, BlockCoord, TsdfVoxel, VoxelF32, VoxelF32Rgb, VoxelI16, VoxelI16Rgb, Weight,
};

// Validated configuration
pub mod config;
pub use config::{ConfigError, FusionParams, HashParams};

// Camera math and image views
pub mod camera;
pub use camera::{ColorImage, DepthImage, Intrinsics};

// Spatial hash index and storage
pub mod block_array;
pub mod freelist;
pub mod hash;
pub use block_array::VoxelBlockArray;
pub use freelist::AllocationList;
pub use hash::{hash_index, HashEntry, Lookup, VoxelBlockHash};

// Per-frame scratch and visibility state
pub mod scratch;
pub use scratch::{AllocType, FrameVisibility, Visibility};

// Scene container
pub mod scene;
pub use scene::Scene;

// Frame input bundle
pub mod view;
pub use view::FrameView;

// Frame pipeline phases
pub mod allocator;
pub mod fusion;
pub mod planner;
pub mod revalidate;
pub use allocator::AllocationStats;

// Per-frame orchestration
pub mod engine;
pub use engine::{FusionStats, ReconstructionEngine};

// Shared test fixtures
#[cfg(test)]
pub mod test_utils;
