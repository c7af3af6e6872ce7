//! Per-frame input bundle.
//!
//! Everything the fusion core consumes for one frame, borrowed from the
//! external capture and tracking collaborators: images, poses, intrinsics.
//! All read-only; the core never owns pixels or poses.

use glam::Mat4;

use crate::camera::{ColorImage, DepthImage, Intrinsics};

/// One frame of sensor input.
pub struct FrameView<'a> {
  pub depth: DepthImage<'a>,

  /// Color frame; `None` runs depth-only fusion even for color payloads.
  pub color: Option<ColorImage<'a>>,

  /// World → depth-camera rigid transform.
  pub depth_pose: Mat4,

  /// Depth-camera → world (inverse pose), used by the planner's ray walk.
  pub depth_pose_inv: Mat4,

  /// World → color-camera rigid transform.
  pub color_pose: Mat4,

  pub depth_intrinsics: Intrinsics,
  pub color_intrinsics: Intrinsics,
}

impl<'a> FrameView<'a> {
  /// Depth-only frame; the color camera mirrors the depth camera so color
  /// payload scenes can still fuse depth.
  pub fn depth_only(depth: DepthImage<'a>, depth_pose: Mat4, depth_intrinsics: Intrinsics) -> Self {
    Self {
      depth,
      color: None,
      depth_pose,
      depth_pose_inv: depth_pose.inverse(),
      color_pose: depth_pose,
      depth_intrinsics,
      color_intrinsics: depth_intrinsics,
    }
  }

  /// Attach a color frame with its own pose and intrinsics.
  pub fn with_color(
    mut self,
    color: ColorImage<'a>,
    color_pose: Mat4,
    color_intrinsics: Intrinsics,
  ) -> Self {
    self.color = Some(color);
    self.color_pose = color_pose;
    self.color_intrinsics = color_intrinsics;
    self
  }
}
