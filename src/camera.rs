//! Pinhole projection and read-only image views.
//!
//! The fusion core never owns pixels: depth and color frames are borrowed
//! slices produced by an external capture pipeline, and poses/intrinsics are
//! produced by an external tracker. Everything here is the small amount of
//! camera math the planner, revalidator and fusion engine share.

use glam::{Mat4, UVec2, Vec2, Vec3};

/// Pinhole projection parameters in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intrinsics {
  pub fx: f32,
  pub fy: f32,
  pub cx: f32,
  pub cy: f32,
}

impl Intrinsics {
  pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
    Self { fx, fy, cx, cy }
  }

  /// Project a camera-space point to pixel coordinates. No bounds check;
  /// the caller decides what "inside the image" means.
  #[inline(always)]
  pub fn project(&self, pt_camera: Vec3) -> Vec2 {
    Vec2::new(
      self.fx * pt_camera.x / pt_camera.z + self.cx,
      self.fy * pt_camera.y / pt_camera.z + self.cy,
    )
  }

  /// Back-project pixel `(x, y)` at `depth` into camera space.
  #[inline(always)]
  pub fn unproject(&self, x: u32, y: u32, depth: f32) -> Vec3 {
    Vec3::new(
      depth * (x as f32 - self.cx) / self.fx,
      depth * (y as f32 - self.cy) / self.fy,
      depth,
    )
  }
}

/// Project a world-space point through a camera.
///
/// Returns the camera-space point and pixel coordinates, or `None` when the
/// point is behind the camera or lands outside the bilinear-safe interior
/// of the image (a 1-pixel margin on the low side, 2 on the high side).
///
/// This is the shared "valid projection" predicate: planner visibility,
/// block revalidation and fusion all agree on it.
#[inline]
pub fn project_to_pixel(
  intrinsics: &Intrinsics,
  world_to_camera: &Mat4,
  img_size: UVec2,
  pt_world: Vec3,
) -> Option<(Vec3, Vec2)> {
  let pt_camera = world_to_camera.transform_point3(pt_world);
  if pt_camera.z <= 0.0 {
    return None;
  }

  let pt_image = intrinsics.project(pt_camera);
  if pt_image.x < 1.0
    || pt_image.x > (img_size.x as f32 - 2.0)
    || pt_image.y < 1.0
    || pt_image.y > (img_size.y as f32 - 2.0)
  {
    return None;
  }

  Some((pt_camera, pt_image))
}

/// Borrowed view of a depth frame. Values are scene distances; anything
/// `<= 0` marks an invalid measurement.
#[derive(Clone, Copy)]
pub struct DepthImage<'a> {
  data: &'a [f32],
  size: UVec2,
}

impl<'a> DepthImage<'a> {
  pub fn new(data: &'a [f32], size: UVec2) -> Self {
    debug_assert_eq!(data.len(), (size.x * size.y) as usize);
    Self { data, size }
  }

  #[inline]
  pub fn size(&self) -> UVec2 {
    self.size
  }

  #[inline(always)]
  pub fn get(&self, x: u32, y: u32) -> f32 {
    self.data[(x + y * self.size.x) as usize]
  }

  /// Nearest-pixel sample. `pt` must lie in the interior accepted by
  /// [`project_to_pixel`].
  #[inline(always)]
  pub fn sample_nearest(&self, pt: Vec2) -> f32 {
    let x = (pt.x + 0.5) as u32;
    let y = (pt.y + 0.5) as u32;
    self.get(x, y)
  }
}

/// Borrowed view of a packed RGBA color frame.
#[derive(Clone, Copy)]
pub struct ColorImage<'a> {
  data: &'a [[u8; 4]],
  size: UVec2,
}

impl<'a> ColorImage<'a> {
  pub fn new(data: &'a [[u8; 4]], size: UVec2) -> Self {
    debug_assert_eq!(data.len(), (size.x * size.y) as usize);
    Self { data, size }
  }

  #[inline]
  pub fn size(&self) -> UVec2 {
    self.size
  }

  #[inline(always)]
  fn rgb(&self, x: u32, y: u32) -> Vec3 {
    let p = self.data[(x + y * self.size.x) as usize];
    Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32)
  }

  /// Bilinear RGB sample. `pt` must lie in the interior accepted by
  /// [`project_to_pixel`].
  #[inline]
  pub fn sample_bilinear(&self, pt: Vec2) -> Vec3 {
    let x0 = pt.x.floor();
    let y0 = pt.y.floor();
    let dx = pt.x - x0;
    let dy = pt.y - y0;
    let (x, y) = (x0 as u32, y0 as u32);

    self.rgb(x, y) * (1.0 - dx) * (1.0 - dy)
      + self.rgb(x + 1, y) * dx * (1.0 - dy)
      + self.rgb(x, y + 1) * (1.0 - dx) * dy
      + self.rgb(x + 1, y + 1) * dx * dy
  }
}

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;
