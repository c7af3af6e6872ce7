use super::*;

#[test]
fn test_default_hash_params_valid() {
  let p = HashParams::default();
  assert_eq!(p.bucket_count(), 0x100000);
  assert_eq!(p.excess_capacity(), 0x20000);
  assert_eq!(p.total_entries(), 0x120000);
  assert_eq!(p.bucket_mask(), 0xFFFFF);
}

#[test]
fn test_bucket_count_must_be_power_of_two() {
  let err = HashParams::new(1000, 16, 64).unwrap_err();
  assert_eq!(err, ConfigError::BucketCountNotPowerOfTwo(1000));
}

#[test]
fn test_excess_must_be_below_bucket_count() {
  let err = HashParams::new(64, 64, 64).unwrap_err();
  assert_eq!(
    err,
    ConfigError::ExcessCapacityTooLarge {
      excess: 64,
      buckets: 64
    }
  );
}

#[test]
fn test_block_capacity_nonzero() {
  let err = HashParams::new(64, 16, 0).unwrap_err();
  assert_eq!(err, ConfigError::ZeroBlockCapacity);
}

#[test]
fn test_excess_slot_indexing() {
  let p = HashParams::new(64, 16, 32).unwrap();
  assert_eq!(p.excess_slot(0), 64);
  assert_eq!(p.excess_slot(15), 79);
}

#[test]
fn test_fusion_params_validation() {
  assert!(FusionParams::new(0.005, 0.02, 100, 100, 0.2, 3.0).is_ok());

  assert_eq!(
    FusionParams::new(0.0, 0.02, 100, 100, 0.2, 3.0).unwrap_err(),
    ConfigError::InvalidVoxelSize(0.0)
  );
  assert_eq!(
    FusionParams::new(0.005, -1.0, 100, 100, 0.2, 3.0).unwrap_err(),
    ConfigError::InvalidTruncationBand(-1.0)
  );
  assert_eq!(
    FusionParams::new(0.005, 0.02, 100, 100, 3.0, 0.2).unwrap_err(),
    ConfigError::InvalidFrustum {
      near: 3.0,
      far: 0.2
    }
  );
}

/// Values only enter through the validating constructor and read back
/// unchanged through the accessors.
#[test]
fn test_fusion_params_accessors() {
  let p = FusionParams::new(0.01, 0.04, 50, 60, 0.3, 5.0).unwrap();
  assert_eq!(p.voxel_size(), 0.01);
  assert_eq!(p.mu(), 0.04);
  assert_eq!(p.max_depth_weight(), 50);
  assert_eq!(p.max_color_weight(), 60);
  assert_eq!(p.view_frustum_min(), 0.3);
  assert_eq!(p.view_frustum_max(), 5.0);
}

#[test]
fn test_block_world_size() {
  let p = FusionParams::default();
  assert!((p.block_world_size() - 0.04).abs() < 1e-6);
}
