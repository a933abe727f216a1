use super::*;

#[test]
fn test_default_layout() {
  let layout = BuildConfig::default().validate().unwrap();
  assert_eq!(layout.resolution, 256);
  assert_eq!(layout.max_level, 8);
  assert_eq!(layout.fragment_capacity, 256 * 256 * 3);
  assert_eq!(layout.bricks_per_axis, 70);
  assert_eq!(layout.brick_capacity, 70 * 70 * 70);
  // Fragment capacity is smaller than a full 8-level tree.
  assert_eq!(layout.node_tile_capacity, 256 * 256 * 3);
  assert_eq!(layout.node_capacity, 1 + 8 * 256 * 256 * 3);
}

#[test]
fn test_max_level_is_log2_resolution() {
  for (resolution, level) in [(2, 1), (4, 2), (128, 7), (256, 8), (1024, 10)] {
    let layout = BuildConfig::with_resolution(resolution).validate().unwrap();
    assert_eq!(layout.max_level, level, "resolution {resolution}");
  }
}

#[test]
fn test_small_grid_caps_tiles_at_full_tree() {
  let layout = BuildConfig::with_resolution(4).validate().unwrap();
  // 1 + 8 tiles cover every interior node of a depth-2 tree.
  assert_eq!(layout.node_tile_capacity, 9);
}

#[test]
fn test_rejects_bad_resolution() {
  assert_eq!(
    BuildConfig::with_resolution(100).validate(),
    Err(ConfigError::ResolutionNotPowerOfTwo(100))
  );
  assert_eq!(
    BuildConfig::with_resolution(0).validate(),
    Err(ConfigError::ResolutionNotPowerOfTwo(0))
  );
  assert!(matches!(
    BuildConfig::with_resolution(1).validate(),
    Err(ConfigError::ResolutionOutOfRange { got: 1, .. })
  ));
  assert!(matches!(
    BuildConfig::with_resolution(1 << 17).validate(),
    Err(ConfigError::ResolutionOutOfRange { .. })
  ));
}

#[test]
fn test_rejects_zero_parameters() {
  let config = BuildConfig {
    fragment_list_capacity_divisor: 0,
    ..Default::default()
  };
  assert_eq!(
    config.validate(),
    Err(ConfigError::Zero("fragment_list_capacity_divisor"))
  );

  let config = BuildConfig {
    brick_size: 0,
    ..Default::default()
  };
  assert_eq!(config.validate(), Err(ConfigError::Zero("brick_size")));

  let config = BuildConfig {
    node_pool_tiles: Some(0),
    ..Default::default()
  };
  assert_eq!(config.validate(), Err(ConfigError::Zero("node_pool_tiles")));
}

#[test]
fn test_rejects_undersized_brick_pool() {
  let config = BuildConfig {
    brick_pool_resolution: 2,
    brick_size: 3,
    ..Default::default()
  };
  assert_eq!(
    config.validate(),
    Err(ConfigError::BrickPoolTooSmall {
      resolution: 2,
      brick_size: 3
    })
  );
}

#[test]
fn test_rejects_fragment_capacity_overflow() {
  let config = BuildConfig {
    voxel_grid_resolution: 1 << 16,
    ..Default::default()
  };
  assert_eq!(
    config.validate(),
    Err(ConfigError::CapacityOverflow("fragment list"))
  );
}

#[test]
fn test_rejects_partial_barrier_scope() {
  let config = BuildConfig {
    barrier_scope: BarrierScope::SHADER_STORAGE | BarrierScope::COMMAND,
    ..Default::default()
  };
  assert!(matches!(
    config.validate(),
    Err(ConfigError::InsufficientBarrierScope { .. })
  ));
}

#[test]
fn test_explicit_node_tiles() {
  let config = BuildConfig {
    voxel_grid_resolution: 16,
    node_pool_tiles: Some(5),
    ..Default::default()
  };
  let layout = config.validate().unwrap();
  assert_eq!(layout.node_tile_capacity, 5);
  assert_eq!(layout.node_capacity, 41);
}

#[test]
fn test_full_tree_tiles() {
  assert_eq!(full_tree_tiles(0), 0);
  assert_eq!(full_tree_tiles(1), 1);
  assert_eq!(full_tree_tiles(3), 1 + 8 + 64);
}
