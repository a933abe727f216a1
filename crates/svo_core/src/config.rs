//! Build configuration and the validated buffer layout derived from it.

use serde::{Deserialize, Serialize};

use crate::constants::{node_capacity, MAX_SUPPORTED_LEVEL, TILE_SIZE};
use crate::device::BarrierScope;
use crate::error::ConfigError;
use crate::pipeline::Schedule;

/// What a build does when the node pool runs out of tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
  /// Fail the build; the previous octree stays current.
  #[default]
  Abort,
  /// Keep the partial tree and flag it in the stats.
  Clamp,
}

/// User-facing build parameters.
///
/// Defaults match a 256³ grid with a 210³ brick pool of 3³ bricks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
  /// Leaf grid edge length (power of two).
  pub voxel_grid_resolution: u32,
  /// Brick pool texture edge length in texels.
  pub brick_pool_resolution: u32,
  /// Brick edge length in texels.
  pub brick_size: u32,
  /// Fragment list capacity = resolution² × multiplier / divisor.
  pub fragment_list_capacity_multiplier: u32,
  pub fragment_list_capacity_divisor: u32,
  /// Node pool size in 8-node tiles. `None` sizes it from the fragment capacity.
  pub node_pool_tiles: Option<u32>,
  /// Scope of every barrier in the op list.
  pub barrier_scope: BarrierScope,
  pub on_node_pool_exhausted: CapacityPolicy,
  pub schedule: Schedule,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      voxel_grid_resolution: 256,
      brick_pool_resolution: 70 * 3,
      brick_size: 3,
      fragment_list_capacity_multiplier: 3,
      fragment_list_capacity_divisor: 1,
      node_pool_tiles: None,
      barrier_scope: BarrierScope::all(),
      on_node_pool_exhausted: CapacityPolicy::Abort,
      schedule: Schedule::Parallel,
    }
  }
}

impl BuildConfig {
  /// Default config at another grid resolution.
  pub fn with_resolution(resolution: u32) -> Self {
    Self {
      voxel_grid_resolution: resolution,
      ..Default::default()
    }
  }

  /// Check every parameter and derive capacities.
  pub fn validate(&self) -> Result<BuildLayout, ConfigError> {
    let resolution = self.voxel_grid_resolution;
    if !resolution.is_power_of_two() {
      return Err(ConfigError::ResolutionNotPowerOfTwo(resolution));
    }
    let max_resolution = 1u32 << MAX_SUPPORTED_LEVEL;
    if !(2..=max_resolution).contains(&resolution) {
      return Err(ConfigError::ResolutionOutOfRange {
        got: resolution,
        max: max_resolution,
      });
    }
    let max_level = resolution.trailing_zeros();

    if self.fragment_list_capacity_multiplier == 0 {
      return Err(ConfigError::Zero("fragment_list_capacity_multiplier"));
    }
    if self.fragment_list_capacity_divisor == 0 {
      return Err(ConfigError::Zero("fragment_list_capacity_divisor"));
    }
    let fragment_capacity = (resolution as u64 * resolution as u64)
      * self.fragment_list_capacity_multiplier as u64
      / self.fragment_list_capacity_divisor as u64;
    let fragment_capacity =
      u32::try_from(fragment_capacity).map_err(|_| ConfigError::CapacityOverflow("fragment list"))?;
    if fragment_capacity == 0 {
      return Err(ConfigError::Zero("fragment list capacity"));
    }

    // Largest tile count whose node capacity still fits in the child word.
    let max_tiles = (crate::constants::CHILD_MASK - 1) / TILE_SIZE;
    let node_tile_capacity = match self.node_pool_tiles {
      Some(0) => return Err(ConfigError::Zero("node_pool_tiles")),
      Some(tiles) if tiles > max_tiles => return Err(ConfigError::CapacityOverflow("node pool")),
      Some(tiles) => tiles,
      None => (fragment_capacity as u64)
        .min(full_tree_tiles(max_level))
        .min(max_tiles as u64) as u32,
    };

    if self.brick_size == 0 {
      return Err(ConfigError::Zero("brick_size"));
    }
    if self.brick_pool_resolution < self.brick_size {
      return Err(ConfigError::BrickPoolTooSmall {
        resolution: self.brick_pool_resolution,
        brick_size: self.brick_size,
      });
    }
    let bricks_per_axis = self.brick_pool_resolution / self.brick_size;
    let brick_capacity = (bricks_per_axis as u64).pow(3);
    // u32::MAX is the "no brick" sentinel.
    let brick_capacity = u32::try_from(brick_capacity)
      .ok()
      .filter(|&c| c < u32::MAX)
      .ok_or(ConfigError::CapacityOverflow("brick pool"))?;

    if !self.barrier_scope.contains(BarrierScope::all()) {
      return Err(ConfigError::InsufficientBarrierScope {
        scope: self.barrier_scope,
        required: BarrierScope::all(),
      });
    }

    Ok(BuildLayout {
      resolution,
      max_level,
      fragment_capacity,
      node_tile_capacity,
      node_capacity: node_capacity(node_tile_capacity),
      brick_size: self.brick_size,
      brick_pool_resolution: self.brick_pool_resolution,
      bricks_per_axis,
      brick_capacity,
      barrier_scope: self.barrier_scope,
      on_node_pool_exhausted: self.on_node_pool_exhausted,
    })
  }
}

/// Tiles needed by a complete tree of depth `max_level` (Σ 8^l, l < max_level).
pub fn full_tree_tiles(max_level: u32) -> u64 {
  (0..max_level).map(|l| 8u64.pow(l)).sum()
}

/// Validated sizes shared by every buffer of one builder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BuildLayout {
  pub resolution: u32,
  /// `log2(resolution)`, the leaf level.
  pub max_level: u32,
  pub fragment_capacity: u32,
  pub node_tile_capacity: u32,
  /// `1 + 8 * node_tile_capacity`.
  pub node_capacity: u32,
  pub brick_size: u32,
  pub brick_pool_resolution: u32,
  pub bricks_per_axis: u32,
  /// `bricks_per_axis³`.
  pub brick_capacity: u32,
  pub barrier_scope: BarrierScope,
  pub on_node_pool_exhausted: CapacityPolicy,
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
