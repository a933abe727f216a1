//! Error types for configuration, op-list execution, and builds.

use crate::device::BarrierScope;
use crate::pipeline::Kernel;

/// Bump allocator ran past its fixed capacity.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("allocator exhausted: request #{requested} exceeds capacity {capacity}")]
pub struct Exhausted {
  /// Zero-based index of the rejected request.
  pub requested: u32,
  /// Fixed capacity of the pool.
  pub capacity: u32,
}

/// Rejected build configuration. Raised before any work is issued.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  #[error("voxel_grid_resolution must be a power of two, got {0}")]
  ResolutionNotPowerOfTwo(u32),

  #[error("voxel_grid_resolution must be between 2 and {max}, got {got}")]
  ResolutionOutOfRange { got: u32, max: u32 },

  #[error("{0} must be greater than zero")]
  Zero(&'static str),

  #[error("brick pool resolution {resolution} cannot hold a single brick of size {brick_size}")]
  BrickPoolTooSmall { resolution: u32, brick_size: u32 },

  #[error("{0} capacity does not fit in 32 bits")]
  CapacityOverflow(&'static str),

  #[error("barrier scope {scope:?} does not cover required classes {required:?}")]
  InsufficientBarrierScope {
    scope: BarrierScope,
    required: BarrierScope,
  },
}

/// Malformed op list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
  #[error("dispatch of {kernel:?} without a bound {binding}")]
  MissingBinding {
    kernel: Kernel,
    binding: &'static str,
  },

  #[error("level {level} has no dispatch record (max level {max_level})")]
  LevelOutOfRange { level: u32, max_level: u32 },

  #[error("dispatch of {kernel:?} reads {pending:?} written without a barrier")]
  MissingBarrier {
    kernel: Kernel,
    pending: BarrierScope,
  },
}

/// A rebuild that did not produce a usable octree.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Pipeline(#[from] PipelineError),

  #[error("node pool exhausted: {requested} tiles requested, capacity {capacity}")]
  NodePoolExhausted { requested: u32, capacity: u32 },

  #[error("buffers were allocated for a different layout")]
  LayoutMismatch,

  #[error("a background rebuild still owns the back buffers")]
  RebuildInFlight,
}
