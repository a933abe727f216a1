//! svo_core - Parallel sparse voxel octree construction
//!
//! Builds a sparse voxel octree top-down from a list of voxel fragments, one
//! level at a time, entirely through data-parallel dispatches whose sizes are
//! read from device memory. The "device" is emulated on the CPU with rayon:
//! buffers are atomic words, dispatches are parallel loops, and barriers are
//! explicit, checked ops.
//!
//! # Features
//!
//! - **Level-by-level construction**: flag, allocate, derive, init per level
//! - **Indirect dispatch**: per-level work sizes produced on the device
//! - **Bricks**: `brick_size³` texel blocks per node, box-filtered bottom-up
//! - **Light injection**: radiance channel updated without a rebuild
//! - **Hazard checking**: missing barriers are rejected, not raced
//! - **Double buffering**: a failed rebuild keeps the previous octree
//!
//! # Example
//!
//! ```
//! use svo_core::synthetic::{FragmentSource, SphereShell};
//! use svo_core::{BuildConfig, FragmentList, OctreeBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let builder = OctreeBuilder::new(BuildConfig::with_resolution(32))?;
//! let mut buffers = builder.allocate_buffers();
//! let fragments = FragmentList::from_fragments(
//!   builder.layout().fragment_capacity,
//!   SphereShell::default().fragments(32),
//! );
//!
//! let stats = builder.build(&mut buffers, &fragments, None)?;
//! println!("{} nodes, {} bricks", stats.total_nodes(), stats.bricks_allocated);
//! assert_eq!(stats.max_level, 5);
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod types;

pub use constants::{BRICK_NONE, NODE_NONE, TILE_SIZE};
pub use types::{rgba8, Channel, Fragment, IrradianceSample, OctreeNode, PayloadRef};

pub mod error;
pub use error::{BuildError, ConfigError, Exhausted, PipelineError};

pub mod config;
pub use config::{BuildConfig, BuildLayout, CapacityPolicy};

// Device memory emulation
pub mod device;
pub mod fragments;
pub use device::BarrierScope;
pub use fragments::{FragmentList, IrradianceList};

pub mod pool;
pub use pool::{BrickPool, IndirectDispatchParams, NodePool, SvoBuffers};

// Op lists, executor, and kernels
pub mod pipeline;
pub mod stages;
pub use pipeline::{ExecutionReport, Executor, IndirectSource, Kernel, Op, Schedule};

pub mod builder;
pub mod octree;
pub mod stats;
pub use builder::OctreeBuilder;
pub use octree::{NodeSummary, OctreeView};
pub use stats::{BuildStats, LevelStats};

// Double-buffered storage and background rebuilds
pub mod store;
pub use store::{AsyncRebuild, OctreeStore, RebuildRequest, RebuildResult};

pub mod metrics;
pub mod synthetic;
