//! Octree builder: owns the validated layout and issues op lists.

use tracing::{debug, info, warn};
use web_time::Instant;

use crate::config::{BuildConfig, BuildLayout, CapacityPolicy};
use crate::error::{BuildError, ConfigError};
use crate::fragments::{FragmentList, IrradianceList};
use crate::pipeline::{program, ExecutionReport, Executor, Op, Schedule};
use crate::pool::SvoBuffers;
use crate::stages::Resources;
use crate::stats::BuildStats;
use crate::types::Channel;

/// Builds sparse voxel octrees into [`SvoBuffers`] allocated for its layout.
///
/// The builder holds no device memory, so it is cheap to clone into a
/// background rebuild.
#[derive(Clone, Debug)]
pub struct OctreeBuilder {
  config: BuildConfig,
  layout: BuildLayout,
  schedule: Schedule,
  visualized_level: u32,
}

impl OctreeBuilder {
  pub fn new(config: BuildConfig) -> Result<Self, ConfigError> {
    let layout = config.validate()?;
    Ok(Self {
      schedule: config.schedule,
      visualized_level: layout.max_level,
      config,
      layout,
    })
  }

  pub fn config(&self) -> &BuildConfig {
    &self.config
  }

  pub fn layout(&self) -> &BuildLayout {
    &self.layout
  }

  pub fn schedule(&self) -> Schedule {
    self.schedule
  }

  /// Override the work-item order (for interleaving tests).
  pub fn with_schedule(mut self, schedule: Schedule) -> Self {
    self.schedule = schedule;
    self
  }

  /// Pools sized for this builder's layout.
  pub fn allocate_buffers(&self) -> SvoBuffers {
    SvoBuffers::new(self.layout)
  }

  /// Empty fragment list with the configured capacity.
  pub fn allocate_fragment_list(&self) -> FragmentList {
    FragmentList::with_capacity(self.layout.fragment_capacity)
  }

  /// Level shown by visualization passes. Clamped to the leaf level.
  pub fn set_visualized_level(&mut self, level: u32) -> u32 {
    self.visualized_level = level.min(self.layout.max_level);
    self.visualized_level
  }

  pub fn visualized_level(&self) -> u32 {
    self.visualized_level
  }

  /// Rebuild the octree from `fragments`.
  ///
  /// With `samples`, lighting is injected and filtered in the same pass.
  /// On node-pool exhaustion under [`CapacityPolicy::Abort`] the buffers hold
  /// a partial tree and the error is returned.
  #[tracing::instrument(skip_all, name = "svo::build", fields(resolution = self.layout.resolution))]
  pub fn build(
    &self,
    buffers: &mut SvoBuffers,
    fragments: &FragmentList,
    samples: Option<&IrradianceList>,
  ) -> Result<BuildStats, BuildError> {
    self.check_layout(buffers)?;
    let start = Instant::now();
    buffers.reset();

    let ops = program::build_program(&self.layout, samples.is_some());
    let report = self.execute(buffers, fragments, samples, &ops)?;
    let elapsed_us = start.elapsed().as_micros() as u64;

    let stats = BuildStats::collect(buffers, fragments, &report, elapsed_us);

    if stats.fragments_dropped > 0 {
      warn!(
        dropped = stats.fragments_dropped,
        capacity = fragments.capacity(),
        "fragment list overflowed"
      );
    }
    if stats.brick_pool_exhausted {
      warn!(
        requested = stats.bricks_requested,
        capacity = stats.brick_capacity,
        "brick pool exhausted, affected nodes keep inline colors"
      );
    }
    if stats.node_pool_exhausted {
      match self.layout.on_node_pool_exhausted {
        CapacityPolicy::Abort => {
          warn!(
            requested = stats.tiles_requested,
            capacity = stats.tile_capacity,
            "node pool exhausted, discarding build"
          );
          return Err(BuildError::NodePoolExhausted {
            requested: stats.tiles_requested,
            capacity: stats.tile_capacity,
          });
        }
        CapacityPolicy::Clamp => warn!(
          requested = stats.tiles_requested,
          capacity = stats.tile_capacity,
          "node pool exhausted, keeping partial tree"
        ),
      }
    }

    for level in &stats.levels {
      debug!(level = level.level, nodes = level.nodes, first_node = level.first_node, "level");
    }
    info!(
      fragments = stats.fragments,
      nodes = stats.total_nodes(),
      bricks = stats.bricks_allocated,
      dispatches = stats.dispatches,
      elapsed_us,
      "octree built"
    );

    Ok(stats)
  }

  /// Re-inject lighting into the current tree and refilter radiance.
  #[tracing::instrument(skip_all, name = "svo::update_lighting")]
  pub fn update_lighting(
    &self,
    buffers: &mut SvoBuffers,
    samples: &IrradianceList,
  ) -> Result<ExecutionReport, BuildError> {
    self.check_layout(buffers)?;
    let empty = FragmentList::with_capacity(0);
    let ops = program::light_update_program(&self.layout);
    let report = self.execute(buffers, &empty, Some(samples), &ops)?;
    debug!(samples = samples.len(), dispatches = report.dispatches.len(), "lighting updated");
    Ok(report)
  }

  /// Re-run the bottom-up sweep of one channel.
  pub fn remip(&self, buffers: &mut SvoBuffers, channel: Channel) -> Result<ExecutionReport, BuildError> {
    self.check_layout(buffers)?;
    let empty = FragmentList::with_capacity(0);
    let ops = program::mip_ops(&self.layout, channel);
    self.execute(buffers, &empty, None, &ops)
  }

  /// Run a caller-supplied op list against the buffers.
  pub fn execute(
    &self,
    buffers: &SvoBuffers,
    fragments: &FragmentList,
    samples: Option<&IrradianceList>,
    ops: &[Op],
  ) -> Result<ExecutionReport, BuildError> {
    let res = Resources {
      layout: &self.layout,
      nodes: buffers.nodes(),
      bricks: buffers.bricks(),
      fragments,
      samples,
    };
    Ok(Executor::new(self.schedule).execute(ops, &res)?)
  }

  fn check_layout(&self, buffers: &SvoBuffers) -> Result<(), BuildError> {
    if *buffers.layout() != self.layout {
      return Err(BuildError::LayoutMismatch);
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod builder_test;
