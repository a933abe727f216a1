//! Per-build statistics read back once the op list finished.

use serde::Serialize;

use crate::fragments::FragmentList;
use crate::pipeline::ExecutionReport;
use crate::pool::SvoBuffers;

/// Nodes of one level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelStats {
  pub level: u32,
  /// Tiles (or the root) making up this level.
  pub work_items: u32,
  pub nodes: u32,
  pub first_node: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BuildStats {
  pub resolution: u32,
  pub max_level: u32,
  pub fragments: u32,
  /// Fragments the voxelizer could not append.
  pub fragments_dropped: u32,
  pub levels: Vec<LevelStats>,
  pub tiles_allocated: u32,
  pub tiles_requested: u32,
  pub tile_capacity: u32,
  pub bricks_allocated: u32,
  pub bricks_requested: u32,
  pub brick_capacity: u32,
  pub node_pool_exhausted: bool,
  pub brick_pool_exhausted: bool,
  pub dispatches: usize,
  pub invocations: u64,
  pub barriers: usize,
  pub elapsed_us: u64,
}

impl BuildStats {
  /// End-of-build readback of counters and level records.
  pub fn collect(
    buffers: &SvoBuffers,
    fragments: &FragmentList,
    report: &ExecutionReport,
    elapsed_us: u64,
  ) -> Self {
    let layout = buffers.layout();
    let nodes = buffers.nodes();
    let bricks = buffers.bricks();
    let levels = (0..=layout.max_level)
      .map(|level| {
        let record = nodes.params(level);
        LevelStats {
          level,
          work_items: record.work_item_count,
          nodes: record.invocations(),
          first_node: record.first_node,
        }
      })
      .collect();

    Self {
      resolution: layout.resolution,
      max_level: layout.max_level,
      fragments: fragments.len(),
      fragments_dropped: fragments.dropped(),
      levels,
      tiles_allocated: nodes.tiles().allocated(),
      tiles_requested: nodes.tiles().requested(),
      tile_capacity: nodes.tiles().capacity(),
      bricks_allocated: bricks.allocator().allocated(),
      bricks_requested: bricks.allocator().requested(),
      brick_capacity: bricks.capacity(),
      node_pool_exhausted: nodes.tiles().overflowed(),
      brick_pool_exhausted: bricks.allocator().overflowed(),
      dispatches: report.dispatches.len(),
      invocations: report.total_invocations(),
      barriers: report.barriers,
      elapsed_us,
    }
  }

  /// Node slots in use, root included.
  pub fn total_nodes(&self) -> u32 {
    crate::constants::node_capacity(self.tiles_allocated)
  }

  /// Nodes subdivided at `level` (tiles handed to level + 1).
  pub fn subdivided_at(&self, level: u32) -> u32 {
    self
      .levels
      .get(level as usize + 1)
      .map_or(0, |next| next.work_items)
  }
}
