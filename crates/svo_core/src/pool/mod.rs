//! Fixed-capacity pools the pipeline builds into.

pub mod brick_pool;
pub mod node_pool;

pub use brick_pool::BrickPool;
pub use node_pool::{IndirectDispatchParams, NodePool};

use crate::config::BuildLayout;
use crate::octree::OctreeView;

/// Node pool and brick pool sized for one [`BuildLayout`].
///
/// Allocated once per builder and reused by every rebuild.
#[derive(Debug)]
pub struct SvoBuffers {
  layout: BuildLayout,
  nodes: NodePool,
  bricks: BrickPool,
}

impl SvoBuffers {
  pub fn new(layout: BuildLayout) -> Self {
    Self {
      nodes: NodePool::new(layout.node_tile_capacity, layout.max_level),
      bricks: BrickPool::new(layout.brick_pool_resolution, layout.brick_size),
      layout,
    }
  }

  pub fn layout(&self) -> &BuildLayout {
    &self.layout
  }

  pub fn nodes(&self) -> &NodePool {
    &self.nodes
  }

  pub fn bricks(&self) -> &BrickPool {
    &self.bricks
  }

  /// Host reset before a rebuild.
  pub fn reset(&mut self) {
    self.nodes.reset();
    self.bricks.reset();
  }

  /// Read-only view of the octree currently in the buffers.
  pub fn view(&self) -> OctreeView<'_> {
    OctreeView::new(&self.layout, &self.nodes, &self.bricks)
  }
}
