//! Read-only access to a built octree.
//!
//! Node indices depend on allocation order, which varies between schedules.
//! [`OctreeView::canonical_nodes`] gives an index-free description for
//! comparing trees.

use std::ops::Range;

use glam::UVec3;
use serde::Serialize;
use smallvec::SmallVec;

use crate::config::BuildLayout;
use crate::constants::{node_capacity, octant_at, octant_offset, MAX_SUPPORTED_LEVEL};
use crate::pool::{BrickPool, IndirectDispatchParams, NodePool};
use crate::stages::descend;
use crate::types::{rgba8, Channel, OctreeNode};

/// Node indices from the root to a leaf.
pub type NodePath = SmallVec<[u32; MAX_SUPPORTED_LEVEL as usize + 1]>;

/// Index-free description of one reachable node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct NodeSummary {
  pub level: u32,
  /// Node coordinate at its own level, `[z, y, x]` so sorting is z-major.
  pub position: [u32; 3],
  pub color: [u8; 4],
  pub radiance: [u8; 4],
  pub subdivided: bool,
  /// Albedo texels of the node's brick.
  pub brick_albedo: Option<Vec<u32>>,
}

#[derive(Clone, Copy)]
pub struct OctreeView<'a> {
  layout: &'a BuildLayout,
  nodes: &'a NodePool,
  bricks: &'a BrickPool,
}

impl<'a> OctreeView<'a> {
  pub fn new(layout: &'a BuildLayout, nodes: &'a NodePool, bricks: &'a BrickPool) -> Self {
    Self { layout, nodes, bricks }
  }

  pub fn layout(&self) -> &BuildLayout {
    self.layout
  }

  pub fn max_level(&self) -> u32 {
    self.layout.max_level
  }

  /// Node slots in use, root included.
  pub fn node_count(&self) -> u32 {
    node_capacity(self.nodes.tiles().allocated())
  }

  pub fn root(&self) -> OctreeNode {
    self.nodes.get_node(0)
  }

  /// Node `index`, if it is inside the allocated range.
  pub fn node(&self, index: u32) -> Option<OctreeNode> {
    (index < self.node_count()).then(|| self.nodes.get_node(index))
  }

  pub fn level_params(&self, level: u32) -> Option<IndirectDispatchParams> {
    (level <= self.layout.max_level).then(|| self.nodes.params(level))
  }

  /// Node indices making up `level`.
  pub fn level_nodes(&self, level: u32) -> Range<u32> {
    self.level_params(level).map_or(0..0, |params| params.nodes())
  }

  /// Node containing `position` (leaf coordinates) at `level`.
  pub fn lookup(&self, position: UVec3, level: u32) -> Option<u32> {
    if level > self.layout.max_level {
      return None;
    }
    descend(self.nodes, self.layout, position, level)
  }

  /// Nodes visited from the root towards `position`, as deep as the tree goes.
  pub fn path(&self, position: UVec3) -> NodePath {
    let mut path = NodePath::new();
    if position.max_element() >= self.layout.resolution {
      return path;
    }
    let mut node = 0;
    path.push(node);
    for level in 0..self.layout.max_level {
      let Some(base) = self.nodes.child_block(node) else {
        break;
      };
      node = base + octant_at(position, level, self.layout.max_level);
      path.push(node);
    }
    path
  }

  /// Inline `channel` value at `position` filtered to `level`.
  ///
  /// Falls back to the deepest existing ancestor when the tree stops above
  /// `level`. `None` outside the grid.
  pub fn sample(&self, position: UVec3, level: u32, channel: Channel) -> Option<[u8; 4]> {
    let path = self.path(position);
    let depth = (level as usize).min(path.len().checked_sub(1)?);
    Some(rgba8::unpack(self.nodes.load_channel(channel, path[depth])))
  }

  /// One texel of an allocated brick.
  pub fn brick_texel(&self, channel: Channel, brick: u32, local: UVec3) -> Option<[u8; 4]> {
    let in_brick = local.cmplt(UVec3::splat(self.bricks.brick_size())).all();
    (brick < self.bricks.allocator().allocated() && in_brick)
      .then(|| rgba8::unpack(self.bricks.texel(channel, brick, local)))
  }

  /// All texels of an allocated brick, x fastest.
  pub fn brick(&self, channel: Channel, brick: u32) -> Option<Vec<u32>> {
    (brick < self.bricks.allocator().allocated()).then(|| self.bricks.read_brick(channel, brick))
  }

  /// Every node reachable from the root, sorted by level then z, y, x.
  pub fn canonical_nodes(&self) -> Vec<NodeSummary> {
    let mut out = Vec::new();
    let mut stack = vec![(0u32, 0u32, UVec3::ZERO)];
    while let Some((index, level, position)) = stack.pop() {
      let node = self.nodes.get_node(index);
      if let Some(children) = node.children() {
        for (octant, child) in children.enumerate() {
          stack.push((child, level + 1, position * 2 + octant_offset(octant as u32)));
        }
      }
      out.push(NodeSummary {
        level,
        position: [position.z, position.y, position.x],
        color: node.color,
        radiance: node.radiance,
        subdivided: node.child_block.is_some(),
        brick_albedo: node.brick.map(|brick| self.bricks.read_brick(Channel::Albedo, brick)),
      });
    }
    out.sort();
    out
  }

  /// Occupied nodes of `level` with their `channel` value, for level
  /// visualization. Positions are at that level's resolution.
  pub fn voxels_at_level(&self, level: u32, channel: Channel) -> Vec<(UVec3, [u8; 4])> {
    if level > self.layout.max_level {
      return Vec::new();
    }
    let mut out = Vec::new();
    let mut stack = vec![(0u32, 0u32, UVec3::ZERO)];
    while let Some((index, depth, position)) = stack.pop() {
      let node = self.nodes.get_node(index);
      if depth == level {
        let value = node.channel(channel);
        if value[3] > 0 {
          out.push((position, value));
        }
        continue;
      }
      if let Some(children) = node.children() {
        for (octant, child) in children.enumerate() {
          stack.push((child, depth + 1, position * 2 + octant_offset(octant as u32)));
        }
      }
    }
    out.sort_by_key(|(p, _)| (p.z, p.y, p.x));
    out
  }
}

#[cfg(test)]
#[path = "octree_test.rs"]
mod octree_test;
