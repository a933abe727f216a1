//! Node pool: four parallel word arrays plus the per-level dispatch records.
//!
//! ```text
//! child[i]     flag bit | child tile base
//! brick[i]     brick index or BRICK_NONE
//! color[i]     RGBA8 albedo
//! radiance[i]  RGBA8 radiance
//! params[4L..4L+4]  IndirectDispatchParams of level L
//! ```
//!
//! Slots past the allocation frontier hold stale data from earlier builds. The
//! init stage clears each tile before anything reads it.

use std::ops::Range;
use std::sync::atomic::AtomicU32;

use serde::Serialize;

use crate::constants::{node_capacity, tile_base, BRICK_NONE, CHILD_MASK, FLAG_BIT, NODE_NONE, TILE_SIZE};
use crate::device::{BumpAllocator, DeviceBuffer};
use crate::error::Exhausted;
use crate::types::{rgba8, Channel, OctreeNode, PayloadRef};

const PARAM_WORDS: usize = 4;

/// Indirect dispatch record of one level.
///
/// Work items of level `L` are the nodes `first_node .. first_node + work_item_count * nodes_per_item`.
/// `alloc_base` is the tile counter value when level `L` started allocating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndirectDispatchParams {
  pub work_item_count: u32,
  pub first_node: u32,
  pub nodes_per_item: u32,
  pub alloc_base: u32,
}

impl IndirectDispatchParams {
  /// Level 0: just the root.
  pub const ROOT: Self = Self {
    work_item_count: 1,
    first_node: 0,
    nodes_per_item: 1,
    alloc_base: 0,
  };

  /// Launch size of a per-node dispatch.
  #[inline]
  pub fn invocations(&self) -> u32 {
    self.work_item_count * self.nodes_per_item
  }

  /// Node handled by `invocation`.
  #[inline]
  pub fn node(&self, invocation: u32) -> u32 {
    self.first_node + invocation
  }

  pub fn nodes(&self) -> Range<u32> {
    self.first_node..self.first_node + self.invocations()
  }

  /// Record of the next level given the allocator's clamped tile count.
  ///
  /// Tiles are handed out contiguously, so the tiles allocated by this level
  /// are exactly `alloc_base .. allocated_tiles`.
  pub fn next_level(&self, allocated_tiles: u32) -> Self {
    Self {
      work_item_count: allocated_tiles.saturating_sub(self.alloc_base),
      first_node: tile_base(self.alloc_base),
      nodes_per_item: TILE_SIZE,
      alloc_base: allocated_tiles,
    }
  }
}

/// Fixed-capacity node storage with a tile allocator.
#[derive(Debug)]
pub struct NodePool {
  child: DeviceBuffer,
  brick: DeviceBuffer,
  color: DeviceBuffer,
  radiance: DeviceBuffer,
  tiles: BumpAllocator,
  params: DeviceBuffer,
  max_level: u32,
}

impl NodePool {
  pub fn new(tile_capacity: u32, max_level: u32) -> Self {
    let len = node_capacity(tile_capacity) as usize;
    let pool = Self {
      child: DeviceBuffer::zeroed(len),
      brick: DeviceBuffer::filled(len, BRICK_NONE),
      color: DeviceBuffer::zeroed(len),
      radiance: DeviceBuffer::zeroed(len),
      tiles: BumpAllocator::new(tile_capacity),
      params: DeviceBuffer::zeroed((max_level as usize + 1) * PARAM_WORDS),
      max_level,
    };
    pool.reset();
    pool
  }

  /// Node slots, root included.
  pub fn capacity(&self) -> u32 {
    node_capacity(self.tiles.capacity())
  }

  pub fn max_level(&self) -> u32 {
    self.max_level
  }

  pub fn tiles(&self) -> &BumpAllocator {
    &self.tiles
  }

  /// Claim an 8-node tile, returning the node index of its first slot.
  #[inline]
  pub fn allocate_tile(&self) -> Result<u32, Exhausted> {
    self.tiles.allocate().map(tile_base)
  }

  /// Decoded copy of slot `index`.
  pub fn get_node(&self, index: u32) -> OctreeNode {
    let i = index as usize;
    OctreeNode::from_words(
      self.child.load(i),
      self.brick.load(i),
      self.color.load(i),
      self.radiance.load(i),
    )
  }

  /// Set the subdivision flag. Returns true if this call set it.
  #[inline]
  pub fn flag(&self, index: u32) -> bool {
    self.child.fetch_or(index as usize, FLAG_BIT) & FLAG_BIT == 0
  }

  #[inline]
  pub fn is_flagged(&self, index: u32) -> bool {
    self.child.load(index as usize) & FLAG_BIT != 0
  }

  #[inline]
  pub fn clear_flag(&self, index: u32) {
    self.child.fetch_and(index as usize, CHILD_MASK);
  }

  #[inline]
  pub fn child_block(&self, index: u32) -> Option<u32> {
    let base = self.child.load(index as usize) & CHILD_MASK;
    (base != NODE_NONE).then_some(base)
  }

  /// Store the child tile base. Replaces the flag bit.
  pub fn set_child_block(&self, index: u32, base: u32) {
    debug_assert_eq!(
      self.child.load(index as usize) & CHILD_MASK,
      NODE_NONE,
      "child pointer of node {index} is write-once"
    );
    debug_assert!(base & FLAG_BIT == 0);
    self.child.store(index as usize, base);
  }

  #[inline]
  pub fn brick(&self, index: u32) -> Option<u32> {
    let brick = self.brick.load(index as usize);
    (brick != BRICK_NONE).then_some(brick)
  }

  #[inline]
  pub fn set_brick(&self, index: u32, brick: u32) {
    self.brick.store(index as usize, brick);
  }

  /// Write the albedo payload of a node.
  pub fn set_payload(&self, index: u32, payload: PayloadRef) {
    let i = index as usize;
    match payload {
      PayloadRef::Empty => {
        self.brick.store(i, BRICK_NONE);
        self.color.store(i, 0);
      }
      PayloadRef::Color(color) => self.color.store(i, rgba8::pack(color)),
      PayloadRef::Brick(brick) => self.brick.store(i, brick),
    }
  }

  #[inline]
  fn channel_buffer(&self, channel: Channel) -> &DeviceBuffer {
    match channel {
      Channel::Albedo => &self.color,
      Channel::Radiance => &self.radiance,
    }
  }

  /// Atomic payload word, for running averages.
  #[inline]
  pub fn channel_word(&self, channel: Channel, index: u32) -> &AtomicU32 {
    self.channel_buffer(channel).word(index as usize)
  }

  #[inline]
  pub fn load_channel(&self, channel: Channel, index: u32) -> u32 {
    self.channel_buffer(channel).load(index as usize)
  }

  #[inline]
  pub fn store_channel(&self, channel: Channel, index: u32, word: u32) {
    self.channel_buffer(channel).store(index as usize, word);
  }

  /// Put a slot in the empty state.
  pub fn init_node(&self, index: u32) {
    let i = index as usize;
    self.child.store(i, NODE_NONE);
    self.brick.store(i, BRICK_NONE);
    self.color.store(i, 0);
    self.radiance.store(i, 0);
  }

  /// Dispatch record of `level`.
  pub fn params(&self, level: u32) -> IndirectDispatchParams {
    let base = level as usize * PARAM_WORDS;
    IndirectDispatchParams {
      work_item_count: self.params.load(base),
      first_node: self.params.load(base + 1),
      nodes_per_item: self.params.load(base + 2),
      alloc_base: self.params.load(base + 3),
    }
  }

  pub fn store_params(&self, level: u32, params: IndirectDispatchParams) {
    let base = level as usize * PARAM_WORDS;
    self.params.store(base, params.work_item_count);
    self.params.store(base + 1, params.first_node);
    self.params.store(base + 2, params.nodes_per_item);
    self.params.store(base + 3, params.alloc_base);
  }

  /// Host reset before a build: counter zeroed, records cleared, root
  /// initialized, level-0 record written.
  pub fn reset(&self) {
    self.tiles.reset();
    self.params.fill(0);
    self.init_node(0);
    self.store_params(0, IndirectDispatchParams::ROOT);
  }
}

#[cfg(test)]
#[path = "node_pool_test.rs"]
mod node_pool_test;
