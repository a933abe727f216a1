//! Brick pool: two 3D textures carved into `brick_size³` blocks.
//!
//! Brick `b` sits at block coordinate `(b % n, (b / n) % n, b / n²)` where
//! `n = bricks_per_axis`, i.e. texel origin `block * brick_size`.

use glam::UVec3;

use crate::device::{BumpAllocator, Texture3d};
use crate::error::Exhausted;
use crate::types::Channel;

#[derive(Debug)]
pub struct BrickPool {
  brick_size: u32,
  bricks_per_axis: u32,
  allocator: BumpAllocator,
  albedo: Texture3d,
  radiance: Texture3d,
}

impl BrickPool {
  /// Pool over a `resolution³` texture. Leftover texels past the last whole
  /// brick are never addressed.
  pub fn new(resolution: u32, brick_size: u32) -> Self {
    let bricks_per_axis = resolution / brick_size;
    Self {
      brick_size,
      bricks_per_axis,
      allocator: BumpAllocator::new(bricks_per_axis.pow(3)),
      albedo: Texture3d::new(resolution),
      radiance: Texture3d::new(resolution),
    }
  }

  pub fn brick_size(&self) -> u32 {
    self.brick_size
  }

  pub fn bricks_per_axis(&self) -> u32 {
    self.bricks_per_axis
  }

  pub fn capacity(&self) -> u32 {
    self.allocator.capacity()
  }

  pub fn allocator(&self) -> &BumpAllocator {
    &self.allocator
  }

  #[inline]
  pub fn allocate_brick(&self) -> Result<u32, Exhausted> {
    self.allocator.allocate()
  }

  /// First texel of brick `brick`.
  #[inline]
  pub fn brick_origin(&self, brick: u32) -> UVec3 {
    let n = self.bricks_per_axis;
    UVec3::new(brick % n, (brick / n) % n, brick / (n * n)) * self.brick_size
  }

  pub fn texture(&self, channel: Channel) -> &Texture3d {
    match channel {
      Channel::Albedo => &self.albedo,
      Channel::Radiance => &self.radiance,
    }
  }

  /// Texel `local` (each component `< brick_size`) of a brick.
  #[inline]
  pub fn texel(&self, channel: Channel, brick: u32, local: UVec3) -> u32 {
    debug_assert!(brick < self.capacity());
    self.texture(channel).load(self.brick_origin(brick) + local)
  }

  #[inline]
  pub fn store_texel(&self, channel: Channel, brick: u32, local: UVec3, word: u32) {
    debug_assert!(brick < self.capacity());
    self.texture(channel).store(self.brick_origin(brick) + local, word);
  }

  /// Set every texel of a brick to `word`.
  pub fn fill(&self, channel: Channel, brick: u32, word: u32) {
    for local in self.brick_texels() {
      self.store_texel(channel, brick, local, word);
    }
  }

  /// Copy of a brick in x-fastest order.
  pub fn read_brick(&self, channel: Channel, brick: u32) -> Vec<u32> {
    self
      .brick_texels()
      .map(|local| self.texel(channel, brick, local))
      .collect()
  }

  /// Local coordinates of one brick, x fastest.
  pub fn brick_texels(&self) -> impl Iterator<Item = UVec3> {
    let size = self.brick_size;
    (0..size).flat_map(move |z| (0..size).flat_map(move |y| (0..size).map(move |x| UVec3::new(x, y, z))))
  }

  /// Zero the allocator. Kernels clear a brick's texels when they hand it out.
  pub fn reset(&self) {
    self.allocator.reset();
  }
}

#[cfg(test)]
#[path = "brick_pool_test.rs"]
mod brick_pool_test;
