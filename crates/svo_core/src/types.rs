//! Core data types shared by the pools, stages, and readback views.

use std::ops::Range;

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{BRICK_NONE, CHILD_MASK, FLAG_BIT, NODE_NONE, TILE_SIZE};

/// One voxelized surface sample produced by the (external) voxelizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fragment {
  /// Voxel coordinate at the finest level, in `[0, resolution)³`.
  pub position: UVec3,
  /// Surface albedo, RGBA8.
  pub color: [u8; 4],
}

impl Fragment {
  pub fn new(position: UVec3, color: [u8; 4]) -> Self {
    Self { position, color }
  }
}

/// Irradiance arriving at a leaf voxel, e.g. read from a shadow map texel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IrradianceSample {
  /// Voxel coordinate at the finest level.
  pub position: UVec3,
  /// Linear irradiance, `1.0` = full albedo reflected.
  pub irradiance: Vec3,
}

impl IrradianceSample {
  pub fn new(position: UVec3, irradiance: Vec3) -> Self {
    Self {
      position,
      irradiance,
    }
  }
}

/// Which payload a mip or finalize pass reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
  /// Filtered surface color.
  Albedo,
  /// Injected direct light.
  Radiance,
}

/// Host view of a node payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadRef {
  /// Nothing stored.
  Empty,
  /// Inline RGBA8 color, no brick.
  Color([u8; 4]),
  /// Index into the brick pool.
  Brick(u32),
}

/// Decoded copy of one node pool slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OctreeNode {
  /// Base index of the 8-child tile, if allocated.
  pub child_block: Option<u32>,
  /// Subdivision flag (only visible between the flag and allocate stages).
  pub flagged: bool,
  /// Brick index, if one was allocated.
  pub brick: Option<u32>,
  /// Inline albedo.
  pub color: [u8; 4],
  /// Inline radiance.
  pub radiance: [u8; 4],
}

impl OctreeNode {
  /// Decode from raw pool words.
  pub fn from_words(child: u32, brick: u32, color: u32, radiance: u32) -> Self {
    let child_base = child & CHILD_MASK;
    Self {
      child_block: (child_base != NODE_NONE).then_some(child_base),
      flagged: child & FLAG_BIT != 0,
      brick: (brick != BRICK_NONE).then_some(brick),
      color: rgba8::unpack(color),
      radiance: rgba8::unpack(radiance),
    }
  }

  /// Node in the state the init stage leaves behind.
  pub fn is_empty(&self) -> bool {
    self.child_block.is_none()
      && !self.flagged
      && self.brick.is_none()
      && self.color == [0; 4]
      && self.radiance == [0; 4]
  }

  /// True when the node has no child tile.
  pub fn is_leaf(&self) -> bool {
    self.child_block.is_none()
  }

  /// Node indices of the 8 children.
  pub fn children(&self) -> Option<Range<u32>> {
    self.child_block.map(|base| base..base + TILE_SIZE)
  }

  /// The payload a sampler should read: brick first, then inline color.
  pub fn payload(&self) -> PayloadRef {
    match self.brick {
      Some(brick) => PayloadRef::Brick(brick),
      None if self.color != [0; 4] => PayloadRef::Color(self.color),
      None => PayloadRef::Empty,
    }
  }

  /// Inline word for a channel.
  pub fn channel(&self, channel: Channel) -> [u8; 4] {
    match channel {
      Channel::Albedo => self.color,
      Channel::Radiance => self.radiance,
    }
  }
}

/// RGBA8 packing and the atomic averaging used by the leaf and mip stages.
///
/// Packed layout is little-endian `r | g << 8 | b << 16 | a << 24`.
pub mod rgba8 {
  use std::sync::atomic::{AtomicU32, Ordering};

  /// Pack four channels into one word.
  #[inline]
  pub fn pack(color: [u8; 4]) -> u32 {
    u32::from_le_bytes(color)
  }

  /// Unpack one word into four channels.
  #[inline]
  pub fn unpack(word: u32) -> [u8; 4] {
    word.to_le_bytes()
  }

  /// Alpha channel of a packed word.
  #[inline]
  pub fn alpha(word: u32) -> u8 {
    (word >> 24) as u8
  }

  /// Replace the alpha channel.
  #[inline]
  pub fn with_alpha(word: u32, alpha: u8) -> u32 {
    (word & 0x00FF_FFFF) | ((alpha as u32) << 24)
  }

  /// One step of the running average.
  ///
  /// Alpha holds the number of samples folded in so far (saturates at 255,
  /// after which each new sample weighs 1/256).
  pub fn average_step(current: u32, rgb: [u8; 3]) -> u32 {
    let [r, g, b, count] = unpack(current);
    let n = count as u32;
    let blend = |avg: u8, sample: u8| -> u8 {
      ((avg as u32 * n + sample as u32 + (n + 1) / 2) / (n + 1)) as u8
    };
    let next_count = count.saturating_add(1);
    pack([blend(r, rgb[0]), blend(g, rgb[1]), blend(b, rgb[2]), next_count])
  }

  /// Fold one sample into an atomic running average.
  pub fn accumulate(word: &AtomicU32, rgb: [u8; 3]) {
    // Retry until the exchange wins; concurrent writers never lose a sample.
    let mut current = word.load(Ordering::Relaxed);
    loop {
      match word.compare_exchange_weak(current, average_step(current, rgb), Ordering::Relaxed, Ordering::Relaxed) {
        Ok(_) => return,
        Err(actual) => current = actual,
      }
    }
  }

  /// Opacity-weighted average of child words.
  ///
  /// `rgb = Σ(rgbᵢ·aᵢ) / Σaᵢ`, `a = Σaᵢ / n`. Empty children (alpha 0) only
  /// lower the opacity, they never darken the color.
  pub fn average_weighted(words: &[u32]) -> u32 {
    if words.is_empty() {
      return 0;
    }
    let mut sum = [0u32; 3];
    let mut sum_a = 0u32;
    for &word in words {
      let [r, g, b, a] = unpack(word);
      let a = a as u32;
      sum[0] += r as u32 * a;
      sum[1] += g as u32 * a;
      sum[2] += b as u32 * a;
      sum_a += a;
    }
    if sum_a == 0 {
      return 0;
    }
    let n = words.len() as u32;
    let channel = |s: u32| ((s + sum_a / 2) / sum_a).min(255) as u8;
    let alpha = ((sum_a + n / 2) / n).min(255) as u8;
    pack([channel(sum[0]), channel(sum[1]), channel(sum[2]), alpha])
  }

  /// Modulate an albedo by linear irradiance, clamped to RGB8.
  pub fn modulate(albedo: u32, irradiance: glam::Vec3) -> [u8; 3] {
    let [r, g, b, _] = unpack(albedo);
    let scale = |c: u8, e: f32| -> u8 { (c as f32 * e.max(0.0)).round().min(255.0) as u8 };
    [
      scale(r, irradiance.x),
      scale(g, irradiance.y),
      scale(b, irradiance.z),
    ]
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
