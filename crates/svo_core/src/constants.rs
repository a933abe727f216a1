//! Node pool layout constants and octant math.
//!
//! # Node Pool Layout
//!
//! ```text
//! index:   0      1 ..  8     9 .. 16    17 .. 24   ...
//!        [root] [ tile 0 ]  [ tile 1 ]  [ tile 2 ]
//!
//! tile t base = 1 + 8 * t
//! ```
//!
//! The root never lives inside a tile, so a child pointer of `0` can never name
//! a real child block and doubles as the "no children" sentinel.
//!
//! # Child Word
//!
//! ```text
//!  31  30                                   0
//! ┌───┬──────────────────────────────────────┐
//! │ F │        child tile base (0 = none)    │
//! └───┴──────────────────────────────────────┘
//!   F = needs subdivision (set by the flag stage)
//! ```
//!
//! # Octant Convention
//!
//! ```text
//! octant bits (binary: ZYX):
//!   0 = (0,0,0)    4 = (0,0,1)
//!   1 = (1,0,0)    5 = (1,0,1)
//!   2 = (0,1,0)    6 = (0,1,1)
//!   3 = (1,1,0)    7 = (1,1,1)
//! ```

use glam::UVec3;

/// Children per tile.
pub const TILE_SIZE: u32 = 8;

/// Child pointer value meaning "no children".
pub const NODE_NONE: u32 = 0;

/// Brick pointer value meaning "no brick".
pub const BRICK_NONE: u32 = u32::MAX;

/// Subdivision flag in the child word.
pub const FLAG_BIT: u32 = 1 << 31;

/// Mask selecting the child tile base from the child word.
pub const CHILD_MASK: u32 = !FLAG_BIT;

/// Default brick edge length in texels.
pub const DEFAULT_BRICK_SIZE: u32 = 3;

/// Deepest supported tree (resolution 2^16 keeps coordinates in 16 bits).
pub const MAX_SUPPORTED_LEVEL: u32 = 16;

/// Node index of the first slot of tile `tile`.
#[inline]
pub const fn tile_base(tile: u32) -> u32 {
  1 + tile * TILE_SIZE
}

/// Number of node slots needed for `tiles` tiles plus the root.
#[inline]
pub const fn node_capacity(tiles: u32) -> u32 {
  1 + tiles * TILE_SIZE
}

/// Octant of `position` when descending from `level` to `level + 1`.
///
/// `position` is a voxel coordinate at `max_level` resolution.
#[inline]
pub fn octant_at(position: UVec3, level: u32, max_level: u32) -> u32 {
  debug_assert!(level < max_level);
  let shift = max_level - 1 - level;
  ((position.x >> shift) & 1) | (((position.y >> shift) & 1) << 1) | (((position.z >> shift) & 1) << 2)
}

/// Offset (0 or 1 per axis) of an octant inside its parent.
#[inline]
pub fn octant_offset(octant: u32) -> UVec3 {
  UVec3::new(octant & 1, (octant >> 1) & 1, (octant >> 2) & 1)
}

/// Octant index from a per-axis offset (each component 0 or 1).
#[inline]
pub fn octant_from_offset(offset: UVec3) -> u32 {
  (offset.x & 1) | ((offset.y & 1) << 1) | ((offset.z & 1) << 2)
}

/// Coordinate of the node containing `position` at `level`.
#[inline]
pub fn position_at_level(position: UVec3, level: u32, max_level: u32) -> UVec3 {
  position >> (max_level - level)
}

#[cfg(test)]
#[path = "constants_test.rs"]
mod constants_test;
