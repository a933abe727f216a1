//! Storage buffers and 3D images made of atomic words.

use std::sync::atomic::{AtomicU32, Ordering};

use glam::UVec3;
use rayon::prelude::*;

/// Flat array of 32-bit words shared by all work items of a dispatch.
pub struct DeviceBuffer {
  words: Box<[AtomicU32]>,
}

impl DeviceBuffer {
  /// Buffer of `len` words, all zero.
  pub fn zeroed(len: usize) -> Self {
    Self::filled(len, 0)
  }

  /// Buffer of `len` words, all `value`.
  pub fn filled(len: usize, value: u32) -> Self {
    Self {
      words: (0..len).map(|_| AtomicU32::new(value)).collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }

  /// Atomic word at `index`.
  #[inline]
  pub fn word(&self, index: usize) -> &AtomicU32 {
    &self.words[index]
  }

  #[inline]
  pub fn load(&self, index: usize) -> u32 {
    self.words[index].load(Ordering::Relaxed)
  }

  #[inline]
  pub fn store(&self, index: usize, value: u32) {
    self.words[index].store(value, Ordering::Relaxed);
  }

  /// Atomic OR, returns the previous value.
  #[inline]
  pub fn fetch_or(&self, index: usize, bits: u32) -> u32 {
    self.words[index].fetch_or(bits, Ordering::Relaxed)
  }

  /// Atomic AND, returns the previous value.
  #[inline]
  pub fn fetch_and(&self, index: usize, bits: u32) -> u32 {
    self.words[index].fetch_and(bits, Ordering::Relaxed)
  }

  /// Overwrite every word (parallel clear).
  pub fn fill(&self, value: u32) {
    self.words.par_iter().for_each(|word| word.store(value, Ordering::Relaxed));
  }

  /// Copy of the current contents.
  pub fn to_vec(&self) -> Vec<u32> {
    self.words.iter().map(|word| word.load(Ordering::Relaxed)).collect()
  }
}

impl std::fmt::Debug for DeviceBuffer {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DeviceBuffer").field("len", &self.len()).finish()
  }
}

/// Cubic RGBA8 image, one packed word per texel.
///
/// Texel `(x, y, z)` is stored at `x + y * side + z * side²`.
#[derive(Debug)]
pub struct Texture3d {
  side: u32,
  texels: DeviceBuffer,
}

impl Texture3d {
  pub fn new(side: u32) -> Self {
    let len = side as usize * side as usize * side as usize;
    Self {
      side,
      texels: DeviceBuffer::zeroed(len),
    }
  }

  /// Edge length in texels.
  pub fn side(&self) -> u32 {
    self.side
  }

  #[inline]
  fn index(&self, coord: UVec3) -> usize {
    debug_assert!(coord.cmplt(UVec3::splat(self.side)).all());
    let side = self.side as usize;
    coord.x as usize + coord.y as usize * side + coord.z as usize * side * side
  }

  #[inline]
  pub fn load(&self, coord: UVec3) -> u32 {
    self.texels.load(self.index(coord))
  }

  #[inline]
  pub fn store(&self, coord: UVec3, value: u32) {
    self.texels.store(self.index(coord), value);
  }

  /// Zero every texel.
  pub fn clear(&self) {
    self.texels.fill(0);
  }
}
