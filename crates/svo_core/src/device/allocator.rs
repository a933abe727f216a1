//! Atomic bump allocator over a fixed-capacity arena.
//!
//! ```text
//! requests:  0   1   2   ...  cap-1 | cap  cap+1 ...
//! result:   Ok  Ok  Ok   ...   Ok   | Exhausted ...
//! ```
//!
//! Every request bumps the counter exactly once, so `requested()` counts the
//! demand and `allocated()` (the counter clamped to capacity) counts what was
//! actually handed out. The counter saturates at `u32::MAX` and never wraps
//! back into the valid range.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::Exhausted;

/// Monotonic slot allocator. Slots are never freed within a build.
#[derive(Debug)]
pub struct BumpAllocator {
  next: AtomicU32,
  capacity: u32,
}

impl BumpAllocator {
  pub fn new(capacity: u32) -> Self {
    Self {
      next: AtomicU32::new(0),
      capacity,
    }
  }

  /// Reserve one slot.
  #[inline]
  pub fn allocate(&self) -> Result<u32, Exhausted> {
    let slot = match self
      .next
      .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_add(1)))
    {
      Ok(previous) | Err(previous) => previous,
    };
    if slot < self.capacity {
      Ok(slot)
    } else {
      Err(Exhausted {
        requested: slot,
        capacity: self.capacity,
      })
    }
  }

  /// Fixed number of slots.
  pub fn capacity(&self) -> u32 {
    self.capacity
  }

  /// Slots actually handed out.
  pub fn allocated(&self) -> u32 {
    self.requested().min(self.capacity)
  }

  /// Requests seen so far, including rejected ones.
  pub fn requested(&self) -> u32 {
    self.next.load(Ordering::Relaxed)
  }

  /// True once any request was rejected.
  pub fn overflowed(&self) -> bool {
    self.requested() > self.capacity
  }

  /// Zero the counter (start of a rebuild).
  pub fn reset(&self) {
    self.next.store(0, Ordering::Relaxed);
  }
}

#[cfg(test)]
#[path = "allocator_test.rs"]
mod allocator_test;
