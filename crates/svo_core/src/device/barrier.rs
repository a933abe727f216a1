//! Barrier scopes and read-after-write hazard tracking.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
  /// Memory classes made visible by a barrier.
  #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
  pub struct BarrierScope: u32 {
    /// Node pool words (child pointers, payloads).
    const SHADER_STORAGE = 1 << 0;
    /// Brick textures.
    const SHADER_IMAGE_ACCESS = 1 << 1;
    /// Bump allocator counters.
    const ATOMIC_COUNTER = 1 << 2;
    /// Indirect dispatch records.
    const COMMAND = 1 << 3;
  }
}

impl Default for BarrierScope {
  fn default() -> Self {
    Self::all()
  }
}

/// Tracks classes written since the last barrier that covered them.
#[derive(Clone, Copy, Debug, Default)]
pub struct HazardTracker {
  pending: BarrierScope,
}

impl HazardTracker {
  pub fn new() -> Self {
    Self {
      pending: BarrierScope::empty(),
    }
  }

  /// Classes a dispatch would read that still have unsynchronized writes.
  pub fn conflicts(&self, reads: BarrierScope) -> Option<BarrierScope> {
    let hazard = self.pending & reads;
    (!hazard.is_empty()).then_some(hazard)
  }

  /// Mark classes written by a finished dispatch.
  pub fn record_writes(&mut self, writes: BarrierScope) {
    self.pending |= writes;
  }

  /// A barrier makes writes in `scope` visible.
  pub fn barrier(&mut self, scope: BarrierScope) {
    self.pending.remove(scope);
  }

  pub fn pending(&self) -> BarrierScope {
    self.pending
  }
}
