//! Op list vocabulary: bindings, dispatches, and barriers.

use serde::Serialize;

use crate::device::BarrierScope;
use crate::types::Channel;

/// Where a dispatch takes its launch size from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IndirectSource {
  /// Fragment list counter: one work item per fragment.
  Fragments,
  /// Irradiance list counter: one work item per light sample.
  Samples,
  /// Dispatch record of a level: one work item per node.
  Level(u32),
  /// A single work item.
  Single,
}

/// Work-item granularity a kernel expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
  Fragments,
  Samples,
  Nodes,
  Single,
}

impl SourceKind {
  pub(crate) fn binding_name(self) -> &'static str {
    match self {
      SourceKind::Fragments => "fragment counter",
      SourceKind::Samples => "irradiance sample counter",
      SourceKind::Nodes => "level dispatch record",
      SourceKind::Single => "single-item dispatch",
    }
  }
}

impl IndirectSource {
  pub fn kind(self) -> SourceKind {
    match self {
      IndirectSource::Fragments => SourceKind::Fragments,
      IndirectSource::Samples => SourceKind::Samples,
      IndirectSource::Level(_) => SourceKind::Nodes,
      IndirectSource::Single => SourceKind::Single,
    }
  }

  /// Classes read when the launch size is fetched.
  pub fn reads(self) -> BarrierScope {
    match self {
      IndirectSource::Level(_) => BarrierScope::COMMAND,
      _ => BarrierScope::empty(),
    }
  }
}

/// Kernels the executor can launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Kernel {
  /// Mark nodes that fragments pass through at the bound level.
  Flag,
  /// Give every flagged node a child tile and a brick.
  Allocate,
  /// Write the next level's dispatch record from the tile counter.
  DeriveIndirect,
  /// Clear freshly allocated nodes.
  Init,
  /// Average fragment colors into leaves.
  WriteLeaf,
  /// Make occupied leaves opaque and give them a filled brick.
  FinalizeLeaf,
  /// Zero the radiance word of every node at the bound level.
  ClearRadiance,
  /// Average modulated irradiance into occupied leaves.
  InjectLight,
  /// Settle leaf radiance and fill radiance bricks.
  FinalizeRadiance,
  /// Filter one level from the level below for the bound channel.
  MipAggregate,
}

impl Kernel {
  pub fn source_kind(self) -> SourceKind {
    match self {
      Kernel::Flag | Kernel::WriteLeaf => SourceKind::Fragments,
      Kernel::InjectLight => SourceKind::Samples,
      Kernel::DeriveIndirect => SourceKind::Single,
      Kernel::Allocate
      | Kernel::Init
      | Kernel::FinalizeLeaf
      | Kernel::ClearRadiance
      | Kernel::FinalizeRadiance
      | Kernel::MipAggregate => SourceKind::Nodes,
    }
  }

  /// Kernel needs a bound image channel.
  pub fn needs_channel(self) -> bool {
    matches!(self, Kernel::MipAggregate)
  }

  /// Classes the kernel reads.
  pub fn reads(self) -> BarrierScope {
    match self {
      Kernel::Flag | Kernel::Allocate | Kernel::WriteLeaf | Kernel::FinalizeLeaf => {
        BarrierScope::SHADER_STORAGE
      }
      Kernel::DeriveIndirect => BarrierScope::ATOMIC_COUNTER | BarrierScope::COMMAND,
      Kernel::Init | Kernel::ClearRadiance => BarrierScope::empty(),
      Kernel::InjectLight | Kernel::FinalizeRadiance => BarrierScope::SHADER_STORAGE,
      Kernel::MipAggregate => BarrierScope::SHADER_STORAGE | BarrierScope::SHADER_IMAGE_ACCESS,
    }
  }

  /// Classes the kernel writes.
  pub fn writes(self) -> BarrierScope {
    match self {
      Kernel::Flag | Kernel::Init | Kernel::WriteLeaf | Kernel::ClearRadiance | Kernel::InjectLight => {
        BarrierScope::SHADER_STORAGE
      }
      Kernel::DeriveIndirect => BarrierScope::COMMAND,
      Kernel::Allocate | Kernel::FinalizeLeaf => {
        BarrierScope::SHADER_STORAGE | BarrierScope::SHADER_IMAGE_ACCESS | BarrierScope::ATOMIC_COUNTER
      }
      Kernel::FinalizeRadiance | Kernel::MipAggregate => {
        BarrierScope::SHADER_STORAGE | BarrierScope::SHADER_IMAGE_ACCESS
      }
    }
  }
}

/// One step of an op list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Op {
  /// Select the launch-size source for following dispatches.
  BindIndirect(IndirectSource),
  /// Set the level uniform.
  BindUniform(u32),
  /// Select the payload channel (node word and brick texture).
  BindImage(Channel),
  Dispatch(Kernel),
  Barrier(BarrierScope),
}
