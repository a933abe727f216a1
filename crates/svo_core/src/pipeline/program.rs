//! Fixed op lists for builds, light updates, and mip sweeps.
//!
//! # Construction (per level L in 0..max_level)
//!
//! ```text
//! uniform L    indirect Fragments  Flag            barrier
//!              indirect Level(L)   Allocate        barrier
//!              indirect Single     DeriveIndirect  barrier
//! uniform L+1  indirect Level(L+1) Init            barrier
//! ```
//!
//! Then leaves (WriteLeaf per fragment, FinalizeLeaf per leaf node), an
//! optional light pass, and a bottom-up albedo sweep.

use super::op::{IndirectSource, Kernel, Op};
use crate::config::BuildLayout;
use crate::types::Channel;

/// Flag, allocate, derive, init for every level.
pub fn construction_ops(layout: &BuildLayout) -> Vec<Op> {
  let barrier = Op::Barrier(layout.barrier_scope);
  let mut ops = Vec::with_capacity(layout.max_level as usize * 12);
  for level in 0..layout.max_level {
    ops.extend([
      Op::BindUniform(level),
      Op::BindIndirect(IndirectSource::Fragments),
      Op::Dispatch(Kernel::Flag),
      barrier,
      Op::BindIndirect(IndirectSource::Level(level)),
      Op::Dispatch(Kernel::Allocate),
      barrier,
      Op::BindIndirect(IndirectSource::Single),
      Op::Dispatch(Kernel::DeriveIndirect),
      barrier,
      Op::BindUniform(level + 1),
      Op::BindIndirect(IndirectSource::Level(level + 1)),
      Op::Dispatch(Kernel::Init),
      barrier,
    ]);
  }
  ops
}

/// Write fragment colors into leaves and give occupied leaves bricks.
pub fn leaf_ops(layout: &BuildLayout) -> Vec<Op> {
  let barrier = Op::Barrier(layout.barrier_scope);
  let max = layout.max_level;
  vec![
    Op::BindUniform(max),
    Op::BindIndirect(IndirectSource::Fragments),
    Op::Dispatch(Kernel::WriteLeaf),
    barrier,
    Op::BindIndirect(IndirectSource::Level(max)),
    Op::Dispatch(Kernel::FinalizeLeaf),
    barrier,
  ]
}

/// Clear radiance everywhere, inject samples, settle leaves.
pub fn light_ops(layout: &BuildLayout) -> Vec<Op> {
  let barrier = Op::Barrier(layout.barrier_scope);
  let max = layout.max_level;
  let mut ops = Vec::new();
  for level in 0..=max {
    ops.extend([
      Op::BindUniform(level),
      Op::BindIndirect(IndirectSource::Level(level)),
      Op::Dispatch(Kernel::ClearRadiance),
    ]);
  }
  ops.extend([
    barrier,
    Op::BindUniform(max),
    Op::BindIndirect(IndirectSource::Samples),
    Op::Dispatch(Kernel::InjectLight),
    barrier,
    Op::BindIndirect(IndirectSource::Level(max)),
    Op::Dispatch(Kernel::FinalizeRadiance),
    barrier,
  ]);
  ops
}

/// Filter `channel` from level `max_level - 1` up to the root.
pub fn mip_ops(layout: &BuildLayout, channel: Channel) -> Vec<Op> {
  let barrier = Op::Barrier(layout.barrier_scope);
  let mut ops = vec![Op::BindImage(channel)];
  for level in (0..layout.max_level).rev() {
    ops.extend([
      Op::BindUniform(level),
      Op::BindIndirect(IndirectSource::Level(level)),
      Op::Dispatch(Kernel::MipAggregate),
      barrier,
    ]);
  }
  ops
}

/// Full rebuild: structure, leaves, albedo mips, and optionally lighting.
pub fn build_program(layout: &BuildLayout, with_light: bool) -> Vec<Op> {
  let mut ops = construction_ops(layout);
  ops.extend(leaf_ops(layout));
  ops.extend(mip_ops(layout, Channel::Albedo));
  if with_light {
    ops.extend(light_update_program(layout));
  }
  ops
}

/// Relight an existing tree without touching its structure.
pub fn light_update_program(layout: &BuildLayout) -> Vec<Op> {
  let mut ops = light_ops(layout);
  ops.extend(mip_ops(layout, Channel::Radiance));
  ops
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::BuildConfig;

  fn layout(resolution: u32) -> BuildLayout {
    BuildConfig::with_resolution(resolution).validate().unwrap()
  }

  fn dispatches(ops: &[Op]) -> Vec<Kernel> {
    ops
      .iter()
      .filter_map(|op| match op {
        Op::Dispatch(kernel) => Some(*kernel),
        _ => None,
      })
      .collect()
  }

  #[test]
  fn test_construction_has_four_phases_per_level() {
    let layout = layout(8);
    let ops = construction_ops(&layout);
    let kernels = dispatches(&ops);
    assert_eq!(kernels.len(), 4 * 3);
    assert_eq!(
      &kernels[..4],
      &[Kernel::Flag, Kernel::Allocate, Kernel::DeriveIndirect, Kernel::Init]
    );
  }

  #[test]
  fn test_every_dispatch_is_followed_by_barrier_before_next_phase() {
    let layout = layout(16);
    let ops = construction_ops(&layout);
    for window in ops.windows(2) {
      if let [Op::Dispatch(_), next] = window {
        assert!(matches!(next, Op::Barrier(_)), "dispatch followed by {next:?}");
      }
    }
  }

  #[test]
  fn test_mip_sweep_runs_bottom_up() {
    let layout = layout(8);
    let levels: Vec<u32> = mip_ops(&layout, Channel::Albedo)
      .iter()
      .filter_map(|op| match op {
        Op::BindUniform(level) => Some(*level),
        _ => None,
      })
      .collect();
    assert_eq!(levels, vec![2, 1, 0]);
  }

  #[test]
  fn test_build_program_with_light_ends_with_radiance_sweep() {
    let layout = layout(4);
    let ops = build_program(&layout, true);
    let kernels = dispatches(&ops);
    assert_eq!(kernels.last(), Some(&Kernel::MipAggregate));
    assert!(ops.contains(&Op::BindImage(Channel::Radiance)));
    assert_eq!(
      kernels.iter().filter(|k| **k == Kernel::ClearRadiance).count(),
      3
    );
  }
}
