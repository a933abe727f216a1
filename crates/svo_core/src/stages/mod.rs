//! Kernels of the construction and lighting pipeline.
//!
//! Every kernel is a plain function of `(resources, args, invocation)`. The
//! executor decides how many invocations run and in which order; kernels must
//! give the same tree for any order.

mod allocate;
mod flag;
mod indirect;
mod init;
mod leaf;
mod light;
mod mipmap;

use glam::UVec3;

use crate::config::BuildLayout;
use crate::constants::octant_at;
use crate::fragments::{FragmentList, IrradianceList};
use crate::pipeline::Kernel;
use crate::pool::{BrickPool, IndirectDispatchParams, NodePool};
use crate::types::Channel;

/// Everything a kernel may touch.
#[derive(Clone, Copy)]
pub struct Resources<'a> {
  pub layout: &'a BuildLayout,
  pub nodes: &'a NodePool,
  pub bricks: &'a BrickPool,
  pub fragments: &'a FragmentList,
  pub samples: Option<&'a IrradianceList>,
}

/// Per-dispatch bindings.
#[derive(Clone, Copy, Debug)]
pub struct KernelArgs {
  /// Level uniform.
  pub level: u32,
  /// Bound image channel.
  pub channel: Option<Channel>,
  /// Snapshot of the level record for per-node kernels.
  pub record: IndirectDispatchParams,
}

impl KernelArgs {
  #[inline]
  fn node(&self, invocation: u32) -> u32 {
    self.record.node(invocation)
  }
}

/// Run one work item of `kernel`.
pub fn invoke(kernel: Kernel, res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  match kernel {
    Kernel::Flag => flag::flag(res, args, invocation),
    Kernel::Allocate => allocate::allocate(res, args, invocation),
    Kernel::DeriveIndirect => indirect::derive(res, args),
    Kernel::Init => init::init(res, args, invocation),
    Kernel::WriteLeaf => leaf::write_leaf(res, args, invocation),
    Kernel::FinalizeLeaf => leaf::finalize_leaf(res, args, invocation),
    Kernel::ClearRadiance => light::clear_radiance(res, args, invocation),
    Kernel::InjectLight => light::inject(res, args, invocation),
    Kernel::FinalizeRadiance => light::finalize_radiance(res, args, invocation),
    Kernel::MipAggregate => mipmap::aggregate(res, args, invocation),
  }
}

/// Walk from the root to the node containing `position` at `level`.
///
/// `None` when the position is outside the grid or the path ends early
/// (a node on the way never got children).
pub(crate) fn descend(nodes: &NodePool, layout: &BuildLayout, position: UVec3, level: u32) -> Option<u32> {
  if position.max_element() >= layout.resolution {
    return None;
  }
  let mut node = 0;
  for l in 0..level {
    let base = nodes.child_block(node)?;
    node = base + octant_at(position, l, layout.max_level);
  }
  Some(node)
}

/// Like [`descend`], but stops at the deepest existing node instead of
/// failing when the path ends before `level`.
pub(crate) fn descend_deepest(nodes: &NodePool, layout: &BuildLayout, position: UVec3, level: u32) -> Option<u32> {
  if position.max_element() >= layout.resolution {
    return None;
  }
  let mut node = 0;
  for l in 0..level {
    let Some(base) = nodes.child_block(node) else {
      break;
    };
    node = base + octant_at(position, l, layout.max_level);
  }
  Some(node)
}
