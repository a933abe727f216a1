use super::{KernelArgs, Resources};

/// One work item per node of a freshly allocated level.
pub(super) fn init(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  res.nodes.init_node(args.node(invocation));
}
