use super::{descend, KernelArgs, Resources};

/// One work item per fragment: flag the node it reaches at the bound level.
pub(super) fn flag(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  let Some(fragment) = res.fragments.get(invocation) else {
    return;
  };
  if let Some(node) = descend(res.nodes, res.layout, fragment.position, args.level) {
    res.nodes.flag(node);
  }
}
