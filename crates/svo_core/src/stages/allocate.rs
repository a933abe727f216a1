use super::{KernelArgs, Resources};
use crate::types::Channel;

/// One work item per node of the bound level.
///
/// A flagged node gets a child tile and a brick. When the node pool is full
/// the flag is dropped and the node stays a leaf; the rejected request is
/// still counted by the allocator.
pub(super) fn allocate(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  let node = args.node(invocation);
  if !res.nodes.is_flagged(node) {
    return;
  }
  match res.nodes.allocate_tile() {
    Ok(base) => res.nodes.set_child_block(node, base),
    Err(_) => {
      res.nodes.clear_flag(node);
      return;
    }
  }
  // Brick exhaustion leaves the node on its inline color.
  if let Ok(brick) = res.bricks.allocate_brick() {
    res.nodes.set_brick(node, brick);
    // Unlit builds never run the radiance sweep.
    res.bricks.fill(Channel::Radiance, brick, 0);
  }
}
