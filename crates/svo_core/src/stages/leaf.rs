use super::{descend_deepest, KernelArgs, Resources};
use crate::types::{rgba8, Channel};

/// One work item per fragment: fold its color into the running average of
/// the deepest node on its path. That is the leaf, unless node-pool
/// exhaustion cut the path short.
pub(super) fn write_leaf(res: &Resources<'_>, _args: &KernelArgs, invocation: u32) {
  let Some(fragment) = res.fragments.get(invocation) else {
    return;
  };
  let Some(node) = descend_deepest(res.nodes, res.layout, fragment.position, res.layout.max_level) else {
    return;
  };
  let [r, g, b, _] = fragment.color;
  rgba8::accumulate(res.nodes.channel_word(Channel::Albedo, node), [r, g, b]);
}

/// One work item per leaf: replace the sample count with full opacity and
/// copy the color into a fresh brick.
pub(super) fn finalize_leaf(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  let leaf = args.node(invocation);
  let word = res.nodes.load_channel(Channel::Albedo, leaf);
  if rgba8::alpha(word) == 0 {
    return;
  }
  let opaque = rgba8::with_alpha(word, u8::MAX);
  res.nodes.store_channel(Channel::Albedo, leaf, opaque);
  if let Ok(brick) = res.bricks.allocate_brick() {
    res.nodes.set_brick(leaf, brick);
    res.bricks.fill(Channel::Albedo, brick, opaque);
    res.bricks.fill(Channel::Radiance, brick, 0);
  }
}
