use super::{descend_deepest, KernelArgs, Resources};
use crate::types::{rgba8, Channel};

/// Radiance of an occupied leaf no sample reached.
const UNLIT: [u8; 4] = [0, 0, 0, u8::MAX];

pub(super) fn clear_radiance(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  res.nodes.store_channel(Channel::Radiance, args.node(invocation), 0);
}

/// One work item per irradiance sample, landing in the deepest node on its
/// path. Samples landing in empty nodes are dropped.
pub(super) fn inject(res: &Resources<'_>, _args: &KernelArgs, invocation: u32) {
  let Some(sample) = res.samples.and_then(|samples| samples.get(invocation)) else {
    return;
  };
  let Some(node) = descend_deepest(res.nodes, res.layout, sample.position, res.layout.max_level) else {
    return;
  };
  let albedo = res.nodes.load_channel(Channel::Albedo, node);
  if rgba8::alpha(albedo) == 0 {
    return;
  }
  let rgb = rgba8::modulate(albedo, sample.irradiance);
  rgba8::accumulate(res.nodes.channel_word(Channel::Radiance, node), rgb);
}

/// One work item per leaf: occupied leaves become opaque in the radiance
/// channel (black when unlit) and their brick is refilled.
pub(super) fn finalize_radiance(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  settle_radiance(res, args.node(invocation));
}

/// Settle the radiance of an occupied childless node.
pub(super) fn settle_radiance(res: &Resources<'_>, node: u32) {
  if rgba8::alpha(res.nodes.load_channel(Channel::Albedo, node)) == 0 {
    return;
  }
  let word = res.nodes.load_channel(Channel::Radiance, node);
  let settled = if rgba8::alpha(word) > 0 {
    rgba8::with_alpha(word, u8::MAX)
  } else {
    rgba8::pack(UNLIT)
  };
  res.nodes.store_channel(Channel::Radiance, node, settled);
  if let Some(brick) = res.nodes.brick(node) {
    res.bricks.fill(Channel::Radiance, brick, settled);
  }
}
