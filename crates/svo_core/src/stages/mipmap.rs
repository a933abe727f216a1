//! Bottom-up filtering of node words and bricks.
//!
//! A parent brick of edge `bs` covers the same space as the `2·bs` grid formed
//! by its 8 children's bricks:
//!
//! ```text
//!  fine texel f = 2·p + o      (p = parent texel, o ∈ {0,1}³)
//!  child octant  = f / bs
//!  child texel   = f % bs
//! ```
//!
//! Each parent texel averages its 8 fine texels with the same opacity
//! weighting used for node words.
//!
//! Occupied nodes without children above the leaf level are where node-pool
//! exhaustion cut the tree. They keep their own average and are settled here
//! the way leaves are settled by the leaf and light passes.

use glam::UVec3;

use super::{light, KernelArgs, Resources};
use crate::constants::{octant_from_offset, octant_offset, TILE_SIZE};
use crate::types::{rgba8, Channel};

/// One work item per node of the bound level.
pub(super) fn aggregate(res: &Resources<'_>, args: &KernelArgs, invocation: u32) {
  let Some(channel) = args.channel else {
    return;
  };
  let node = args.node(invocation);
  let Some(base) = res.nodes.child_block(node) else {
    settle_childless(res, channel, node);
    return;
  };

  let mut words = [0u32; TILE_SIZE as usize];
  for (octant, word) in words.iter_mut().enumerate() {
    *word = res.nodes.load_channel(channel, base + octant as u32);
  }
  res.nodes.store_channel(channel, node, rgba8::average_weighted(&words));

  if let Some(brick) = res.nodes.brick(node) {
    filter_brick(res, channel, brick, base, &words);
  }
}

fn settle_childless(res: &Resources<'_>, channel: Channel, node: u32) {
  match channel {
    Channel::Albedo => {
      let word = res.nodes.load_channel(Channel::Albedo, node);
      if rgba8::alpha(word) > 0 {
        res.nodes.store_channel(Channel::Albedo, node, rgba8::with_alpha(word, u8::MAX));
      }
    }
    Channel::Radiance => light::settle_radiance(res, node),
  }
}

fn filter_brick(res: &Resources<'_>, channel: Channel, brick: u32, base: u32, inline: &[u32; 8]) {
  let bricks = res.bricks;
  let size = bricks.brick_size();
  let child_bricks: [Option<u32>; 8] = std::array::from_fn(|octant| res.nodes.brick(base + octant as u32));

  for texel in bricks.brick_texels() {
    let mut samples = [0u32; 8];
    for (offset, sample) in samples.iter_mut().enumerate() {
      let fine = texel * 2 + octant_offset(offset as u32);
      let octant = octant_from_offset(fine / size) as usize;
      *sample = match child_bricks[octant] {
        Some(child) => bricks.texel(channel, child, fine % size),
        None => inline[octant],
      };
    }
    bricks.store_texel(channel, brick, texel, rgba8::average_weighted(&samples));
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_fine_grid_maps_into_children() {
    // Brick size 3: parent texel 1 on an axis covers fine texels 2 and 3,
    // which straddle octant 0 (texel 2) and octant 1 (texel 0).
    let size = 3;
    let fine = UVec3::new(1, 0, 0) * 2 + octant_offset(1);
    assert_eq!(fine, UVec3::new(3, 0, 0));
    assert_eq!(octant_from_offset(fine / size), 1);
    assert_eq!(fine % size, UVec3::ZERO);

    let fine = UVec3::new(2, 2, 2) * 2 + octant_offset(7);
    assert_eq!(octant_from_offset(fine / size), 7);
    assert_eq!(fine % size, UVec3::splat(2));
  }
}
