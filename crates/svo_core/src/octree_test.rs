use super::*;
use crate::builder::OctreeBuilder;
use crate::config::BuildConfig;
use crate::fragments::FragmentList;
use crate::synthetic::{FragmentSource, SolidBox};
use crate::types::Fragment;

fn built(fragments: &[Fragment]) -> (OctreeBuilder, crate::pool::SvoBuffers) {
  let builder = OctreeBuilder::new(BuildConfig {
    voxel_grid_resolution: 8,
    brick_pool_resolution: 24,
    ..Default::default()
  })
  .unwrap();
  let mut buffers = builder.allocate_buffers();
  let list = FragmentList::from_fragments(builder.layout().fragment_capacity, fragments.iter().copied());
  builder.build(&mut buffers, &list, None).unwrap();
  (builder, buffers)
}

#[test]
fn test_out_of_range_queries() {
  let (_, buffers) = built(&[]);
  let view = buffers.view();
  assert_eq!(view.node(1), None);
  assert_eq!(view.level_params(4), None);
  assert!(view.level_nodes(9).is_empty());
  assert_eq!(view.lookup(UVec3::ZERO, 4), None);
  assert!(view.path(UVec3::new(0, 9, 0)).is_empty());
  assert_eq!(view.sample(UVec3::new(0, 9, 0), 0, Channel::Albedo), None);
  assert_eq!(view.brick_texel(Channel::Albedo, 0, UVec3::ZERO), None);
}

#[test]
fn test_level_nodes_follow_records() {
  let (_, buffers) = built(&[Fragment::new(UVec3::new(5, 5, 5), [1, 2, 3, 255])]);
  let view = buffers.view();
  assert_eq!(view.level_nodes(0), 0..1);
  assert_eq!(view.level_nodes(1), 1..9);
  assert_eq!(view.level_nodes(2), 9..17);
  assert_eq!(view.level_nodes(3), 17..25);
  assert_eq!(view.node_count(), 25);
}

#[test]
fn test_canonical_nodes_are_sorted_and_complete() {
  let (_, buffers) = built(&[Fragment::new(UVec3::new(5, 5, 5), [1, 2, 3, 255])]);
  let nodes = buffers.view().canonical_nodes();
  assert_eq!(nodes.len(), 25);
  assert!(nodes.windows(2).all(|w| w[0] <= w[1]));
  assert_eq!(nodes[0].level, 0);

  let leaf = nodes
    .iter()
    .find(|n| n.level == 3 && n.position == [5, 5, 5])
    .unwrap();
  assert_eq!(leaf.color, [1, 2, 3, 255]);
  assert!(leaf.brick_albedo.is_some());
  assert!(!leaf.subdivided);
}

#[test]
fn test_voxels_at_level_coarsens() {
  // 2x2x2 block aligned to level 2 cells.
  let fragments = SolidBox {
    min: UVec3::splat(2),
    max: UVec3::splat(4),
    color: [90, 90, 90, 255],
  }
  .fragments(8);
  let (_, buffers) = built(&fragments);
  let view = buffers.view();

  assert_eq!(view.voxels_at_level(3, Channel::Albedo).len(), 8);
  let coarse = view.voxels_at_level(2, Channel::Albedo);
  assert_eq!(coarse, vec![(UVec3::ONE, [90, 90, 90, 255])]);
  assert_eq!(view.voxels_at_level(1, Channel::Albedo).len(), 1);
  assert!(view.voxels_at_level(3, Channel::Radiance).is_empty());
  assert!(view.voxels_at_level(7, Channel::Albedo).is_empty());
}
