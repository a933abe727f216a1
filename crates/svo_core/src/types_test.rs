use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;

use super::*;

#[test]
fn test_pack_is_little_endian() {
  let word = rgba8::pack([1, 2, 3, 4]);
  assert_eq!(word, 0x0403_0201);
  assert_eq!(rgba8::alpha(word), 4);
  assert_eq!(rgba8::unpack(rgba8::with_alpha(word, 255)), [1, 2, 3, 255]);
}

#[test]
fn test_average_step_counts_in_alpha() {
  let mut word = 0;
  word = rgba8::average_step(word, [100, 0, 200]);
  assert_eq!(rgba8::unpack(word), [100, 0, 200, 1]);
  word = rgba8::average_step(word, [200, 0, 0]);
  assert_eq!(rgba8::unpack(word), [150, 0, 100, 2]);
}

#[test]
fn test_average_step_saturates_count() {
  let mut word = rgba8::pack([10, 10, 10, 255]);
  word = rgba8::average_step(word, [10, 10, 10]);
  assert_eq!(rgba8::alpha(word), 255);
  assert_eq!(rgba8::unpack(word)[0], 10);
}

/// Identical samples average to themselves no matter how many threads race.
#[test]
fn test_concurrent_accumulate_identical_colors() {
  let word = AtomicU32::new(0);
  (0..200).into_par_iter().for_each(|_| {
    rgba8::accumulate(&word, [37, 180, 255]);
  });
  assert_eq!(rgba8::unpack(word.load(Ordering::Relaxed)), [37, 180, 255, 200]);
}

/// Racing writers with different colors still all get counted.
#[test]
fn test_concurrent_accumulate_counts_every_sample() {
  let word = AtomicU32::new(0);
  (0..120u32).into_par_iter().for_each(|i| {
    let c = if i % 2 == 0 { 0 } else { 200 };
    rgba8::accumulate(&word, [c, c, c]);
  });
  assert_eq!(rgba8::alpha(word.load(Ordering::Relaxed)), 120);
}

#[test]
fn test_weighted_average_ignores_empty_color() {
  let mut words = [0u32; 8];
  words[3] = rgba8::pack([200, 100, 50, 255]);
  let avg = rgba8::unpack(rgba8::average_weighted(&words));
  assert_eq!(&avg[..3], &[200, 100, 50], "Empty children must not darken");
  assert_eq!(avg[3], 32, "One opaque child of eight gives 1/8 opacity");
}

#[test]
fn test_weighted_average_all_empty_is_zero() {
  assert_eq!(rgba8::average_weighted(&[0u32; 8]), 0);
  assert_eq!(rgba8::average_weighted(&[]), 0);
}

#[test]
fn test_weighted_average_full() {
  let words = [rgba8::pack([10, 20, 30, 255]); 8];
  assert_eq!(rgba8::unpack(rgba8::average_weighted(&words)), [10, 20, 30, 255]);
}

#[test]
fn test_modulate_clamps() {
  let albedo = rgba8::pack([200, 100, 0, 255]);
  assert_eq!(rgba8::modulate(albedo, Vec3::new(2.0, 0.5, 1.0)), [255, 50, 0]);
  assert_eq!(rgba8::modulate(albedo, Vec3::splat(-1.0)), [0, 0, 0]);
}

#[test]
fn test_node_decode() {
  let node = OctreeNode::from_words(
    9 | FLAG_BIT,
    4,
    rgba8::pack([1, 2, 3, 255]),
    0,
  );
  assert_eq!(node.child_block, Some(9));
  assert!(node.flagged);
  assert_eq!(node.children(), Some(9..17));
  assert_eq!(node.payload(), PayloadRef::Brick(4));
  assert!(!node.is_empty());

  let empty = OctreeNode::from_words(NODE_NONE, BRICK_NONE, 0, 0);
  assert!(empty.is_empty());
  assert!(empty.is_leaf());
  assert_eq!(empty.payload(), PayloadRef::Empty);
}

#[test]
fn test_payload_falls_back_to_inline_color() {
  let node = OctreeNode::from_words(NODE_NONE, BRICK_NONE, rgba8::pack([5, 6, 7, 8]), 0);
  assert_eq!(node.payload(), PayloadRef::Color([5, 6, 7, 8]));
  assert_eq!(node.channel(Channel::Albedo), [5, 6, 7, 8]);
  assert_eq!(node.channel(Channel::Radiance), [0; 4]);
}
