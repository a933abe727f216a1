use rayon::prelude::*;

use super::*;

#[test]
fn test_reset_state() {
  let pool = NodePool::new(4, 3);
  assert_eq!(pool.capacity(), 33);
  assert!(pool.get_node(0).is_empty());
  assert_eq!(pool.params(0), IndirectDispatchParams::ROOT);
  assert_eq!(pool.params(1), IndirectDispatchParams::default());
  assert_eq!(pool.tiles().requested(), 0);
}

#[test]
fn test_tiles_never_overlap_root() {
  let pool = NodePool::new(3, 2);
  assert_eq!(pool.allocate_tile(), Ok(1));
  assert_eq!(pool.allocate_tile(), Ok(9));
  assert_eq!(pool.allocate_tile(), Ok(17));
  assert!(pool.allocate_tile().is_err());
}

#[test]
fn test_flag_is_idempotent() {
  let pool = NodePool::new(1, 1);
  let first: Vec<bool> = (0..64).into_par_iter().map(|_| pool.flag(0)).collect();
  assert_eq!(first.iter().filter(|&&won| won).count(), 1);
  assert!(pool.is_flagged(0));
  assert_eq!(pool.child_block(0), None);
}

#[test]
fn test_child_block_replaces_flag() {
  let pool = NodePool::new(1, 1);
  pool.flag(0);
  let base = pool.allocate_tile().unwrap();
  pool.set_child_block(0, base);

  let root = pool.get_node(0);
  assert!(!root.flagged);
  assert_eq!(root.child_block, Some(1));
  assert_eq!(root.children(), Some(1..9));
}

#[test]
fn test_payload_and_channels() {
  let pool = NodePool::new(1, 1);
  pool.set_payload(0, PayloadRef::Color([1, 2, 3, 255]));
  pool.set_payload(0, PayloadRef::Brick(7));
  pool.store_channel(Channel::Radiance, 0, rgba8::pack([9, 9, 9, 255]));

  let root = pool.get_node(0);
  assert_eq!(root.payload(), PayloadRef::Brick(7));
  assert_eq!(root.channel(Channel::Albedo), [1, 2, 3, 255]);
  assert_eq!(root.channel(Channel::Radiance), [9, 9, 9, 255]);

  pool.set_payload(0, PayloadRef::Empty);
  assert_eq!(pool.get_node(0).payload(), PayloadRef::Empty);
}

#[test]
fn test_params_roundtrip_and_next_level() {
  let pool = NodePool::new(8, 3);
  let root = pool.params(0);
  assert_eq!(root.invocations(), 1);
  assert_eq!(root.nodes(), 0..1);

  // Root allocated one tile.
  let level1 = root.next_level(1);
  assert_eq!(
    level1,
    IndirectDispatchParams {
      work_item_count: 1,
      first_node: 1,
      nodes_per_item: 8,
      alloc_base: 1
    }
  );
  pool.store_params(1, level1);
  assert_eq!(pool.params(1), level1);

  // Level 1 allocated three more tiles.
  let level2 = level1.next_level(4);
  assert_eq!(level2.work_item_count, 3);
  assert_eq!(level2.first_node, 9);
  assert_eq!(level2.nodes(), 9..33);
}

#[test]
fn test_next_level_without_allocations_is_empty() {
  let record = IndirectDispatchParams::ROOT.next_level(0);
  assert_eq!(record.invocations(), 0);
  assert!(record.nodes().is_empty());
}

#[test]
fn test_reset_clears_previous_build() {
  let pool = NodePool::new(2, 2);
  pool.flag(0);
  let base = pool.allocate_tile().unwrap();
  pool.set_child_block(0, base);
  pool.store_params(1, IndirectDispatchParams::ROOT.next_level(1));

  pool.reset();
  assert!(pool.get_node(0).is_empty());
  assert_eq!(pool.params(1), IndirectDispatchParams::default());
  assert_eq!(pool.allocate_tile(), Ok(1));
}
