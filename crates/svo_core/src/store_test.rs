use glam::UVec3;

use super::*;
use crate::config::BuildConfig;
use crate::synthetic::{FragmentSource, SphereShell};
use crate::types::Channel;
use crate::types::Fragment;

fn builder(node_pool_tiles: Option<u32>) -> OctreeBuilder {
  OctreeBuilder::new(BuildConfig {
    voxel_grid_resolution: 16,
    brick_pool_resolution: 48,
    node_pool_tiles,
    ..Default::default()
  })
  .unwrap()
}

fn fragments(builder: &OctreeBuilder, fragments: Vec<Fragment>) -> FragmentList {
  FragmentList::from_fragments(builder.layout().fragment_capacity, fragments)
}

#[test]
fn test_no_tree_before_first_build() {
  let store = OctreeStore::new(builder(None));
  assert!(store.current().is_none());
  assert_eq!(store.generation(), 0);
  assert!(store.last_stats().is_none());
}

#[test]
fn test_rebuild_swaps_in_new_tree() {
  let mut store = OctreeStore::new(builder(None));
  let list = fragments(store.builder(), vec![Fragment::new(UVec3::splat(3), [5, 6, 7, 255])]);

  let tiles = store.rebuild(&list, None).unwrap().tiles_allocated;
  assert_eq!(tiles, 4);
  assert_eq!(store.generation(), 1);
  let view = store.current().unwrap();
  assert_eq!(view.sample(UVec3::splat(3), 4, Channel::Albedo), Some([5, 6, 7, 255]));
}

/// A failed rebuild leaves the previous octree in place.
#[test]
fn test_aborted_rebuild_keeps_previous_tree() {
  let mut store = OctreeStore::new(builder(Some(8)));
  let small = fragments(store.builder(), vec![Fragment::new(UVec3::splat(3), [5, 6, 7, 255])]);
  store.rebuild(&small, None).unwrap();
  let before = store.current().unwrap().canonical_nodes();

  let big = fragments(store.builder(), SphereShell::default().fragments(16));
  let err = store.rebuild(&big, None).unwrap_err();
  assert!(matches!(err, BuildError::NodePoolExhausted { .. }));

  assert_eq!(store.generation(), 1);
  assert_eq!(store.current().unwrap().canonical_nodes(), before);

  // The store still works afterwards.
  store.rebuild(&small, None).unwrap();
  assert_eq!(store.generation(), 2);
}

#[test]
fn test_async_rebuild() {
  let mut store = OctreeStore::new(builder(None));
  let list = Arc::new(fragments(store.builder(), SphereShell::default().fragments(16)));

  store.rebuild_async(Arc::clone(&list), None).unwrap();
  assert!(store.is_rebuilding());
  assert_eq!(
    store.rebuild_async(Arc::clone(&list), None).unwrap_err(),
    BuildError::RebuildInFlight
  );
  assert_eq!(store.rebuild(&list, None).unwrap_err(), BuildError::RebuildInFlight);

  let stats = store.wait().unwrap().unwrap().clone();
  assert!(!store.is_rebuilding());
  assert_eq!(store.generation(), 1);
  assert_eq!(store.last_stats(), Some(&stats));
  assert!(store.current().is_some());
  assert!(store.poll().is_none());
}

#[test]
fn test_poll_eventually_applies() {
  let mut store = OctreeStore::new(builder(None));
  let list = Arc::new(fragments(store.builder(), vec![Fragment::new(UVec3::ZERO, [1, 1, 1, 255])]));
  store.rebuild_async(list, None).unwrap();

  let mut applied = false;
  for _ in 0..10_000 {
    if let Some(result) = store.poll() {
      result.unwrap();
      applied = true;
      break;
    }
    std::thread::sleep(std::time::Duration::from_millis(1));
  }
  assert!(applied, "background rebuild never finished");
  assert_eq!(store.generation(), 1);
}

#[test]
fn test_update_lighting_needs_a_tree() {
  let mut store = OctreeStore::new(builder(None));
  let samples = IrradianceList::from_samples(&[]);
  assert!(!store.update_lighting(&samples).unwrap());

  let list = fragments(store.builder(), vec![Fragment::new(UVec3::ZERO, [100, 100, 100, 255])]);
  store.rebuild(&list, None).unwrap();
  assert!(store.update_lighting(&samples).unwrap());
  let view = store.current().unwrap();
  assert_eq!(view.sample(UVec3::ZERO, 4, Channel::Radiance), Some([0, 0, 0, 255]));
}

#[test]
fn test_async_rebuild_cancel() {
  let mut pipeline = AsyncRebuild::new();
  let builder = builder(None);
  let request = RebuildRequest {
    buffers: builder.allocate_buffers(),
    fragments: Arc::new(fragments(&builder, vec![])),
    samples: None,
    builder: builder.clone(),
  };
  pipeline.start(request).ok().unwrap();
  assert!(pipeline.is_busy());
  pipeline.cancel();
  assert!(!pipeline.is_busy());
  assert!(pipeline.poll_results().is_none());
}
