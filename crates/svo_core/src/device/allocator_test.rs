use std::collections::HashSet;

use rayon::prelude::*;

use super::*;

#[test]
fn test_sequential_slots() {
  let alloc = BumpAllocator::new(3);
  assert_eq!(alloc.allocate(), Ok(0));
  assert_eq!(alloc.allocate(), Ok(1));
  assert_eq!(alloc.allocate(), Ok(2));
  assert_eq!(alloc.allocated(), 3);
  assert!(!alloc.overflowed());
}

#[test]
fn test_exhaustion_is_distinguishable() {
  let alloc = BumpAllocator::new(2);
  alloc.allocate().unwrap();
  alloc.allocate().unwrap();

  let err = alloc.allocate().unwrap_err();
  assert_eq!(
    err,
    Exhausted {
      requested: 2,
      capacity: 2
    }
  );
  assert!(alloc.overflowed());
  assert_eq!(alloc.allocated(), 2, "allocated() clamps to capacity");
  assert_eq!(alloc.requested(), 3, "requested() keeps counting demand");
}

#[test]
fn test_zero_capacity_rejects_everything() {
  let alloc = BumpAllocator::new(0);
  assert!(alloc.allocate().is_err());
  assert_eq!(alloc.allocated(), 0);
}

/// Racing allocations never hand out the same slot twice.
#[test]
fn test_concurrent_slots_are_unique() {
  let alloc = BumpAllocator::new(5000);
  let slots: Vec<u32> = (0..6000)
    .into_par_iter()
    .filter_map(|_| alloc.allocate().ok())
    .collect();

  assert_eq!(slots.len(), 5000);
  let unique: HashSet<u32> = slots.iter().copied().collect();
  assert_eq!(unique.len(), 5000, "Every slot must be issued once");
  assert!(slots.iter().all(|&s| s < 5000));
  assert_eq!(alloc.requested(), 6000);
}

#[test]
fn test_reset_restarts_from_zero() {
  let alloc = BumpAllocator::new(4);
  alloc.allocate().unwrap();
  alloc.allocate().unwrap();
  alloc.reset();
  assert_eq!(alloc.requested(), 0);
  assert_eq!(alloc.allocate(), Ok(0));
}

#[test]
fn test_counter_saturates() {
  let alloc = BumpAllocator::new(1);
  alloc.next.store(u32::MAX, Ordering::Relaxed);
  assert!(alloc.allocate().is_err());
  assert_eq!(alloc.requested(), u32::MAX, "Counter must not wrap to 0");
  assert!(alloc.allocate().is_err());
}
