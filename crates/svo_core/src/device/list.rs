//! Append-only record lists with a device-resident length counter.
//!
//! Records are flattened into `R::WORDS` consecutive words. The counter is a
//! [`BumpAllocator`], so appends past capacity are dropped and counted instead
//! of writing out of bounds.

use std::marker::PhantomData;

use smallvec::{smallvec, SmallVec};

use super::{BumpAllocator, DeviceBuffer};
use crate::error::Exhausted;

/// Fixed-size record that can live in a [`DeviceList`].
pub trait Record: Copy + Send + Sync {
  /// Words per record.
  const WORDS: usize;

  fn encode(&self, out: &mut [u32]);

  fn decode(words: &[u32]) -> Self;
}

/// Append-only list of records.
pub struct DeviceList<R: Record> {
  words: DeviceBuffer,
  counter: BumpAllocator,
  _marker: PhantomData<R>,
}

impl<R: Record> DeviceList<R> {
  pub fn with_capacity(capacity: u32) -> Self {
    Self {
      words: DeviceBuffer::zeroed(capacity as usize * R::WORDS),
      counter: BumpAllocator::new(capacity),
      _marker: PhantomData,
    }
  }

  /// Host upload. Records past `capacity` are dropped and counted.
  pub fn from_records(capacity: u32, records: impl IntoIterator<Item = R>) -> Self {
    let list = Self::with_capacity(capacity);
    for record in records {
      let _ = list.append(record);
    }
    list
  }

  /// Atomically claim a slot and write `record` into it.
  pub fn append(&self, record: R) -> Result<u32, Exhausted> {
    let slot = self.counter.allocate()?;
    let mut staged: SmallVec<[u32; 8]> = smallvec![0; R::WORDS];
    record.encode(&mut staged);
    let base = slot as usize * R::WORDS;
    for (offset, &word) in staged.iter().enumerate() {
      self.words.store(base + offset, word);
    }
    Ok(slot)
  }

  /// Record at `index`, if it was written.
  pub fn get(&self, index: u32) -> Option<R> {
    if index >= self.len() {
      return None;
    }
    let base = index as usize * R::WORDS;
    let mut staged: SmallVec<[u32; 8]> = smallvec![0; R::WORDS];
    for (offset, word) in staged.iter_mut().enumerate() {
      *word = self.words.load(base + offset);
    }
    Some(R::decode(&staged))
  }

  /// Records stored (clamped to capacity).
  pub fn len(&self) -> u32 {
    self.counter.allocated()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn capacity(&self) -> u32 {
    self.counter.capacity()
  }

  /// Appends rejected because the list was full.
  pub fn dropped(&self) -> u32 {
    self.counter.requested() - self.len()
  }

  /// Forget all records. Storage is kept.
  pub fn clear(&self) {
    self.counter.reset();
  }

  pub fn iter(&self) -> impl Iterator<Item = R> + '_ {
    (0..self.len()).filter_map(move |i| self.get(i))
  }
}

impl<R: Record> std::fmt::Debug for DeviceList<R> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DeviceList")
      .field("len", &self.len())
      .field("capacity", &self.capacity())
      .finish()
  }
}
