//! Fragment and irradiance lists consumed by the pipeline.
//!
//! The voxelizer (outside this crate) appends one [`Fragment`] per covered
//! voxel; several fragments may name the same voxel. A light pass appends one
//! [`IrradianceSample`] per lit voxel.
//!
//! # Record Layout
//!
//! ```text
//! Fragment:          [x, y, z, rgba8]
//! IrradianceSample:  [x, y, z, r.to_bits(), g.to_bits(), b.to_bits()]
//! ```

use glam::{UVec3, Vec3};

use crate::device::{DeviceList, Record};
use crate::types::{rgba8, Fragment, IrradianceSample};

pub type FragmentList = DeviceList<Fragment>;

pub type IrradianceList = DeviceList<IrradianceSample>;

impl FragmentList {
  /// Host upload of voxelizer output.
  pub fn from_fragments(capacity: u32, fragments: impl IntoIterator<Item = Fragment>) -> Self {
    Self::from_records(capacity, fragments)
  }
}

impl IrradianceList {
  /// Host upload of light samples. Capacity is the sample count.
  pub fn from_samples(samples: &[IrradianceSample]) -> Self {
    let capacity = u32::try_from(samples.len()).unwrap_or(u32::MAX);
    Self::from_records(capacity, samples.iter().copied())
  }
}

impl Record for Fragment {
  const WORDS: usize = 4;

  fn encode(&self, out: &mut [u32]) {
    out[0] = self.position.x;
    out[1] = self.position.y;
    out[2] = self.position.z;
    out[3] = rgba8::pack(self.color);
  }

  fn decode(words: &[u32]) -> Self {
    Self {
      position: UVec3::new(words[0], words[1], words[2]),
      color: rgba8::unpack(words[3]),
    }
  }
}

impl Record for IrradianceSample {
  const WORDS: usize = 6;

  fn encode(&self, out: &mut [u32]) {
    out[0] = self.position.x;
    out[1] = self.position.y;
    out[2] = self.position.z;
    out[3] = self.irradiance.x.to_bits();
    out[4] = self.irradiance.y.to_bits();
    out[5] = self.irradiance.z.to_bits();
  }

  fn decode(words: &[u32]) -> Self {
    Self {
      position: UVec3::new(words[0], words[1], words[2]),
      irradiance: Vec3::new(
        f32::from_bits(words[3]),
        f32::from_bits(words[4]),
        f32::from_bits(words[5]),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use rayon::prelude::*;

  use super::*;

  #[test]
  fn test_fragment_list_preserves_records() {
    let fragments = vec![
      Fragment::new(UVec3::new(1, 2, 3), [10, 20, 30, 255]),
      Fragment::new(UVec3::new(7, 0, 5), [1, 2, 3, 4]),
    ];
    let list = FragmentList::from_records(8, fragments.clone());

    assert_eq!(list.len(), 2);
    assert_eq!(list.iter().collect::<Vec<_>>(), fragments);
    assert_eq!(list.get(2), None);
  }

  #[test]
  fn test_overflowing_appends_are_dropped() {
    let list = FragmentList::with_capacity(3);
    (0..10u32).into_par_iter().for_each(|i| {
      let _ = list.append(Fragment::new(UVec3::splat(i), [0, 0, 0, 255]));
    });

    assert_eq!(list.len(), 3);
    assert_eq!(list.dropped(), 7);
    for fragment in list.iter() {
      assert!(fragment.position.x < 10);
    }
  }

  #[test]
  fn test_irradiance_bits_survive() {
    let sample = IrradianceSample::new(UVec3::new(4, 5, 6), Vec3::new(0.25, 1.5, -0.0));
    let list = IrradianceList::from_records(1, [sample]);
    assert_eq!(list.get(0), Some(sample));
  }

  #[test]
  fn test_clear_keeps_capacity() {
    let list = FragmentList::from_records(2, [Fragment::new(UVec3::ZERO, [0; 4])]);
    list.clear();
    assert!(list.is_empty());
    assert_eq!(list.capacity(), 2);
  }
}
