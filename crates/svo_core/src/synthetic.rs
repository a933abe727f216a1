//! Deterministic fragment and light sources for tests, benches, and tools.
//!
//! These stand in for a rasterizing voxelizer and a shadow-map light pass.
//! Shapes are simple enough to check by hand.

use std::collections::HashMap;

use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

use crate::types::{Fragment, IrradianceSample};

/// Produces voxelizer-style fragments for a grid of `resolution³`.
pub trait FragmentSource {
  fn fragments(&self, resolution: u32) -> Vec<Fragment>;
}

/// Single fragment at the grid center.
#[derive(Clone, Copy, Debug)]
pub struct CenterPoint {
  pub color: [u8; 4],
}

impl Default for CenterPoint {
  fn default() -> Self {
    Self {
      color: [255, 255, 255, 255],
    }
  }
}

impl FragmentSource for CenterPoint {
  fn fragments(&self, resolution: u32) -> Vec<Fragment> {
    vec![Fragment::new(UVec3::splat(resolution / 2), self.color)]
  }
}

/// Hollow sphere, one voxel thick.
///
/// Voxels whose center lies within half a voxel of the surface are covered.
/// Color encodes the outward normal so mips have something to average.
#[derive(Clone, Copy, Debug)]
pub struct SphereShell {
  /// Radius as a fraction of the grid size.
  pub radius: f32,
}

impl Default for SphereShell {
  fn default() -> Self {
    Self { radius: 0.4 }
  }
}

impl FragmentSource for SphereShell {
  fn fragments(&self, resolution: u32) -> Vec<Fragment> {
    let center = Vec3::splat(resolution as f32 * 0.5);
    let radius = self.radius * resolution as f32;
    let lo = (center.x - radius - 1.0).floor().max(0.0) as u32;
    let hi = ((center.x + radius + 1.0).ceil() as u32).min(resolution);

    let mut out = Vec::new();
    for z in lo..hi {
      for y in lo..hi {
        for x in lo..hi {
          let p = Vec3::new(x as f32, y as f32, z as f32) + 0.5;
          let offset = p - center;
          if (offset.length() - radius).abs() > 0.5 {
            continue;
          }
          let n = offset.normalize_or_zero() * 0.5 + 0.5;
          let color = [
            (n.x * 255.0) as u8,
            (n.y * 255.0) as u8,
            (n.z * 255.0) as u8,
            255,
          ];
          out.push(Fragment::new(UVec3::new(x, y, z), color));
        }
      }
    }
    out
  }
}

/// Horizontal slab one voxel thick.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
  /// Height as a fraction of the grid size.
  pub height: f32,
  pub color: [u8; 4],
}

impl Default for Plane {
  fn default() -> Self {
    Self {
      height: 0.25,
      color: [120, 200, 80, 255],
    }
  }
}

impl FragmentSource for Plane {
  fn fragments(&self, resolution: u32) -> Vec<Fragment> {
    let y = ((self.height * resolution as f32) as u32).min(resolution - 1);
    (0..resolution)
      .flat_map(|z| (0..resolution).map(move |x| UVec3::new(x, y, z)))
      .map(|position| Fragment::new(position, self.color))
      .collect()
  }
}

/// Solid axis-aligned box, `min` inclusive, `max` exclusive (leaf coordinates).
#[derive(Clone, Copy, Debug)]
pub struct SolidBox {
  pub min: UVec3,
  pub max: UVec3,
  pub color: [u8; 4],
}

impl FragmentSource for SolidBox {
  fn fragments(&self, resolution: u32) -> Vec<Fragment> {
    let max = self.max.min(UVec3::splat(resolution));
    let mut out = Vec::new();
    for z in self.min.z..max.z {
      for y in self.min.y..max.y {
        for x in self.min.x..max.x {
          out.push(Fragment::new(UVec3::new(x, y, z), self.color));
        }
      }
    }
    out
  }
}

/// Named scenes selectable from configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
  CenterPoint,
  Sphere { radius: f32 },
  Plane { height: f32 },
  Box { min: [u32; 3], max: [u32; 3] },
}

impl Default for Scene {
  fn default() -> Self {
    Scene::Sphere { radius: 0.4 }
  }
}

impl FragmentSource for Scene {
  fn fragments(&self, resolution: u32) -> Vec<Fragment> {
    match *self {
      Scene::CenterPoint => CenterPoint::default().fragments(resolution),
      Scene::Sphere { radius } => SphereShell { radius }.fragments(resolution),
      Scene::Plane { height } => Plane {
        height,
        ..Default::default()
      }
      .fragments(resolution),
      Scene::Box { min, max } => SolidBox {
        min: UVec3::from_array(min),
        max: UVec3::from_array(max),
        color: [200, 160, 120, 255],
      }
      .fragments(resolution),
    }
  }
}

/// Light from straight above: only the topmost fragment of each (x, z)
/// column receives `irradiance`, the way a top-down shadow map would see it.
pub fn top_down_light(fragments: &[Fragment], irradiance: Vec3) -> Vec<IrradianceSample> {
  let mut top: HashMap<(u32, u32), u32> = HashMap::new();
  for fragment in fragments {
    let p = fragment.position;
    let y = top.entry((p.x, p.z)).or_insert(p.y);
    *y = (*y).max(p.y);
  }
  let mut samples: Vec<IrradianceSample> = top
    .into_iter()
    .map(|((x, z), y)| IrradianceSample::new(UVec3::new(x, y, z), irradiance))
    .collect();
  samples.sort_by_key(|s| (s.position.z, s.position.y, s.position.x));
  samples
}

/// Same irradiance on every fragment.
pub fn uniform_light(fragments: &[Fragment], irradiance: Vec3) -> Vec<IrradianceSample> {
  fragments
    .iter()
    .map(|fragment| IrradianceSample::new(fragment.position, irradiance))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_center_point() {
    let fragments = CenterPoint::default().fragments(256);
    assert_eq!(fragments.len(), 1);
    assert_eq!(fragments[0].position, UVec3::splat(128));
  }

  #[test]
  fn test_sphere_stays_in_grid() {
    let fragments = SphereShell { radius: 0.45 }.fragments(32);
    assert!(!fragments.is_empty());
    assert!(fragments.iter().all(|f| f.position.max_element() < 32));
    // Shell, not solid: the center is empty.
    assert!(fragments.iter().all(|f| f.position != UVec3::splat(16)));
  }

  #[test]
  fn test_plane_covers_one_layer() {
    let fragments = Plane::default().fragments(16);
    assert_eq!(fragments.len(), 256);
    assert!(fragments.iter().all(|f| f.position.y == 4));
  }

  #[test]
  fn test_box_is_clipped() {
    let fragments = SolidBox {
      min: UVec3::new(2, 2, 2),
      max: UVec3::splat(100),
      color: [1, 2, 3, 255],
    }
    .fragments(4);
    assert_eq!(fragments.len(), 8);
  }

  #[test]
  fn test_top_down_light_hits_column_tops() {
    let fragments = SolidBox {
      min: UVec3::ZERO,
      max: UVec3::new(2, 3, 1),
      color: [255; 4],
    }
    .fragments(4);
    let samples = top_down_light(&fragments, Vec3::ONE);
    assert_eq!(samples.len(), 2);
    assert!(samples.iter().all(|s| s.position.y == 2));
  }
}
