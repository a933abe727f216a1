//! Device memory primitives.
//!
//! The construction pipeline runs on a data-parallel "device" emulated with
//! rayon. Everything a kernel touches lives in these primitives:
//!
//! - [`DeviceBuffer`]: flat array of `AtomicU32` words (storage buffers)
//! - [`Texture3d`]: 3D RGBA8 image backed by a `DeviceBuffer`
//! - [`BumpAllocator`]: saturating atomic counter over a fixed-capacity arena
//! - [`DeviceList`]: append-only record list with a device-resident counter
//! - [`BarrierScope`]: memory classes a barrier makes visible
//!
//! Kernels only use `Relaxed` atomics. Ordering between phases comes from the
//! barriers the op list places between dispatches.

pub mod allocator;
pub mod barrier;
pub mod buffer;
pub mod list;

pub use allocator::BumpAllocator;
pub use barrier::{BarrierScope, HazardTracker};
pub use buffer::{DeviceBuffer, Texture3d};
pub use list::{DeviceList, Record};
