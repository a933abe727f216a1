//! Rebuild metrics for the octree store.
//!
//! Compiled in with the `metrics` feature and switchable at runtime through
//! [`COLLECT_METRICS`]. Without the feature every recording call is a no-op.
//!
//! ```ignore
//! use std::sync::atomic::Ordering;
//! use svo_core::metrics::COLLECT_METRICS;
//!
//! COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let metrics = store.metrics();
//! println!("avg build: {:.0}us", metrics.average_build_us());
//! ```

use std::collections::VecDeque;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;
use std::sync::atomic::AtomicBool;

use crate::stats::BuildStats;

/// Number of builds kept in the history.
pub const HISTORY_LEN: usize = 64;

/// Runtime toggle for metrics collection.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

/// Check if metrics collection is enabled (both compile-time and runtime).
#[inline]
pub fn is_enabled() -> bool {
    #[cfg(feature = "metrics")]
    {
        COLLECT_METRICS.load(Ordering::Relaxed)
    }
    #[cfg(not(feature = "metrics"))]
    {
        false
    }
}

/// What one successful build cost and produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildSample {
    pub elapsed_us: u64,
    pub nodes: u32,
    pub bricks: u32,
    /// Allocated tiles over tile capacity.
    pub node_pool_usage: f32,
}

impl From<&BuildStats> for BuildSample {
    fn from(stats: &BuildStats) -> Self {
        let node_pool_usage = if stats.tile_capacity == 0 {
            0.0
        } else {
            stats.tiles_allocated as f32 / stats.tile_capacity as f32
        };
        Self {
            elapsed_us: stats.elapsed_us,
            nodes: stats.total_nodes(),
            bricks: stats.bricks_allocated,
            node_pool_usage,
        }
    }
}

/// Recent builds plus lifetime counters.
#[derive(Debug, Clone, Default)]
pub struct BuildMetrics {
    history: VecDeque<BuildSample>,
    /// Highest node pool usage ever seen.
    pub peak_node_pool_usage: f32,
    pub builds: u64,
    pub failed_builds: u64,
}

impl BuildMetrics {
    pub fn record_build(&mut self, stats: &BuildStats) {
        if !is_enabled() {
            return;
        }
        let sample = BuildSample::from(stats);
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(sample);
        self.peak_node_pool_usage = self.peak_node_pool_usage.max(sample.node_pool_usage);
        self.builds += 1;
    }

    pub fn record_failure(&mut self) {
        if !is_enabled() {
            return;
        }
        self.failed_builds += 1;
    }

    /// Recorded builds, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &BuildSample> {
        self.history.iter()
    }

    pub fn last(&self) -> Option<&BuildSample> {
        self.history.back()
    }

    pub fn average_build_us(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: u64 = self.history.iter().map(|s| s.elapsed_us).sum();
        total as f64 / self.history.len() as f64
    }

    pub fn slowest_build_us(&self) -> Option<u64> {
        self.history.iter().map(|s| s.elapsed_us).max()
    }
}
