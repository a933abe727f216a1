//! Double-buffered octree storage and background rebuilds.
//!
//! # Flow
//!
//! ```text
//! Caller                            Async (rayon)
//! ┌──────────────────┐
//! │ rebuild_async()  │  back buffers + fragments
//! │                  │─────────────────────────────┐
//! └──────────────────┘                             ▼
//!   current() keeps                       ┌────────────────┐
//!   serving the front                     │ builder.build()│
//!   buffers                               └───────┬────────┘
//! ┌──────────────────┐                            │
//! │ poll()           │◄───────────────────────────┘
//! │ Ok  → swap       │
//! │ Err → keep front │
//! └──────────────────┘
//! ```

use std::sync::Arc;

use crossbeam_channel::{self as channel, Receiver, TryRecvError};
use tracing::warn;
use web_time::Instant;

use crate::builder::OctreeBuilder;
use crate::error::BuildError;
use crate::fragments::{FragmentList, IrradianceList};
use crate::metrics::BuildMetrics;
use crate::octree::OctreeView;
use crate::pool::SvoBuffers;
use crate::stats::BuildStats;

/// Inputs of one background rebuild.
pub struct RebuildRequest {
  pub builder: OctreeBuilder,
  /// Buffers the build writes into. Returned in the result either way.
  pub buffers: SvoBuffers,
  pub fragments: Arc<FragmentList>,
  pub samples: Option<Arc<IrradianceList>>,
}

pub struct RebuildResult {
  pub buffers: SvoBuffers,
  pub outcome: Result<BuildStats, BuildError>,
  /// Time from spawn to completion, queueing included.
  pub total_us: u64,
}

/// Non-blocking rebuild on rayon's thread pool.
///
/// A started rebuild always runs to completion; cancelling only drops the
/// result.
#[derive(Default)]
pub struct AsyncRebuild {
  receiver: Option<Receiver<RebuildResult>>,
}

impl AsyncRebuild {
  pub fn new() -> Self {
    Self { receiver: None }
  }

  pub fn is_busy(&self) -> bool {
    self.receiver.is_some()
  }

  /// Start a rebuild. Hands the request back if one is already running.
  pub fn start(&mut self, request: RebuildRequest) -> Result<(), RebuildRequest> {
    if self.is_busy() {
      return Err(request);
    }

    let (sender, receiver) = channel::bounded(1);
    self.receiver = Some(receiver);

    rayon::spawn(move || {
      let start = Instant::now();
      let RebuildRequest {
        builder,
        mut buffers,
        fragments,
        samples,
      } = request;
      let outcome = builder.build(&mut buffers, &fragments, samples.as_deref());
      // Receiver dropped = cancelled.
      let _ = sender.send(RebuildResult {
        buffers,
        outcome,
        total_us: start.elapsed().as_micros() as u64,
      });
    });

    Ok(())
  }

  /// Returns `Some(result)` when complete, `None` if still running.
  pub fn poll_results(&mut self) -> Option<RebuildResult> {
    let receiver = self.receiver.as_ref()?;

    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        Some(result)
      }
      Err(TryRecvError::Empty) => None,
      Err(TryRecvError::Disconnected) => {
        self.receiver = None;
        None
      }
    }
  }

  /// Block until the running rebuild finishes.
  pub fn wait(&mut self) -> Option<RebuildResult> {
    let receiver = self.receiver.take()?;
    receiver.recv().ok()
  }

  /// Forget the running rebuild. Its buffers are dropped when it finishes.
  pub fn cancel(&mut self) {
    self.receiver = None;
  }
}

/// Front buffers serve readers; rebuilds go into the back buffers and are
/// swapped in only when they succeed.
pub struct OctreeStore {
  builder: OctreeBuilder,
  front: SvoBuffers,
  back: Option<SvoBuffers>,
  has_tree: bool,
  generation: u64,
  last_stats: Option<BuildStats>,
  pending: AsyncRebuild,
  metrics: BuildMetrics,
}

impl OctreeStore {
  pub fn new(builder: OctreeBuilder) -> Self {
    Self {
      front: builder.allocate_buffers(),
      back: Some(builder.allocate_buffers()),
      builder,
      has_tree: false,
      generation: 0,
      last_stats: None,
      pending: AsyncRebuild::new(),
      metrics: BuildMetrics::default(),
    }
  }

  pub fn builder(&self) -> &OctreeBuilder {
    &self.builder
  }

  /// Mutable access for per-level controls such as the visualized level.
  pub fn builder_mut(&mut self) -> &mut OctreeBuilder {
    &mut self.builder
  }

  /// The last successfully built octree.
  pub fn current(&self) -> Option<OctreeView<'_>> {
    self.has_tree.then(|| self.front.view())
  }

  /// Successful rebuilds so far.
  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn last_stats(&self) -> Option<&BuildStats> {
    self.last_stats.as_ref()
  }

  pub fn metrics(&self) -> &BuildMetrics {
    &self.metrics
  }

  pub fn is_rebuilding(&self) -> bool {
    self.pending.is_busy()
  }

  /// Rebuild on the calling thread.
  pub fn rebuild(
    &mut self,
    fragments: &FragmentList,
    samples: Option<&IrradianceList>,
  ) -> Result<&BuildStats, BuildError> {
    let mut buffers = self.take_back()?;
    let outcome = self.builder.build(&mut buffers, fragments, samples);
    self.apply(buffers, outcome)
  }

  /// Start a rebuild in the background. Readers keep seeing the current tree.
  pub fn rebuild_async(
    &mut self,
    fragments: Arc<FragmentList>,
    samples: Option<Arc<IrradianceList>>,
  ) -> Result<(), BuildError> {
    let buffers = self.take_back()?;
    let request = RebuildRequest {
      builder: self.builder.clone(),
      buffers,
      fragments,
      samples,
    };
    if let Err(request) = self.pending.start(request) {
      self.back = Some(request.buffers);
      return Err(BuildError::RebuildInFlight);
    }
    Ok(())
  }

  /// Apply a finished background rebuild, if any.
  pub fn poll(&mut self) -> Option<Result<&BuildStats, BuildError>> {
    let result = self.pending.poll_results()?;
    Some(self.apply(result.buffers, result.outcome))
  }

  /// Block until the background rebuild finishes and apply it.
  pub fn wait(&mut self) -> Option<Result<&BuildStats, BuildError>> {
    let result = self.pending.wait()?;
    Some(self.apply(result.buffers, result.outcome))
  }

  /// Relight the current tree in place. Returns false when there is no tree.
  pub fn update_lighting(&mut self, samples: &IrradianceList) -> Result<bool, BuildError> {
    if !self.has_tree {
      return Ok(false);
    }
    self.builder.update_lighting(&mut self.front, samples)?;
    Ok(true)
  }

  fn take_back(&mut self) -> Result<SvoBuffers, BuildError> {
    if self.pending.is_busy() {
      return Err(BuildError::RebuildInFlight);
    }
    // A cancelled rebuild took the back buffers with it.
    Ok(self.back.take().unwrap_or_else(|| self.builder.allocate_buffers()))
  }

  fn apply(
    &mut self,
    buffers: SvoBuffers,
    outcome: Result<BuildStats, BuildError>,
  ) -> Result<&BuildStats, BuildError> {
    match outcome {
      Ok(stats) => {
        let previous = std::mem::replace(&mut self.front, buffers);
        self.back = Some(previous);
        self.has_tree = true;
        self.generation += 1;
        self.metrics.record_build(&stats);
        Ok(&*self.last_stats.insert(stats))
      }
      Err(err) => {
        warn!(%err, generation = self.generation, "rebuild failed, keeping previous octree");
        self.back = Some(buffers);
        self.metrics.record_failure();
        Err(err)
      }
    }
  }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
