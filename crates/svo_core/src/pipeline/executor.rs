//! Op list interpreter.
//!
//! Each `Dispatch` resolves its launch size from the bound indirect source,
//! checks for read-after-write hazards, and runs the kernel once per work item
//! in the order chosen by the [`Schedule`]. A `Barrier` joins the dispatch
//! (rayon already did) and issues a `SeqCst` fence.

use std::sync::atomic::{fence, Ordering};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::op::{IndirectSource, Kernel, Op};
use crate::device::HazardTracker;
use crate::error::PipelineError;
use crate::pool::IndirectDispatchParams;
use crate::stages::{self, KernelArgs, Resources};
use crate::types::Channel;

/// Order in which work items of one dispatch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Schedule {
  /// rayon work stealing.
  #[default]
  Parallel,
  /// Ascending, on the calling thread.
  Sequential,
  /// Descending, on the calling thread.
  Reversed,
  /// Seeded permutation per dispatch, on the calling thread.
  Shuffled { seed: u64 },
}

/// One executed dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DispatchRecord {
  pub kernel: Kernel,
  /// Bound level uniform.
  pub level: u32,
  pub invocations: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
  pub dispatches: Vec<DispatchRecord>,
  pub barriers: usize,
}

impl ExecutionReport {
  /// Work items launched for `kernel` at `level` (0 if never dispatched).
  pub fn invocations_of(&self, kernel: Kernel, level: u32) -> u32 {
    self
      .dispatches
      .iter()
      .filter(|d| d.kernel == kernel && d.level == level)
      .map(|d| d.invocations)
      .sum()
  }

  pub fn total_invocations(&self) -> u64 {
    self.dispatches.iter().map(|d| d.invocations as u64).sum()
  }
}

/// Interprets op lists against a set of [`Resources`].
///
/// Bindings persist across `execute` calls on the same executor, like device
/// state between command buffers.
#[derive(Debug)]
pub struct Executor {
  schedule: Schedule,
  indirect: Option<IndirectSource>,
  level: Option<u32>,
  channel: Option<Channel>,
  hazards: HazardTracker,
  dispatch_count: u64,
}

impl Executor {
  pub fn new(schedule: Schedule) -> Self {
    Self {
      schedule,
      indirect: None,
      level: None,
      channel: None,
      hazards: HazardTracker::new(),
      dispatch_count: 0,
    }
  }

  pub fn schedule(&self) -> Schedule {
    self.schedule
  }

  /// Run `ops` in order. Stops at the first malformed op.
  pub fn execute(&mut self, ops: &[Op], res: &Resources<'_>) -> Result<ExecutionReport, PipelineError> {
    let mut report = ExecutionReport::default();
    for op in ops {
      match *op {
        Op::BindIndirect(source) => self.indirect = Some(source),
        Op::BindUniform(level) => self.level = Some(level),
        Op::BindImage(channel) => self.channel = Some(channel),
        Op::Barrier(scope) => {
          fence(Ordering::SeqCst);
          self.hazards.barrier(scope);
          report.barriers += 1;
        }
        Op::Dispatch(kernel) => {
          let record = self.dispatch(kernel, res)?;
          report.dispatches.push(record);
        }
      }
    }
    Ok(report)
  }

  fn dispatch(&mut self, kernel: Kernel, res: &Resources<'_>) -> Result<DispatchRecord, PipelineError> {
    let max_level = res.layout.max_level;

    let level = self.level.ok_or(PipelineError::MissingBinding {
      kernel,
      binding: "level uniform",
    })?;
    if level > max_level {
      return Err(PipelineError::LevelOutOfRange { level, max_level });
    }

    let expected = kernel.source_kind();
    let source = self
      .indirect
      .filter(|source| source.kind() == expected)
      .ok_or(PipelineError::MissingBinding {
        kernel,
        binding: expected.binding_name(),
      })?;

    let channel = match (kernel.needs_channel(), self.channel) {
      (true, None) => {
        return Err(PipelineError::MissingBinding {
          kernel,
          binding: "image channel",
        })
      }
      (_, channel) => channel,
    };

    if let Some(pending) = self.hazards.conflicts(kernel.reads() | source.reads()) {
      return Err(PipelineError::MissingBarrier { kernel, pending });
    }

    // Launch size comes from device memory right before launch.
    let (record, invocations) = match source {
      IndirectSource::Level(n) => {
        if n > max_level {
          return Err(PipelineError::LevelOutOfRange { level: n, max_level });
        }
        let record = res.nodes.params(n);
        (record, record.invocations())
      }
      IndirectSource::Fragments => (IndirectDispatchParams::default(), res.fragments.len()),
      IndirectSource::Samples => (
        IndirectDispatchParams::default(),
        res.samples.map_or(0, |samples| samples.len()),
      ),
      IndirectSource::Single => (IndirectDispatchParams::default(), 1),
    };

    tracing::trace!(?kernel, level, invocations, "dispatch");

    let args = KernelArgs {
      level,
      channel,
      record,
    };
    let salt = self.dispatch_count;
    self.dispatch_count += 1;
    self.launch(invocations, salt, |invocation| {
      stages::invoke(kernel, res, &args, invocation)
    });
    self.hazards.record_writes(kernel.writes());

    Ok(DispatchRecord {
      kernel,
      level,
      invocations,
    })
  }

  fn launch<F>(&self, count: u32, salt: u64, work_item: F)
  where
    F: Fn(u32) + Send + Sync,
  {
    match self.schedule {
      Schedule::Parallel => (0..count).into_par_iter().for_each(work_item),
      Schedule::Sequential => (0..count).for_each(work_item),
      Schedule::Reversed => (0..count).rev().for_each(work_item),
      Schedule::Shuffled { seed } => {
        let mut order: Vec<u32> = (0..count).collect();
        let mut rng = StdRng::seed_from_u64(seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        order.shuffle(&mut rng);
        order.into_iter().for_each(work_item);
      }
    }
  }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod executor_test;
