//! Op lists and the executor that interprets them.
//!
//! A build is a flat, fixed sequence of [`Op`]s issued by one control thread.
//! All data-dependent sizes are read from device memory at dispatch time, so
//! the host never waits on intermediate results.

pub mod executor;
pub mod op;
pub mod program;

pub use executor::{DispatchRecord, ExecutionReport, Executor, Schedule};
pub use op::{IndirectSource, Kernel, Op, SourceKind};
