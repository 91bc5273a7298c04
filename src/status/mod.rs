//! Unit status monitoring.
//!
//! Converts a stream of raw unit-state batches into one coarse
//! [`ProcessStatus`] for a single unit and keeps the latest value readable
//! from any task.
//!
//! - `process_status`: [`ProcessStatus`], [`UnitState`], [`UnitBatch`];
//! - `classify`: the first-match rule table and per-batch rules;
//! - `source`: the [`UnitStateSource`] collaborator and [`MemorySource`];
//! - `service`: [`ServiceStatus`] setup and the [`StatusMonitor`] loop.

mod classify;
mod process_status;
mod service;
mod source;

pub use classify::{Classification, Observation, classify, observe};
pub use process_status::{ProcessStatus, UnitBatch, UnitState};
pub use service::{ServiceStatus, StatusMonitor, StatusReader};
pub use source::{MemoryFeed, MemorySource, UnitFeed, UnitStateSource};
