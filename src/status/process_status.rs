//! # Coarse unit status and the raw states it is derived from.
//!
//! [`ProcessStatus`] is what callers of the monitor see. It is derived from a
//! [`UnitState`] triple reported by the init system for each unit:
//!
//! ```text
//! UnitState { load_state, active_state, sub_state } ──classify──► ProcessStatus
//! ```
//!
//! A [`UnitBatch`] is one delivery from the source: every unit it mentions, with
//! `None` standing for a unit the source reports as removed.

use std::collections::HashMap;
use std::fmt;

/// Coarse lifecycle status of the monitored unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// No information yet, or the unit was absent from the last batch (default).
    #[default]
    Unknown,
    /// Loaded, active and running (or active without a main process).
    Running,
    /// Inactive and dead, or an active-exited leftover of an unloaded unit.
    Stopped,
    /// The source reported the unit as removed.
    Deleted,
    /// Any state combination without a rule, e.g. `deactivating`.
    Other,
}

impl ProcessStatus {
    /// Returns a short stable label for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            ProcessStatus::Unknown => "unknown",
            ProcessStatus::Running => "running",
            ProcessStatus::Stopped => "stopped",
            ProcessStatus::Deleted => "deleted",
            ProcessStatus::Other => "other",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Raw per-unit state reported by the init system.
///
/// The three axes are opaque strings; only a handful of literal combinations
/// are meaningful to the classifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnitState {
    /// Whether the unit definition is loaded (`loaded`, `not-found`, ...).
    pub load_state: String,
    /// High-level activation state (`active`, `inactive`, `deactivating`, ...).
    pub active_state: String,
    /// Unit-type specific sub-state (`running`, `dead`, `exited`, ...).
    pub sub_state: String,
}

impl UnitState {
    pub fn new(
        load_state: impl Into<String>,
        active_state: impl Into<String>,
        sub_state: impl Into<String>,
    ) -> Self {
        Self {
            load_state: load_state.into(),
            active_state: active_state.into(),
            sub_state: sub_state.into(),
        }
    }
}

/// One delivery from the source: unit name → state, `None` when removed.
pub type UnitBatch = HashMap<String, Option<UnitState>>;
