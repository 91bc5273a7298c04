//! # Unit state classification.
//!
//! Maps the raw [`UnitState`] triple of one unit to a [`ProcessStatus`] using an
//! ordered, first-match rule table:
//!
//! ```text
//! load       active     sub       → status
//! ─────────  ─────────  ────────    ────────
//! loaded     active     running   → Running
//! loaded     active     active    → Running
//! not-found  active     exited    → Stopped
//! loaded     inactive   dead      → Stopped
//! (anything else)                 → Other
//! ```
//!
//! Rows match on the full triple, so they are mutually exclusive and the order
//! never changes the outcome. [`observe`] wraps the table with the per-batch
//! rules (empty batch, unit missing, unit removed).

use crate::status::process_status::{ProcessStatus, UnitBatch, UnitState};

struct Rule {
    load: &'static str,
    active: &'static str,
    sub: &'static str,
    status: ProcessStatus,
}

const RULES: [Rule; 4] = [
    Rule {
        load: "loaded",
        active: "active",
        sub: "running",
        status: ProcessStatus::Running,
    },
    Rule {
        load: "loaded",
        active: "active",
        sub: "active",
        status: ProcessStatus::Running,
    },
    Rule {
        load: "not-found",
        active: "active",
        sub: "exited",
        status: ProcessStatus::Stopped,
    },
    Rule {
        load: "loaded",
        active: "inactive",
        sub: "dead",
        status: ProcessStatus::Stopped,
    },
];

impl Rule {
    fn matches(&self, st: &UnitState) -> bool {
        st.load_state == self.load && st.active_state == self.active && st.sub_state == self.sub
    }
}

/// Result of classifying one triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Derived status.
    pub status: ProcessStatus,
    /// `false` when no rule matched and the status fell back to `Other`.
    pub matched: bool,
}

/// Classifies a raw triple.
///
/// # Example
/// ```
/// use unitvisor::{ProcessStatus, UnitState, classify};
///
/// let c = classify(&UnitState::new("loaded", "active", "running"));
/// assert_eq!(c.status, ProcessStatus::Running);
///
/// let c = classify(&UnitState::new("loaded", "active", "deactivating"));
/// assert_eq!(c.status, ProcessStatus::Other);
/// assert!(!c.matched);
/// ```
pub fn classify(state: &UnitState) -> Classification {
    RULES
        .iter()
        .find(|rule| rule.matches(state))
        .map(|rule| Classification {
            status: rule.status,
            matched: true,
        })
        .unwrap_or(Classification {
            status: ProcessStatus::Other,
            matched: false,
        })
}

/// What one batch says about the monitored unit.
#[derive(Debug, PartialEq, Eq)]
pub enum Observation<'a> {
    /// Empty batch; leave the status alone.
    Skip,
    /// The unit did not report in this batch.
    Missing,
    /// The source reported the unit as removed.
    Deleted,
    /// The unit reported a state triple.
    Classified {
        state: &'a UnitState,
        classification: Classification,
    },
}

impl Observation<'_> {
    /// Status to publish, or `None` for [`Observation::Skip`].
    pub fn status(&self) -> Option<ProcessStatus> {
        match self {
            Observation::Skip => None,
            Observation::Missing => Some(ProcessStatus::Unknown),
            Observation::Deleted => Some(ProcessStatus::Deleted),
            Observation::Classified { classification, .. } => Some(classification.status),
        }
    }
}

/// Applies the per-batch rules for `unit`.
///
/// ### Rules
/// 1. Empty batch → [`Observation::Skip`]
/// 2. Unit absent → [`Observation::Missing`] (status `Unknown`)
/// 3. Unit present without state → [`Observation::Deleted`]
/// 4. Otherwise → [`classify`]
pub fn observe<'a>(batch: &'a UnitBatch, unit: &str) -> Observation<'a> {
    if batch.is_empty() {
        return Observation::Skip;
    }
    match batch.get(unit) {
        None => Observation::Missing,
        Some(None) => Observation::Deleted,
        Some(Some(state)) => Observation::Classified {
            state,
            classification: classify(state),
        },
    }
}
