//! # Diagnostics events emitted by the status monitor and the watchdog.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Status events**: monitor lifecycle and classification results
//! - **Watchdog events**: scheduler start/stop and individual pings
//! - **Subscriber events**: overflow and panics inside observers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, unit name,
//! raw unit states, the ping period and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use unitvisor::{Event, EventKind, ProcessStatus, Severity};
//!
//! let ev = Event::new(EventKind::StatusChanged)
//!     .with_unit("nginx.service")
//!     .with_status(ProcessStatus::Running)
//!     .with_previous(ProcessStatus::Unknown);
//!
//! assert_eq!(ev.kind.severity(), Severity::Debug);
//! assert_eq!(ev.unit.as_deref(), Some("nginx.service"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::status::{ProcessStatus, UnitState};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// How loudly an event should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Classification of diagnostics events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Status monitor ===
    /// Monitor loop started.
    ///
    /// Sets: `unit`, `period` (poll interval)
    MonitorStarted,

    /// Monitor loop exited (feed closed, cancelled or failed).
    ///
    /// Sets: `unit`, `status` (last known)
    MonitorStopped,

    /// Published status differs from the previous one.
    ///
    /// Sets: `unit`, `status`, `previous`
    StatusChanged,

    /// A batch arrived without the monitored unit.
    ///
    /// Sets: `unit`
    UnitMissing,

    /// The source reported the unit as gone.
    ///
    /// Sets: `unit`
    UnitDeleted,

    /// The unit's states matched no classification rule.
    ///
    /// Sets: `unit`, `state` (raw load/active/sub)
    UnitUnrecognized,

    /// The feed's error channel delivered an error; the monitor is stopping.
    ///
    /// Sets: `unit`, `reason`
    FeedFailed,

    // === Watchdog ===
    /// Ping loop started.
    ///
    /// Sets: `period` (half of the deadline)
    WatchdogStarted,

    /// Keep-alive delivered to the notifier.
    WatchdogPing,

    /// Notifier rejected a keep-alive; the next tick retries.
    ///
    /// Sets: `reason`
    WatchdogPingFailed,

    /// Ping loop stopped on request.
    WatchdogStopped,

    // === Subscribers ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `unit` (subscriber name), `reason`
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `unit` (subscriber name), `reason` (panic message)
    SubscriberPanicked,
}

impl EventKind {
    /// Reporting level for this kind.
    pub fn severity(self) -> Severity {
        match self {
            EventKind::StatusChanged | EventKind::WatchdogPing => Severity::Debug,
            EventKind::MonitorStarted
            | EventKind::MonitorStopped
            | EventKind::WatchdogStarted
            | EventKind::WatchdogStopped => Severity::Info,
            EventKind::UnitMissing
            | EventKind::UnitDeleted
            | EventKind::UnitUnrecognized
            | EventKind::WatchdogPingFailed
            | EventKind::SubscriberOverflow => Severity::Warn,
            EventKind::FeedFailed | EventKind::SubscriberPanicked => Severity::Error,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            EventKind::MonitorStarted => "monitor_started",
            EventKind::MonitorStopped => "monitor_stopped",
            EventKind::StatusChanged => "status_changed",
            EventKind::UnitMissing => "unit_missing",
            EventKind::UnitDeleted => "unit_deleted",
            EventKind::UnitUnrecognized => "unit_unrecognized",
            EventKind::FeedFailed => "feed_failed",
            EventKind::WatchdogStarted => "watchdog_started",
            EventKind::WatchdogPing => "watchdog_ping",
            EventKind::WatchdogPingFailed => "watchdog_ping_failed",
            EventKind::WatchdogStopped => "watchdog_stopped",
            EventKind::SubscriberOverflow => "subscriber_overflow",
            EventKind::SubscriberPanicked => "subscriber_panicked",
        }
    }

    #[inline]
    pub fn is_watchdog(self) -> bool {
        matches!(
            self,
            EventKind::WatchdogStarted
                | EventKind::WatchdogPing
                | EventKind::WatchdogPingFailed
                | EventKind::WatchdogStopped
        )
    }

    #[inline]
    pub fn is_subscriber(self) -> bool {
        matches!(
            self,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

/// Diagnostics event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Unit (or subscriber) name, if applicable.
    pub unit: Option<Arc<str>>,
    /// Status published by the monitor.
    pub status: Option<ProcessStatus>,
    /// Status before this change.
    pub previous: Option<ProcessStatus>,
    /// Raw states that failed classification.
    pub state: Option<UnitState>,
    /// Poll interval or ping period.
    pub period: Option<Duration>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            unit: None,
            status: None,
            previous: None,
            state: None,
            period: None,
            reason: None,
        }
    }

    /// Attaches a unit name.
    #[inline]
    pub fn with_unit(mut self, unit: impl Into<Arc<str>>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Attaches the published status.
    #[inline]
    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches the status being replaced.
    #[inline]
    pub fn with_previous(mut self, status: ProcessStatus) -> Self {
        self.previous = Some(status);
        self
    }

    /// Attaches raw unit states.
    #[inline]
    pub fn with_state(mut self, state: UnitState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a period (poll interval or ping half-period).
    #[inline]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_unit(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_unit(subscriber)
            .with_reason(info)
    }
}
