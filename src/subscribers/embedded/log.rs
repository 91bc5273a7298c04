//! # LogWriter: events to `tracing`
//!
//! A subscriber that forwards every incoming [`Event`] to `tracing` at the
//! event's [`Severity`], tagged with a per-subsystem target:
//!
//! - `unitvisor::status`: monitor lifecycle and classification
//! - `unitvisor::watchdog`: scheduler start/stop and pings
//! - `unitvisor::subscribers`: overflow and panics
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO  unitvisor::status: monitor started unit="nginx.service" seq=0 kind="monitor_started"
//! WARN  unitvisor::status: status is unknown, unit missing from batch unit="nginx.service" seq=3 kind="unit_missing"
//! WARN  unitvisor::status: unrecognized states load=loaded active=deactivating sub=stop-sigterm unit="nginx.service" ...
//! DEBUG unitvisor::watchdog: ping seq=7 kind="watchdog_ping"
//! INFO  unitvisor::watchdog: stopping on request seq=9 kind="watchdog_stopped"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind, Severity};
use crate::subscribers::Subscribe;

/// Dispatches on severity; `tracing` needs the level at the callsite.
macro_rules! emit {
    ($target:literal, $sev:expr, $($rest:tt)+) => {
        match $sev {
            Severity::Debug => tracing::debug!(target: $target, $($rest)+),
            Severity::Info => tracing::info!(target: $target, $($rest)+),
            Severity::Warn => tracing::warn!(target: $target, $($rest)+),
            Severity::Error => tracing::error!(target: $target, $($rest)+),
        }
    };
}

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Renders the human part of the log line.
fn describe(e: &Event) -> String {
    match e.kind {
        EventKind::MonitorStarted => format!("monitor started interval={:?}", e.period),
        EventKind::MonitorStopped => format!("monitor stopped last={:?}", e.status),
        EventKind::StatusChanged => format!("status {:?} -> {:?}", e.previous, e.status),
        EventKind::UnitMissing => "status is unknown, unit missing from batch".to_string(),
        EventKind::UnitDeleted => "unit deleted".to_string(),
        EventKind::UnitUnrecognized => match &e.state {
            Some(st) => format!(
                "unrecognized states load={} active={} sub={}",
                st.load_state, st.active_state, st.sub_state
            ),
            None => "unrecognized states".to_string(),
        },
        EventKind::FeedFailed => format!(
            "unit state feed error: {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::WatchdogStarted => format!("starting the watchdog period={:?}", e.period),
        EventKind::WatchdogPing => "ping".to_string(),
        EventKind::WatchdogPingFailed => format!(
            "ping not delivered: {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::WatchdogStopped => "stopping on request".to_string(),
        EventKind::SubscriberOverflow => format!(
            "subscriber-overflow {}",
            e.reason.as_deref().unwrap_or("unknown")
        ),
        EventKind::SubscriberPanicked => format!(
            "subscriber-panicked subscriber={} info={}",
            e.unit.as_deref().unwrap_or("unknown"),
            e.reason.as_deref().unwrap_or("unknown"),
        ),
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let message = describe(e);
        let sev = e.kind.severity();
        let unit = e.unit.as_deref();
        let kind = e.kind.as_label();

        if e.kind.is_watchdog() {
            emit!("unitvisor::watchdog", sev, seq = e.seq, kind, "{message}");
        } else if e.kind.is_subscriber() {
            emit!("unitvisor::subscribers", sev, seq = e.seq, kind, "{message}");
        } else {
            emit!("unitvisor::status", sev, unit, seq = e.seq, kind, "{message}");
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
