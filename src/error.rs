//! Error types used by the status monitor, the watchdog and their collaborators.
//!
//! This module defines two main error enums:
//!
//! - [`StatusError`]: errors raised while setting up or running the unit status monitor.
//! - [`WatchdogError`]: errors raised while deriving and starting the watchdog pinger.
//!
//! Plus two opaque wrappers for collaborator failures, [`SourceError`] and [`NotifyError`],
//! which keep the original cause reachable through [`std::error::Error::source`].
//!
//! Both main types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::error::Error as StdError;
use std::num::ParseIntError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// # Failure reported by a [`UnitStateSource`](crate::UnitStateSource).
///
/// Wraps the collaborator's own error type so it can be forwarded unchanged.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct SourceError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl SourceError {
    /// Creates an error with a message and no underlying cause.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying cause.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// # Failure reported by a [`Notify`](crate::Notify) implementation.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct NotifyError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl NotifyError {
    /// Creates an error with a message and no underlying cause.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying cause.
    pub fn new<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// # Errors produced by the unit status monitor.
///
/// Setup failures are returned from [`ServiceStatus::init`](crate::ServiceStatus::init)
/// and [`StatusMonitor::close`](crate::StatusMonitor::close).
/// A broken feed surfaces later through [`StatusMonitor::wait`](crate::StatusMonitor::wait).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StatusError {
    /// The unit name is empty.
    #[error("invalid service name")]
    InvalidServiceName,

    /// A collaborator call failed during setup or teardown.
    #[error("{op} failed: {source}")]
    Source {
        /// Collaborator operation that failed (`connect`, `subscribe`, ...).
        op: &'static str,
        /// Forwarded collaborator error.
        #[source]
        source: SourceError,
    },

    /// The unit-state feed reported an error; the status is no longer trustworthy.
    #[error("unit state feed for {unit} broke: {source}")]
    Feed {
        /// Name of the monitored unit.
        unit: String,
        /// Error delivered on the feed's error channel.
        #[source]
        source: SourceError,
    },

    /// The monitor task ended abnormally (panicked or was aborted).
    #[error("status monitor aborted: {reason}")]
    MonitorAborted {
        /// Join error description.
        reason: String,
    },
}

impl StatusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use unitvisor::StatusError;
    ///
    /// assert_eq!(StatusError::InvalidServiceName.as_label(), "status_invalid_service_name");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StatusError::InvalidServiceName => "status_invalid_service_name",
            StatusError::Source { .. } => "status_source",
            StatusError::Feed { .. } => "status_feed",
            StatusError::MonitorAborted { .. } => "status_monitor_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StatusError::InvalidServiceName => "service name must not be empty".to_string(),
            StatusError::Source { op, source } => format!("{op}: {source}"),
            StatusError::Feed { unit, source } => format!("feed broke; unit={unit} err={source}"),
            StatusError::MonitorAborted { reason } => format!("aborted: {reason}"),
        }
    }

    pub(crate) fn from_source(op: &'static str, source: SourceError) -> Self {
        StatusError::Source { op, source }
    }
}

/// # Errors produced when starting the watchdog.
///
/// [`WatchdogError::NotRunning`] and [`WatchdogError::NoWatchdogConfigured`] are expected
/// conditions meaning "watchdog unavailable"; see [`WatchdogError::is_unavailable`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WatchdogError {
    /// The host was not booted with systemd.
    #[error("systemd is not running")]
    NotRunning,

    /// No watchdog was requested for this process.
    #[error("no watchdog enabled for this daemon")]
    NoWatchdogConfigured,

    /// The watchdog deadline is not a decimal microsecond count.
    #[error("invalid watchdog period {value:?}: {source}")]
    InvalidPeriod {
        /// Raw environment value.
        value: String,
        /// Parse failure.
        #[source]
        source: ParseIntError,
    },

    /// The watchdog pid is not a decimal process id.
    #[error("invalid watchdog pid {value:?}: {source}")]
    InvalidPid {
        /// Raw environment value.
        value: String,
        /// Parse failure.
        #[source]
        source: ParseIntError,
    },

    /// The derived ping interval is zero.
    #[error("invalid watchdog interval derived from {usec}us")]
    InvalidInterval {
        /// Parsed deadline in microseconds.
        usec: u64,
    },
}

impl WatchdogError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use unitvisor::WatchdogError;
    ///
    /// let err = WatchdogError::InvalidInterval { usec: 1 };
    /// assert_eq!(err.as_label(), "watchdog_invalid_interval");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WatchdogError::NotRunning => "watchdog_not_running",
            WatchdogError::NoWatchdogConfigured => "watchdog_not_configured",
            WatchdogError::InvalidPeriod { .. } => "watchdog_invalid_period",
            WatchdogError::InvalidPid { .. } => "watchdog_invalid_pid",
            WatchdogError::InvalidInterval { .. } => "watchdog_invalid_interval",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WatchdogError::NotRunning => "systemd not detected".to_string(),
            WatchdogError::NoWatchdogConfigured => "watchdog not requested".to_string(),
            WatchdogError::InvalidPeriod { value, source } => {
                format!("period={value:?} err={source}")
            }
            WatchdogError::InvalidPid { value, source } => format!("pid={value:?} err={source}"),
            WatchdogError::InvalidInterval { usec } => format!("half-period of {usec}us is zero"),
        }
    }

    /// Indicates the watchdog is simply not available here, not misconfigured.
    ///
    /// Returns `true` for [`WatchdogError::NotRunning`] and
    /// [`WatchdogError::NoWatchdogConfigured`].
    ///
    /// # Example
    /// ```
    /// use unitvisor::WatchdogError;
    ///
    /// assert!(WatchdogError::NoWatchdogConfigured.is_unavailable());
    /// assert!(!WatchdogError::InvalidInterval { usec: 0 }.is_unavailable());
    /// ```
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            WatchdogError::NotRunning | WatchdogError::NoWatchdogConfigured
        )
    }
}
