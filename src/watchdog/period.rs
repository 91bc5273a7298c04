//! # Ping period derivation.
//!
//! The service manager announces the watchdog deadline in microseconds. Pings
//! are sent every half deadline to leave room for delivery jitter:
//!
//! ```text
//! WATCHDOG_USEC="1000000"  →  deadline 1s  →  ping every 500ms
//! WATCHDOG_USEC unset/""   →  NoWatchdogConfigured
//! WATCHDOG_USEC="abc"      →  InvalidPeriod (wraps ParseIntError)
//! WATCHDOG_USEC="0" | "1"  →  InvalidInterval (half-period is zero)
//! ```
//!
//! `WATCHDOG_PID`, when present, names the process the deadline is meant for.

use std::time::Duration;

use crate::error::WatchdogError;

/// Derives the ping interval from a raw deadline value.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use unitvisor::half_period;
///
/// assert_eq!(half_period(Some("1000000")).ok(), Some(Duration::from_millis(500)));
/// assert!(half_period(None).is_err());
/// ```
pub fn half_period(raw: Option<&str>) -> Result<Duration, WatchdogError> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or(WatchdogError::NoWatchdogConfigured)?;

    let usec: u64 = raw
        .parse()
        .map_err(|source| WatchdogError::InvalidPeriod {
            value: raw.to_string(),
            source,
        })?;

    match usec / 2 {
        0 => Err(WatchdogError::InvalidInterval { usec }),
        half => Ok(Duration::from_micros(half)),
    }
}

/// Checks whether the announced watchdog pid is `pid`.
pub fn pid_matches(raw: &str, pid: u32) -> Result<bool, WatchdogError> {
    let target: u32 = raw.parse().map_err(|source| WatchdogError::InvalidPid {
        value: raw.to_string(),
        source,
    })?;
    Ok(target == pid)
}
