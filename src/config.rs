//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the status monitor, the watchdog and the diagnostics hub.
//!
//! Config is used in three ways:
//! 1. **Hub creation**: `Hub::builder(config)` sizes the event bus
//! 2. **ServiceStatus defaults**: `ServiceStatus::with_defaults(name, &config)`
//! 3. **Watchdog detection**: `Watchdog::new(&config, notifier, bus)`
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `watchdog_pid_var = None` → the pid ownership check is skipped

use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

/// Directory that exists (as a directory) only when the host was booted with systemd.
pub const SYSTEMD_RUNTIME_DIR: &str = "/run/systemd/system";

/// Environment variable carrying the watchdog deadline in microseconds.
pub const WATCHDOG_USEC_VAR: &str = "WATCHDOG_USEC";

/// Environment variable carrying the pid the watchdog is meant for.
pub const WATCHDOG_PID_VAR: &str = "WATCHDOG_PID";

/// Global configuration.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `poll_interval`: Default unit-state polling granularity handed to the source
/// - `systemd_dir`: Directory probed to detect systemd
/// - `watchdog_usec_var`: Environment variable holding the deadline
/// - `watchdog_pid_var`: Environment variable holding the target pid (`None` = skip check)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Default polling interval for unit-state subscriptions.
    ///
    /// Used by `ServiceStatus::with_defaults()` and `Hub::service_status()`.
    pub poll_interval: Duration,

    /// Directory whose presence means "running under systemd".
    pub systemd_dir: PathBuf,

    /// Name of the deadline environment variable.
    pub watchdog_usec_var: Cow<'static, str>,

    /// Name of the pid environment variable, if the ownership check is wanted.
    pub watchdog_pid_var: Option<Cow<'static, str>>,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Reads the deadline variable from the process environment.
    ///
    /// Returns `None` when unset or not valid unicode.
    pub fn watchdog_usec(&self) -> Option<String> {
        std::env::var(self.watchdog_usec_var.as_ref()).ok()
    }

    /// Reads the pid variable from the process environment.
    ///
    /// Returns `None` when the check is disabled or the variable is unset.
    pub fn watchdog_pid(&self) -> Option<String> {
        self.watchdog_pid_var
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `poll_interval = 1s`
    /// - `systemd_dir = /run/systemd/system`
    /// - `watchdog_usec_var = WATCHDOG_USEC`
    /// - `watchdog_pid_var = Some(WATCHDOG_PID)`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            poll_interval: Duration::from_secs(1),
            systemd_dir: PathBuf::from(SYSTEMD_RUNTIME_DIR),
            watchdog_usec_var: Cow::Borrowed(WATCHDOG_USEC_VAR),
            watchdog_pid_var: Some(Cow::Borrowed(WATCHDOG_PID_VAR)),
        }
    }
}
