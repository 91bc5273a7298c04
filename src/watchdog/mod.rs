//! Watchdog keep-alive.
//!
//! Derives a ping interval from the deadline the service manager announces and
//! pings on a strict schedule until stopped.
//!
//! - `probe`: init-system detection ([`is_running_systemd`]);
//! - `period`: deadline parsing ([`half_period`], [`pid_matches`]);
//! - `notify`: the [`Notify`] collaborator and [`NOTIFY_WATCHDOG`];
//! - `session`: [`Watchdog`], [`WatchdogHandle`] and the ping loop.

mod notify;
mod period;
mod probe;
mod session;

pub use notify::{NOTIFY_WATCHDOG, Notify};
pub use period::{half_period, pid_matches};
pub use probe::is_running_systemd;
pub use session::{Watchdog, WatchdogHandle, WatchdogState};
