//! # Watchdog: periodic keep-alive pings.
//!
//! [`Watchdog`] checks that a watchdog was requested for this process, derives
//! the ping period and spawns a loop that pings until told to stop.
//!
//! ## Flow
//! ```text
//! Watchdog::start()
//!   ├─► systemd_dir is a directory?        no  → NotRunning
//!   ├─► WATCHDOG_USEC set and non-empty?   no  → NoWatchdogConfigured
//!   ├─► half_period(WATCHDOG_USEC)         err → InvalidPeriod / InvalidInterval
//!   ├─► WATCHDOG_PID (if set) is us?       no  → NoWatchdogConfigured
//!   ├─► publish WatchdogStarted
//!   └─► spawn ping loop ──► WatchdogHandle
//!
//! loop {
//!   ├─► stop requested?                    → break
//!   ├─► select! (biased) { stop | tick }   stop wins, abandons the wait
//!   └─► notify("WATCHDOG=1")
//!         ├─ Ok  → publish WatchdogPing
//!         └─ Err → publish WatchdogPingFailed, keep going
//! }
//! publish WatchdogStopped
//! ```
//!
//! ## State machine
//! `Idle → Running → Stopped`. A [`WatchdogHandle`] only exists once the loop is
//! spawned, so it reports `Running` or `Stopped`. Stopped is terminal; call
//! [`Watchdog::start`] again for an independent session.
//!
//! ## Rules
//! - Ticks follow a strict schedule (`now + period`, `now + 2·period`, ...); a late
//!   tick delays the next one instead of bursting.
//! - [`WatchdogHandle::stop`] is idempotent and never blocks.
//! - Dropping the handle does **not** stop the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::{
    select,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::WatchdogError;
use crate::events::{Bus, Event, EventKind};
use crate::watchdog::{
    notify::{NOTIFY_WATCHDOG, Notify},
    period::{half_period, pid_matches},
    probe::is_running_systemd,
};

/// Lifecycle of a started watchdog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchdogState {
    /// The loop is pinging.
    Running,
    /// Stop was requested or the loop has exited.
    Stopped,
}

/// Starts watchdog sessions.
pub struct Watchdog {
    cfg: Config,
    notifier: Arc<dyn Notify>,
    bus: Bus,
}

impl Watchdog {
    pub fn new(cfg: &Config, notifier: Arc<dyn Notify>, bus: Bus) -> Self {
        Self {
            cfg: cfg.clone(),
            notifier,
            bus,
        }
    }

    /// Starts pinging based on the process environment.
    ///
    /// Returns [`WatchdogError::NotRunning`] / [`WatchdogError::NoWatchdogConfigured`]
    /// when the watchdog is simply unavailable (see [`WatchdogError::is_unavailable`]).
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<WatchdogHandle, WatchdogError> {
        self.ensure_systemd()?;

        let usec = self.cfg.watchdog_usec();
        if usec.as_deref().is_none_or(str::is_empty) {
            return Err(WatchdogError::NoWatchdogConfigured);
        }
        let period = half_period(usec.as_deref())?;

        if let Some(pid) = self.cfg.watchdog_pid() {
            if !pid_matches(&pid, std::process::id())? {
                return Err(WatchdogError::NoWatchdogConfigured);
            }
        }
        Ok(self.spawn(period))
    }

    /// Starts pinging with a caller-supplied deadline (microseconds, decimal).
    ///
    /// Same checks as [`start`](Self::start) except the environment and the pid.
    pub fn start_with_deadline(&self, usec: Option<&str>) -> Result<WatchdogHandle, WatchdogError> {
        self.ensure_systemd()?;
        let period = half_period(usec)?;
        Ok(self.spawn(period))
    }

    fn ensure_systemd(&self) -> Result<(), WatchdogError> {
        if is_running_systemd(&self.cfg.systemd_dir) {
            Ok(())
        } else {
            Err(WatchdogError::NotRunning)
        }
    }

    fn spawn(&self, period: Duration) -> WatchdogHandle {
        let token = CancellationToken::new();
        let pings = Arc::new(AtomicU64::new(0));

        self.bus
            .publish(Event::new(EventKind::WatchdogStarted).with_period(period));

        let pinger = Pinger {
            period,
            notifier: Arc::clone(&self.notifier),
            bus: self.bus.clone(),
            pings: Arc::clone(&pings),
        };
        let worker = tokio::spawn(pinger.run(token.clone()));

        WatchdogHandle {
            token,
            worker,
            period,
            pings,
        }
    }
}

/// Stop handle for a running watchdog session.
pub struct WatchdogHandle {
    token: CancellationToken,
    worker: JoinHandle<()>,
    period: Duration,
    pings: Arc<AtomicU64>,
}

impl WatchdogHandle {
    /// Requests the loop to stop. Safe to call any number of times.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatchdogState {
        if self.token.is_cancelled() || self.worker.is_finished() {
            WatchdogState::Stopped
        } else {
            WatchdogState::Running
        }
    }

    /// Interval between pings (half the deadline).
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Number of pings the notifier accepted so far.
    pub fn pings(&self) -> u64 {
        self.pings.load(Ordering::Relaxed)
    }

    /// Token that stops the loop when cancelled; lets callers tie the watchdog to
    /// a wider shutdown.
    pub fn stop_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Waits until the loop has exited. Does not request a stop by itself.
    pub async fn join(self) {
        let _ = self.worker.await;
    }
}

/// State owned by the spawned ping loop.
struct Pinger {
    period: Duration,
    notifier: Arc<dyn Notify>,
    bus: Bus,
    pings: Arc<AtomicU64>,
}

impl Pinger {
    async fn run(self, token: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if token.is_cancelled() {
                break;
            }
            select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.ping();
        }

        self.bus.publish(Event::new(EventKind::WatchdogStopped));
    }

    fn ping(&self) {
        match self.notifier.notify(NOTIFY_WATCHDOG) {
            Ok(()) => {
                self.pings.fetch_add(1, Ordering::Relaxed);
                self.bus.publish(Event::new(EventKind::WatchdogPing));
            }
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::WatchdogPingFailed).with_reason(e.to_string()),
                );
            }
        }
    }
}
