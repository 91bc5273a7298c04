//! # ServiceStatus: single-unit status monitor.
//!
//! Tracks one unit through a [`UnitStateSource`] and keeps its last
//! [`ProcessStatus`] behind a lock that any task can read.
//!
//! ## Lifecycle
//! ```text
//! ServiceStatus::new(name, interval)
//!        │ init(source, bus)        connect → subscribe → subscribe_units
//!        ▼
//! StatusMonitor ──spawn──► monitor loop
//!        │ get_status() / reader()
//!        │ wait()                   resolves when the loop ends (feed error → Err)
//!        │ close()                  unsubscribe → cancel → close → join
//!        ▼
//!     (consumed)
//! ```
//!
//! ## Monitor loop
//! ```text
//! loop {
//!   select! (biased) {
//!     token cancelled      → exit Ok
//!     feed error           → publish FeedFailed, exit Err(Feed)
//!     batch                → observe(batch, unit) → set status, publish diagnostics
//!     batch channel closed → exit Ok
//!   }
//! }
//! publish MonitorStopped
//! ```
//!
//! ## Rules
//! - The status lock is held only to copy a value in or out; no I/O under it.
//! - `init` is consumed by value, `close` too: a monitor is set up once and never reused.
//! - After `close` returns the loop has exited; no further status writes happen.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::{select, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::StatusError;
use crate::events::{Bus, Event, EventKind};
use crate::status::classify::{Observation, observe};
use crate::status::process_status::{ProcessStatus, UnitBatch};
use crate::status::source::{UnitFeed, UnitStateSource};

/// Shared, lock-guarded status of one unit.
///
/// Cheap to clone; every clone reads the same value.
#[derive(Clone, Debug, Default)]
pub struct StatusReader {
    inner: Arc<Mutex<ProcessStatus>>,
}

impl StatusReader {
    /// Returns the last published status.
    pub fn get_status(&self) -> ProcessStatus {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publishes `status`, returning the previous value.
    pub(crate) fn set_status(&self, status: ProcessStatus) -> ProcessStatus {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, status)
    }
}

/// Unit to monitor, before [`ServiceStatus::init`].
#[derive(Clone, Debug)]
pub struct ServiceStatus {
    /// Name of the unit, e.g. `nginx.service`.
    pub name: String,
    /// Interval between probes, handed to the source.
    pub interval: Duration,
}

impl ServiceStatus {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
        }
    }

    /// Uses [`Config::poll_interval`] as the probe interval.
    pub fn with_defaults(name: impl Into<String>, cfg: &Config) -> Self {
        Self::new(name, cfg.poll_interval)
    }

    /// Subscribes to `source` and starts the monitor loop.
    ///
    /// ### Flow
    /// 1. Reject an empty (or whitespace-only) name
    /// 2. `connect` → `subscribe` → `subscribe_units(interval)`
    /// 3. Spawn the monitor loop; publish `MonitorStarted`
    ///
    /// If a step after `connect` fails the source is closed before returning.
    /// Must be called from within a tokio runtime.
    pub async fn init<S: UnitStateSource>(
        self,
        mut source: S,
        bus: Bus,
    ) -> Result<StatusMonitor<S>, StatusError> {
        if self.name.trim().is_empty() {
            return Err(StatusError::InvalidServiceName);
        }

        source
            .connect()
            .await
            .map_err(|e| StatusError::from_source("connect", e))?;

        let feed = match subscribe(&mut source, self.interval).await {
            Ok(feed) => feed,
            Err(e) => {
                source.close().await;
                return Err(e);
            }
        };

        let unit: Arc<str> = Arc::from(self.name);
        let status = StatusReader::default();
        let token = CancellationToken::new();

        bus.publish(
            Event::new(EventKind::MonitorStarted)
                .with_unit(Arc::clone(&unit))
                .with_period(self.interval),
        );

        let monitor = MonitorLoop {
            unit: Arc::clone(&unit),
            status: status.clone(),
            bus,
        };
        let worker = tokio::spawn(monitor.run(feed, token.clone()));

        Ok(StatusMonitor {
            unit,
            source,
            status,
            token,
            worker: Some(worker),
        })
    }
}

async fn subscribe<S: UnitStateSource>(
    source: &mut S,
    interval: Duration,
) -> Result<UnitFeed, StatusError> {
    source
        .subscribe()
        .await
        .map_err(|e| StatusError::from_source("subscribe", e))?;
    source
        .subscribe_units(interval)
        .await
        .map_err(|e| StatusError::from_source("subscribe_units", e))
}

/// A running monitor for one unit.
///
/// Dropping it without [`close`](Self::close) cancels the loop but leaves the
/// source subscribed.
pub struct StatusMonitor<S: UnitStateSource> {
    unit: Arc<str>,
    source: S,
    status: StatusReader,
    token: CancellationToken,
    worker: Option<JoinHandle<Result<(), StatusError>>>,
}

impl<S: UnitStateSource> StatusMonitor<S> {
    /// Name of the monitored unit.
    pub fn name(&self) -> &str {
        &self.unit
    }

    /// Returns the last published status.
    pub fn get_status(&self) -> ProcessStatus {
        self.status.get_status()
    }

    /// Returns a read handle that outlives borrows of the monitor.
    pub fn reader(&self) -> StatusReader {
        self.status.clone()
    }

    /// Waits for the monitor loop to end and returns its outcome.
    ///
    /// Resolves with [`StatusError::Feed`] when the source reported a delivery error;
    /// callers should treat that as fatal for the service. Cancel-safe; once the loop
    /// has been observed to end, later calls return `Ok(())`.
    pub async fn wait(&mut self) -> Result<(), StatusError> {
        let Some(worker) = self.worker.as_mut() else {
            return Ok(());
        };
        let res = worker.await;
        self.worker = None;
        match res {
            Ok(outcome) => outcome,
            Err(join) => Err(StatusError::MonitorAborted {
                reason: join.to_string(),
            }),
        }
    }

    /// Unsubscribes and releases the source, then joins the loop.
    ///
    /// `close()` on the source runs even when `unsubscribe()` fails; the
    /// unsubscribe error is returned afterwards.
    pub async fn close(mut self) -> Result<(), StatusError> {
        let res = self
            .source
            .unsubscribe()
            .await
            .map_err(|e| StatusError::from_source("unsubscribe", e));

        self.token.cancel();
        self.source.close().await;

        if let Some(worker) = self.worker.take() {
            let _ = worker.await;
        }
        res
    }
}

impl<S: UnitStateSource> Drop for StatusMonitor<S> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// State owned by the spawned loop.
struct MonitorLoop {
    unit: Arc<str>,
    status: StatusReader,
    bus: Bus,
}

impl MonitorLoop {
    async fn run(self, mut feed: UnitFeed, token: CancellationToken) -> Result<(), StatusError> {
        let mut errors_open = true;

        let outcome = loop {
            select! {
                biased;
                _ = token.cancelled() => break Ok(()),
                err = feed.errors.recv(), if errors_open => match err {
                    Some(source) => {
                        self.bus.publish(
                            Event::new(EventKind::FeedFailed)
                                .with_unit(Arc::clone(&self.unit))
                                .with_reason(source.to_string()),
                        );
                        break Err(StatusError::Feed {
                            unit: self.unit.to_string(),
                            source,
                        });
                    }
                    None => errors_open = false,
                },
                batch = feed.batches.recv() => match batch {
                    Some(batch) => self.apply(&batch),
                    None => break Ok(()),
                },
            }
        };

        self.bus.publish(
            Event::new(EventKind::MonitorStopped)
                .with_unit(Arc::clone(&self.unit))
                .with_status(self.status.get_status()),
        );
        outcome
    }

    fn apply(&self, batch: &UnitBatch) {
        let obs = observe(batch, &self.unit);
        let Some(next) = obs.status() else {
            return;
        };

        match &obs {
            Observation::Missing => self.publish(Event::new(EventKind::UnitMissing)),
            Observation::Deleted => self.publish(Event::new(EventKind::UnitDeleted)),
            Observation::Classified {
                state,
                classification,
            } if !classification.matched => {
                self.publish(Event::new(EventKind::UnitUnrecognized).with_state((*state).clone()))
            }
            _ => {}
        }

        let prev = self.status.set_status(next);
        if prev != next {
            self.publish(
                Event::new(EventKind::StatusChanged)
                    .with_status(next)
                    .with_previous(prev),
            );
        }
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_unit(Arc::clone(&self.unit)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_reader_clones_share_value() {
        let a = StatusReader::default();
        let b = a.clone();
        assert_eq!(b.get_status(), ProcessStatus::Unknown);

        assert_eq!(a.set_status(ProcessStatus::Running), ProcessStatus::Unknown);
        assert_eq!(b.get_status(), ProcessStatus::Running);
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let reader = StatusReader::default();
        let all = [
            ProcessStatus::Unknown,
            ProcessStatus::Running,
            ProcessStatus::Stopped,
            ProcessStatus::Deleted,
            ProcessStatus::Other,
        ];

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let r = reader.clone();
                thread::spawn(move || {
                    for i in 0..2_000 {
                        r.set_status(all[(i + w) % all.len()]);
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let r = reader.clone();
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let seen = r.get_status();
                        assert!(all.contains(&seen), "torn value {seen:?}");
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            assert!(h.join().is_ok());
        }
    }

    #[test]
    fn test_with_defaults_uses_poll_interval() {
        let cfg = Config {
            poll_interval: Duration::from_millis(300),
            ..Config::default()
        };
        let svc = ServiceStatus::with_defaults("a.service", &cfg);
        assert_eq!(svc.interval, Duration::from_millis(300));
    }
}
