//! # Hub: bus, subscriber fan-out and component factories.
//!
//! ## Architecture
//! ```text
//! Hub::builder(cfg).with_subscribers(subs).build()
//!   ├─► Bus::new(cfg.bus_capacity)
//!   ├─► SubscriberSet::new(subs)
//!   └─► listener: Bus.subscribe() ─► SubscriberSet::emit(Event)   (fire-and-forget)
//!
//! hub.service_status(name, source) ─► ServiceStatus::with_defaults(..).init(source, bus)
//! hub.watchdog(notifier)           ─► Watchdog::new(cfg, notifier, bus).start()
//!
//! hub.shutdown()
//!   ├─► stop listener (drains events already on the bus)
//!   └─► SubscriberSet::shutdown() (drains per-subscriber queues)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use unitvisor::{Config, Hub, MemorySource, NotifyError, ProcessStatus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn unitvisor::Subscribe>> = vec![Arc::new(unitvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn unitvisor::Subscribe>> = Vec::new();
//!
//!     let hub = Hub::builder(Config::default()).with_subscribers(subs).build();
//!
//!     let (source, _feed) = MemorySource::new();
//!     let monitor = hub.service_status("nginx.service", source).await?;
//!     assert_eq!(monitor.get_status(), ProcessStatus::Unknown);
//!
//!     // Outside systemd (or without WATCHDOG_USEC) this is "unavailable", not a failure.
//!     let notifier = Arc::new(|_: &str| -> Result<(), NotifyError> { Ok(()) });
//!     match hub.watchdog(notifier) {
//!         Ok(handle) => handle.stop(),
//!         Err(e) if e.is_unavailable() => {}
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     monitor.close().await?;
//!     hub.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::{select, sync::broadcast, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use super::builder::HubBuilder;
use crate::{
    config::Config,
    error::{StatusError, WatchdogError},
    events::{Bus, Event},
    status::{ServiceStatus, StatusMonitor, UnitStateSource},
    subscribers::SubscriberSet,
    watchdog::{Notify, Watchdog, WatchdogHandle},
};

/// Owns the diagnostics pipeline and builds components attached to it.
pub struct Hub {
    cfg: Config,
    bus: Bus,
    token: CancellationToken,
    listener: JoinHandle<SubscriberSet>,
}

impl Hub {
    /// Starts building a hub.
    pub fn builder(cfg: Config) -> HubBuilder {
        HubBuilder::new(cfg)
    }

    pub(super) fn new_internal(cfg: Config, bus: Bus, subs: SubscriberSet) -> Self {
        let token = CancellationToken::new();
        let rx = bus.subscribe();
        let listener = tokio::spawn(listen(rx, subs, token.clone()));
        Self {
            cfg,
            bus,
            token,
            listener,
        }
    }

    /// Bus shared by every component built from this hub.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Starts monitoring `name` with [`Config::poll_interval`].
    pub async fn service_status<S: UnitStateSource>(
        &self,
        name: impl Into<String>,
        source: S,
    ) -> Result<StatusMonitor<S>, StatusError> {
        ServiceStatus::with_defaults(name, &self.cfg)
            .init(source, self.bus.clone())
            .await
    }

    /// Starts the watchdog from the process environment.
    pub fn watchdog(&self, notifier: Arc<dyn Notify>) -> Result<WatchdogHandle, WatchdogError> {
        Watchdog::new(&self.cfg, notifier, self.bus.clone()).start()
    }

    /// Stops the listener and drains all subscribers.
    ///
    /// Events published before this call are delivered; later ones are not.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Ok(set) = self.listener.await {
            set.shutdown().await;
        }
    }
}

/// Forwards bus events to the subscriber set until cancelled.
async fn listen(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    token: CancellationToken,
) -> SubscriberSet {
    loop {
        select! {
            biased;
            _ = token.cancelled() => break,
            ev = rx.recv() => match ev {
                Ok(ev) => set.emit(ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return set,
            },
        }
    }

    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit(ev),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    set
}
