//! # unitvisor
//!
//! **Unitvisor** keeps a long-running service honest with its init system.
//!
//! It provides two independent building blocks:
//! - a **status monitor** that follows one systemd unit through a stream of raw
//!   state batches and classifies it into a small, stable [`ProcessStatus`];
//! - a **watchdog pinger** that derives a keep-alive interval from
//!   `WATCHDOG_USEC` and sends `WATCHDOG=1` on a strict schedule until stopped.
//!
//! The transport that reports unit states and the socket that carries pings are
//! collaborators behind the [`UnitStateSource`] and [`Notify`] traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   UnitStateSource                                      Notify
//!   (D-Bus, MemorySource)                                (notify socket)
//!          │ UnitFeed                                        ▲ "WATCHDOG=1"
//!          ▼                                                 │
//! ┌─────────────────────────┐                   ┌─────────────────────────┐
//! │ StatusMonitor loop      │                   │ Watchdog ping loop      │
//! │ select! {               │                   │ select! {               │
//! │   cancel | error |      │                   │   stop | tick           │
//! │   batch → classify      │                   │ }                       │
//! │ }                       │                   └────────────┬────────────┘
//! └──────┬───────────┬──────┘                                │
//!        │           ▼                                       │
//!        │   Mutex<ProcessStatus> ◄── get_status()           │
//!        │                                                   │
//!        │ publish(Event)                     publish(Event) │
//!        ▼                                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                         Hub listener ─► SubscriberSet
//!                                   ┌─────────┼─────────┐
//!                                   ▼         ▼         ▼
//!                               LogWriter  metrics   custom
//! ```
//!
//! ### Classification
//! ```text
//! batch empty                         → (no change)
//! unit absent from batch              → Unknown   + UnitMissing
//! unit present, state None            → Deleted   + UnitDeleted
//! loaded    / active   / running      → Running
//! loaded    / active   / active       → Running
//! not-found / active   / exited       → Stopped
//! loaded    / inactive / dead         → Stopped
//! anything else                       → Other     + UnitUnrecognized
//! feed error                          → monitor ends with StatusError::Feed
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Status**        | Follow one unit and classify its state.                       | [`ServiceStatus`], [`StatusMonitor`]        |
//! | **Watchdog**      | Keep-alive pings at half the announced deadline.              | [`Watchdog`], [`WatchdogHandle`]            |
//! | **Collaborators** | Plug in the state transport and the ping delivery.            | [`UnitStateSource`], [`Notify`]             |
//! | **Diagnostics**   | Injected observers instead of a global logger.                | [`Bus`], [`Subscribe`], [`Event`]           |
//! | **Errors**        | Typed setup and feed errors.                                  | [`StatusError`], [`WatchdogError`]          |
//! | **Configuration** | Centralize bus size, poll interval and environment names.     | [`Config`], [`Hub`]                         |
//!
//! ## Optional features
//! - `logging` (default): exports [`LogWriter`], which forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use unitvisor::{Bus, MemorySource, ProcessStatus, ServiceStatus, UnitBatch, UnitState};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Bus::new(64);
//!     let (source, feed) = MemorySource::new();
//!
//!     let monitor = ServiceStatus::new("nginx.service", Duration::from_secs(1))
//!         .init(source, bus.clone())
//!         .await?;
//!
//!     let mut batch = UnitBatch::new();
//!     batch.insert(
//!         "nginx.service".to_string(),
//!         Some(UnitState::new("loaded", "active", "running")),
//!     );
//!     feed.send_batch(batch).await;
//!
//!     while monitor.get_status() != ProcessStatus::Running {
//!         tokio::task::yield_now().await;
//!     }
//!
//!     monitor.close().await?;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod status;
mod subscribers;
mod watchdog;

// ---- Public re-exports ----

pub use config::{Config, SYSTEMD_RUNTIME_DIR, WATCHDOG_PID_VAR, WATCHDOG_USEC_VAR};
pub use self::core::{Hub, HubBuilder};
pub use error::{NotifyError, SourceError, StatusError, WatchdogError};
pub use events::{Bus, Event, EventKind, Severity};
pub use status::{
    Classification, MemoryFeed, MemorySource, Observation, ProcessStatus, ServiceStatus,
    StatusMonitor, StatusReader, UnitBatch, UnitFeed, UnitState, UnitStateSource, classify,
    observe,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use watchdog::{
    NOTIFY_WATCHDOG, Notify, Watchdog, WatchdogHandle, WatchdogState, half_period, is_running_systemd,
    pid_matches,
};

// Optional: built-in subscriber that forwards events to `tracing`.
// Enabled by default; disable with `default-features = false`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
