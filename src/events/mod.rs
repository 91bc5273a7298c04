//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to diagnostics emitted by the status monitor, the
//! watchdog pinger and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Severity`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ServiceStatus` monitor loop, `Watchdog` ping loop,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: `Hub` listener (fans out to `SubscriberSet`), or any
//!   receiver obtained with [`Bus::subscribe`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Severity};
