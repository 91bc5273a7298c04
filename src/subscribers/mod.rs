//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery that
//! delivers diagnostics published on the [`Bus`](crate::Bus) to user code.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   ServiceStatus / Watchdog ── publish(Event) ──► Bus ──► Hub listener
//!                                                             │
//!                                                             ▼
//!                                                       SubscriberSet
//!                                                   ┌─────────┼─────────┐
//!                                                   ▼         ▼         ▼
//!                                               LogWriter  Metrics   Custom
//! ```
//!
//! Tests and embedders that only need to capture events can skip this layer
//! entirely and call [`Bus::subscribe`](crate::Bus::subscribe).

#[cfg(feature = "logging")]
mod embedded;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
