//! Composition: wires the event bus to subscribers and hands it to components.
//!
//! The only public API from this module is [`Hub`] (and its [`HubBuilder`]).
//! The status monitor and the watchdog never know about each other; the hub
//! just gives both the same [`Bus`](crate::Bus).
//!
//! - `builder`: collects config and subscribers;
//! - `hub`: owns the bus, the subscriber set and the listener task.

mod builder;
mod hub;

pub use builder::HubBuilder;
pub use hub::Hub;
