//! Built-in subscribers.

mod log;

pub use log::LogWriter;
