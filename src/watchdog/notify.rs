//! # Keep-alive delivery.
//!
//! [`Notify`] is the collaborator that hands a state string to the service
//! manager (on a real host, a datagram on `$NOTIFY_SOCKET`). The watchdog only
//! ever sends [`NOTIFY_WATCHDOG`].
//!
//! Any `Fn(&str) -> Result<(), NotifyError>` closure is a [`Notify`].
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use unitvisor::{NOTIFY_WATCHDOG, Notify, NotifyError};
//!
//! let notifier: Arc<dyn Notify> = Arc::new(|state: &str| -> Result<(), NotifyError> {
//!     assert_eq!(state, NOTIFY_WATCHDOG);
//!     Ok(())
//! });
//! assert!(notifier.notify(NOTIFY_WATCHDOG).is_ok());
//! ```

use crate::error::NotifyError;

/// "Alive, reset my deadline."
pub const NOTIFY_WATCHDOG: &str = "WATCHDOG=1";

/// Sends a state string to the service manager. Best-effort.
pub trait Notify: Send + Sync + 'static {
    /// Delivers one state assignment, e.g. [`NOTIFY_WATCHDOG`].
    fn notify(&self, state: &str) -> Result<(), NotifyError>;
}

impl<F> Notify for F
where
    F: Fn(&str) -> Result<(), NotifyError> + Send + Sync + 'static,
{
    fn notify(&self, state: &str) -> Result<(), NotifyError> {
        self(state)
    }
}
