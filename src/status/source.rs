//! # Unit-state source: the collaborator feeding the monitor.
//!
//! [`UnitStateSource`] abstracts the transport that reports unit states (on a
//! real host, the init system's D-Bus API). The monitor drives it through a
//! fixed call sequence:
//!
//! ```text
//! init():   connect() ─► subscribe() ─► subscribe_units(interval) ─► UnitFeed
//! close():  unsubscribe() ─► close()          (close() runs even if unsubscribe fails)
//! ```
//!
//! A [`UnitFeed`] is a pair of channels: batches of unit states, and errors.
//! Closing the batch channel ends the monitor loop normally; anything arriving
//! on the error channel ends it with [`StatusError::Feed`](crate::StatusError::Feed).
//!
//! [`MemorySource`] is an in-process implementation driven through a
//! [`MemoryFeed`] handle, for embedding and tests.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SourceError;
use crate::status::process_status::UnitBatch;

/// Channels produced by [`UnitStateSource::subscribe_units`].
#[derive(Debug)]
pub struct UnitFeed {
    /// Unit-state batches, one per poll or change notification.
    pub batches: mpsc::Receiver<UnitBatch>,
    /// Delivery errors; any item here means the subscription is broken.
    pub errors: mpsc::Receiver<SourceError>,
}

/// # Transport that reports unit states.
///
/// Implementations forward their own failures wrapped in [`SourceError`].
#[async_trait]
pub trait UnitStateSource: Send + 'static {
    /// Opens the connection to the init system.
    async fn connect(&mut self) -> Result<(), SourceError>;

    /// Enables change notifications on the connection.
    async fn subscribe(&mut self) -> Result<(), SourceError>;

    /// Starts delivering unit-state batches at `interval` granularity.
    async fn subscribe_units(&mut self, interval: Duration) -> Result<UnitFeed, SourceError>;

    /// Stops change notifications; the batch channel should close afterwards.
    async fn unsubscribe(&mut self) -> Result<(), SourceError>;

    /// Releases the connection. Best-effort.
    async fn close(&mut self);
}

#[derive(Default)]
struct Shared {
    batches: Option<mpsc::Sender<UnitBatch>>,
    errors: Option<mpsc::Sender<SourceError>>,
    interval: Option<Duration>,
    calls: Vec<&'static str>,
}

fn lock(shared: &Mutex<Shared>) -> std::sync::MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process [`UnitStateSource`].
///
/// Batches and errors are pushed through the paired [`MemoryFeed`].
/// Individual operations can be made to fail with [`MemorySource::fail_on`].
///
/// # Example
/// ```
/// use unitvisor::MemorySource;
///
/// let (source, feed) = MemorySource::new();
/// assert!(!feed.is_subscribed());
/// # drop(source);
/// ```
pub struct MemorySource {
    shared: Arc<Mutex<Shared>>,
    capacity: usize,
    failing: Vec<&'static str>,
}

/// Producer side of a [`MemorySource`].
#[derive(Clone)]
pub struct MemoryFeed {
    shared: Arc<Mutex<Shared>>,
}

impl MemorySource {
    /// Creates a source with a batch queue of 16.
    pub fn new() -> (Self, MemoryFeed) {
        Self::with_capacity(16)
    }

    /// Creates a source with the given batch queue capacity (min 1).
    pub fn with_capacity(capacity: usize) -> (Self, MemoryFeed) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let source = Self {
            shared: Arc::clone(&shared),
            capacity: capacity.max(1),
            failing: Vec::new(),
        };
        (source, MemoryFeed { shared })
    }

    /// Makes the named operation (`"connect"`, `"subscribe"`, `"subscribe_units"`,
    /// `"unsubscribe"`) return an error.
    pub fn fail_on(mut self, op: &'static str) -> Self {
        self.failing.push(op);
        self
    }

    fn record(&self, op: &'static str) -> Result<(), SourceError> {
        lock(&self.shared).calls.push(op);
        if self.failing.contains(&op) {
            return Err(SourceError::msg(format!("{op} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitStateSource for MemorySource {
    async fn connect(&mut self) -> Result<(), SourceError> {
        self.record("connect")
    }

    async fn subscribe(&mut self) -> Result<(), SourceError> {
        self.record("subscribe")
    }

    async fn subscribe_units(&mut self, interval: Duration) -> Result<UnitFeed, SourceError> {
        self.record("subscribe_units")?;

        let (batch_tx, batches) = mpsc::channel(self.capacity);
        let (err_tx, errors) = mpsc::channel(1);

        let mut shared = lock(&self.shared);
        shared.batches = Some(batch_tx);
        shared.errors = Some(err_tx);
        shared.interval = Some(interval);
        Ok(UnitFeed { batches, errors })
    }

    async fn unsubscribe(&mut self) -> Result<(), SourceError> {
        let res = self.record("unsubscribe");
        let mut shared = lock(&self.shared);
        shared.batches = None;
        shared.errors = None;
        res
    }

    async fn close(&mut self) {
        let _ = self.record("close");
    }
}

impl MemoryFeed {
    /// Delivers a batch; waits if the queue is full.
    ///
    /// Returns `false` when there is no active subscription.
    pub async fn send_batch(&self, batch: UnitBatch) -> bool {
        let tx = lock(&self.shared).batches.clone();
        match tx {
            Some(tx) => tx.send(batch).await.is_ok(),
            None => false,
        }
    }

    /// Delivers a feed error.
    ///
    /// Returns `false` when there is no active subscription.
    pub async fn send_error(&self, err: SourceError) -> bool {
        let tx = lock(&self.shared).errors.clone();
        match tx {
            Some(tx) => tx.send(err).await.is_ok(),
            None => false,
        }
    }

    /// Whether `subscribe_units` succeeded and `unsubscribe` has not run.
    pub fn is_subscribed(&self) -> bool {
        lock(&self.shared).batches.is_some()
    }

    /// Interval requested by the last `subscribe_units`.
    pub fn interval(&self) -> Option<Duration> {
        lock(&self.shared).interval
    }

    /// Operations invoked on the source, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.shared).calls.clone()
    }
}
