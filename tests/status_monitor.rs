use std::time::Duration;

use tokio::sync::broadcast;
use unitvisor::{
    Bus, Event, EventKind, MemoryFeed, MemorySource, ProcessStatus, ServiceStatus, SourceError,
    StatusError, StatusMonitor, UnitBatch, UnitState,
};

const UNIT: &str = "nginx.service";

fn batch(entries: &[(&str, Option<(&str, &str, &str)>)]) -> UnitBatch {
    entries
        .iter()
        .map(|(name, st)| {
            (
                name.to_string(),
                st.map(|(l, a, s)| UnitState::new(l, a, s)),
            )
        })
        .collect()
}

async fn start() -> (StatusMonitor<MemorySource>, MemoryFeed, broadcast::Receiver<Event>) {
    let bus = Bus::new(256);
    let rx = bus.subscribe();
    let (source, feed) = MemorySource::new();
    let monitor = match ServiceStatus::new(UNIT, Duration::from_millis(100))
        .init(source, bus)
        .await
    {
        Ok(m) => m,
        Err(e) => panic!("init failed: {e}"),
    };
    (monitor, feed, rx)
}

/// Receives events until one of `kind` shows up.
async fn next_of(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        match rx.recv().await {
            Ok(ev) if ev.kind == kind => return ev,
            Ok(_) => continue,
            Err(e) => panic!("bus closed while waiting for {kind:?}: {e}"),
        }
    }
}

#[tokio::test]
async fn init_subscribes_in_order_with_interval() {
    let (monitor, feed, mut rx) = start().await;

    assert_eq!(feed.calls(), vec!["connect", "subscribe", "subscribe_units"]);
    assert_eq!(feed.interval(), Some(Duration::from_millis(100)));
    assert_eq!(monitor.name(), UNIT);
    assert_eq!(monitor.get_status(), ProcessStatus::Unknown);

    let started = next_of(&mut rx, EventKind::MonitorStarted).await;
    assert_eq!(started.unit.as_deref(), Some(UNIT));

    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn batches_drive_status() {
    let (monitor, feed, mut rx) = start().await;
    let cases = [
        (("loaded", "active", "running"), ProcessStatus::Running),
        (("loaded", "inactive", "dead"), ProcessStatus::Stopped),
        (("loaded", "active", "active"), ProcessStatus::Running),
        (("not-found", "active", "exited"), ProcessStatus::Stopped),
        (("loaded", "active", "deactivating"), ProcessStatus::Other),
    ];

    for (triple, want) in cases {
        assert!(feed.send_batch(batch(&[(UNIT, Some(triple))])).await);
        let ev = next_of(&mut rx, EventKind::StatusChanged).await;
        assert_eq!(ev.status, Some(want), "triple {triple:?}");
        assert_eq!(monitor.get_status(), want);
    }

    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn unrecognized_states_are_reported_raw() {
    let (monitor, feed, mut rx) = start().await;

    feed.send_batch(batch(&[(
        UNIT,
        Some(("loaded", "deactivating", "stop-sigterm")),
    )]))
    .await;

    let ev = next_of(&mut rx, EventKind::UnitUnrecognized).await;
    assert_eq!(
        ev.state,
        Some(UnitState::new("loaded", "deactivating", "stop-sigterm"))
    );
    assert_eq!(ev.unit.as_deref(), Some(UNIT));
    next_of(&mut rx, EventKind::StatusChanged).await;
    assert_eq!(monitor.get_status(), ProcessStatus::Other);

    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn missing_unit_is_unknown_with_warning() {
    let (monitor, feed, mut rx) = start().await;

    feed.send_batch(batch(&[(UNIT, Some(("loaded", "active", "running")))]))
        .await;
    next_of(&mut rx, EventKind::StatusChanged).await;

    feed.send_batch(batch(&[(
        "other.service",
        Some(("loaded", "active", "running")),
    )]))
    .await;
    next_of(&mut rx, EventKind::UnitMissing).await;
    let ev = next_of(&mut rx, EventKind::StatusChanged).await;
    assert_eq!(ev.previous, Some(ProcessStatus::Running));
    assert_eq!(ev.status, Some(ProcessStatus::Unknown));
    assert_eq!(monitor.get_status(), ProcessStatus::Unknown);

    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn empty_batch_leaves_status_alone() {
    let (monitor, feed, mut rx) = start().await;

    feed.send_batch(batch(&[(UNIT, Some(("loaded", "inactive", "dead")))]))
        .await;
    next_of(&mut rx, EventKind::StatusChanged).await;

    feed.send_batch(UnitBatch::new()).await;
    feed.send_batch(batch(&[(UNIT, Some(("loaded", "active", "running")))]))
        .await;

    // Batches are applied in order, so everything up to the next change
    // belongs to the empty batch.
    let changed = loop {
        match rx.recv().await {
            Ok(ev) if ev.kind == EventKind::StatusChanged => break ev,
            Ok(ev) => assert_ne!(ev.kind, EventKind::UnitMissing),
            Err(e) => panic!("bus closed: {e}"),
        }
    };
    assert_eq!(changed.previous, Some(ProcessStatus::Stopped));
    assert_eq!(changed.status, Some(ProcessStatus::Running));

    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn removed_unit_is_deleted() {
    let (monitor, feed, mut rx) = start().await;

    feed.send_batch(batch(&[(UNIT, None)])).await;
    next_of(&mut rx, EventKind::UnitDeleted).await;
    next_of(&mut rx, EventKind::StatusChanged).await;
    assert_eq!(monitor.reader().get_status(), ProcessStatus::Deleted);

    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn feed_error_is_fatal_to_the_monitor() {
    let (mut monitor, feed, mut rx) = start().await;

    feed.send_batch(batch(&[(UNIT, Some(("loaded", "active", "running")))]))
        .await;
    next_of(&mut rx, EventKind::StatusChanged).await;

    assert!(feed.send_error(SourceError::msg("connection reset")).await);

    let res = monitor.wait().await;
    assert!(matches!(res, Err(StatusError::Feed { ref unit, .. }) if unit == UNIT));

    let failed = next_of(&mut rx, EventKind::FeedFailed).await;
    assert_eq!(failed.reason.as_deref(), Some("connection reset"));
    let stopped = next_of(&mut rx, EventKind::MonitorStopped).await;
    assert_eq!(stopped.status, Some(ProcessStatus::Running));

    // The last known value is kept.
    assert_eq!(monitor.get_status(), ProcessStatus::Running);
    assert!(monitor.wait().await.is_ok());
    assert!(monitor.close().await.is_ok());
}

#[tokio::test]
async fn close_unsubscribes_then_closes() {
    let (monitor, feed, mut rx) = start().await;
    let reader = monitor.reader();

    assert!(monitor.close().await.is_ok());
    assert_eq!(
        feed.calls(),
        vec!["connect", "subscribe", "subscribe_units", "unsubscribe", "close"]
    );
    assert!(!feed.is_subscribed());
    next_of(&mut rx, EventKind::MonitorStopped).await;

    // No loop is left to write.
    assert!(!feed.send_batch(batch(&[(UNIT, Some(("loaded", "active", "running")))])).await);
    assert_eq!(reader.get_status(), ProcessStatus::Unknown);
}

#[tokio::test]
async fn close_still_closes_when_unsubscribe_fails() {
    let bus = Bus::new(16);
    let (source, feed) = MemorySource::new();
    let monitor = match ServiceStatus::new(UNIT, Duration::from_secs(1))
        .init(source.fail_on("unsubscribe"), bus)
        .await
    {
        Ok(m) => m,
        Err(e) => panic!("init failed: {e}"),
    };

    let res = monitor.close().await;
    assert!(matches!(res, Err(StatusError::Source { op: "unsubscribe", .. })));
    assert_eq!(feed.calls().last(), Some(&"close"));
}

#[tokio::test]
async fn invalid_name_touches_nothing() {
    for name in ["", "   "] {
        let (source, feed) = MemorySource::new();
        let res = ServiceStatus::new(name, Duration::from_secs(1))
            .init(source, Bus::default())
            .await;
        assert!(matches!(res, Err(StatusError::InvalidServiceName)));
        assert!(feed.calls().is_empty());
    }
}

#[tokio::test]
async fn setup_failure_is_forwarded_and_source_closed() {
    for op in ["connect", "subscribe", "subscribe_units"] {
        let (source, feed) = MemorySource::new();
        let res = ServiceStatus::new(UNIT, Duration::from_secs(1))
            .init(source.fail_on(op), Bus::default())
            .await;

        match res {
            Err(StatusError::Source { op: failed, .. }) => assert_eq!(failed, op),
            Err(e) => panic!("{op}: unexpected error {e}"),
            Ok(_) => panic!("{op}: init should fail"),
        }

        let calls = feed.calls();
        if op == "connect" {
            assert_eq!(calls, vec!["connect"]);
        } else {
            assert_eq!(calls.last(), Some(&"close"), "{op}: {calls:?}");
        }
    }
}
