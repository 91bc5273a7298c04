use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant};
use unitvisor::{
    Bus, Config, Event, EventKind, NOTIFY_WATCHDOG, Notify, NotifyError, Watchdog, WatchdogError,
    WatchdogState,
};

fn cfg() -> Config {
    Config {
        systemd_dir: std::env::temp_dir(),
        watchdog_usec_var: "UNITVISOR_IT_USEC_NEVER_SET".into(),
        watchdog_pid_var: None,
        ..Config::default()
    }
}

/// Notifier that records every state string it is given.
fn recording() -> (Arc<dyn Notify>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let notifier: Arc<dyn Notify> = Arc::new(move |state: &str| -> Result<(), NotifyError> {
        assert_eq!(state, NOTIFY_WATCHDOG);
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (notifier, calls)
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
    let mut kinds = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        kinds.push(ev.kind);
    }
    kinds
}

#[tokio::test(start_paused = true)]
async fn pings_at_half_the_deadline() {
    let (notifier, calls) = recording();
    let bus = Bus::new(64);
    let mut rx = bus.subscribe();
    let handle = match Watchdog::new(&cfg(), notifier, bus).start_with_deadline(Some("1000000")) {
        Ok(h) => h,
        Err(e) => panic!("start failed: {e}"),
    };
    assert_eq!(handle.period(), Duration::from_millis(500));

    time::sleep(Duration::from_millis(1750)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(handle.pings(), 3);
    assert_eq!(handle.state(), WatchdogState::Running);

    handle.stop();
    handle.join().await;

    assert_eq!(
        drain(&mut rx),
        vec![
            EventKind::WatchdogStarted,
            EventKind::WatchdogPing,
            EventKind::WatchdogPing,
            EventKind::WatchdogPing,
            EventKind::WatchdogStopped,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_before_first_tick_sends_nothing() {
    let (notifier, calls) = recording();
    let handle = match Watchdog::new(&cfg(), notifier, Bus::default())
        .start_with_deadline(Some("1000000"))
    {
        Ok(h) => h,
        Err(e) => panic!("start failed: {e}"),
    };

    time::sleep(Duration::from_millis(100)).await;
    handle.stop();
    handle.join().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_abandons_the_pending_wait() {
    let (notifier, calls) = recording();
    let handle = match Watchdog::new(&cfg(), notifier, Bus::default())
        .start_with_deadline(Some("10000000"))
    {
        Ok(h) => h,
        Err(e) => panic!("start failed: {e}"),
    };
    assert_eq!(handle.period(), Duration::from_secs(5));

    let begin = Instant::now();
    time::sleep(Duration::from_secs(1)).await;
    handle.stop();
    handle.join().await;

    assert!(begin.elapsed() < Duration::from_secs(5));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn stop_is_idempotent() {
    let (notifier, _) = recording();
    let handle = match Watchdog::new(&cfg(), notifier, Bus::default())
        .start_with_deadline(Some("2000000"))
    {
        Ok(h) => h,
        Err(e) => panic!("start failed: {e}"),
    };
    let token = handle.stop_token();

    handle.stop();
    handle.stop();
    token.cancel();
    assert_eq!(handle.state(), WatchdogState::Stopped);
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn failed_pings_do_not_stop_the_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let notifier: Arc<dyn Notify> = Arc::new(move |_: &str| -> Result<(), NotifyError> {
        seen.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::msg("socket gone"))
    });
    let bus = Bus::new(64);
    let mut rx = bus.subscribe();

    let handle = match Watchdog::new(&cfg(), notifier, bus).start_with_deadline(Some("200000")) {
        Ok(h) => h,
        Err(e) => panic!("start failed: {e}"),
    };

    time::sleep(Duration::from_millis(350)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(handle.pings(), 0);
    assert_eq!(handle.state(), WatchdogState::Running);

    handle.stop();
    handle.join().await;

    let mut failures = 0;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::WatchdogPingFailed {
            assert_eq!(ev.reason.as_deref(), Some("socket gone"));
            failures += 1;
        }
    }
    assert_eq!(failures, 3);
}

#[tokio::test]
async fn bad_deadlines_are_rejected() {
    let (notifier, calls) = recording();
    let wd = Watchdog::new(&cfg(), notifier, Bus::default());

    assert!(matches!(
        wd.start_with_deadline(Some("0")),
        Err(WatchdogError::InvalidInterval { usec: 0 })
    ));
    assert!(matches!(
        wd.start_with_deadline(Some("1")),
        Err(WatchdogError::InvalidInterval { usec: 1 })
    ));
    assert!(matches!(
        wd.start_with_deadline(Some("abc")),
        Err(WatchdogError::InvalidPeriod { .. })
    ));
    assert!(matches!(
        wd.start_with_deadline(None),
        Err(WatchdogError::NoWatchdogConfigured)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unavailable_outside_a_watchdog_environment() {
    let (notifier, _) = recording();

    let not_configured = Watchdog::new(&cfg(), Arc::clone(&notifier), Bus::default()).start();
    assert!(matches!(not_configured, Err(WatchdogError::NoWatchdogConfigured)));

    let no_systemd = Config {
        systemd_dir: "/nonexistent/unitvisor/run/systemd/system".into(),
        ..cfg()
    };
    let not_running = Watchdog::new(&no_systemd, notifier, Bus::default()).start();
    match not_running {
        Err(e) => {
            assert!(matches!(e, WatchdogError::NotRunning));
            assert!(e.is_unavailable());
        }
        Ok(_) => panic!("watchdog must not start without systemd"),
    }
}

/// Config reading its deadline and pid from variables private to `tag`.
fn env_cfg(tag: &str, usec: &str, pid: &str) -> Config {
    let usec_var = format!("UNITVISOR_IT_{tag}_USEC");
    let pid_var = format!("UNITVISOR_IT_{tag}_PID");
    // Each test owns its variable names, so no other thread touches them.
    unsafe {
        std::env::set_var(&usec_var, usec);
        std::env::set_var(&pid_var, pid);
    }
    Config {
        watchdog_usec_var: usec_var.into(),
        watchdog_pid_var: Some(pid_var.into()),
        ..cfg()
    }
}

fn foreign_pid() -> String {
    std::process::id().wrapping_add(1).to_string()
}

#[tokio::test(start_paused = true)]
async fn start_reads_deadline_for_this_process() {
    let (notifier, _) = recording();
    let cfg = env_cfg("OWN_PID", "1000000", &std::process::id().to_string());

    let handle = match Watchdog::new(&cfg, notifier, Bus::default()).start() {
        Ok(h) => h,
        Err(e) => panic!("start failed: {e}"),
    };
    assert_eq!(handle.period(), Duration::from_millis(500));
    handle.stop();
    handle.join().await;
}

#[tokio::test]
async fn start_ignores_deadline_for_another_process() {
    let (notifier, calls) = recording();
    let cfg = env_cfg("FOREIGN_PID", "1000000", &foreign_pid());

    let res = Watchdog::new(&cfg, notifier, Bus::default()).start();
    assert!(matches!(res, Err(WatchdogError::NoWatchdogConfigured)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn start_rejects_malformed_pid() {
    let (notifier, _) = recording();
    let cfg = env_cfg("BAD_PID", "1000000", "self");

    let res = Watchdog::new(&cfg, notifier, Bus::default()).start();
    assert!(matches!(res, Err(WatchdogError::InvalidPid { ref value, .. }) if value == "self"));
}

#[tokio::test]
async fn start_rejects_zero_deadline_from_env() {
    let (notifier, _) = recording();
    let cfg = env_cfg("ZERO_USEC", "0", &std::process::id().to_string());

    let res = Watchdog::new(&cfg, notifier, Bus::default()).start();
    assert!(matches!(res, Err(WatchdogError::InvalidInterval { usec: 0 })));
}

#[tokio::test]
async fn malformed_deadline_reported_before_pid_ownership() {
    let (notifier, _) = recording();
    let cfg = env_cfg("BAD_USEC_FOREIGN", "abc", &foreign_pid());

    let res = Watchdog::new(&cfg, notifier, Bus::default()).start();
    assert!(matches!(res, Err(WatchdogError::InvalidPeriod { ref value, .. }) if value == "abc"));
}
