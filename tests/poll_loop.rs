mod common;
use crate::common::{
    assert_elapsed, init_tracing, poll_loop, timing, watch_set, with_timeout, FakeSink,
    MockFileSystem, Reply, REFERENCE_FILE,
};

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};

use relaywatch::delivery::DeliveryOutcome;
use relaywatch::watch::{fingerprint, spawn_poller, PollError, PollTiming};

fn path(s: &str) -> PathBuf {
    PathBuf::from(s)
}

#[tokio::test(start_paused = true)]
async fn first_pass_only_records_baselines() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "alpha");
    fs.add_file("/data/b.txt", "beta");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt", "b.txt"]), rx);
    let report = poller.run_pass().await;

    assert_eq!(report.baselined, vec![path("/data/a.txt"), path("/data/b.txt")]);
    assert!(report.changed.is_empty());
    assert_eq!(sink.attempts(), 0);
    assert_eq!(
        poller.fingerprints().get(&path("/data/a.txt")),
        Some(&fingerprint(b"alpha"))
    );
}

#[tokio::test(start_paused = true)]
async fn unchanged_content_never_notifies() {
    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "alpha");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt"]), rx);
    poller.run_pass().await;
    let report = poller.run_pass().await;

    assert_eq!(report.unchanged, vec![path("/data/a.txt")]);
    assert!(report.changed.is_empty());
    assert_eq!(sink.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn each_change_is_delivered_exactly_once() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file(REFERENCE_FILE, "ledger summary");
    fs.add_file("/data/a.txt", "v1");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt"]), rx);
    poller.run_pass().await;

    fs.add_file("/data/a.txt", "v2");
    let report = poller.run_pass().await;
    assert_eq!(
        report.changed,
        vec![(path("/data/a.txt"), DeliveryOutcome::Delivered { attempts: 1 })]
    );
    assert_eq!(
        poller.fingerprints().get(&path("/data/a.txt")),
        Some(&fingerprint(b"v2"))
    );

    // Re-baselined immediately: the next pass sees no change.
    let report = poller.run_pass().await;
    assert!(report.changed.is_empty());

    let posts = sink.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body, "ledger summary");
}

#[tokio::test(start_paused = true)]
async fn missing_target_does_not_block_later_targets() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/data/b.txt", "one");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt", "b.txt"]), rx);
    poller.run_pass().await;

    fs.add_file("/data/b.txt", "two");
    let report = poller.run_pass().await;

    assert_eq!(report.skipped, vec![PollError::NotFound(path("/data/a.txt"))]);
    assert_eq!(
        report.changed,
        vec![(path("/data/b.txt"), DeliveryOutcome::Delivered { attempts: 1 })]
    );
    assert_eq!(sink.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn file_appearing_later_is_baselined_not_notified() {
    let fs = MockFileSystem::new();
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["late.txt"]), rx);
    let report = poller.run_pass().await;
    assert_eq!(report.skipped, vec![PollError::NotFound(path("/data/late.txt"))]);

    fs.add_file("/data/late.txt", "hello");
    let report = poller.run_pass().await;
    assert_eq!(report.baselined, vec![path("/data/late.txt")]);
    assert_eq!(sink.attempts(), 0);
}

/// Targets are processed sequentially: a permission-denied read holds up the
/// rest of the pass for the backoff, after which later targets still run.
#[tokio::test(start_paused = true)]
async fn permission_denied_backs_off_then_continues_the_pass() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.deny("/data/locked.txt");
    fs.add_file("/data/open.txt", "v1");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(
        &fs,
        &sink,
        watch_set("alice", "/data", &["locked.txt", "open.txt"]),
        rx,
    );

    poller.run_pass().await;
    fs.add_file("/data/open.txt", "v2");

    let start = Instant::now();
    let report = poller.run_pass().await;
    assert_elapsed(start.elapsed(), Duration::from_secs(5));

    assert_eq!(
        report.skipped,
        vec![PollError::PermissionDenied(path("/data/locked.txt"))]
    );
    assert_eq!(report.changed.len(), 1);
    assert_eq!(report.changed[0].0, path("/data/open.txt"));

    // One read of the locked file per pass; never retried within a pass.
    let locked_reads = fs
        .reads()
        .iter()
        .filter(|p| **p == path("/data/locked.txt"))
        .count();
    assert_eq!(locked_reads, 2);
}

#[tokio::test(start_paused = true)]
async fn permission_recovers_on_a_later_pass() {
    let fs = MockFileSystem::new();
    fs.deny("/data/locked.txt");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["locked.txt"]), rx)
        .with_timing(timing(1_000, 100));
    poller.run_pass().await;

    fs.add_file("/data/locked.txt", "readable now");
    let report = poller.run_pass().await;
    assert_eq!(report.baselined, vec![path("/data/locked.txt")]);
}

#[tokio::test(start_paused = true)]
async fn other_read_failures_are_skipped_without_backoff() {
    let fs = MockFileSystem::new();
    fs.break_file("/data/broken.txt", "input/output error");
    fs.add_file("/data/ok.txt", "fine");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(
        &fs,
        &sink,
        watch_set("alice", "/data", &["broken.txt", "ok.txt"]),
        rx,
    );

    let start = Instant::now();
    let report = poller.run_pass().await;

    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(
        report.skipped,
        vec![PollError::ReadFailure {
            path: path("/data/broken.txt"),
            message: "input/output error".to_string(),
        }]
    );
    assert_eq!(report.baselined, vec![path("/data/ok.txt")]);
}

#[tokio::test(start_paused = true)]
async fn exhausted_delivery_drops_the_event_and_polling_continues() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "v1");
    let sink = FakeSink::scripted(
        [
            Reply::Fail("down".to_string()),
            Reply::Fail("down".to_string()),
        ],
        Reply::Status(204),
    );
    let (_tx, rx) = watch::channel(false);

    let mut poller = poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt"]), rx);
    poller.run_pass().await;

    fs.add_file("/data/a.txt", "v2");
    let report = poller.run_pass().await;
    assert_eq!(
        report.changed,
        vec![(path("/data/a.txt"), DeliveryOutcome::Exhausted { attempts: 2 })]
    );

    // Not retried on the next pass: the fingerprint already moved on.
    let report = poller.run_pass().await;
    assert_eq!(report.unchanged, vec![path("/data/a.txt")]);
    assert_eq!(sink.attempts(), 2);

    // A further change is delivered normally.
    fs.add_file("/data/a.txt", "v3");
    let report = poller.run_pass().await;
    assert_eq!(
        report.changed,
        vec![(path("/data/a.txt"), DeliveryOutcome::Delivered { attempts: 1 })]
    );
}

#[tokio::test(start_paused = true)]
async fn watchers_keep_independent_fingerprints() {
    let fs = MockFileSystem::new();
    fs.add_file("/shared/x.txt", "v1");
    let sink = FakeSink::always_ok();
    let (_tx, rx) = watch::channel(false);

    let mut alice = poll_loop(&fs, &sink, watch_set("alice", "/shared", &["x.txt"]), rx.clone());
    let mut bob = poll_loop(&fs, &sink, watch_set("bob", "/shared", &["x.txt"]), rx);

    alice.run_pass().await;
    fs.add_file("/shared/x.txt", "v2");
    alice.run_pass().await;

    // Bob has never read the file, so this is his baseline.
    let report = bob.run_pass().await;
    assert_eq!(report.baselined, vec![path("/shared/x.txt")]);
    assert_eq!(sink.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn running_loop_detects_changes_and_stops_on_shutdown() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "v1");
    let sink = FakeSink::always_ok();
    let (tx, rx) = watch::channel(false);

    let handle = spawn_poller(poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt"]), rx));

    // Let the baseline pass and a couple of idle passes go by.
    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(sink.attempts(), 0);

    fs.add_file("/data/a.txt", "v2");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(sink.attempts(), 1);

    tx.send(true).unwrap();
    with_timeout(handle.join()).await.unwrap();

    fs.add_file("/data/a.txt", "v3");
    sleep(Duration::from_secs(3)).await;
    assert_eq!(sink.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_the_permission_backoff() {
    let fs = MockFileSystem::new();
    fs.deny("/data/locked.txt");
    fs.add_file("/data/after.txt", "v1");
    let sink = FakeSink::always_ok();
    let (tx, rx) = watch::channel(false);

    let handle = spawn_poller(poll_loop(
        &fs,
        &sink,
        watch_set("alice", "/data", &["locked.txt", "after.txt"]),
        rx,
    ));

    // Inside the first pass's 5s backoff.
    sleep(Duration::from_secs(1)).await;
    let start = Instant::now();
    tx.send(true).unwrap();
    handle.join().await.unwrap();

    assert!(start.elapsed() < Duration::from_secs(1));
    // The pass was abandoned before reaching the second target.
    assert!(!fs.reads().contains(&path("/data/after.txt")));
}

#[tokio::test(start_paused = true)]
async fn dropped_shutdown_sender_does_not_stop_polling() {
    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "v1");
    let sink = FakeSink::always_ok();
    let (tx, rx) = watch::channel(false);

    let _handle = spawn_poller(poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt"]), rx));
    drop(tx);

    sleep(Duration::from_millis(1_500)).await;
    fs.add_file("/data/a.txt", "v2");
    sleep(Duration::from_secs(2)).await;

    assert_eq!(sink.attempts(), 1);
}

/// An interval or backoff that does not fit on the clock must not take the
/// watcher down; the loop simply sleeps until shutdown.
#[tokio::test(start_paused = true)]
async fn oversized_sleeps_wait_for_shutdown_instead_of_failing() {
    init_tracing();

    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "v1");
    fs.deny("/data/locked.txt");
    let sink = FakeSink::always_ok();
    let (tx, rx) = watch::channel(false);

    let handle = spawn_poller(
        poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt", "locked.txt"]), rx)
            .with_timing(PollTiming {
                interval: Duration::MAX,
                permission_backoff: Duration::MAX,
            }),
    );

    sleep(Duration::from_secs(60)).await;
    assert_eq!(fs.reads(), vec![path("/data/a.txt"), path("/data/locked.txt")]);

    tx.send(true).unwrap();
    with_timeout(handle.join())
        .await
        .expect("poll loop should stop cleanly");
}

#[tokio::test(start_paused = true)]
async fn oversized_interval_is_fine_after_the_shutdown_sender_is_dropped() {
    let fs = MockFileSystem::new();
    fs.add_file("/data/a.txt", "v1");
    let sink = FakeSink::always_ok();
    let (tx, rx) = watch::channel(false);

    let handle = spawn_poller(
        poll_loop(&fs, &sink, watch_set("alice", "/data", &["a.txt"]), rx)
            .with_timing(PollTiming {
                interval: Duration::MAX,
                permission_backoff: Duration::from_secs(5),
            }),
    );
    drop(tx);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(fs.reads().len(), 1);
    assert!(!handle.is_finished());
}
