// src/watch/poller.rs

//! The polling loop for one watcher.
//!
//! A `PollLoop` is a single sequential task: it visits every target of its
//! `WatchSet` in order, re-reads the file, compares fingerprints and hands
//! real changes to the `DeliveryAgent`. It only yields control while
//! sleeping (between passes, during the permission backoff, between delivery
//! retries) and while waiting on the sink.
//!
//! Cancellation is cooperative. The shutdown signal is checked at the top of
//! every pass and interrupts the inter-pass sleep and the permission backoff,
//! never a read in progress.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::delivery::{
    DeliveryAgent, DeliveryOutcome, NotificationEvent, NotificationSink, DEFAULT_MESSAGE,
};
use crate::fs::FileSystem;

use super::fingerprint::{FingerprintChange, FingerprintStore};
use super::target::WatchSet;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_PERMISSION_BACKOFF: Duration = Duration::from_secs(5);

/// Sleep lengths used by the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    /// Pause between the end of one pass and the start of the next.
    pub interval: Duration,
    /// Pause after a permission-denied read, before moving to the next target.
    pub permission_backoff: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            permission_backoff: DEFAULT_PERMISSION_BACKOFF,
        }
    }
}

/// Why a target was skipped in a pass. None of these stop the loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("permission denied reading {0:?}")]
    PermissionDenied(PathBuf),

    #[error("error reading {path:?}: {message}")]
    ReadFailure { path: PathBuf, message: String },
}

impl PollError {
    fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => PollError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => PollError::PermissionDenied(path.to_path_buf()),
            _ => PollError::ReadFailure {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PollError::NotFound(path) | PollError::PermissionDenied(path) => path,
            PollError::ReadFailure { path, .. } => path,
        }
    }
}

/// What happened during one pass, in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Paths read for the first time (fingerprint baseline, no notification).
    pub baselined: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    /// Paths whose content changed, with the delivery result for each.
    pub changed: Vec<(PathBuf, DeliveryOutcome)>,
    pub skipped: Vec<PollError>,
    /// The pass stopped early because shutdown was requested.
    pub cancelled: bool,
}

/// Polling loop for one watcher. Owns that watcher's `FingerprintStore`.
pub struct PollLoop {
    set: WatchSet,
    store: FingerprintStore,
    fs: Arc<dyn FileSystem>,
    sink: Arc<dyn NotificationSink>,
    agent: DeliveryAgent,
    timing: PollTiming,
    message: String,
    shutdown: watch::Receiver<bool>,
}

impl std::fmt::Debug for PollLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollLoop")
            .field("set", &self.set)
            .field("fingerprints", &self.store.len())
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl PollLoop {
    pub fn new(
        set: WatchSet,
        fs: Arc<dyn FileSystem>,
        sink: Arc<dyn NotificationSink>,
        agent: DeliveryAgent,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            set,
            store: FingerprintStore::new(),
            fs,
            sink,
            agent,
            timing: PollTiming::default(),
            message: DEFAULT_MESSAGE.to_string(),
            shutdown,
        }
    }

    pub fn with_timing(mut self, timing: PollTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.set
    }

    pub fn fingerprints(&self) -> &FingerprintStore {
        &self.store
    }

    /// Run passes until shutdown is requested.
    pub async fn run(mut self) {
        info!(
            watcher = %self.set.watcher(),
            targets = self.set.targets().len(),
            interval = ?self.timing.interval,
            "starting file monitoring"
        );

        let mut passes: u64 = 0;
        loop {
            if self.shutdown_requested() {
                break;
            }

            let report = self.run_pass().await;
            passes += 1;
            if report.cancelled {
                break;
            }

            if self.pause(self.timing.interval).await {
                break;
            }
        }

        info!(watcher = %self.set.watcher(), passes, "file monitoring stopped");
    }

    /// Run one pass over every target, in declared order.
    pub async fn run_pass(&mut self) -> PassReport {
        let mut report = PassReport::default();
        let targets = self.set.targets().to_vec();

        for target in targets {
            if self.shutdown_requested() {
                report.cancelled = true;
                break;
            }

            let path = target.resolve();

            if !self.fs.exists(&path) {
                let poll_err = PollError::NotFound(path);
                self.log_skip(&poll_err);
                report.skipped.push(poll_err);
                continue;
            }

            // Synchronous read: a shutdown request can never interrupt it.
            let content = match self.fs.read(&path) {
                Ok(content) => content,
                Err(err) => {
                    let poll_err = PollError::from_io(&path, &err);
                    let backoff = matches!(poll_err, PollError::PermissionDenied(_));
                    self.log_skip(&poll_err);
                    report.skipped.push(poll_err);

                    if backoff && self.pause(self.timing.permission_backoff).await {
                        report.cancelled = true;
                        break;
                    }
                    continue;
                }
            };

            match self.store.record_and_compare(&path, &content) {
                FingerprintChange::FirstSeen => report.baselined.push(path),
                FingerprintChange::Unchanged => report.unchanged.push(path),
                FingerprintChange::Changed => {
                    info!(watcher = %self.set.watcher(), path = ?path, "change detected");
                    let event = NotificationEvent {
                        watcher: self.set.watcher().to_string(),
                        path: path.clone(),
                        message: self.message.clone(),
                    };
                    let outcome = self.agent.deliver(self.sink.as_ref(), &event).await;
                    report.changed.push((path, outcome));
                }
            }
        }

        debug!(
            watcher = %self.set.watcher(),
            baselined = report.baselined.len(),
            unchanged = report.unchanged.len(),
            changed = report.changed.len(),
            skipped = report.skipped.len(),
            "pass complete"
        );
        report
    }

    fn log_skip(&self, err: &PollError) {
        match err {
            PollError::NotFound(_) => {
                warn!(watcher = %self.set.watcher(), path = ?err.path(), "file not found");
            }
            PollError::PermissionDenied(_) => {
                warn!(
                    watcher = %self.set.watcher(),
                    path = ?err.path(),
                    backoff = ?self.timing.permission_backoff,
                    "permission denied; backing off until next pass"
                );
            }
            PollError::ReadFailure { message, .. } => {
                error!(
                    watcher = %self.set.watcher(),
                    path = ?err.path(),
                    error = %message,
                    "error reading file"
                );
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Sleep for `duration`, waking early only if shutdown is requested.
    ///
    /// Returns `true` when the sleep was cut short by shutdown. If the
    /// shutdown sender is gone, the full duration is slept. Durations past
    /// the end of the clock sleep until shutdown.
    async fn pause(&mut self, duration: Duration) -> bool {
        let timer = sleep(duration);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                _ = &mut timer => return false,
                changed = self.shutdown.changed() => match changed {
                    Ok(()) if *self.shutdown.borrow() => return true,
                    Ok(()) => continue,
                    Err(_) => {
                        (&mut timer).await;
                        return false;
                    }
                },
            }
        }
    }
}

/// Handle for a spawned poll loop.
pub struct PollerHandle {
    watcher: String,
    join: JoinHandle<()>,
}

impl std::fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollerHandle")
            .field("watcher", &self.watcher)
            .finish()
    }
}

impl PollerHandle {
    pub fn watcher(&self) -> &str {
        &self.watcher
    }

    /// The task has stopped (normally or not).
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the loop to stop (after shutdown has been requested).
    ///
    /// An `Err` means the task panicked or was aborted.
    pub async fn join(self) -> Result<(), JoinError> {
        self.join.await.inspect_err(|err| {
            error!(watcher = %self.watcher, error = %err, "poll loop task failed");
        })
    }
}

/// Spawn `poll_loop` as its own Tokio task.
pub fn spawn_poller(poll_loop: PollLoop) -> PollerHandle {
    let watcher = poll_loop.watch_set().watcher().to_string();
    let join = tokio::spawn(poll_loop.run());
    PollerHandle { watcher, join }
}
