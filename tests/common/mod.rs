#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use relaywatch::delivery::{BodySource, DeliveryAgent};
use relaywatch::watch::{PollLoop, PollTiming, WatchSet, WatchTarget};

pub use relaywatch_test_utils::fake_sink::{FakeSink, Reply};
pub use relaywatch_test_utils::log_capture::LogCapture;
pub use relaywatch_test_utils::{init_tracing, with_timeout, MockFileSystem};

pub const REFERENCE_FILE: &str = "/ref/discordM.txt";

pub fn watch_set(watcher: &str, directory: impl AsRef<Path>, files: &[&str]) -> WatchSet {
    let directory = directory.as_ref();
    WatchSet::new(
        watcher,
        files
            .iter()
            .map(|f| WatchTarget::new(directory, *f))
            .collect(),
    )
}

/// Agent with the default retry settings (2 attempts, 1s apart) that reads
/// its body from `REFERENCE_FILE` on the mock filesystem.
pub fn agent(fs: &MockFileSystem) -> DeliveryAgent {
    DeliveryAgent::new(
        Arc::new(fs.clone()),
        BodySource::ReferenceFile(REFERENCE_FILE.into()),
    )
}

/// Poll loop over `set` with default timing (1s interval, 5s backoff).
pub fn poll_loop(
    fs: &MockFileSystem,
    sink: &FakeSink,
    set: WatchSet,
    shutdown: watch::Receiver<bool>,
) -> PollLoop {
    PollLoop::new(
        set,
        Arc::new(fs.clone()),
        Arc::new(sink.clone()),
        agent(fs),
        shutdown,
    )
}

pub fn timing(interval_ms: u64, backoff_ms: u64) -> PollTiming {
    PollTiming {
        interval: Duration::from_millis(interval_ms),
        permission_backoff: Duration::from_millis(backoff_ms),
    }
}

/// Virtual-time durations may land a millisecond past the exact deadline.
pub fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual <= expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {actual:?}"
    );
}
