use std::error::Error;
use std::fs;
use std::io::Write;

use relaywatch::logging::{build_subscriber, log_writer};
use tracing::Level;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn log_file_is_truncated_then_receives_every_record() -> TestResult {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(b"stale line from the previous run\n")?;
    file.flush()?;

    let writer = log_writer(Some(file.path()))?;
    assert_eq!(fs::read_to_string(file.path())?, "");

    let subscriber = build_subscriber(Level::INFO, writer, false);
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!(watcher = "alice", "starting file monitoring");
        tracing::warn!(path = "/data/a.txt", "file not found");
        tracing::error!("failed to deliver notification; dropping change event");
        tracing::debug!("below the configured level");
    });

    let contents = fs::read_to_string(file.path())?;
    assert!(!contents.contains("stale line"), "{contents}");
    assert_eq!(contents.lines().count(), 3, "{contents}");
    assert!(contents.contains("starting file monitoring"), "{contents}");
    assert!(contents.contains("file not found"), "{contents}");
    assert!(contents.contains("ERROR"), "{contents}");
    assert!(!contents.contains("below the configured level"), "{contents}");
    // Plain text in the file, no terminal colour codes.
    assert!(!contents.contains('\u{1b}'), "{contents}");

    Ok(())
}

#[test]
fn unwritable_log_file_is_a_startup_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let missing_parent = dir.path().join("no-such-dir").join("relay.log");

    let err = log_writer(Some(missing_parent.as_path()))
        .err()
        .expect("log file under a missing directory should fail");
    assert!(err.to_string().contains("creating log file"), "{err:#}");
}
