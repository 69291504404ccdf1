// src/watch/target.rs

use std::path::{Path, PathBuf};

use crate::types::WatcherId;

/// One file to monitor: a base directory plus a file name relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    directory: PathBuf,
    file_name: String,
}

impl WatchTarget {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Path that is actually read on every pass.
    pub fn resolve(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

/// The frozen target list handed to a poll loop when monitoring starts.
///
/// Targets keep the order in which the files were selected; each pass visits
/// them in that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSet {
    watcher: WatcherId,
    targets: Vec<WatchTarget>,
}

impl WatchSet {
    pub fn new(watcher: impl Into<WatcherId>, targets: Vec<WatchTarget>) -> Self {
        Self {
            watcher: watcher.into(),
            targets,
        }
    }

    pub fn watcher(&self) -> &str {
        &self.watcher
    }

    pub fn targets(&self) -> &[WatchTarget] {
        &self.targets
    }
}
