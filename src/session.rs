// src/session.rs

//! Watch configuration per watcher.
//!
//! Configuring a watcher is a three-step protocol:
//! 1. `set_directory`
//! 2. `select_files` (requires a directory)
//! 3. `start_monitoring` (requires both), which freezes the selection into a
//!    `WatchSet` for a poll loop.
//!
//! Out-of-order calls are rejected with `RelayError::PreconditionNotMet`
//! carrying a message meant for the person doing the configuring.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ConfigFile;
use crate::errors::{RelayError, Result};
use crate::types::WatcherId;
use crate::watch::{WatchSet, WatchTarget};

#[derive(Debug, Clone, Default)]
struct PendingSession {
    directory: Option<PathBuf>,
    files: Option<Vec<String>>,
}

/// Mapping from watcher identity to its (possibly incomplete) configuration.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<WatcherId, PendingSession>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every `[watcher.<id>]` section through the normal protocol.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut registry = Self::new();
        for (id, watcher) in cfg.watcher.iter() {
            registry.set_directory(id, &watcher.directory);
            registry.select_files(id, watcher.files.iter().cloned())?;
        }
        Ok(registry)
    }

    /// Set (or replace) the directory for `watcher`. A previous file
    /// selection is kept.
    pub fn set_directory(&mut self, watcher: &str, directory: impl Into<PathBuf>) {
        let directory = directory.into();
        info!(watcher, directory = ?directory, "directory set");
        self.sessions.entry(watcher.to_string()).or_default().directory = Some(directory);
    }

    /// Select the files to watch, relative to the watcher's directory.
    pub fn select_files<I, S>(&mut self, watcher: &str, files: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let session = match self.sessions.get_mut(watcher) {
            Some(session) if session.directory.is_some() => session,
            _ => {
                return Err(RelayError::PreconditionNotMet(
                    "Please set a directory first using set_directory".to_string(),
                ));
            }
        };

        let files: Vec<String> = files.into_iter().map(Into::into).collect();
        info!(watcher, ?files, "files selected");
        session.files = Some(files);
        Ok(())
    }

    /// Freeze the watcher's selection into a `WatchSet`.
    pub fn start_monitoring(&self, watcher: &str) -> Result<WatchSet> {
        let (directory, files) = match self.sessions.get(watcher) {
            Some(PendingSession {
                directory: Some(directory),
                files: Some(files),
            }) => (directory, files),
            _ => {
                return Err(RelayError::PreconditionNotMet(
                    "Please set a directory and select files first".to_string(),
                ));
            }
        };

        let targets = files
            .iter()
            .map(|file| WatchTarget::new(directory.clone(), file.clone()))
            .collect();
        Ok(WatchSet::new(watcher, targets))
    }

    pub fn directory(&self, watcher: &str) -> Option<&Path> {
        self.sessions
            .get(watcher)
            .and_then(|s| s.directory.as_deref())
    }

    pub fn files(&self, watcher: &str) -> Option<&[String]> {
        self.sessions.get(watcher).and_then(|s| s.files.as_deref())
    }

    pub fn watchers(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(|s| s.as_str())
    }
}
