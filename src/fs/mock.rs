// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    /// Exists, but every read fails with `PermissionDenied`.
    Denied,
    /// Exists, but every read fails with the given message.
    Broken(String),
}

/// In-memory filesystem for tests.
///
/// Clones share the same state, so a test can keep one handle to mutate files
/// while the poll loop reads through another.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    reads: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a readable file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.set(path, MockEntry::File(content.into()));
    }

    pub fn deny(&self, path: impl AsRef<Path>) {
        self.set(path, MockEntry::Denied);
    }

    pub fn break_file(&self, path: impl AsRef<Path>, message: &str) {
        self.set(path, MockEntry::Broken(message.to_string()));
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        lock(&self.entries).remove(path.as_ref());
    }

    /// Every path passed to `read`, in call order.
    pub fn reads(&self) -> Vec<PathBuf> {
        lock(&self.reads).clone()
    }

    fn set(&self, path: impl AsRef<Path>, entry: MockEntry) {
        lock(&self.entries).insert(path.as_ref().to_path_buf(), entry);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        lock(&self.entries).contains_key(path)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        lock(&self.reads).push(path.to_path_buf());

        match lock(&self.entries).get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Denied) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            )),
            Some(MockEntry::Broken(message)) => Err(io::Error::other(message.clone())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )),
        }
    }
}
