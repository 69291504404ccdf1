// src/watch/fingerprint.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use blake3::Hash;
use tracing::debug;

/// Result of recording freshly-read content against the stored fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintChange {
    /// No previous entry for this path; the content is now the baseline.
    FirstSeen,
    /// Content differs from the previous read; the new digest was stored.
    Changed,
    /// Content is byte-identical to the previous read.
    Unchanged,
}

/// Compute the digest of raw file content.
pub fn fingerprint(content: &[u8]) -> Hash {
    blake3::hash(content)
}

/// Last-known content digest per watched path.
///
/// Entries are only ever added or replaced, never removed: the store lives
/// as long as the watcher that owns it.
#[derive(Debug, Default)]
pub struct FingerprintStore {
    digests: HashMap<PathBuf, Hash>,
}

impl FingerprintStore {
    pub fn new() -> Self {
        Self {
            digests: HashMap::new(),
        }
    }

    /// Digest `content`, compare it with the stored entry for `path` and
    /// update the entry when it is new or different.
    pub fn record_and_compare(&mut self, path: &Path, content: &[u8]) -> FingerprintChange {
        let digest = fingerprint(content);

        match self.digests.get_mut(path) {
            None => {
                debug!(?path, digest = %digest.to_hex(), "baseline fingerprint recorded");
                self.digests.insert(path.to_path_buf(), digest);
                FingerprintChange::FirstSeen
            }
            Some(stored) if *stored == digest => FingerprintChange::Unchanged,
            Some(stored) => {
                debug!(
                    ?path,
                    old = %stored.to_hex(),
                    new = %digest.to_hex(),
                    "fingerprint changed"
                );
                *stored = digest;
                FingerprintChange::Changed
            }
        }
    }

    pub fn get(&self, path: &Path) -> Option<&Hash> {
        self.digests.get(path)
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
