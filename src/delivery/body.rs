// src/delivery/body.rs

use std::path::PathBuf;

use tracing::warn;

use crate::fs::FileSystem;

/// Where the text of a notification comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySource {
    /// Contents of this file, re-read for every delivery attempt.
    ReferenceFile(PathBuf),
    /// Always send an empty body.
    Empty,
}

impl BodySource {
    /// Produce the body for one attempt.
    ///
    /// Never fails: a missing or unreadable reference file yields an empty
    /// body. Bytes that are not valid UTF-8 are dropped.
    pub fn read(&self, fs: &dyn FileSystem) -> String {
        match self {
            BodySource::Empty => String::new(),
            BodySource::ReferenceFile(path) => match fs.read(path) {
                Ok(bytes) => decode_ignoring_invalid(&bytes),
                Err(err) => {
                    warn!(
                        path = ?path,
                        error = %err,
                        "reference file unreadable; sending empty body"
                    );
                    String::new()
                }
            },
        }
    }
}

/// Keep the valid UTF-8 runs of `bytes`, skipping everything else.
fn decode_ignoring_invalid(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
