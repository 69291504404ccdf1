// src/watch/mod.rs

//! File polling and change detection.
//!
//! This module is responsible for:
//! - Describing what to watch (`WatchTarget`, `WatchSet`).
//! - Remembering a content fingerprint per path (`FingerprintStore`).
//! - Driving the per-watcher poll loop that re-reads every target on a fixed
//!   interval and hands real changes to delivery.
//!
//! Polling is used instead of OS file notifications, so detection latency is
//! bounded by the poll interval and a change that reverts within one interval
//! can be missed.

pub mod fingerprint;
pub mod poller;
pub mod target;

pub use fingerprint::{fingerprint, FingerprintChange, FingerprintStore};
pub use poller::{
    spawn_poller, PassReport, PollError, PollLoop, PollTiming, PollerHandle,
    DEFAULT_PERMISSION_BACKOFF, DEFAULT_POLL_INTERVAL,
};
pub use target::{WatchSet, WatchTarget};
