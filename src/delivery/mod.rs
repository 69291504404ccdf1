// src/delivery/mod.rs

//! Notification delivery.
//!
//! - [`sink`] defines the `NotificationSink` trait and the production
//!   `WebhookSink`, which posts to an HTTP webhook via `reqwest`.
//! - [`body`] decides what text is sent. The body comes from a configured
//!   reference file, not from the file whose change triggered delivery.
//! - [`agent`] wraps one notification in a bounded retry loop and reports an
//!   explicit [`DeliveryOutcome`].

use std::path::PathBuf;

use crate::types::WatcherId;

pub mod agent;
pub mod body;
pub mod sink;

pub use agent::{DeliveryAgent, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
pub use body::BodySource;
pub use sink::{NotificationSink, SinkResponse, WebhookSink};

/// Message attached to every change notification unless configured otherwise.
pub const DEFAULT_MESSAGE: &str = "File has been modified!";

/// "This path's content changed". Lives for one delivery attempt sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub watcher: WatcherId,
    pub path: PathBuf,
    pub message: String,
}

/// Final result of delivering one `NotificationEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The sink accepted the notification on attempt number `attempts`.
    Delivered { attempts: u32 },
    /// Every attempt failed; the event is dropped.
    Exhausted { attempts: u32 },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryOutcome::Delivered { attempts } | DeliveryOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }
}
