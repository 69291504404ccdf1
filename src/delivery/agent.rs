// src/delivery/agent.rs

//! Bounded-retry delivery of a single change notification.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::fs::FileSystem;
use crate::types::SuccessPolicy;

use super::{BodySource, DeliveryOutcome, NotificationEvent, NotificationSink};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Delivers one notification with up to `max_attempts` tries.
///
/// Each attempt:
/// - reads the body fresh from the `BodySource` (the reference file may
///   change between attempts),
/// - posts it to the sink,
/// - stops early if the `SuccessPolicy` accepts the response.
///
/// Consecutive attempts are separated by `retry_delay`; nothing waits after
/// the last one.
#[derive(Debug, Clone)]
pub struct DeliveryAgent {
    fs: Arc<dyn FileSystem>,
    body: BodySource,
    max_attempts: u32,
    retry_delay: Duration,
    policy: SuccessPolicy,
}

impl DeliveryAgent {
    pub fn new(fs: Arc<dyn FileSystem>, body: BodySource) -> Self {
        Self {
            fs,
            body,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            policy: SuccessPolicy::default(),
        }
    }

    /// `max_attempts` is clamped to at least 1.
    pub fn with_retry(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn policy(&self) -> SuccessPolicy {
        self.policy
    }

    pub fn body_source(&self) -> &BodySource {
        &self.body
    }

    pub async fn deliver(
        &self,
        sink: &dyn NotificationSink,
        event: &NotificationEvent,
    ) -> DeliveryOutcome {
        for attempt in 1..=self.max_attempts {
            let body = self.body.read(self.fs.as_ref());

            match sink.post(body).await {
                Ok(response) if self.policy.accepts(&response) => {
                    info!(
                        watcher = %event.watcher,
                        path = ?event.path,
                        attempt,
                        status = ?response.status,
                        notice = %event.message,
                        "notification delivered"
                    );
                    return DeliveryOutcome::Delivered { attempts: attempt };
                }
                Ok(response) => {
                    warn!(
                        watcher = %event.watcher,
                        path = ?event.path,
                        attempt,
                        status = ?response.status,
                        policy = ?self.policy,
                        notice = %event.message,
                        "sink rejected notification"
                    );
                }
                Err(err) => {
                    warn!(
                        watcher = %event.watcher,
                        path = ?event.path,
                        attempt,
                        error = %err,
                        notice = %event.message,
                        "notification attempt failed"
                    );
                }
            }

            if attempt < self.max_attempts {
                sleep(self.retry_delay).await;
            }
        }

        error!(
            watcher = %event.watcher,
            path = ?event.path,
            attempts = self.max_attempts,
            notice = %event.message,
            "failed to deliver notification; dropping change event"
        );
        DeliveryOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }
}
