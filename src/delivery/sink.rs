// src/delivery/sink.rs

//! Pluggable notification sink abstraction.
//!
//! The delivery agent talks to a `NotificationSink` instead of an HTTP client
//! directly, so tests can script successes and failures without a network.
//!
//! - `WebhookSink` is the production implementation. It POSTs a JSON
//!   `{"content": "<body>"}` payload to a webhook URL.
//! - Tests provide their own sink that records bodies and replays scripted
//!   responses.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::errors::Result;

/// What a sink reported back for one post.
///
/// `status` is `None` for transports that have no status code of their own;
/// whether that counts as success is up to the `SuccessPolicy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkResponse {
    pub status: Option<u16>,
}

impl SinkResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            status: Some(status),
        }
    }

    pub fn without_status() -> Self {
        Self { status: None }
    }
}

/// The external system receiving change notifications.
///
/// An `Err` means the post never produced a response (connection refused,
/// timeout, ...). A response with a failing status is still `Ok`.
pub trait NotificationSink: Send + Sync {
    fn post(
        &self,
        body: String,
    ) -> Pin<Box<dyn Future<Output = Result<SinkResponse>> + Send + '_>>;
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Sink that posts to an HTTP webhook (e.g. a chat channel webhook).
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Build a sink for `url`.
    ///
    /// Without `timeout` the client's own defaults apply, which means a hung
    /// endpoint can stall delivery indefinitely.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl NotificationSink for WebhookSink {
    fn post(
        &self,
        body: String,
    ) -> Pin<Box<dyn Future<Output = Result<SinkResponse>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.url)
                .json(&WebhookPayload { content: &body })
                .send()
                .await?;

            let status = response.status().as_u16();
            debug!(url = %self.url, status, "webhook responded");

            Ok(SinkResponse::with_status(status))
        })
    }
}
