use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::time::Instant;
use relaywatch::delivery::{NotificationSink, SinkResponse};
use relaywatch::errors::{RelayError, Result};

/// What the fake sink answers to one post.
#[derive(Debug, Clone)]
pub enum Reply {
    Status(u16),
    NoStatus,
    Fail(String),
}

/// One recorded post.
#[derive(Debug, Clone)]
pub struct Post {
    pub body: String,
    pub at: Instant,
}

/// A fake sink that:
/// - records every posted body together with the (virtual) time it was sent
/// - answers from a script, then from `fallback` once the script runs out.
///
/// Clones share the same script and record.
#[derive(Debug, Clone)]
pub struct FakeSink {
    script: Arc<Mutex<VecDeque<Reply>>>,
    fallback: Reply,
    posts: Arc<Mutex<Vec<Post>>>,
}

impl FakeSink {
    pub fn scripted(replies: impl IntoIterator<Item = Reply>, fallback: Reply) -> Self {
        Self {
            script: Arc::new(Mutex::new(replies.into_iter().collect())),
            fallback,
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn always_ok() -> Self {
        Self::scripted([], Reply::Status(204))
    }

    pub fn always_failing() -> Self {
        Self::scripted([], Reply::Fail("connection refused".to_string()))
    }

    pub fn posts(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

impl NotificationSink for FakeSink {
    fn post(
        &self,
        body: String,
    ) -> Pin<Box<dyn Future<Output = Result<SinkResponse>> + Send + '_>> {
        Box::pin(async move {
            self.posts.lock().unwrap().push(Post {
                body,
                at: Instant::now(),
            });

            let reply = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());

            match reply {
                Reply::Status(status) => Ok(SinkResponse::with_status(status)),
                Reply::NoStatus => Ok(SinkResponse::without_status()),
                Reply::Fail(message) => Err(RelayError::SinkError(message)),
            }
        })
    }
}
