// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::SuccessPolicy;
use crate::watch::PollTiming;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [poll]
/// interval = "1s"
/// permission_backoff = "5s"
///
/// [delivery]
/// max_attempts = 2
/// retry_delay = "1s"
/// success_policy = "permissive"
/// message = "File has been modified!"
/// reference_file = "discordM.txt"
///
/// [sink]
/// webhook_url = "https://example.invalid/webhook"
///
/// [log]
/// file = "file_monitoring.log"
///
/// [watcher.alice]
/// directory = "/srv/data"
/// files = ["ledger.log", "players.txt"]
/// ```
///
/// Everything except `[sink].webhook_url` and at least one watcher has a
/// default.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub poll: PollSection,

    #[serde(default)]
    pub delivery: DeliverySection,

    #[serde(default)]
    pub sink: SinkSection,

    #[serde(default)]
    pub log: LogSection,

    /// All watchers from `[watcher.<id>]`, keyed by watcher id.
    #[serde(default)]
    pub watcher: BTreeMap<String, WatcherConfig>,
}

/// `[poll]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PollSection {
    #[serde(default = "default_interval")]
    pub interval: String,

    #[serde(default = "default_permission_backoff")]
    pub permission_backoff: String,
}

fn default_interval() -> String {
    "1s".to_string()
}

fn default_permission_backoff() -> String {
    "5s".to_string()
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            permission_backoff: default_permission_backoff(),
        }
    }
}

/// `[delivery]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliverySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay: String,

    #[serde(default)]
    pub success_policy: SuccessPolicy,

    /// Human-readable message attached to every change event.
    #[serde(default = "default_message")]
    pub message: String,

    /// File whose content is sent as the notification body. Without one, an
    /// empty body is sent.
    #[serde(default)]
    pub reference_file: Option<PathBuf>,
}

fn default_max_attempts() -> u32 {
    crate::delivery::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay() -> String {
    "1s".to_string()
}

fn default_message() -> String {
    crate::delivery::DEFAULT_MESSAGE.to_string()
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay: default_retry_delay(),
            success_policy: SuccessPolicy::default(),
            message: default_message(),
            reference_file: None,
        }
    }
}

/// `[sink]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SinkSection {
    /// Webhook endpoint. May be supplied through `RELAYWATCH_WEBHOOK_URL`
    /// instead.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Optional request timeout (e.g. `"10s"`).
    #[serde(default)]
    pub timeout: Option<String>,
}

/// `[log]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogSection {
    /// Also write logs to this file. It is emptied at startup.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// `[watcher.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherConfig {
    /// Base directory the file names are relative to.
    pub directory: PathBuf,

    /// File names, visited in this order on every pass.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Resolved delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub success_policy: SuccessPolicy,
    pub message: String,
    pub reference_file: Option<PathBuf>,
}

/// Resolved sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub webhook_url: String,
    pub timeout: Option<Duration>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub poll: PollTiming,
    pub delivery: DeliveryConfig,
    pub sink: SinkConfig,
    pub log: LogSection,
    pub watcher: BTreeMap<String, WatcherConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        poll: PollTiming,
        delivery: DeliveryConfig,
        sink: SinkConfig,
        log: LogSection,
        watcher: BTreeMap<String, WatcherConfig>,
    ) -> Self {
        Self {
            poll,
            delivery,
            sink,
            log,
            watcher,
        }
    }
}
