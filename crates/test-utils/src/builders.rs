#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use relaywatch::config::{
    ConfigFile, DeliverySection, LogSection, PollSection, RawConfigFile, SinkSection,
    WatcherConfig,
};
use relaywatch::types::SuccessPolicy;

pub const TEST_WEBHOOK_URL: &str = "http://127.0.0.1:9/webhook";

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from defaults plus a placeholder webhook URL, so only the watchers
/// need to be added for a valid config.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                poll: PollSection::default(),
                delivery: DeliverySection::default(),
                sink: SinkSection {
                    webhook_url: Some(TEST_WEBHOOK_URL.to_string()),
                    timeout: None,
                },
                log: LogSection::default(),
                watcher: BTreeMap::new(),
            },
        }
    }

    pub fn with_watcher(mut self, id: &str, watcher: WatcherConfig) -> Self {
        self.config.watcher.insert(id.to_string(), watcher);
        self
    }

    pub fn poll_interval(mut self, interval: &str) -> Self {
        self.config.poll.interval = interval.to_string();
        self
    }

    pub fn permission_backoff(mut self, backoff: &str) -> Self {
        self.config.poll.permission_backoff = backoff.to_string();
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.delivery.max_attempts = attempts;
        self
    }

    pub fn retry_delay(mut self, delay: &str) -> Self {
        self.config.delivery.retry_delay = delay.to_string();
        self
    }

    pub fn success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.config.delivery.success_policy = policy;
        self
    }

    pub fn reference_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.delivery.reference_file = Some(path.into());
        self
    }

    pub fn webhook_url(mut self, url: Option<&str>) -> Self {
        self.config.sink.webhook_url = url.map(str::to_string);
        self
    }

    /// The raw config, for tests that exercise validation failures.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WatcherConfig`.
pub struct WatcherConfigBuilder {
    watcher: WatcherConfig,
}

impl WatcherConfigBuilder {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            watcher: WatcherConfig {
                directory: directory.into(),
                files: vec![],
            },
        }
    }

    pub fn file(mut self, name: &str) -> Self {
        self.watcher.files.push(name.to_string());
        self
    }

    pub fn build(self) -> WatcherConfig {
        self.watcher
    }
}
