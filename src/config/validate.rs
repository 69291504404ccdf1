// src/config/validate.rs

use std::time::Duration;

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, DeliveryConfig, RawConfigFile, SinkConfig};
use crate::errors::{RelayError, Result};
use crate::watch::PollTiming;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RelayError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_watchers(&raw)?;
        validate_watchers(&raw)?;

        let poll = resolve_poll(&raw)?;
        let delivery = resolve_delivery(&raw)?;
        let sink = resolve_sink(&raw)?;

        Ok(ConfigFile::new_unchecked(
            poll,
            delivery,
            sink,
            raw.log,
            raw.watcher,
        ))
    }
}

fn ensure_has_watchers(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watcher.is_empty() {
        return Err(RelayError::ConfigError(
            "config must contain at least one [watcher.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_watchers(cfg: &RawConfigFile) -> Result<()> {
    for (id, watcher) in cfg.watcher.iter() {
        if watcher.directory.as_os_str().is_empty() {
            return Err(RelayError::ConfigError(format!(
                "watcher '{}' has an empty `directory`",
                id
            )));
        }
        if watcher.files.is_empty() {
            return Err(RelayError::ConfigError(format!(
                "watcher '{}' must select at least one file in `files`",
                id
            )));
        }
        if let Some(pos) = watcher.files.iter().position(|f| f.trim().is_empty()) {
            return Err(RelayError::ConfigError(format!(
                "watcher '{}' has an empty file name at files[{}]",
                id, pos
            )));
        }
    }
    Ok(())
}

fn resolve_poll(cfg: &RawConfigFile) -> Result<PollTiming> {
    let interval = duration_field("[poll].interval", &cfg.poll.interval)?;
    if interval.is_zero() {
        return Err(RelayError::ConfigError(
            "[poll].interval must be greater than zero".to_string(),
        ));
    }

    let permission_backoff =
        duration_field("[poll].permission_backoff", &cfg.poll.permission_backoff)?;

    Ok(PollTiming {
        interval,
        permission_backoff,
    })
}

fn resolve_delivery(cfg: &RawConfigFile) -> Result<DeliveryConfig> {
    let section = &cfg.delivery;

    if section.max_attempts == 0 {
        return Err(RelayError::ConfigError(
            "[delivery].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(DeliveryConfig {
        max_attempts: section.max_attempts,
        retry_delay: duration_field("[delivery].retry_delay", &section.retry_delay)?,
        success_policy: section.success_policy,
        message: section.message.clone(),
        reference_file: section.reference_file.clone(),
    })
}

fn resolve_sink(cfg: &RawConfigFile) -> Result<SinkConfig> {
    let webhook_url = match cfg.sink.webhook_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            return Err(RelayError::ConfigError(format!(
                "[sink].webhook_url is required (or set {})",
                crate::config::loader::WEBHOOK_URL_ENV
            )));
        }
    };

    let timeout = cfg
        .sink
        .timeout
        .as_deref()
        .map(|t| duration_field("[sink].timeout", t))
        .transpose()?;

    Ok(SinkConfig {
        webhook_url,
        timeout,
    })
}

/// Upper bound for every configured duration.
pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn duration_field(field: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|msg| RelayError::ConfigError(format!("{}: {}", field, msg)))?;

    if duration > MAX_DURATION {
        return Err(RelayError::ConfigError(format!(
            "{}: duration '{}' exceeds the maximum of 7 days",
            field,
            value.trim()
        )));
    }
    Ok(duration)
}
