// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable that overrides `[sink].webhook_url`.
///
/// Lets the endpoint (which usually embeds a secret) stay out of the config
/// file.
pub const WEBHOOK_URL_ENV: &str = "RELAYWATCH_WEBHOOK_URL";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** apply
/// environment overrides or validate anything. Use [`load_and_validate`] for
/// that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file, apply environment overrides and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Applies `RELAYWATCH_WEBHOOK_URL`.
/// - Checks for:
///   - at least one watcher with at least one file,
///   - a webhook URL,
///   - parseable durations and sane retry settings.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let mut raw_config = load_from_path(&path)?;
    apply_env_overrides(&mut raw_config);
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(raw: &mut RawConfigFile) {
    apply_env_overrides_with(raw, |key| std::env::var(key).ok());
}

/// Apply overrides using `lookup` in place of the process environment.
pub fn apply_env_overrides_with<F>(raw: &mut RawConfigFile, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(WEBHOOK_URL_ENV).filter(|u| !u.trim().is_empty()) {
        raw.sink.webhook_url = Some(url);
    }
}

/// Default config path: `Relaywatch.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Relaywatch.toml")
}
