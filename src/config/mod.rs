// src/config/mod.rs

//! Configuration loading and validation for relaywatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and apply environment overrides
//!   (`loader.rs`).
//! - Validate and resolve raw values into typed settings (`validate.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use validate::MAX_DURATION;
pub use loader::{
    apply_env_overrides, apply_env_overrides_with, default_config_path, load_and_validate,
    load_from_path, WEBHOOK_URL_ENV,
};
pub use model::{
    ConfigFile, DeliveryConfig, DeliverySection, LogSection, PollSection, RawConfigFile,
    SinkConfig, SinkSection, WatcherConfig,
};
