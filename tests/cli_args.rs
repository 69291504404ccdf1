use std::path::PathBuf;

use clap::Parser;
use relaywatch::cli::{CliArgs, LogLevel};
use relaywatch::config::default_config_path;

#[test]
fn config_path_defaults_to_relaywatch_toml() {
    let args = CliArgs::try_parse_from(["relaywatch"]).unwrap();

    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, PathBuf::from("Relaywatch.toml"));
    assert!(!args.once);
    assert!(!args.dry_run);
    assert!(args.log_level.is_none());
}

#[test]
fn flags_are_parsed() {
    let args = CliArgs::try_parse_from([
        "relaywatch",
        "--config",
        "demos/relaywatch.toml",
        "--once",
        "--dry-run",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert_eq!(args.config, PathBuf::from("demos/relaywatch.toml"));
    assert!(args.once);
    assert!(args.dry_run);
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(CliArgs::try_parse_from(["relaywatch", "--log-level", "loud"]).is_err());
}
