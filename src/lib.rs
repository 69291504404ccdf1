// src/lib.rs

pub mod cli;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod session;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::watch as shutdown;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::delivery::{BodySource, DeliveryAgent, NotificationSink, WebhookSink};
use crate::fs::{FileSystem, RealFileSystem};
use crate::session::SessionRegistry;
use crate::watch::{spawn_poller, PollLoop, WatchSet};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - session setup from the `[watcher.<id>]` sections
/// - the webhook sink and delivery agent
/// - one poll loop per watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs, cfg: ConfigFile) -> Result<()> {
    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let watch_sets = start_watchers(&cfg)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let sink: Arc<dyn NotificationSink> =
        Arc::new(WebhookSink::new(cfg.sink.webhook_url.clone(), cfg.sink.timeout)?);

    let (shutdown_tx, shutdown_rx) = shutdown::channel(false);

    let loops: Vec<PollLoop> = watch_sets
        .into_iter()
        .map(|set| {
            PollLoop::new(
                set,
                Arc::clone(&fs),
                Arc::clone(&sink),
                build_agent(&cfg, Arc::clone(&fs)),
                shutdown_rx.clone(),
            )
            .with_timing(cfg.poll)
            .with_message(cfg.delivery.message.clone())
        })
        .collect();

    if args.once {
        for mut poll_loop in loops {
            let report = poll_loop.run_pass().await;
            info!(
                watcher = %poll_loop.watch_set().watcher(),
                baselined = report.baselined.len(),
                skipped = report.skipped.len(),
                "single pass complete"
            );
        }
        return Ok(());
    }

    // Ctrl-C → cooperative shutdown of every poll loop.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("shutdown requested");
        let _ = shutdown_tx.send(true);
    });

    let handles: Vec<_> = loops.into_iter().map(spawn_poller).collect();
    let mut failed = 0usize;
    for handle in handles {
        debug!(watcher = %handle.watcher(), "waiting for poll loop to stop");
        if handle.join().await.is_err() {
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} poll loop(s) stopped abnormally");
    }

    info!("all watchers stopped");
    Ok(())
}

/// Run every configured watcher through the session protocol and return the
/// frozen watch sets, in watcher-id order.
pub fn start_watchers(cfg: &ConfigFile) -> crate::errors::Result<Vec<WatchSet>> {
    let registry = SessionRegistry::from_config(cfg)?;
    cfg.watcher
        .keys()
        .map(|id| registry.start_monitoring(id))
        .collect()
}

/// Build the delivery agent described by `[delivery]`.
pub fn build_agent(cfg: &ConfigFile, fs: Arc<dyn FileSystem>) -> DeliveryAgent {
    let body = match cfg.delivery.reference_file {
        Some(ref path) => BodySource::ReferenceFile(path.clone()),
        None => BodySource::Empty,
    };

    DeliveryAgent::new(fs, body)
        .with_retry(cfg.delivery.max_attempts, cfg.delivery.retry_delay)
        .with_success_policy(cfg.delivery.success_policy)
}

/// Simple dry-run output: print watchers and delivery settings.
fn print_dry_run(cfg: &ConfigFile) {
    println!("relaywatch dry-run");
    println!("  poll.interval = {:?}", cfg.poll.interval);
    println!("  poll.permission_backoff = {:?}", cfg.poll.permission_backoff);
    println!("  delivery.max_attempts = {}", cfg.delivery.max_attempts);
    println!("  delivery.retry_delay = {:?}", cfg.delivery.retry_delay);
    println!("  delivery.success_policy = {:?}", cfg.delivery.success_policy);
    match cfg.delivery.reference_file {
        Some(ref path) => println!("  delivery.reference_file = {}", path.display()),
        None => println!("  delivery.reference_file = (none, empty body)"),
    }
    println!();

    println!("watchers ({}):", cfg.watcher.len());
    for (id, watcher) in cfg.watcher.iter() {
        println!("  - {id}");
        println!("      directory: {}", watcher.directory.display());
        for file in watcher.files.iter() {
            println!("      file: {}", watcher.directory.join(file).display());
        }
    }

    debug!("dry-run complete (no polling)");
}
