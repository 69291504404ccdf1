// src/main.rs

use relaywatch::{cli, config, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("relaywatch error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    // Config first: the log file location lives in it.
    let cfg = config::load_and_validate(&args.config)?;
    logging::init_logging(args.log_level, cfg.log.file.as_deref())?;
    run(args, cfg).await
}
