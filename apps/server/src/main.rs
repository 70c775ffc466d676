use anyhow::Context;
use clap::Parser;
use imghub_domain::config::LogConfig;
use imghub_domain::constants::DEFAULT_CONFIG_FILE;
use imghub_kernel::config::load_app_config;
use imghub_logger::Logger;
use imghub_server::{Server, runtime};
use std::path::PathBuf;

/// Fetch images from remote URLs, store them by path and serve them back.
#[derive(Debug, Parser)]
#[command(name = "imghub-server", version, about)]
struct Cli {
    /// TOML configuration file. Missing files fall back to defaults; `IMGHUB__*` variables
    /// override either.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

fn init_logger(log: &LogConfig) -> anyhow::Result<Logger> {
    let mut builder = Logger::builder().name(env!("CARGO_PKG_NAME")).level_str(&log.level)?;
    if let Some(filter) = &log.filter {
        builder = builder.env_filter(filter);
    }

    let logger = match &log.directory {
        Some(directory) => builder.path(directory).json(log.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = load_app_config(Some(&cli.config)).context("Critical: Configuration is malformed")?;

    let _log = init_logger(&cfg.log)?;

    let workers = runtime::worker_threads(cfg.server.worker_threads);
    tracing::info!(workers, "Starting runtime");

    runtime::build(Some(workers))
        .context("Failed to start the async runtime")?
        .block_on(async { Server::builder().config(cfg).build().await?.run().await })
}
