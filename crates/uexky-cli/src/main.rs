#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::command::run;
use cli::config::{AppConfig, CliArgs};
use cli::telemetry::init_telemetry;
use std::io::{BufWriter, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry(config.log_format)?;
    tracing::debug!("Starting with config: {:#?}", config);

    let mut out = BufWriter::new(std::io::stdout());
    run(&config, &mut out).await?;
    out.flush()?;
    Ok(())
}
