mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use redact_config::Config;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Logs go to stderr; the review screen only wants warnings
    let default_filter = match cli.command {
        cli::Commands::Review { .. } => "warn",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load_or_create(&config_path),
    }
    .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    match cli.command {
        cli::Commands::Scan { inputs } => commands::scan::handle(&inputs, &config),
        cli::Commands::Apply {
            inputs,
            output,
            audit,
        } => commands::apply::handle(&inputs, output.as_deref(), audit, &config),
        cli::Commands::Review { inputs, output } => {
            commands::review::handle(&inputs, output, &config)
        }
        cli::Commands::Config => commands::config::handle(&config_path, &config),
    }
}
