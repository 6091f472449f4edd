// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use kp::cli::Cli;
use kp::commands;
use kp::config::Config;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr, command output to stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    debug!(
        "Configuration loaded: config_map={}/{}",
        config.config_namespace, config.config_map
    );

    match commands::execute(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_retryable() {
                warn!("Command failed on a concurrent modification: {}", e);
            }
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
