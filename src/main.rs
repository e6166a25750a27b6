use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod infrastructure;
mod observability;
mod services;
mod ui;

use cli::{Cli, Commands};
use commands::{clean, invoke, package, resolve};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // LOGGING=debug, LOG_LEVEL=warn, or --verbose
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            manifest,
            warmer,
            format,
        } => resolve::execute(manifest, warmer, format)?,
        Commands::Package { manifest, format } => package::execute(manifest, format)?,
        Commands::Clean { manifest, all } => clean::execute(manifest, all)?,
        Commands::Invoke {
            manifest,
            warmers,
            prewarm,
            endpoint,
            timeout,
            fail_on_error,
        } => {
            invoke::execute(
                manifest,
                invoke::InvokeOptions {
                    warmers,
                    prewarm,
                    endpoint,
                    timeout,
                    fail_on_error,
                },
            )
            .await?
        }
    }

    Ok(())
}
