mod analysis;
mod cli;
mod config;
mod error;
mod export;
mod llm;
mod parser;
mod pipeline;
mod tui;

use anyhow::Result;
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, Commands::Analyze { plain: false, .. });
    init_tracing(interactive);

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Auth {
            provider,
            key,
            list,
        } => {
            cli::commands::auth::run(provider, key, list).await?;
        }
        Commands::Analyze {
            path,
            model,
            output,
            format,
            plain,
        } => {
            cli::commands::analyze::run(path, model, output, format, plain).await?;
        }
        Commands::Ask {
            path,
            instruction,
            model,
        } => {
            cli::commands::ask::run(path, instruction, model).await?;
        }
        Commands::Sections => {
            cli::commands::sections::run().await?;
        }
        Commands::Info { path } => {
            cli::commands::info::run(path).await?;
        }
    }

    Ok(())
}

/// Only warnings by default, use RUST_LOG=info for more detail. The
/// interactive view owns the terminal, so its logs go to a file instead.
fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    let log_file = interactive
        .then(|| {
            let dir = Config::config_dir().ok()?;
            fs::create_dir_all(&dir).ok()?;
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("article-analyzer.log"))
                .ok()
        })
        .flatten();

    match log_file {
        Some(file) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None if interactive => registry.init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init(),
    }
}
