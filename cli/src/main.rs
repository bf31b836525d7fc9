//! Command-line entry point for the Kayako email duplicator.
//!
//! Reads one raw email from stdin, produces a uniquely modified copy for
//! each destination address, and re-injects every copy through a
//! sendmail-compatible transport so the downstream ticketing system
//! treats them as distinct new tickets.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::Parser;
use kayako_dup_utils::{
    load_config, parse_destinations, Config, DispatchFailure, Duplicator, MessageIdSource,
    SendmailHandler,
};
use tokio::io::{stdin, AsyncReadExt};
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Comma-separated list of destination addresses
    destinations: Option<String>,

    /// Optional TOML configuration file
    #[arg(long, env = "KAYAKO_DUP_CONFIG")]
    config: Option<PathBuf>,

    /// Transport command override
    #[arg(long)]
    sendmail: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

fn setup_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => "warn",
    };

    // Diagnostics go to stderr; stdout stays clean for pipeline use
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(&args.log_level);

    let destinations = match &args.destinations {
        Some(list) => parse_destinations(list),
        None => {
            eprintln!("Usage: kayako-dup <addr1,addr2,...>");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &destinations).await {
        Ok(failures) if failures.is_empty() => ExitCode::SUCCESS,
        Ok(failures) => {
            for failure in &failures {
                eprintln!("Error: {}: {}", failure.destination, failure.cause);
            }
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, destinations: &[String]) -> Result<Vec<DispatchFailure>> {
    if destinations.is_empty() {
        bail!("no destination addresses provided");
    }

    let mut raw = Vec::new();
    stdin()
        .read_to_end(&mut raw)
        .await
        .context("failed to read email from stdin")?;
    if raw.is_empty() {
        bail!("no email data on stdin");
    }

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let ident = match &config.message.domain {
        Some(domain) => MessageIdSource::new(domain.clone()),
        None => MessageIdSource::local_host(),
    };

    let command = args
        .sendmail
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.transport.command));
    let handler = Arc::new(SendmailHandler::new(command, config.transport.args.clone()));

    info!(
        destinations = destinations.len(),
        domain = ident.domain(),
        "Starting duplication batch"
    );

    let duplicator = Duplicator::new(ident, config.message.tag_length, handler);
    Ok(duplicator.run(&raw, destinations).await)
}
