//! # Papr
//!
//! Runs one registry command and prints its JSON result on stdout. Failures
//! print a report naming the error kind and stage, and exit non-zero.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use shared_types::Report;

use papr_runtime::logging::init_logging;
use papr_runtime::{CommandRegistry, PaprConfig, PaprContext};

/// Confidential manuscript publishing and anonymized peer review.
#[derive(Parser, Debug)]
#[command(name = "papr", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "PAPR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a command with JSON parameters
    Call {
        /// Command name, see `papr commands`
        name: String,
        /// Parameters as a JSON object
        #[arg(default_value = "{}")]
        params: String,
    },
    /// List available commands
    Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let registry = CommandRegistry::new();

    let (name, params) = match cli.command {
        Command::Commands => {
            for name in registry.names() {
                println!("{name}");
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Call { name, params } => (name, params),
    };

    let config = PaprConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_logging(&config.logging).map_err(anyhow::Error::msg)?;

    let params: Value =
        serde_json::from_str(&params).context("command parameters must be JSON")?;
    if !registry.contains(&name) {
        anyhow::bail!("unknown command {name}; run `papr commands` for the list");
    }

    let context = Arc::new(PaprContext::open(config)?);
    match registry.dispatch(context, &name, params).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let report = Report::from_error(&e);
            report.log();
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
