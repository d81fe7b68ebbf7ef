//! `license-expr` — validate SPDX license expressions against a license registry.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config ([`config::load_config`]) and initialise logging.
//! 3. Build the immutable license registry ([`license::registry`]).
//! 4. Run the requested command:
//!    - `serve` — HTTP API ([`server`], [`api`])
//!    - `validate` — one expression ([`license::validator`], [`report`])
//!    - `list` — registry contents ([`report`])
//! 5. `validate` exits `1` on a syntax error, or with `--strict` on unknown licenses.

mod api;
mod cli;
mod config;
mod license;
mod models;
mod report;
mod server;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::{load_config, LogConfig};
use license::registry::LicenseRegistry;
use license::validator::validate;
use models::{License, LicenseOrigin, ValidationBody};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.config.as_deref())?;
    init_tracing(&config.log);

    let registry = LicenseRegistry::from_config(&config.registry)?;

    match cli.command {
        Command::Serve { bind } => {
            let mut server_config = config.server;
            if let Some(bind) = bind {
                server_config.bind = bind;
            }
            server::serve(&server_config, Arc::new(registry)).await?;
        }
        Command::Validate {
            expression,
            json,
            strict,
        } => {
            let result = validate(&registry, &expression);

            if json {
                let body = ValidationBody::from(result.clone());
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                report::terminal::render_validation(&expression, &result, &registry, cli.quiet);
            }

            if !result.valid || (strict && !result.unknown_tokens.is_empty()) {
                std::process::exit(1);
            }
        }
        Command::List { origin, json } => {
            let origin: Option<LicenseOrigin> = origin.as_ref().map(Into::into);
            let licenses: Vec<&License> = registry
                .iter()
                .filter(|l| origin.map_or(true, |o| l.origin == o))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&licenses)?);
            } else {
                report::terminal::render_licenses(&licenses, cli.quiet);
            }
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` takes precedence over `log.filter`.
fn init_tracing(log: &LogConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}
