//! Faraid command-line driver
//!
//! Usage: `faraid son=2 wife=1 [--method forward|dempster|both] [--config faraid.json]`

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use faraid::{ConfigManager, FactSet, FaraidError, InheritanceService, Method};

// ──────────────────────────────────────────────────────────────────────────────
// ARGUMENTS
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "faraid")]
#[command(version)]
#[command(about = "Islamic inheritance shares by forward chaining and Dempster-Shafer evidence")]
struct Cli {
    /// Heir counts as key=count, e.g. son=2 wife=1
    #[arg(required = true, value_parser = parse_heir_count)]
    heirs: Vec<(String, i64)>,

    /// forward, dempster or both
    #[arg(short, long, default_value = "both")]
    method: Method,

    /// Path to configuration file
    #[arg(short, long, default_value = "faraid.json")]
    config: PathBuf,
}

fn parse_heir_count(raw: &str) -> Result<(String, i64), String> {
    let (key, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected heir=count, got '{}'", raw))?;
    let count = count
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("count for '{}' is not an integer", key.trim()))?;
    Ok((key.trim().to_string(), count))
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("faraid=warn")))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();
    let config = ConfigManager::new(&cli.config).load().await?.with_env_overrides()?;
    info!(?config, method = ?cli.method, "Configuration loaded");

    let facts = FactSet::from_raw(cli.heirs);
    let service = InheritanceService::new(config);
    let outcome = match service.calculate(&facts, cli.method) {
        Ok(outcome) => outcome,
        Err(FaraidError::InvalidInput(violations)) => {
            eprintln!("Invalid heir data:");
            for violation in &violations {
                eprintln!("  - {}", violation);
            }
            std::process::exit(2);
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(forward) = &outcome.forward {
        println!("{}\n", forward.explanation());
    }
    if let Some(evidential) = &outcome.evidential {
        println!("{}\n", evidential.analysis());
    }
    if let Some(comparison) = &outcome.comparison {
        println!("{}", comparison.summary());
    }
    Ok(())
}
