//! Terminal entry point for the portfolio rebalancer.

mod config;
mod error;
mod render;
mod session;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{info, warn};

use portfolio_rebalancer_core::models::settings::UnitPolicy;
use portfolio_rebalancer_core::PortfolioManager;

use config::{Config, DEFAULT_CONFIG_FILE};
use session::Session;

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Track a portfolio and rebalance it toward target allocations")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file [default: rebalancer.toml, if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Portfolio file used by `save` and `load` without a path
    #[arg(long)]
    file: Option<PathBuf>,

    /// Unit rounding: whole or fractional
    #[arg(long)]
    units: Option<UnitPolicy>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let (config_path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let config = match Config::load(&config_path, required) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    let mut settings = config.settings();
    if let Some(policy) = cli.units {
        settings.unit_policy = policy;
    }
    let path = cli.file.unwrap_or_else(|| config.portfolio.file.clone());

    let manager = if path.exists() {
        match PortfolioManager::load_from_file(&path, settings.clone()) {
            Ok(m) => m,
            Err(e) => {
                warn!("Could not load {}: {e}; starting empty", path.display());
                PortfolioManager::with_settings(settings)
            }
        }
    } else {
        info!("No portfolio at {}, starting empty", path.display());
        PortfolioManager::with_settings(settings)
    };

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    if prompt {
        println!(
            "Portfolio Manager ({} units). Type `help` for commands.",
            manager.settings().unit_policy
        );
    }

    let mut session = Session::new(manager, path, io::stdout());
    if let Err(e) = session.run(stdin.lock(), prompt) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
