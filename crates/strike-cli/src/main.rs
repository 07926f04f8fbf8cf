//! Strike CLI - command-line pricing, implied vols, curves and surfaces.
//!
//! # Usage
//!
//! ```bash
//! # Price a European call with Greeks
//! strike vanilla --spot 100 --strike 100 --time 1 --rate 0.05 --dividend 0.01 --vol 0.30
//!
//! # Invert a premium to a Black-Scholes vol
//! strike implied-vol --spot 100 --strike 100 --time 1 --rate 0.05 --dividend 0.01 --price 13.6164
//!
//! # Bootstrap a curve from deposits and swaps
//! strike bootstrap curve.toml
//!
//! # Calibrate an FX vol surface
//! strike --config pricing.toml surface surface.toml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use strike_pricing::PricingConfig;

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info,strike=debug" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match &cli.config {
        Some(path) => PricingConfig::from_file(path)
            .with_context(|| format!("loading pricing configuration from {}", path.display()))?,
        None => PricingConfig::default(),
    };
    debug!(?config, "pricing configuration");

    let format = cli.format;
    match cli.command {
        Commands::Vanilla(args) => commands::vanilla::execute(args, &config, format)?,
        Commands::ImpliedVol(args) => commands::implied_vol::execute(args, &config, format)?,
        Commands::Bootstrap(args) => commands::bootstrap::execute(args, &config, format)?,
        Commands::Surface(args) => commands::surface::execute(args, &config, format)?,
    }

    Ok(())
}
