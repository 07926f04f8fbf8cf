//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{BootstrapArgs, ImpliedVolArgs, SurfaceArgs, VanillaArgs};

/// Strike - option, curve and vol surface analytics
#[derive(Parser)]
#[command(name = "strike")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Pricing configuration (TOML)
    #[arg(short, long, global = true, env = "STRIKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Black-Scholes value and Greeks of a vanilla option
    Vanilla(VanillaArgs),

    /// Black-Scholes vol reproducing an option premium
    ImpliedVol(ImpliedVolArgs),

    /// Bootstrap a discount curve from a TOML file of deposits and swaps
    Bootstrap(BootstrapArgs),

    /// Calibrate an FX vol surface from a TOML file of tenor quotes
    Surface(SurfaceArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Minimal output (just the headline value)
    Minimal,
}
