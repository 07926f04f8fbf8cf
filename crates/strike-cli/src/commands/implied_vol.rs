//! Implied-vol command implementation.

use anyhow::Result;
use clap::Args;

use strike_core::types::OptionType;
use strike_options::prelude::{bs_implied_vol_with_config, bs_value};
use strike_pricing::PricingConfig;

use super::Side;
use crate::cli::OutputFormat;
use crate::output::{print_metrics, KeyValue};

/// Arguments for the implied-vol command.
#[derive(Args, Debug)]
pub struct ImpliedVolArgs {
    /// Spot price
    #[arg(long)]
    pub spot: f64,

    /// Strike price
    #[arg(short, long)]
    pub strike: f64,

    /// Time to expiry in years
    #[arg(short, long)]
    pub time: f64,

    /// Continuously compounded risk-free rate (decimal)
    #[arg(short, long, default_value = "0.0")]
    pub rate: f64,

    /// Continuous dividend yield (decimal)
    #[arg(short, long, default_value = "0.0")]
    pub dividend: f64,

    /// Option premium to invert
    #[arg(short, long)]
    pub price: f64,

    /// Call or put
    #[arg(long, value_enum, default_value = "call")]
    pub side: Side,
}

/// Execute the implied-vol command.
pub fn execute(args: ImpliedVolArgs, config: &PricingConfig, format: OutputFormat) -> Result<()> {
    let option_type = OptionType::from(args.side);
    let vol = bs_implied_vol_with_config(
        args.spot,
        args.time,
        args.strike,
        args.rate,
        args.dividend,
        args.price,
        option_type,
        &config.solver.solver_config(),
    )?;
    let repriced = bs_value(args.spot, args.time, args.strike, args.rate, args.dividend, vol, option_type);

    let rows = vec![
        KeyValue::number("Premium", args.price, 6),
        KeyValue::number("Implied vol", vol, 8),
        KeyValue::number("Repricing error", repriced - args.price, 12),
    ];
    print_metrics("Implied Volatility", &rows, "Implied vol", format)
}
