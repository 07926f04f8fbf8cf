//! Vanilla command implementation.
//!
//! Values a European option in closed form with its Greeks, or an
//! American option by Barone-Adesi–Whaley and a CRR tree.

use anyhow::{ensure, Result};
use clap::Args;

use strike_core::types::{ExerciseType, OptionType};
use strike_options::prelude::{baw_value, crr_tree, BsParams};
use strike_pricing::PricingConfig;

use super::Side;
use crate::cli::OutputFormat;
use crate::output::{print_metrics, KeyValue};

/// Arguments for the vanilla command.
#[derive(Args, Debug)]
pub struct VanillaArgs {
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

    /// Black-Scholes volatility (decimal)
    #[arg(short, long)]
    pub vol: f64,

    /// Call or put
    #[arg(long, value_enum, default_value = "call")]
    pub side: Side,

    /// Allow early exercise
    #[arg(long)]
    pub american: bool,
}

/// Execute the vanilla command.
pub fn execute(args: VanillaArgs, config: &PricingConfig, format: OutputFormat) -> Result<()> {
    ensure!(args.spot > 0.0, "spot must be positive, got {}", args.spot);
    ensure!(args.strike > 0.0, "strike must be positive, got {}", args.strike);
    ensure!(args.time > 0.0, "time to expiry must be positive, got {}", args.time);
    ensure!(args.vol > 0.0, "vol must be positive, got {}", args.vol);

    let option_type = OptionType::from(args.side);
    let mut rows = vec![
        KeyValue::new("Option", format!("{} {option_type:?}", if args.american { "American" } else { "European" })),
        KeyValue::number("Spot", args.spot, 4),
        KeyValue::number("Strike", args.strike, 4),
        KeyValue::number("Expiry (years)", args.time, 4),
        KeyValue::percent("Rate", args.rate),
        KeyValue::percent("Dividend", args.dividend),
        KeyValue::percent("Vol", args.vol),
    ];

    if args.american {
        let baw = baw_value(args.spot, args.time, args.strike, args.rate, args.dividend, args.vol, option_type)?;
        let tree = crr_tree(
            args.spot,
            args.time,
            args.strike,
            args.rate,
            args.dividend,
            args.vol,
            option_type,
            ExerciseType::American,
            config.tree.steps,
        )?;
        rows.extend([
            KeyValue::number("Value", tree.value, 6),
            KeyValue::number("BAW value", baw, 6),
            KeyValue::number("Delta", tree.delta, 6),
            KeyValue::number("Gamma", tree.gamma, 6),
            KeyValue::number("Theta", tree.theta, 6),
            KeyValue::new("Tree steps", config.tree.steps.to_string()),
        ]);
    } else {
        let greeks = BsParams::new(args.spot, args.time, args.strike, args.rate, args.dividend, args.vol, option_type)
            .greeks();
        rows.extend([
            KeyValue::number("Value", greeks.value, 6),
            KeyValue::number("Delta", greeks.delta, 6),
            KeyValue::number("Gamma", greeks.gamma, 6),
            KeyValue::number("Vega", greeks.vega, 6),
            KeyValue::number("Theta", greeks.theta, 6),
            KeyValue::number("Rho", greeks.rho, 6),
        ]);
    }

    print_metrics("Vanilla Option", &rows, "Value", format)
}
