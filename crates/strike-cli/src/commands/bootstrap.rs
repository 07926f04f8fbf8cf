//! Bootstrap command implementation.
//!
//! Reads deposit and swap quotes from a TOML file:
//!
//! ```toml
//! valuation_date = "2025-01-02"
//! interpolation = "LINEAR_ZERO_RATES"
//!
//! [[deposits]]
//! tenor = "6M"
//! rate = 0.034
//!
//! [[swaps]]
//! tenor = "1Y"
//! rate = 0.035
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::info;

use strike_core::calendars::{BusinessDayConvention, CalendarType};
use strike_core::daycounts::DayCountType;
use strike_core::types::{Compounding, Frequency};
use strike_core::Date;
use strike_curves::prelude::*;
use strike_pricing::PricingConfig;

use super::{parse_date, read_toml};
use crate::cli::OutputFormat;
use crate::output::{print_header, print_output, print_success, print_warning};

/// Arguments for the bootstrap command.
#[derive(Args, Debug)]
pub struct BootstrapArgs {
    /// Curve definition (TOML)
    pub file: PathBuf,

    /// Overrides the valuation date in the file (YYYY-MM-DD)
    #[arg(long)]
    pub valuation_date: Option<String>,
}

/// Quotes and conventions of one curve.
#[derive(Debug, Deserialize)]
struct CurveFile {
    valuation_date: Date,
    #[serde(default)]
    calendar: CalendarType,
    #[serde(default)]
    interpolation: InterpolationType,
    #[serde(default)]
    deposits: Vec<DepositQuote>,
    #[serde(default)]
    swaps: Vec<SwapQuote>,
}

#[derive(Debug, Deserialize)]
struct DepositQuote {
    tenor: String,
    rate: f64,
    #[serde(default = "deposit_day_count")]
    day_count: DayCountType,
}

#[derive(Debug, Deserialize)]
struct SwapQuote {
    tenor: String,
    rate: f64,
    #[serde(default)]
    frequency: Frequency,
    #[serde(default = "swap_day_count")]
    day_count: DayCountType,
}

fn deposit_day_count() -> DayCountType {
    DayCountType::Act360
}

fn swap_day_count() -> DayCountType {
    DayCountType::Thirty360Bond
}

/// One row of the bootstrap output.
#[derive(Debug, Serialize, Tabled)]
pub struct KnotRow {
    #[tabled(rename = "Instrument")]
    pub instrument: String,
    #[tabled(rename = "Maturity")]
    pub maturity: String,
    #[tabled(rename = "DF")]
    pub df: String,
    #[tabled(rename = "Zero (cont.)")]
    pub zero_rate: String,
    #[tabled(rename = "Repricing PV")]
    pub pv: String,
}

fn bootstrapper(file: &CurveFile, valuation: Date, config: &PricingConfig) -> Result<IborBootstrapper> {
    let mut builder = IborBootstrapper::new(valuation).with_config(BootstrapConfig {
            interpolation: file.interpolation,
            tolerance: config.solver.tolerance,
            max_iterations: config.solver.max_iterations,
            ..BootstrapConfig::default()
        });
    for quote in &file.deposits {
        builder = builder.with_deposit(Deposit::from_tenor(
            valuation,
            &quote.tenor,
            quote.rate,
            quote.day_count,
            file.calendar,
        )?);
    }
    for quote in &file.swaps {
        builder = builder.with_swap(Swap::with_calendar(
            valuation,
            valuation.add_tenor_str(&quote.tenor)?,
            quote.rate,
            quote.frequency,
            quote.day_count,
            file.calendar,
            BusinessDayConvention::ModifiedFollowing,
        )?);
    }
    Ok(builder)
}

/// Execute the bootstrap command.
pub fn execute(args: BootstrapArgs, config: &PricingConfig, format: OutputFormat) -> Result<()> {
    let file: CurveFile = read_toml(&args.file)?;
    let valuation = match &args.valuation_date {
        Some(s) => parse_date(s)?,
        None => file.valuation_date,
    };
    info!(
        file = %args.file.display(),
        %valuation,
        deposits = file.deposits.len(),
        swaps = file.swaps.len(),
        "bootstrapping curve"
    );

    let result = bootstrapper(&file, valuation, config)?.build()?;
    let curve = &result.curve;
    let rows: Vec<KnotRow> = result
        .instruments
        .iter()
        .zip(result.report.checks())
        .map(|(instrument, check)| {
            let maturity = instrument.maturity();
            let t = curve.time(maturity);
            KnotRow {
                instrument: check.instrument.clone(),
                maturity: maturity.to_string(),
                df: format!("{:.10}", curve.df(maturity)),
                zero_rate: format!("{:.6}%", 100.0 * curve.zero_rate(t, Compounding::Continuous)),
                pv: format!("{:.2e}", check.pv),
            }
        })
        .collect();

    if format == OutputFormat::Table {
        print_header(&format!("Curve bootstrapped on {valuation}"));
    }
    print_output(&rows, format)?;
    if format == OutputFormat::Table {
        if result.report.is_valid() {
            print_success(&format!(
                "every instrument reprices, max error {:.2e}",
                result.report.max_error()
            ));
        } else {
            print_warning(&result.report.to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_three_par_swaps() {
        let file: CurveFile = toml::from_str(
            r#"
            valuation_date = "2025-01-02"

            [[swaps]]
            tenor = "1Y"
            rate = 0.035

            [[swaps]]
            tenor = "2Y"
            rate = 0.04

            [[swaps]]
            tenor = "3Y"
            rate = 0.045
            "#,
        )
        .unwrap();
        assert_eq!(file.swaps[0].frequency, Frequency::Annual);
        let result = bootstrapper(&file, file.valuation_date, &PricingConfig::default())
            .unwrap()
            .build()
            .unwrap();
        assert!(result.report.is_valid());
        for check in result.report.checks() {
            assert!(check.pv.abs() < 1e-10);
        }
        let last = result.instruments.last().map(CalibrationInstrument::maturity).unwrap();
        assert!(result.curve.df(last) < 1.0);
        assert_relative_eq!(result.report.max_error(), 0.0, epsilon = 1e-10);
    }
}
