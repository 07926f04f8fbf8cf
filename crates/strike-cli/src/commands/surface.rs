//! Surface command implementation.
//!
//! Calibrates an FX vol surface to ATM, strangle and risk reversal quotes
//! read from a TOML file:
//!
//! ```toml
//! valuation_date = "2024-01-02"
//! spot = 1.3465
//! domestic_rate = 0.0294
//! foreign_rate = 0.0171
//! function = "CLARK"
//!
//! [[quotes]]
//! tenor = "1Y"
//! atm_vol = 0.21
//! ms25 = 0.0075
//! rr25 = -0.0025
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::info;

use strike_core::Date;
use strike_curves::curves::FlatCurve;
use strike_options::fx::DeltaMethod;
use strike_pricing::PricingConfig;
use strike_vol::prelude::*;

use super::read_toml;
use crate::cli::OutputFormat;
use crate::output::{print_header, print_output};

/// Arguments for the surface command.
#[derive(Args, Debug)]
pub struct SurfaceArgs {
    /// Surface quotes (TOML)
    pub file: PathBuf,
}

/// Spot, flat rates, conventions and per-tenor quotes.
#[derive(Debug, Deserialize)]
struct SurfaceFile {
    valuation_date: Date,
    spot: f64,
    domestic_rate: f64,
    foreign_rate: f64,
    #[serde(default)]
    function: VolFunctionType,
    #[serde(default)]
    atm_method: AtmMethod,
    #[serde(default)]
    delta_method: DeltaMethod,
    quotes: Vec<FxVolQuote>,
}

/// One calibrated tenor.
#[derive(Debug, Serialize, Tabled)]
pub struct TenorRow {
    #[tabled(rename = "Tenor")]
    pub tenor: String,
    #[tabled(rename = "Expiry")]
    pub expiry: String,
    #[tabled(rename = "ATM strike")]
    pub atm_strike: String,
    #[tabled(rename = "25D put")]
    pub put_25d: String,
    #[tabled(rename = "25D call")]
    pub call_25d: String,
    #[tabled(rename = "ATM err")]
    pub atm_error: String,
    #[tabled(rename = "MS25 err")]
    pub ms25_error: String,
    #[tabled(rename = "RR25 err")]
    pub rr25_error: String,
    #[tabled(rename = "Objective")]
    pub objective: String,
}

fn calibrate(file: &SurfaceFile, config: &PricingConfig) -> Result<FxVolSurface> {
    let domestic = FlatCurve::continuous(file.valuation_date, file.domestic_rate);
    let foreign = FlatCurve::continuous(file.valuation_date, file.foreign_rate);
    Ok(FxVolSurface::builder(file.valuation_date, file.spot)
        .with_function(file.function)
        .with_atm_method(file.atm_method)
        .with_delta_method(file.delta_method)
        .with_config(config.calibration)
        .add_quotes(file.quotes.iter().cloned())
        .build(&domestic, &foreign)?)
}

/// Execute the surface command.
pub fn execute(args: SurfaceArgs, config: &PricingConfig, format: OutputFormat) -> Result<()> {
    let file: SurfaceFile = read_toml(&args.file)?;
    info!(
        file = %args.file.display(),
        function = ?file.function,
        tenors = file.quotes.len(),
        "calibrating vol surface"
    );

    let surface = calibrate(&file, config)?;
    let rows: Vec<TenorRow> = surface
        .tenors()
        .iter()
        .zip(surface.calibration_report())
        .map(|(tenor, report)| TenorRow {
            tenor: tenor.quote.tenor.to_string(),
            expiry: tenor.expiry.to_string(),
            atm_strike: format!("{:.6}", tenor.atm_strike),
            put_25d: format!("{:.6}", tenor.wing_25d.put),
            call_25d: format!("{:.6}", tenor.wing_25d.call),
            atm_error: format!("{:.2e}", report.atm_vol_error),
            ms25_error: format!("{:.2e}", report.ms25_premium_error),
            rr25_error: format!("{:.2e}", report.rr25_error),
            objective: format!("{:.2e}", report.objective),
        })
        .collect();

    if format == OutputFormat::Table {
        print_header(&format!("{:?} surface, spot {}", surface.function_type(), surface.spot()));
    }
    print_output(&rows, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clark_surface_file() {
        let file: SurfaceFile = toml::from_str(
            r#"
            valuation_date = "2024-01-02"
            spot = 1.3465
            domestic_rate = 0.0294
            foreign_rate = 0.0171
            function = "CLARK"

            [[quotes]]
            tenor = "1Y"
            atm_vol = 0.21
            ms25 = 0.0075
            rr25 = -0.0025
            "#,
        )
        .unwrap();
        let surface = calibrate(&file, &PricingConfig::default()).unwrap();
        let report = &surface.calibration_report()[0];
        assert!(report.atm_vol_error.abs() < 1e-4);
        assert!(report.rr25_error.abs() < 1e-4);
    }
}
