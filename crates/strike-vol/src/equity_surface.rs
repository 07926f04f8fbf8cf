//! Equity volatility surface fitted per expiry to strike-vol quotes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use strike_core::Date;
use strike_curves::Curve;
use strike_math::optimization::{minimize, OptimizationConfig};

use crate::calibration::{optimiser_failure, CalibrationConfig};
use crate::error::{VolError, VolResult};
use crate::function::{VolFunction, VolFunctionType};
use crate::traits::{interpolate_vol, year_fraction, VolSurface};

/// Quoted smile at one expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityVolQuote {
    /// Expiry date.
    pub expiry: Date,
    /// Strikes, strictly increasing.
    pub strikes: Vec<f64>,
    /// Black vols at the strikes.
    pub vols: Vec<f64>,
}

impl EquityVolQuote {
    /// Creates a quote set and checks it.
    pub fn new(expiry: Date, strikes: Vec<f64>, vols: Vec<f64>) -> VolResult<Self> {
        let quote = Self { expiry, strikes, vols };
        quote.validate()?;
        Ok(quote)
    }

    fn validate(&self) -> VolResult<()> {
        if self.strikes.len() != self.vols.len() {
            return Err(VolError::invalid_input(format!(
                "{}: {} strikes but {} vols",
                self.expiry,
                self.strikes.len(),
                self.vols.len()
            )));
        }
        if self.strikes.iter().any(|k| !(k.is_finite() && *k > 0.0))
            || self.vols.iter().any(|v| !(v.is_finite() && *v > 0.0))
        {
            return Err(VolError::invalid_input(format!(
                "{}: strikes and vols must be positive",
                self.expiry
            )));
        }
        if self.strikes.windows(2).any(|w| w[1] <= w[0]) {
            return Err(VolError::invalid_input(format!(
                "{}: strikes must be strictly increasing",
                self.expiry
            )));
        }
        Ok(())
    }

    /// Quoted vol nearest to `strike`.
    fn nearest_vol(&self, strike: f64) -> f64 {
        self.strikes
            .iter()
            .zip(&self.vols)
            .min_by(|a, b| (a.0 - strike).abs().total_cmp(&(b.0 - strike).abs()))
            .map_or(0.2, |(_, v)| *v)
    }
}

/// One fitted expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityVolSlice {
    /// Expiry date.
    pub expiry: Date,
    /// Expiry in years (ACT/365F).
    pub time: f64,
    /// Forward at expiry.
    pub forward: f64,
    /// Fitted smile.
    pub function: VolFunction,
    /// Root-mean-square vol error of the fit.
    pub rmse: f64,
}

impl EquityVolSlice {
    /// Smile vol at `strike`.
    pub fn vol(&self, strike: f64) -> f64 {
        self.function.vol(self.forward, strike, self.time)
    }
}

/// Equity volatility surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityVolSurface {
    anchor: Date,
    spot: f64,
    function_type: VolFunctionType,
    slices: Vec<EquityVolSlice>,
}

impl EquityVolSurface {
    /// Starts a builder.
    pub fn builder(anchor: Date, spot: f64) -> EquityVolSurfaceBuilder {
        EquityVolSurfaceBuilder {
            anchor,
            spot,
            quotes: Vec::new(),
            function_type: VolFunctionType::Svi,
            config: CalibrationConfig::default(),
        }
    }

    /// Spot price.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Smile parametrisation.
    pub fn function_type(&self) -> VolFunctionType {
        self.function_type
    }

    /// Fitted expiries in order.
    pub fn slices(&self) -> &[EquityVolSlice] {
        &self.slices
    }

    fn times(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.time).collect()
    }
}

impl VolSurface for EquityVolSurface {
    fn reference_date(&self) -> Date {
        self.anchor
    }

    fn vol(&self, strike: f64, t: f64) -> f64 {
        interpolate_vol(&self.times(), t, |i| self.slices[i].vol(strike))
    }
}

/// Builder for [`EquityVolSurface`].
#[derive(Debug, Clone)]
pub struct EquityVolSurfaceBuilder {
    anchor: Date,
    spot: f64,
    quotes: Vec<EquityVolQuote>,
    function_type: VolFunctionType,
    config: CalibrationConfig,
}

impl EquityVolSurfaceBuilder {
    /// Adds the smile quoted at one expiry.
    #[must_use]
    pub fn add_expiry(mut self, quote: EquityVolQuote) -> Self {
        self.quotes.push(quote);
        self
    }

    /// Sets the smile parametrisation. Vanna-volga needs FX pillars and
    /// is rejected at build time.
    #[must_use]
    pub fn with_function(mut self, function_type: VolFunctionType) -> Self {
        self.function_type = function_type;
        self
    }

    /// Sets the optimiser settings; `max_objective` bounds the mean
    /// squared vol error of each expiry.
    #[must_use]
    pub fn with_config(mut self, config: CalibrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Fits every expiry against a discount curve and a continuous
    /// dividend yield.
    pub fn build<C: Curve>(self, curve: &C, dividend_yield: f64) -> VolResult<EquityVolSurface> {
        if self.function_type == VolFunctionType::VannaVolga {
            return Err(VolError::invalid_input(
                "vanna-volga smiles are built from FX pillars, not strike quotes",
            ));
        }
        if !(self.spot.is_finite() && self.spot > 0.0) || !dividend_yield.is_finite() {
            return Err(VolError::invalid_input(format!(
                "spot must be positive and dividend yield finite, got {} and {dividend_yield}",
                self.spot
            )));
        }
        if self.quotes.is_empty() {
            return Err(VolError::invalid_input("surface needs at least one expiry"));
        }
        self.config.validate()?;

        let optimizer = OptimizationConfig::default()
            .with_max_iterations(self.config.max_iterations)
            .with_tolerance(self.config.tolerance);
        let needed = self.function_type.num_params();

        let mut slices: Vec<EquityVolSlice> = Vec::with_capacity(self.quotes.len());
        for quote in &self.quotes {
            quote.validate()?;
            let label = quote.expiry.to_string();
            let time = year_fraction(self.anchor, quote.expiry);
            if time <= 0.0 {
                return Err(VolError::invalid_input(format!("{label}: expiry is not after {}", self.anchor)));
            }
            if slices.last().is_some_and(|prev| time <= prev.time) {
                return Err(VolError::invalid_input(format!("{label}: expiries must be increasing")));
            }
            if quote.strikes.len() < needed {
                return Err(VolError::invalid_input(format!(
                    "{label}: {} needs at least {needed} quotes, got {}",
                    self.function_type,
                    quote.strikes.len()
                )));
            }

            let df = curve.df(quote.expiry);
            if !(df > 0.0) {
                return Err(VolError::invalid_input(format!("{label}: discount factor must be positive")));
            }
            let forward = self.spot * (-dividend_yield * time).exp() / df;

            let n = quote.strikes.len() as f64;
            let objective = |theta: &[f64]| -> f64 {
                let Ok(function) = VolFunction::from_params(self.function_type, theta) else {
                    return f64::INFINITY;
                };
                quote
                    .strikes
                    .iter()
                    .zip(&quote.vols)
                    .map(|(k, v)| {
                        let e = function.vol(forward, *k, time) - v;
                        e * e
                    })
                    .sum::<f64>()
                    / n
            };

            let initial = initial_guess(self.function_type, quote.nearest_vol(forward), forward, time);
            let result = minimize(&objective, &initial, &optimizer)
                .map_err(|e| optimiser_failure(&label, objective(&initial), &e))?;
            if !(result.objective_value <= self.config.max_objective) {
                warn!(expiry = %label, objective = result.objective_value, "equity smile fit above threshold");
                return Err(VolError::calibration_failure(
                    &label,
                    result.objective_value,
                    format!("mean squared vol error above {:.1e}", self.config.max_objective),
                ));
            }
            let function = VolFunction::from_params(self.function_type, &result.parameters)?;
            debug!(expiry = %label, rmse = result.objective_value.sqrt(), "fitted equity smile");
            slices.push(EquityVolSlice {
                expiry: quote.expiry,
                time,
                forward,
                function,
                rmse: result.objective_value.sqrt(),
            });
        }

        info!(expiries = slices.len(), function = %self.function_type, "equity vol surface fitted");
        Ok(EquityVolSurface {
            anchor: self.anchor,
            spot: self.spot,
            function_type: self.function_type,
            slices,
        })
    }
}

fn initial_guess(function_type: VolFunctionType, atm: f64, forward: f64, t: f64) -> Vec<f64> {
    let w = atm * atm * t;
    match function_type {
        VolFunctionType::Clark => vec![atm.ln(), 0.0, 0.0],
        VolFunctionType::Clark5 => vec![atm.ln(), 0.0, 0.0, 0.0, 0.0],
        VolFunctionType::Sabr => vec![atm, 1.0, 0.0, 0.5],
        VolFunctionType::SabrBetaOne => vec![atm, 0.0, 0.5],
        VolFunctionType::SabrBetaHalf => vec![atm * forward.sqrt(), 0.0, 0.5],
        VolFunctionType::Bbg => vec![0.0, 0.0, atm],
        VolFunctionType::Svi => vec![0.5 * w, 0.5 * w, 0.0, 0.0, 0.1],
        VolFunctionType::Ssvi => vec![0.5, atm, 0.0],
        VolFunctionType::VannaVolga => vec![atm; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strike_core::daycounts::DayCountType;
    use strike_core::types::Compounding;
    use strike_curves::curves::FlatCurve;

    fn anchor() -> Date {
        Date::from_ymd(2024, 6, 3).unwrap()
    }

    fn curve() -> FlatCurve {
        FlatCurve::new(anchor(), 0.04, Compounding::Continuous, DayCountType::Act365F).unwrap()
    }

    fn quote(expiry: Date, forward: f64, t: f64, truth: &VolFunction) -> EquityVolQuote {
        let strikes: Vec<f64> = (0..9).map(|i| 80.0 + 5.0 * f64::from(i)).collect();
        let vols = strikes.iter().map(|k| truth.vol(forward, *k, t)).collect();
        EquityVolQuote::new(expiry, strikes, vols).unwrap()
    }

    #[test]
    fn test_clark_fit_recovers_quotes() {
        let expiry = Date::from_ymd(2025, 6, 3).unwrap();
        let t = year_fraction(anchor(), expiry);
        let forward = 100.0 * ((0.04 - 0.01) * t).exp();
        let truth = VolFunction::Clark([0.22_f64.ln(), -0.15, 0.6]);
        let surface = EquityVolSurface::builder(anchor(), 100.0)
            .with_function(VolFunctionType::Clark)
            .add_expiry(quote(expiry, forward, t, &truth))
            .build(&curve(), 0.01)
            .unwrap();
        let slice = &surface.slices()[0];
        assert_relative_eq!(slice.forward, forward, epsilon = 1e-10);
        assert!(slice.rmse < 1e-4);
        for k in [85.0, 100.0, 115.0] {
            assert_relative_eq!(surface.vol(k, t), truth.vol(forward, k, t), epsilon = 5e-4);
        }
    }

    #[test]
    fn test_rejects_vanna_volga_and_short_quotes() {
        let expiry = Date::from_ymd(2025, 6, 3).unwrap();
        let q = EquityVolQuote::new(expiry, vec![90.0, 110.0], vec![0.2, 0.19]).unwrap();
        let err = EquityVolSurface::builder(anchor(), 100.0)
            .with_function(VolFunctionType::VannaVolga)
            .add_expiry(q.clone())
            .build(&curve(), 0.0)
            .unwrap_err();
        assert!(matches!(err, VolError::InvalidInput { .. }));
        let err = EquityVolSurface::builder(anchor(), 100.0)
            .with_function(VolFunctionType::Svi)
            .add_expiry(q)
            .build(&curve(), 0.0)
            .unwrap_err();
        assert!(matches!(err, VolError::InvalidInput { .. }));
    }

    #[test]
    fn test_quote_validation() {
        let expiry = Date::from_ymd(2025, 6, 3).unwrap();
        assert!(EquityVolQuote::new(expiry, vec![100.0, 90.0], vec![0.2, 0.2]).is_err());
        assert!(EquityVolQuote::new(expiry, vec![90.0], vec![0.2, 0.2]).is_err());
        assert!(EquityVolQuote::new(expiry, vec![90.0], vec![-0.2]).is_err());
    }
}
