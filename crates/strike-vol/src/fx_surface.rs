//! FX volatility surface calibrated tenor by tenor to ATM, strangle and
//! risk-reversal quotes.

use serde::{Deserialize, Serialize};
use tracing::info;

use strike_core::types::OptionType;
use strike_core::Date;
use strike_curves::Curve;
use strike_options::black_scholes::bs_value;
use strike_options::fx::{DeltaMethod, FxInputs};

use crate::calibration::{calibrate_tenor, CalibrationConfig, TenorMarket, WingStrikes};
use crate::error::{VolError, VolResult};
use crate::function::{VolFunction, VolFunctionType};
use crate::quotes::{AtmMethod, FxVolQuote};
use crate::traits::{bracket, interpolate_vol, year_fraction, Bracket, VolSurface};

/// One calibrated expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxVolTenor {
    /// The quotes fitted.
    pub quote: FxVolQuote,
    /// Expiry date.
    pub expiry: Date,
    /// Expiry in years (ACT/365F).
    pub time: f64,
    /// Outright forward.
    pub forward: f64,
    /// Domestic zero rate to expiry, continuously compounded.
    pub rd: f64,
    /// Foreign zero rate to expiry, continuously compounded.
    pub rf: f64,
    /// ATM strike under the surface's ATM convention.
    pub atm_strike: f64,
    /// Fitted smile.
    pub function: VolFunction,
    /// 25-delta strikes.
    pub wing_25d: WingStrikes,
    /// 10-delta strikes, when fitted.
    pub wing_10d: Option<WingStrikes>,
    /// Terminal calibration objective.
    pub objective: f64,
    /// Optimiser iterations used.
    pub iterations: u64,
}

impl FxVolTenor {
    /// Smile vol at `strike`.
    pub fn vol(&self, strike: f64) -> f64 {
        self.function.vol(self.forward, strike, self.time)
    }

    fn inputs(&self, spot: f64) -> VolResult<FxInputs> {
        Ok(FxInputs::new(spot, self.time, self.rd, self.rf)?)
    }
}

/// How closely a tenor reproduces its quotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Expiry in years.
    pub time: f64,
    /// `σ(K_ATM) − atm`.
    pub atm_vol_error: f64,
    /// Smile premium of the 25-delta market strangle minus its market
    /// premium.
    pub ms25_premium_error: f64,
    /// `σ(K_25C) − σ(K_25P) − rr25`.
    pub rr25_error: f64,
    /// Terminal objective.
    pub objective: f64,
}

/// FX volatility surface.
///
/// # Example
///
/// ```rust,no_run
/// use strike_core::daycounts::DayCountType;
/// use strike_core::types::Compounding;
/// use strike_core::Date;
/// use strike_curves::curves::FlatCurve;
/// use strike_vol::prelude::*;
///
/// let anchor = Date::from_ymd(2024, 3, 1).unwrap();
/// let eur = FlatCurve::new(anchor, 0.03, Compounding::Continuous, DayCountType::Act365F).unwrap();
/// let usd = FlatCurve::new(anchor, 0.05, Compounding::Continuous, DayCountType::Act365F).unwrap();
/// let surface = FxVolSurface::builder(anchor, 1.08)
///     .add_quote(FxVolQuote::new("3M", 0.075, 0.0015, -0.004).unwrap())
///     .add_quote(FxVolQuote::new("1Y", 0.080, 0.0020, -0.006).unwrap())
///     .build(&usd, &eur)
///     .unwrap();
/// let vol = surface.vol(1.10, 0.5);
/// assert!(vol > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxVolSurface {
    anchor: Date,
    spot: f64,
    atm_method: AtmMethod,
    delta_method: DeltaMethod,
    function_type: VolFunctionType,
    tenors: Vec<FxVolTenor>,
}

impl FxVolSurface {
    /// Starts a builder.
    pub fn builder(anchor: Date, spot: f64) -> FxVolSurfaceBuilder {
        FxVolSurfaceBuilder::new(anchor, spot)
    }

    /// Spot rate.
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// ATM convention.
    pub fn atm_method(&self) -> AtmMethod {
        self.atm_method
    }

    /// Delta convention.
    pub fn delta_method(&self) -> DeltaMethod {
        self.delta_method
    }

    /// Smile parametrisation.
    pub fn function_type(&self) -> VolFunctionType {
        self.function_type
    }

    /// Calibrated tenors in expiry order.
    pub fn tenors(&self) -> &[FxVolTenor] {
        &self.tenors
    }

    fn times(&self) -> Vec<f64> {
        self.tenors.iter().map(|x| x.time).collect()
    }

    /// Domestic and foreign zero rates at `t`, linear between tenors and
    /// flat outside.
    pub fn rates(&self, t: f64) -> (f64, f64) {
        match bracket(&self.times(), t) {
            Bracket::Single(i) => (self.tenors[i].rd, self.tenors[i].rf),
            Bracket::Between(i, w) => {
                let (a, b) = (&self.tenors[i], &self.tenors[i + 1]);
                (a.rd + w * (b.rd - a.rd), a.rf + w * (b.rf - a.rf))
            }
        }
    }

    /// Outright forward at `t`.
    pub fn forward(&self, t: f64) -> f64 {
        let (rd, rf) = self.rates(t);
        self.spot * ((rd - rf) * t).exp()
    }

    /// Strike with the given delta at expiry `t`.
    ///
    /// Positive deltas are calls and negative deltas puts, quoted in the
    /// surface's delta convention. The strike is solved on the smile of
    /// each bracketing tenor and interpolated linearly in time.
    pub fn strike_from_delta(&self, delta: f64, t: f64) -> VolResult<f64> {
        if !delta.is_finite() || delta == 0.0 {
            return Err(VolError::invalid_input(format!("delta must be non-zero, got {delta}")));
        }
        let option_type = if delta > 0.0 {
            OptionType::Call
        } else {
            OptionType::Put
        };
        let solve = |i: usize| -> VolResult<f64> {
            let tenor = &self.tenors[i];
            let market = TenorMarket {
                fx: tenor.inputs(self.spot)?,
                atm_method: self.atm_method,
                delta_method: self.delta_method,
            };
            let guess = market
                .fx
                .strike_from_delta(self.delta_method, delta, tenor.vol(tenor.atm_strike), option_type)?;
            market.smile_strike(&tenor.function, delta, option_type, guess)
        };
        match bracket(&self.times(), t) {
            Bracket::Single(i) => solve(i),
            Bracket::Between(i, w) => {
                let k0 = solve(i)?;
                let k1 = solve(i + 1)?;
                Ok(k0 + w * (k1 - k0))
            }
        }
    }

    /// Risk-neutral density of the spot at `t` on `n` strikes spanning
    /// `[k_lo, k_hi]`, from the second strike derivative of the call
    /// price (Breeden–Litzenberger).
    pub fn implied_pdf(&self, t: f64, k_lo: f64, k_hi: f64, n: usize) -> VolResult<Vec<(f64, f64)>> {
        if !(t > 0.0) || !(k_lo > 0.0) || !(k_hi > k_lo) || n < 3 {
            return Err(VolError::invalid_input(format!(
                "density needs t > 0, 0 < k_lo < k_hi and at least 3 points, got t={t}, [{k_lo}, {k_hi}], n={n}"
            )));
        }
        let (rd, rf) = self.rates(t);
        let h = (k_hi - k_lo) / (n - 1) as f64;
        let call = |k: f64| bs_value(self.spot, t, k, rd, rf, self.vol(k, t), OptionType::Call);
        let growth = (rd * t).exp();
        Ok((0..n)
            .map(|i| {
                let k = k_lo + i as f64 * h;
                let bump = h.min(0.5 * k);
                let second = (call(k + bump) - 2.0 * call(k) + call(k - bump)) / (bump * bump);
                (k, growth * second)
            })
            .collect())
    }

    /// Fit diagnostics for every tenor.
    pub fn calibration_report(&self) -> Vec<CalibrationReport> {
        self.tenors
            .iter()
            .map(|tenor| {
                let (rd, rf, t) = (tenor.rd, tenor.rf, tenor.time);
                let wing = &tenor.wing_25d;
                let smile_premium = bs_value(self.spot, t, wing.call_ms, rd, rf, tenor.vol(wing.call_ms), OptionType::Call)
                    + bs_value(self.spot, t, wing.put_ms, rd, rf, tenor.vol(wing.put_ms), OptionType::Put);
                CalibrationReport {
                    time: t,
                    atm_vol_error: tenor.vol(tenor.atm_strike) - tenor.quote.atm_vol,
                    ms25_premium_error: smile_premium - wing.premium_ms,
                    rr25_error: tenor.vol(wing.call) - tenor.vol(wing.put) - tenor.quote.rr25,
                    objective: tenor.objective,
                }
            })
            .collect()
    }
}

impl VolSurface for FxVolSurface {
    fn reference_date(&self) -> Date {
        self.anchor
    }

    fn vol(&self, strike: f64, t: f64) -> f64 {
        interpolate_vol(&self.times(), t, |i| self.tenors[i].vol(strike))
    }
}

/// Builder for [`FxVolSurface`].
#[derive(Debug, Clone)]
pub struct FxVolSurfaceBuilder {
    anchor: Date,
    spot: f64,
    quotes: Vec<FxVolQuote>,
    atm_method: AtmMethod,
    delta_method: DeltaMethod,
    function_type: VolFunctionType,
    config: CalibrationConfig,
}

impl FxVolSurfaceBuilder {
    /// Creates a builder with forward delta-neutral ATM, spot delta and the
    /// Clark smile.
    pub fn new(anchor: Date, spot: f64) -> Self {
        Self {
            anchor,
            spot,
            quotes: Vec::new(),
            atm_method: AtmMethod::default(),
            delta_method: DeltaMethod::default(),
            function_type: VolFunctionType::default(),
            config: CalibrationConfig::default(),
        }
    }

    /// Adds one tenor of quotes.
    #[must_use]
    pub fn add_quote(mut self, quote: FxVolQuote) -> Self {
        self.quotes.push(quote);
        self
    }

    /// Adds several tenors.
    #[must_use]
    pub fn add_quotes(mut self, quotes: impl IntoIterator<Item = FxVolQuote>) -> Self {
        self.quotes.extend(quotes);
        self
    }

    /// Sets the ATM convention.
    #[must_use]
    pub fn with_atm_method(mut self, atm_method: AtmMethod) -> Self {
        self.atm_method = atm_method;
        self
    }

    /// Sets the delta convention.
    #[must_use]
    pub fn with_delta_method(mut self, delta_method: DeltaMethod) -> Self {
        self.delta_method = delta_method;
        self
    }

    /// Sets the smile parametrisation.
    #[must_use]
    pub fn with_function(mut self, function_type: VolFunctionType) -> Self {
        self.function_type = function_type;
        self
    }

    /// Sets the calibration settings.
    #[must_use]
    pub fn with_config(mut self, config: CalibrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Calibrates every tenor against domestic and foreign discount curves.
    ///
    /// Tenors are fitted in expiry order; the first failure is returned with
    /// its tenor label and terminal objective.
    pub fn build<D: Curve, F: Curve>(self, domestic: &D, foreign: &F) -> VolResult<FxVolSurface> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(VolError::invalid_input(format!("spot must be positive, got {}", self.spot)));
        }
        if self.quotes.is_empty() {
            return Err(VolError::invalid_input("surface needs at least one tenor"));
        }
        self.config.validate()?;

        let mut tenors: Vec<FxVolTenor> = Vec::with_capacity(self.quotes.len());
        for quote in self.quotes {
            quote.validate()?;
            let label = quote.tenor.to_string();
            let expiry = self.anchor.add_tenor(&quote.tenor)?;
            let time = year_fraction(self.anchor, expiry);
            if time <= 0.0 {
                return Err(VolError::invalid_input(format!("{label}: expiry {expiry} is not after {}", self.anchor)));
            }
            if let Some(prev) = tenors.last() {
                if time <= prev.time {
                    return Err(VolError::invalid_input(format!(
                        "tenors must be in increasing expiry order: {label} after {}",
                        prev.quote.tenor
                    )));
                }
            }

            let df_d = domestic.df(expiry);
            let df_f = foreign.df(expiry);
            if !(df_d > 0.0 && df_f > 0.0) {
                return Err(VolError::invalid_input(format!("{label}: discount factors must be positive")));
            }
            let rd = -df_d.ln() / time;
            let rf = -df_f.ln() / time;
            let market = TenorMarket {
                fx: FxInputs::new(self.spot, time, rd, rf)?,
                atm_method: self.atm_method,
                delta_method: self.delta_method,
            };
            let fit = calibrate_tenor(&label, &market, &quote, self.function_type, &self.config)?;
            tenors.push(FxVolTenor {
                forward: market.forward(),
                quote,
                expiry,
                time,
                rd,
                rf,
                atm_strike: fit.atm_strike,
                function: fit.function,
                wing_25d: fit.wing_25d,
                wing_10d: fit.wing_10d,
                objective: fit.objective,
                iterations: fit.iterations,
            });
        }

        info!(
            tenors = tenors.len(),
            function = %self.function_type,
            atm = %self.atm_method,
            delta = %self.delta_method,
            "FX vol surface calibrated"
        );

        Ok(FxVolSurface {
            anchor: self.anchor,
            spot: self.spot,
            atm_method: self.atm_method,
            delta_method: self.delta_method,
            function_type: self.function_type,
            tenors,
        })
    }
}
