//! Per-tenor smile calibration to FX market quotes.
//!
//! For one expiry the fit matches three market facts: the vol at the ATM
//! strike, the premium of the market strangle at its own strikes, and the
//! risk reversal between the 25-delta strikes solved on the fitted smile.
//! With 10-delta quotes and a non-zero weight the same two wing terms are
//! added at 10 delta.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use strike_core::types::OptionType;
use strike_math::optimization::{minimize, OptimizationConfig};
use strike_math::MathError;
use strike_math::solvers::{secant_with_fallback, SolverConfig};
use strike_options::fx::{DeltaMethod, FxInputs};

use crate::error::{VolError, VolResult};
use crate::function::{VolFunction, VolFunctionType};
use crate::quotes::{AtmMethod, FxVolQuote};

/// Objective returned when a trial smile cannot produce wing strikes.
const FAILED_TRIAL_PENALTY: f64 = 1.0e6;

/// Calibration settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Iteration cap for each optimiser.
    pub max_iterations: u64,
    /// Simplex tolerance.
    pub tolerance: f64,
    /// A tenor whose terminal objective exceeds this fails.
    pub max_objective: f64,
    /// Largest accepted ATM vol, strangle premium or risk-reversal error
    /// of a fully weighted pillar.
    pub max_error: f64,
    /// Weight of the 10-delta terms: 0 fits 25 delta only, 1 fits 10
    /// delta only.
    pub weight_10d: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-14,
            max_objective: 1e-8,
            max_error: 1e-4,
            weight_10d: 0.0,
        }
    }
}

impl CalibrationConfig {
    /// Sets the 10-delta weight.
    #[must_use]
    pub fn with_weight_10d(mut self, weight: f64) -> Self {
        self.weight_10d = weight;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the objective acceptance threshold.
    #[must_use]
    pub fn with_max_objective(mut self, max_objective: f64) -> Self {
        self.max_objective = max_objective;
        self
    }

    /// Sets the per-quote error tolerance.
    #[must_use]
    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = max_error;
        self
    }

    pub(crate) fn validate(&self) -> VolResult<()> {
        if !(0.0..=1.0).contains(&self.weight_10d) {
            return Err(VolError::invalid_input(format!(
                "10-delta weight must lie in [0, 1], got {}",
                self.weight_10d
            )));
        }
        if self.max_iterations == 0
            || !(self.tolerance > 0.0)
            || !(self.max_objective > 0.0)
            || !(self.max_error > 0.0)
        {
            return Err(VolError::invalid_input(
                "calibration needs positive iterations, tolerance and error thresholds",
            ));
        }
        Ok(())
    }
}

/// Strikes and premium of one delta pillar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WingStrikes {
    /// Absolute delta of the pillar (0.25 or 0.10).
    pub delta: f64,
    /// Call strike at the market strangle vol.
    pub call_ms: f64,
    /// Put strike at the market strangle vol.
    pub put_ms: f64,
    /// Call plus put premium at the market strangle vol.
    pub premium_ms: f64,
    /// Call strike solved on the fitted smile.
    pub call: f64,
    /// Put strike solved on the fitted smile.
    pub put: f64,
}

/// Market strangle target of one pillar.
#[derive(Debug, Clone, Copy)]
struct WingTarget {
    delta: f64,
    rr: f64,
    call_ms: f64,
    put_ms: f64,
    premium_ms: f64,
    vega_ms: f64,
}

/// Outcome of one tenor fit.
#[derive(Debug, Clone)]
pub(crate) struct TenorFit {
    pub function: VolFunction,
    pub atm_strike: f64,
    pub wing_25d: WingStrikes,
    pub wing_10d: Option<WingStrikes>,
    pub objective: f64,
    pub iterations: u64,
}

/// Market state at one expiry plus the conventions used to read quotes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TenorMarket {
    pub fx: FxInputs,
    pub atm_method: AtmMethod,
    pub delta_method: DeltaMethod,
}

impl TenorMarket {
    pub fn forward(&self) -> f64 {
        self.fx.forward()
    }

    fn atm_strike(&self, atm_vol: f64) -> f64 {
        self.atm_method
            .strike(self.fx.spot, self.forward(), atm_vol, self.fx.time_to_expiry)
    }

    fn premium(&self, strike: f64, sigma: f64, option_type: OptionType) -> (f64, f64) {
        let greeks = self.fx.garman_kohlhagen(strike, sigma, option_type);
        (greeks.value, greeks.vega)
    }

    fn wing_target(&self, delta: f64, atm_vol: f64, ms: f64, rr: f64) -> VolResult<WingTarget> {
        let sigma_ms = atm_vol + ms;
        let call_ms = self
            .fx
            .strike_from_delta(self.delta_method, delta, sigma_ms, OptionType::Call)?;
        let put_ms = self
            .fx
            .strike_from_delta(self.delta_method, -delta, sigma_ms, OptionType::Put)?;
        let (call_value, call_vega) = self.premium(call_ms, sigma_ms, OptionType::Call);
        let (put_value, put_vega) = self.premium(put_ms, sigma_ms, OptionType::Put);
        Ok(WingTarget {
            delta,
            rr,
            call_ms,
            put_ms,
            premium_ms: call_value + put_value,
            vega_ms: (call_vega + put_vega).max(1e-12),
        })
    }

    /// Strike whose delta, evaluated at the smile vol of that strike,
    /// equals `delta`.
    pub fn smile_strike(
        &self,
        function: &VolFunction,
        delta: f64,
        option_type: OptionType,
        guess: f64,
    ) -> VolResult<f64> {
        let f = self.forward();
        let t = self.fx.time_to_expiry;
        let g = |k: f64| self.fx.delta(self.delta_method, k, function.vol(f, k, t), option_type) - delta;
        secant_with_fallback(g, guess, Some((0.8 * guess, 1.25 * guess)), &SolverConfig::new(1e-12, 50))
            .map(|r| r.root)
            .map_err(|source| VolError::StrikeSearchFailed {
                delta,
                time: t,
                source,
            })
    }

    /// Strangle premium error in premium units at the market strangle
    /// strikes.
    fn premium_error(&self, function: &VolFunction, target: &WingTarget) -> f64 {
        let f = self.forward();
        let t = self.fx.time_to_expiry;
        let (call, _) = self.premium(target.call_ms, function.vol(f, target.call_ms, t), OptionType::Call);
        let (put, _) = self.premium(target.put_ms, function.vol(f, target.put_ms, t), OptionType::Put);
        call + put - target.premium_ms
    }

    /// Premium error in vol units and risk-reversal error of one pillar.
    fn wing_errors(&self, function: &VolFunction, target: &WingTarget) -> Option<(f64, f64)> {
        let f = self.forward();
        let t = self.fx.time_to_expiry;
        let premium_error = self.premium_error(function, target) / target.vega_ms;

        let k_call = self
            .smile_strike(function, target.delta, OptionType::Call, target.call_ms)
            .ok()?;
        let k_put = self
            .smile_strike(function, -target.delta, OptionType::Put, target.put_ms)
            .ok()?;
        let rr_error = function.vol(f, k_call, t) - function.vol(f, k_put, t) - target.rr;
        Some((premium_error, rr_error))
    }

    fn wing_strikes(&self, function: &VolFunction, target: &WingTarget) -> VolResult<WingStrikes> {
        Ok(WingStrikes {
            delta: target.delta,
            call_ms: target.call_ms,
            put_ms: target.put_ms,
            premium_ms: target.premium_ms,
            call: self.smile_strike(function, target.delta, OptionType::Call, target.call_ms)?,
            put: self.smile_strike(function, -target.delta, OptionType::Put, target.put_ms)?,
        })
    }

    /// Builds a trial smile. Vanna-volga anchors its strikes on the trial
    /// vols themselves.
    fn trial(&self, function_type: VolFunctionType, theta: &[f64]) -> Option<VolFunction> {
        if function_type != VolFunctionType::VannaVolga {
            return VolFunction::from_params(function_type, theta).ok();
        }
        let [put_vol, atm_vol, call_vol] = <[f64; 3]>::try_from(theta).ok()?;
        if put_vol <= 0.0 || atm_vol <= 0.0 || call_vol <= 0.0 {
            return None;
        }
        let k_put = self
            .fx
            .strike_from_delta(self.delta_method, -0.25, put_vol, OptionType::Put)
            .ok()?;
        let k_call = self
            .fx
            .strike_from_delta(self.delta_method, 0.25, call_vol, OptionType::Call)
            .ok()?;
        Some(VolFunction::VannaVolga {
            vols: [put_vol, atm_vol, call_vol],
            strikes: [k_put, self.atm_strike(atm_vol), k_call],
        })
    }
}

/// Starting parameters for a tenor.
fn initial_guess(function_type: VolFunctionType, quote: &FxVolQuote, forward: f64, t: f64) -> Vec<f64> {
    let atm = quote.atm_vol;
    let w = atm * atm * t;
    match function_type {
        VolFunctionType::Clark => vec![atm.ln(), 0.05, 0.8],
        VolFunctionType::Clark5 => vec![atm.ln(), 0.05, 0.8, 0.0, 0.0],
        VolFunctionType::Sabr => vec![atm, 1.0, 0.0, 0.5],
        VolFunctionType::SabrBetaOne => vec![atm, 0.0, 0.5],
        VolFunctionType::SabrBetaHalf => vec![atm * forward.sqrt(), 0.0, 0.5],
        VolFunctionType::Bbg => vec![0.2, -0.2, atm + 0.05],
        VolFunctionType::Svi => vec![0.9 * w, w, 0.0, 0.0, 0.1],
        VolFunctionType::Ssvi => vec![0.5, atm, 0.0],
        VolFunctionType::VannaVolga => vec![
            atm + quote.ms25 - 0.5 * quote.rr25,
            atm,
            atm + quote.ms25 + 0.5 * quote.rr25,
        ],
    }
}

/// Calibration failure for an optimiser that returned no iterate; the
/// objective is the one at the starting parameters.
pub(crate) fn optimiser_failure(label: &str, initial_objective: f64, source: &MathError) -> VolError {
    VolError::calibration_failure(
        label,
        initial_objective,
        format!("optimiser failed, objective shown at the starting parameters: {source}"),
    )
}

/// Fails when any fitted quote misses its market value by more than
/// `max_error`.
fn check_fit_errors(label: &str, objective: f64, errors: &[(&str, f64)], max_error: f64) -> VolResult<()> {
    match errors.iter().find(|(_, error)| !(error.abs() <= max_error)) {
        Some((name, error)) => {
            warn!(tenor = label, quote = *name, error = *error, "vol calibration error above tolerance");
            Err(VolError::calibration_failure(
                label,
                objective,
                format!("{name} error {error:.2e} above {max_error:.1e}"),
            ))
        }
        None => Ok(()),
    }
}

/// Fits one tenor.
pub(crate) fn calibrate_tenor(
    label: &str,
    market: &TenorMarket,
    quote: &FxVolQuote,
    function_type: VolFunctionType,
    config: &CalibrationConfig,
) -> VolResult<TenorFit> {
    let f = market.forward();
    let t = market.fx.time_to_expiry;
    let atm_vol = quote.atm_vol;
    let atm_strike = market.atm_strike(atm_vol);

    let target_25 = market.wing_target(0.25, atm_vol, quote.ms25, quote.rr25)?;
    let target_10 = match quote.quotes_10d() {
        Some((ms10, rr10)) if config.weight_10d > 0.0 => {
            Some(market.wing_target(0.10, atm_vol, ms10, rr10)?)
        }
        Some(_) => None,
        None if config.weight_10d > 0.0 => {
            return Err(VolError::invalid_input(format!(
                "{label}: 10-delta weight {} needs 10-delta quotes",
                config.weight_10d
            )))
        }
        None => None,
    };
    let weight_10 = if target_10.is_some() { config.weight_10d } else { 0.0 };

    let objective = |theta: &[f64]| -> f64 {
        let Some(function) = market.trial(function_type, theta) else {
            return FAILED_TRIAL_PENALTY;
        };
        let atm_error = function.vol(f, atm_strike, t) - atm_vol;
        let mut total = atm_error * atm_error;
        if weight_10 < 1.0 {
            let Some((premium, rr)) = market.wing_errors(&function, &target_25) else {
                return FAILED_TRIAL_PENALTY;
            };
            total += (1.0 - weight_10) * (premium * premium + rr * rr);
        }
        if let Some(target) = &target_10 {
            let Some((premium, rr)) = market.wing_errors(&function, target) else {
                return FAILED_TRIAL_PENALTY;
            };
            total += weight_10 * (premium * premium + rr * rr);
        }
        total
    };

    let initial = initial_guess(function_type, quote, f, t);
    let optimizer = OptimizationConfig::default()
        .with_max_iterations(config.max_iterations)
        .with_tolerance(config.tolerance);
    let result = minimize(&objective, &initial, &optimizer)
        .map_err(|e| optimiser_failure(label, objective(&initial), &e))?;

    if !(result.objective_value <= config.max_objective) {
        warn!(
            tenor = label,
            function = %function_type,
            objective = result.objective_value,
            "vol calibration objective above threshold"
        );
        return Err(VolError::calibration_failure(
            label,
            result.objective_value,
            format!("objective above {:.1e} after {} iterations", config.max_objective, result.iterations),
        ));
    }

    let function = market.trial(function_type, &result.parameters).ok_or_else(|| {
        VolError::calibration_failure(label, result.objective_value, "terminal parameters are not a valid smile")
    })?;
    let wing_25d = market.wing_strikes(&function, &target_25)?;
    let wing_10d = target_10
        .as_ref()
        .map(|target| market.wing_strikes(&function, target))
        .transpose()?;

    let mut errors: Vec<(&str, f64)> = vec![("ATM vol", function.vol(f, atm_strike, t) - atm_vol)];
    let mut pillar_errors = |target: &WingTarget, wing: &WingStrikes, names: [&'static str; 2]| {
        let rr = function.vol(f, wing.call, t) - function.vol(f, wing.put, t) - target.rr;
        errors.push((names[0], market.premium_error(&function, target)));
        errors.push((names[1], rr));
    };
    if weight_10 == 0.0 {
        pillar_errors(&target_25, &wing_25d, ["25-delta strangle premium", "25-delta risk reversal"]);
    }
    if let (Some(target), Some(wing)) = (&target_10, &wing_10d) {
        if weight_10 == 1.0 {
            pillar_errors(target, wing, ["10-delta strangle premium", "10-delta risk reversal"]);
        }
    }
    check_fit_errors(label, result.objective_value, &errors, config.max_error)?;

    debug!(
        tenor = label,
        function = %function_type,
        objective = result.objective_value,
        iterations = result.iterations,
        "calibrated FX vol tenor"
    );

    Ok(TenorFit {
        function,
        atm_strike,
        wing_25d,
        wing_10d,
        objective: result.objective_value,
        iterations: result.iterations,
    })
}
