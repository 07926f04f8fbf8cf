//! Sequential knot solver shared by the IBOR and OIS bootstrappers.

use serde::{Deserialize, Serialize};
use strike_core::daycounts::DayCountType;
use strike_core::Date;
use strike_math::solvers::{newton_with_fallback, secant_with_fallback, SolverConfig};
use strike_math::MathError;
use tracing::{debug, warn};

use super::instruments::CalibrationInstrument;
use super::repricing::{BootstrapResult, RepricingReport};
use crate::curves::DiscountCurve;
use crate::error::{CurveError, CurveResult};
use crate::interpolation::InterpolationType;
use crate::traits::{check_time_day_count, time_between};

/// Discount factor range searched for each knot.
const KNOT_BOUNDS: (f64, f64) = (1e-4, 1.5);

/// Bump for the numerical derivative of an instrument PV in its knot.
const DERIVATIVE_BUMP: f64 = 1e-7;

/// Two knot times closer than this are the same knot.
const KNOT_TIME_EPS: f64 = 1e-12;

/// Settings common to every bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Interpolation between knots.
    pub interpolation: InterpolationType,
    /// Day count measuring curve time.
    pub day_count: DayCountType,
    /// Tolerance of each knot solve.
    pub tolerance: f64,
    /// Iteration cap of each knot solve.
    pub max_iterations: u32,
    /// Sweeps over all knots when the interpolation is not local.
    pub max_passes: usize,
    /// Fail unless every instrument reprices within tolerance.
    pub verify: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationType::FlatFwdRates,
            day_count: DayCountType::Act365F,
            tolerance: 1e-10,
            max_iterations: 50,
            max_passes: 50,
            verify: true,
        }
    }
}

impl BootstrapConfig {
    fn solver(&self) -> SolverConfig {
        SolverConfig::new(self.tolerance, self.max_iterations)
    }
}

struct Engine<'a> {
    valuation_date: Date,
    config: &'a BootstrapConfig,
    times: Vec<f64>,
}

impl Engine<'_> {
    fn time(&self, date: Date) -> f64 {
        time_between(self.config.day_count, self.valuation_date, date)
    }

    fn curve(&self, n: usize, dfs: &[f64]) -> CurveResult<DiscountCurve> {
        DiscountCurve::new(
            self.valuation_date,
            &self.times[..n],
            &dfs[..n],
            self.config.interpolation,
            self.config.day_count,
        )
    }

    /// Discount factor at `t` when `t` is the origin or one of the first
    /// `below` knots.
    fn knot_df(&self, t: f64, below: usize, dfs: &[f64]) -> Option<f64> {
        if t.abs() < KNOT_TIME_EPS {
            return Some(1.0);
        }
        self.times[..below]
            .iter()
            .position(|k| (k - t).abs() < KNOT_TIME_EPS)
            .map(|j| dfs[j])
    }

    /// Solves knot `i` so that `instrument` prices to zero on the first `n`
    /// knots, with every other knot held at its value in `dfs`.
    fn solve_knot(
        &self,
        i: usize,
        n: usize,
        dfs: &[f64],
        instrument: &CalibrationInstrument,
    ) -> CurveResult<f64> {
        let t_start = self.time(instrument.start());
        let closed_form = match instrument {
            CalibrationInstrument::Deposit(d) => Some(d.rate() * d.accrual()),
            CalibrationInstrument::Fra(f) => Some(f.rate() * f.accrual()),
            CalibrationInstrument::Swap(_) => None,
        };
        if let Some(accrued) = closed_form {
            if let Some(df_start) = self.knot_df(t_start, i, dfs) {
                return Ok(df_start / (1.0 + accrued));
            }
        }

        let pv = |x: f64| {
            let mut knots = dfs[..n].to_vec();
            knots[i] = x;
            self.curve(n, &knots)
                .map_or(f64::NAN, |curve| instrument.pv(&curve))
        };
        let prev_t = if i == 0 { 0.0 } else { self.times[i - 1] };
        let prev_df = if i == 0 { 1.0 } else { dfs[i - 1] };
        let guess = if dfs[i].is_finite() && dfs[i] > 0.0 {
            dfs[i]
        } else {
            prev_df * (-instrument.rate() * (self.times[i] - prev_t)).exp()
        };

        let solver = self.config.solver();
        let result = match instrument {
            CalibrationInstrument::Swap(_) => {
                let dpv = |x: f64| {
                    (pv(x + DERIVATIVE_BUMP) - pv(x - DERIVATIVE_BUMP)) / (2.0 * DERIVATIVE_BUMP)
                };
                newton_with_fallback(&pv, dpv, guess, Some(KNOT_BOUNDS), &solver)
            }
            _ => secant_with_fallback(&pv, guess, Some(KNOT_BOUNDS), &solver),
        };
        let root = result
            .map_err(|source| CurveError::BootstrapFailed {
                instrument: instrument.description(),
                source,
            })?
            .root;
        if !(root.is_finite() && root > 0.0) {
            return Err(CurveError::BootstrapFailed {
                instrument: instrument.description(),
                source: MathError::NonFinite { solver: "bootstrap" },
            });
        }
        Ok(root)
    }
}

/// Bootstraps knots at each instrument's maturity, in order.
pub(crate) fn bootstrap(
    valuation_date: Date,
    instruments: Vec<CalibrationInstrument>,
    config: &BootstrapConfig,
) -> CurveResult<BootstrapResult> {
    check_time_day_count(config.day_count)?;
    if instruments.is_empty() {
        return Err(CurveError::invalid_input("no calibration instruments"));
    }

    let mut engine = Engine {
        valuation_date,
        config,
        times: Vec::with_capacity(instruments.len()),
    };
    let mut prev = valuation_date;
    for inst in &instruments {
        if inst.start() < valuation_date {
            return Err(CurveError::invalid_instrument(
                inst.description(),
                format!("starts before the valuation date {valuation_date}"),
            ));
        }
        if inst.maturity() <= prev {
            return Err(CurveError::invalid_instrument(
                inst.description(),
                format!("maturity is not after the previous knot {prev}"),
            ));
        }
        prev = inst.maturity();
        engine.times.push(engine.time(inst.maturity()));
    }

    let n = instruments.len();
    let mut dfs = vec![f64::NAN; n];
    for (i, inst) in instruments.iter().enumerate() {
        dfs[i] = engine.solve_knot(i, i + 1, &dfs, inst)?;
        debug!(
            instrument = %inst.description(),
            t = engine.times[i],
            df = dfs[i],
            "solved bootstrap knot"
        );
    }

    if !config.interpolation.is_local() {
        let mut converged = false;
        for pass in 0..config.max_passes {
            let mut max_change: f64 = 0.0;
            for (i, inst) in instruments.iter().enumerate() {
                let df = engine.solve_knot(i, n, &dfs, inst)?;
                max_change = max_change.max((df - dfs[i]).abs());
                dfs[i] = df;
            }
            debug!(pass, max_change, "bootstrap sweep");
            if max_change < 1e-12 {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                interpolation = %config.interpolation,
                passes = config.max_passes,
                "bootstrap sweeps did not settle"
            );
        }
    }

    let curve = engine.curve(n, &dfs)?;
    let report = RepricingReport::new(&curve, &instruments);
    debug!(
        knots = n,
        max_error = report.max_error(),
        "bootstrap complete"
    );
    if config.verify {
        report.ensure_valid()?;
    }
    Ok(BootstrapResult {
        curve,
        instruments,
        report,
    })
}
