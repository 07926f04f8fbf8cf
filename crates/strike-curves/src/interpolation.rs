//! Interpolation of discount factors between curve knots.
//!
//! A [`CurveInterpolator`] holds knots `(t_i, df_i)` with `t_0 = 0`,
//! `df_0 = 1`, and rebuilds `df(t)` in one of the [`InterpolationType`]
//! spaces. Beyond the last knot the zero rate is held flat, so
//! `df(t) = df_n^{t / t_n}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use strike_math::interpolation::{CubicSpline, Interpolator, LinearInterpolator, Pchip};

use crate::error::{CurveError, CurveResult};

/// Quantity and method used to interpolate between curve knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterpolationType {
    /// Constant instantaneous forward between knots (linear in log df).
    #[default]
    FlatFwdRates,
    /// Linear in continuously compounded zero rate.
    LinearZeroRates,
    /// Piecewise linear instantaneous forward.
    LinearFwdRates,
    /// Natural cubic spline in zero rate.
    CubicZeroRates,
    /// Natural cubic spline in log discount factor.
    NatcubicLogDiscount,
    /// Monotone cubic (PCHIP) in log discount factor.
    PchipLogDiscount,
    /// Monotone cubic (PCHIP) in zero rate.
    PchipZeroRates,
}

impl InterpolationType {
    /// Returns every interpolation type.
    pub fn all() -> &'static [InterpolationType] {
        &[
            InterpolationType::FlatFwdRates,
            InterpolationType::LinearZeroRates,
            InterpolationType::LinearFwdRates,
            InterpolationType::CubicZeroRates,
            InterpolationType::NatcubicLogDiscount,
            InterpolationType::PchipLogDiscount,
            InterpolationType::PchipZeroRates,
        ]
    }

    /// True when moving one knot only changes the curve on its adjacent
    /// segments.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            InterpolationType::FlatFwdRates | InterpolationType::LinearZeroRates
        )
    }
}

impl fmt::Display for InterpolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterpolationType::FlatFwdRates => "FLAT_FWD_RATES",
            InterpolationType::LinearZeroRates => "LINEAR_ZERO_RATES",
            InterpolationType::LinearFwdRates => "LINEAR_FWD_RATES",
            InterpolationType::CubicZeroRates => "CUBIC_ZERO_RATES",
            InterpolationType::NatcubicLogDiscount => "NATCUBIC_LOG_DISCOUNT",
            InterpolationType::PchipLogDiscount => "PCHIP_LOG_DISCOUNT",
            InterpolationType::PchipZeroRates => "PCHIP_ZERO_RATES",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone)]
enum Fitted {
    LogDiscount(LinearInterpolator),
    LogDiscountCubic(CubicSpline),
    LogDiscountPchip(Pchip),
    ZeroLinear(LinearInterpolator),
    ZeroCubic(CubicSpline),
    ZeroPchip(Pchip),
    /// Piecewise linear forward through the knot forwards and a
    /// breakpoint at each segment midpoint.
    LinearForward { knots: Vec<f64>, mids: Vec<f64> },
}

/// Discount factor interpolation over `(t, df)` knots.
#[derive(Debug, Clone)]
pub struct CurveInterpolator {
    kind: InterpolationType,
    ts: Vec<f64>,
    dfs: Vec<f64>,
    log_dfs: Vec<f64>,
    fitted: Fitted,
}

impl CurveInterpolator {
    /// Fits the interpolator. A knot at `t = 0` with `df = 1` is prepended
    /// when the first knot is later than zero.
    pub fn new(kind: InterpolationType, ts: &[f64], dfs: &[f64]) -> CurveResult<Self> {
        if ts.len() != dfs.len() {
            return Err(CurveError::invalid_input(format!(
                "times and discount factors differ in length: {} vs {}",
                ts.len(),
                dfs.len()
            )));
        }
        if ts.is_empty() {
            return Err(CurveError::InsufficientPoints {
                required: 1,
                got: 0,
            });
        }

        let mut knot_ts = Vec::with_capacity(ts.len() + 1);
        let mut knot_dfs = Vec::with_capacity(ts.len() + 1);
        if ts[0] > 0.0 {
            knot_ts.push(0.0);
            knot_dfs.push(1.0);
        } else if ts[0] < 0.0 || (dfs[0] - 1.0).abs() > 1e-14 {
            return Err(CurveError::invalid_input(
                "a knot at t = 0 must have discount factor 1",
            ));
        }
        knot_ts.extend_from_slice(ts);
        knot_dfs.extend_from_slice(dfs);

        for (i, w) in knot_ts.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(CurveError::NonMonotonicTimes {
                    index: i + 1,
                    prev: w[0],
                    current: w[1],
                });
            }
        }
        if let Some(df) = knot_dfs.iter().find(|df| !(df.is_finite() && **df > 0.0)) {
            return Err(CurveError::invalid_input(format!(
                "discount factor {df} must be positive and finite"
            )));
        }

        let log_dfs: Vec<f64> = knot_dfs.iter().map(|df| df.ln()).collect();
        let fitted = fit(kind, &knot_ts, &log_dfs)?;

        Ok(Self {
            kind,
            ts: knot_ts,
            dfs: knot_dfs,
            log_dfs,
            fitted,
        })
    }

    /// The interpolation type.
    pub fn kind(&self) -> InterpolationType {
        self.kind
    }

    /// Knot times, starting at 0.
    pub fn times(&self) -> &[f64] {
        &self.ts
    }

    /// Knot discount factors, starting at 1.
    pub fn discount_factors(&self) -> &[f64] {
        &self.dfs
    }

    /// Last knot time.
    pub fn max_time(&self) -> f64 {
        self.ts[self.ts.len() - 1]
    }

    /// Interpolated discount factor.
    pub fn df(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        let n = self.ts.len();
        if n == 1 {
            return 1.0;
        }
        let t_max = self.ts[n - 1];
        if t >= t_max {
            // Flat zero rate beyond the last knot
            return (self.log_dfs[n - 1] * t / t_max).exp();
        }

        let log_df = match &self.fitted {
            Fitted::LogDiscount(i) => i.interpolate(t),
            Fitted::LogDiscountCubic(i) => i.interpolate(t),
            Fitted::LogDiscountPchip(i) => i.interpolate(t),
            Fitted::ZeroLinear(i) => -i.interpolate(t) * t,
            Fitted::ZeroCubic(i) => -i.interpolate(t) * t,
            Fitted::ZeroPchip(i) => -i.interpolate(t) * t,
            Fitted::LinearForward { knots, mids } => self.linear_forward_log_df(knots, mids, t),
        };
        log_df.exp()
    }

    fn linear_forward_log_df(&self, knots: &[f64], mids: &[f64], t: f64) -> f64 {
        let i = match self.ts.partition_point(|x| *x <= t) {
            0 => 0,
            k => (k - 1).min(self.ts.len() - 2),
        };
        let half = 0.5 * (self.ts[i + 1] - self.ts[i]);
        let s = t - self.ts[i];
        let (f0, m, f1) = (knots[i], mids[i], knots[i + 1]);
        let integral = if s <= half {
            f0 * s + 0.5 * (m - f0) / half * s * s
        } else {
            let u = s - half;
            0.5 * half * (f0 + m) + m * u + 0.5 * (f1 - m) / half * u * u
        };
        self.log_dfs[i] - integral
    }
}

fn fit(kind: InterpolationType, ts: &[f64], log_dfs: &[f64]) -> CurveResult<Fitted> {
    if ts.len() < 2 {
        return Ok(Fitted::LinearForward {
            knots: vec![0.0],
            mids: Vec::new(),
        });
    }

    let zeros = || -> Vec<f64> {
        let mut z: Vec<f64> = ts
            .iter()
            .zip(log_dfs)
            .map(|(t, l)| if *t > 0.0 { -l / t } else { 0.0 })
            .collect();
        // Flat short end: the zero rate at t = 0 is the first knot's
        z[0] = z[1];
        z
    };

    let fitted = match kind {
        InterpolationType::FlatFwdRates => {
            Fitted::LogDiscount(LinearInterpolator::new(ts.to_vec(), log_dfs.to_vec())?)
        }
        InterpolationType::LinearZeroRates => {
            Fitted::ZeroLinear(LinearInterpolator::new(ts.to_vec(), zeros())?)
        }
        InterpolationType::CubicZeroRates if ts.len() >= 3 => {
            Fitted::ZeroCubic(CubicSpline::new(ts.to_vec(), zeros())?)
        }
        InterpolationType::CubicZeroRates => {
            Fitted::ZeroLinear(LinearInterpolator::new(ts.to_vec(), zeros())?)
        }
        InterpolationType::NatcubicLogDiscount if ts.len() >= 3 => {
            Fitted::LogDiscountCubic(CubicSpline::new(ts.to_vec(), log_dfs.to_vec())?)
        }
        InterpolationType::NatcubicLogDiscount => {
            Fitted::LogDiscount(LinearInterpolator::new(ts.to_vec(), log_dfs.to_vec())?)
        }
        InterpolationType::PchipLogDiscount => {
            Fitted::LogDiscountPchip(Pchip::new(ts.to_vec(), log_dfs.to_vec())?)
        }
        InterpolationType::PchipZeroRates => Fitted::ZeroPchip(Pchip::new(ts.to_vec(), zeros())?),
        InterpolationType::LinearFwdRates => {
            let (knots, mids) = linear_forwards(ts, log_dfs);
            Fitted::LinearForward { knots, mids }
        }
    };
    Ok(fitted)
}

/// Knot and midpoint forwards of a piecewise linear forward curve.
///
/// Interior knot forwards are the length-weighted average of the adjacent
/// segment averages `a_i`, limited to `[0, 2·min(|a_{i-1}|, |a_i|)]` with
/// their common sign, and set to zero where the averages change sign. The
/// midpoint forward `m_i = 2a_i − (f_i + f_{i+1})/2` then makes each segment
/// integrate exactly to its log discount factor and keeps the sign of `a_i`,
/// so non-negative segment forwards give a non-increasing curve.
fn linear_forwards(ts: &[f64], log_dfs: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = ts.len();
    let h: Vec<f64> = ts.windows(2).map(|w| w[1] - w[0]).collect();
    let avg: Vec<f64> = (0..n - 1).map(|i| -(log_dfs[i + 1] - log_dfs[i]) / h[i]).collect();

    let mut knots = vec![0.0; n];
    knots[0] = avg[0];
    knots[n - 1] = avg[n - 2];
    for i in 1..n - 1 {
        let (left, right) = (avg[i - 1], avg[i]);
        knots[i] = if left * right <= 0.0 {
            0.0
        } else {
            let weighted = (h[i] * left + h[i - 1] * right) / (h[i - 1] + h[i]);
            let bound = 2.0 * left.abs().min(right.abs());
            weighted.signum() * weighted.abs().min(bound)
        };
    }
    let mids = (0..n - 1)
        .map(|i| 2.0 * avg[i] - 0.5 * (knots[i] + knots[i + 1]))
        .collect();
    (knots, mids)
}
