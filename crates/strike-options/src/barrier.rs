//! Continuously monitored single barriers and one-touch digitals.
//!
//! Closed forms of Reiner and Rubinstein (1991) under Black–Scholes with a
//! continuous yield. In options pay their rebate at expiry when the barrier
//! was never touched; out options pay it when the barrier is touched.

use serde::{Deserialize, Serialize};
use std::fmt;

use strike_core::types::OptionType;
use strike_math::distributions::norm_cdf;

use crate::black_scholes::{bs_value, EPSILON};
use crate::error::{require_finite, require_positive, OptionsError, OptionsResult};

/// Side of the spot the barrier sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarrierDirection {
    /// Barrier above spot.
    Up,
    /// Barrier below spot.
    Down,
}

impl BarrierDirection {
    /// Whether `spot` is at or through the barrier.
    #[must_use]
    pub fn is_breached(&self, spot: f64, barrier: f64) -> bool {
        match self {
            BarrierDirection::Up => spot >= barrier,
            BarrierDirection::Down => spot <= barrier,
        }
    }

    // η: +1 for a down barrier, −1 for an up barrier
    fn eta(self) -> f64 {
        match self {
            BarrierDirection::Down => 1.0,
            BarrierDirection::Up => -1.0,
        }
    }
}

/// Whether touching the barrier activates or extinguishes the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarrierStyle {
    /// Knock-in.
    In,
    /// Knock-out.
    Out,
}

impl fmt::Display for BarrierStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarrierStyle::In => write!(f, "IN"),
            BarrierStyle::Out => write!(f, "OUT"),
        }
    }
}

/// A European single-barrier option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierOption {
    /// Call or put.
    pub option_type: OptionType,
    /// Strike.
    pub strike: f64,
    /// Barrier level.
    pub barrier: f64,
    /// Up or down.
    pub direction: BarrierDirection,
    /// In or out.
    pub style: BarrierStyle,
    /// Cash rebate.
    pub rebate: f64,
}

/// Shared exponents of the reflection formulas.
struct Reflection {
    st: f64,
    mu: f64,
    lambda: f64,
    dr: f64,
    dq: f64,
}

impl Reflection {
    fn new(t: f64, r: f64, q: f64, sigma: f64) -> Self {
        let var = sigma * sigma;
        let mu = (r - q - 0.5 * var) / var;
        Self {
            st: sigma * t.sqrt(),
            mu,
            lambda: (mu * mu + 2.0 * r / var).sqrt(),
            dr: (-r * t).exp(),
            dq: (-q * t).exp(),
        }
    }

    // x2 and y2 of the reflection formulas
    fn x2_y2(&self, s: f64, h: f64) -> (f64, f64) {
        let shift = (1.0 + self.mu) * self.st;
        ((s / h).ln() / self.st + shift, (h / s).ln() / self.st + shift)
    }

    /// Risk-neutral probability that the barrier is touched before expiry.
    fn hit_probability(&self, s: f64, h: f64, eta: f64) -> f64 {
        let (x2, y2) = self.x2_y2(s, h);
        let hs_2mu = (h / s).powf(2.0 * self.mu);
        norm_cdf(-eta * (x2 - self.st)) + hs_2mu * norm_cdf(eta * (y2 - self.st))
    }

    /// Value of one unit paid at the first touch.
    fn pay_at_hit(&self, s: f64, h: f64, eta: f64) -> f64 {
        let ln_hs = (h / s).ln();
        let z = ln_hs / self.st + self.lambda * self.st;
        ((self.mu + self.lambda) * ln_hs).exp() * norm_cdf(eta * z)
            + ((self.mu - self.lambda) * ln_hs).exp()
                * norm_cdf(eta * (z - 2.0 * self.lambda * self.st))
    }
}

impl BarrierOption {
    /// Creates a barrier option without rebate.
    #[must_use]
    pub fn new(
        option_type: OptionType,
        strike: f64,
        barrier: f64,
        direction: BarrierDirection,
        style: BarrierStyle,
    ) -> Self {
        Self {
            option_type,
            strike,
            barrier,
            direction,
            style,
            rebate: 0.0,
        }
    }

    /// Sets the rebate.
    #[must_use]
    pub fn with_rebate(mut self, rebate: f64) -> Self {
        self.rebate = rebate;
        self
    }

    fn validate(&self, s: f64, r: f64, q: f64, sigma: f64) -> OptionsResult<()> {
        require_positive("spot", s)?;
        require_positive("strike", self.strike)?;
        require_positive("barrier", self.barrier)?;
        require_positive("volatility", sigma)?;
        require_finite("rate", r)?;
        require_finite("dividend yield", q)?;
        if !self.rebate.is_finite() || self.rebate < 0.0 {
            return Err(OptionsError::invalid_input(format!(
                "rebate must be non-negative, got {}",
                self.rebate
            )));
        }
        Ok(())
    }

    /// Present value at spot `s` with `t` years to expiry.
    ///
    /// A barrier already breached at valuation turns an in option into
    /// the vanilla and an out option into its rebate.
    ///
    /// # Example
    ///
    /// ```rust
    /// use strike_core::types::OptionType;
    /// use strike_options::barrier::{BarrierDirection, BarrierOption, BarrierStyle};
    /// use strike_options::black_scholes::bs_value;
    ///
    /// let down_in = BarrierOption::new(OptionType::Call, 100.0, 90.0, BarrierDirection::Down, BarrierStyle::In);
    /// let down_out = BarrierOption::new(OptionType::Call, 100.0, 90.0, BarrierDirection::Down, BarrierStyle::Out);
    /// let vanilla = bs_value(100.0, 1.0, 100.0, 0.05, 0.0, 0.25, OptionType::Call);
    /// let parity = down_in.value(100.0, 1.0, 0.05, 0.0, 0.25).unwrap()
    ///     + down_out.value(100.0, 1.0, 0.05, 0.0, 0.25).unwrap();
    /// assert!((parity - vanilla).abs() < 1e-10);
    /// ```
    pub fn value(&self, s: f64, t: f64, r: f64, q: f64, sigma: f64) -> OptionsResult<f64> {
        self.validate(s, r, q, sigma)?;
        let (k, h) = (self.strike, self.barrier);
        let vanilla = bs_value(s, t, k, r, q, sigma, self.option_type);

        if self.direction.is_breached(s, h) {
            return Ok(match self.style {
                BarrierStyle::In => vanilla,
                BarrierStyle::Out => self.rebate,
            });
        }
        if t <= EPSILON {
            return Ok(match self.style {
                BarrierStyle::In => self.rebate,
                BarrierStyle::Out => self.option_type.payoff(s, k),
            });
        }

        let m = Reflection::new(t, r, q, sigma);
        let eta = self.direction.eta();
        let phi = self.option_type.phi();
        let st = m.st;
        let shift = (1.0 + m.mu) * st;

        let x1 = (s / k).ln() / st + shift;
        let y1 = (h * h / (s * k)).ln() / st + shift;
        let (x2, y2) = m.x2_y2(s, h);
        let hs_2mu = (h / s).powf(2.0 * m.mu);
        let hs_2mu1 = (h / s).powf(2.0 * (m.mu + 1.0));

        let a = phi * s * m.dq * norm_cdf(phi * x1) - phi * k * m.dr * norm_cdf(phi * (x1 - st));
        let b = phi * s * m.dq * norm_cdf(phi * x2) - phi * k * m.dr * norm_cdf(phi * (x2 - st));
        let c = phi * s * m.dq * hs_2mu1 * norm_cdf(eta * y1)
            - phi * k * m.dr * hs_2mu * norm_cdf(eta * (y1 - st));
        let d = phi * s * m.dq * hs_2mu1 * norm_cdf(eta * y2)
            - phi * k * m.dr * hs_2mu * norm_cdf(eta * (y2 - st));
        let e = self.rebate * m.dr * (1.0 - m.hit_probability(s, h, eta));
        let f = self.rebate * m.pay_at_hit(s, h, eta);

        use BarrierDirection::{Down, Up};
        use BarrierStyle::{In, Out};
        use OptionType::{Call, Put};
        let value = match (self.style, self.direction, self.option_type, k >= h) {
            (In, Down, Call, true) => c + e,
            (In, Down, Call, false) => a - b + d + e,
            (In, Up, Call, true) => a + e,
            (In, Up, Call, false) => b - c + d + e,
            (In, Down, Put, true) => b - c + d + e,
            (In, Down, Put, false) => a + e,
            (In, Up, Put, true) => a - b + d + e,
            (In, Up, Put, false) => c + e,
            (Out, Down, Call, true) => a - c + f,
            (Out, Down, Call, false) => b - d + f,
            (Out, Up, Call, true) => f,
            (Out, Up, Call, false) => a - b + c - d + f,
            (Out, Down, Put, true) => a - b + c - d + f,
            (Out, Down, Put, false) => f,
            (Out, Up, Put, true) => b - d + f,
            (Out, Up, Put, false) => a - c + f,
        };
        Ok(value.max(0.0))
    }
}

/// When a one-touch pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TouchPayment {
    /// On the first touch of the barrier.
    #[default]
    AtHit,
    /// At expiry, if the barrier was touched.
    AtExpiry,
}

/// A one-touch digital paying `payout` if the barrier trades before expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneTouch {
    /// Barrier level.
    pub barrier: f64,
    /// Cash amount paid.
    pub payout: f64,
    /// Up or down.
    pub direction: BarrierDirection,
    /// Payment timing.
    pub payment: TouchPayment,
}

impl OneTouch {
    /// Creates a one-touch.
    #[must_use]
    pub fn new(barrier: f64, payout: f64, direction: BarrierDirection, payment: TouchPayment) -> Self {
        Self {
            barrier,
            payout,
            direction,
            payment,
        }
    }

    /// Present value at spot `s` with `t` years to expiry.
    pub fn value(&self, s: f64, t: f64, r: f64, q: f64, sigma: f64) -> OptionsResult<f64> {
        require_positive("spot", s)?;
        require_positive("barrier", self.barrier)?;
        require_positive("volatility", sigma)?;
        require_finite("rate", r)?;
        require_finite("dividend yield", q)?;
        require_finite("payout", self.payout)?;

        let t = t.max(0.0);
        let dr = (-r * t).exp();
        if self.direction.is_breached(s, self.barrier) {
            return Ok(match self.payment {
                TouchPayment::AtHit => self.payout,
                TouchPayment::AtExpiry => self.payout * dr,
            });
        }
        if t <= EPSILON {
            return Ok(0.0);
        }

        let m = Reflection::new(t, r, q, sigma);
        let eta = self.direction.eta();
        let value = match self.payment {
            TouchPayment::AtHit => m.pay_at_hit(s, self.barrier, eta),
            TouchPayment::AtExpiry => dr * m.hit_probability(s, self.barrier, eta),
        };
        Ok(self.payout * value.max(0.0))
    }

    /// Value of the complementary no-touch, paying at expiry if the barrier
    /// is never touched.
    pub fn no_touch_value(&self, s: f64, t: f64, r: f64, q: f64, sigma: f64) -> OptionsResult<f64> {
        let at_expiry = Self {
            payment: TouchPayment::AtExpiry,
            ..*self
        };
        let touch = at_expiry.value(s, t, r, q, sigma)?;
        Ok(self.payout * (-r * t.max(0.0)).exp() - touch)
    }
}
