//! FX option conventions: Garman–Kohlhagen valuation, the four delta
//! conventions and strike-from-delta inversion.
//!
//! `rd` is the domestic (discount) rate and `rf` the foreign rate, both
//! continuously compounded. Premiums are in domestic currency per unit of
//! foreign notional.

use serde::{Deserialize, Serialize};
use std::fmt;

use strike_core::types::OptionType;
use strike_math::distributions::{norm_cdf, norm_inv_cdf, norm_pdf};
use strike_math::solvers::{bisection, secant_with_fallback, SolverConfig};

use crate::black_scholes::{d1_d2, BsParams, Greeks, EPSILON};
use crate::error::{require_finite, require_positive, OptionsError, OptionsResult};

/// Delta quoting convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaMethod {
    /// `φ e^{−rf T} N(φ d1)`.
    #[default]
    SpotDelta,
    /// `φ N(φ d1)`.
    ForwardDelta,
    /// Spot delta less the premium in foreign units:
    /// `φ e^{−rf T} (K/F) N(φ d2)`.
    SpotDeltaPremAdj,
    /// `φ (K/F) N(φ d2)`.
    ForwardDeltaPremAdj,
}

impl DeltaMethod {
    /// Whether the premium is included in the delta.
    #[must_use]
    pub fn is_premium_adjusted(&self) -> bool {
        matches!(self, DeltaMethod::SpotDeltaPremAdj | DeltaMethod::ForwardDeltaPremAdj)
    }

    /// Whether the delta is measured against spot.
    #[must_use]
    pub fn is_spot(&self) -> bool {
        matches!(self, DeltaMethod::SpotDelta | DeltaMethod::SpotDeltaPremAdj)
    }
}

impl fmt::Display for DeltaMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeltaMethod::SpotDelta => "SPOT_DELTA",
            DeltaMethod::ForwardDelta => "FORWARD_DELTA",
            DeltaMethod::SpotDeltaPremAdj => "SPOT_DELTA_PREM_ADJ",
            DeltaMethod::ForwardDeltaPremAdj => "FORWARD_DELTA_PREM_ADJ",
        };
        write!(f, "{name}")
    }
}

/// Market inputs of an FX option at one expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxInputs {
    /// Spot rate, domestic per foreign.
    pub spot: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    /// Domestic continuously compounded rate.
    pub rd: f64,
    /// Foreign continuously compounded rate.
    pub rf: f64,
}

impl FxInputs {
    /// Creates validated inputs.
    pub fn new(spot: f64, time_to_expiry: f64, rd: f64, rf: f64) -> OptionsResult<Self> {
        require_positive("spot", spot)?;
        require_finite("domestic rate", rd)?;
        require_finite("foreign rate", rf)?;
        if !time_to_expiry.is_finite() || time_to_expiry <= 0.0 {
            return Err(OptionsError::Expired { time_to_expiry });
        }
        Ok(Self {
            spot,
            time_to_expiry,
            rd,
            rf,
        })
    }

    /// Outright forward `S·e^{(rd − rf)T}`.
    pub fn forward(&self) -> f64 {
        self.spot * ((self.rd - self.rf) * self.time_to_expiry).exp()
    }

    /// Domestic discount factor.
    pub fn domestic_df(&self) -> f64 {
        (-self.rd * self.time_to_expiry).exp()
    }

    /// Foreign discount factor.
    pub fn foreign_df(&self) -> f64 {
        (-self.rf * self.time_to_expiry).exp()
    }

    /// Garman–Kohlhagen value and Greeks; rho is domestic, psi foreign.
    pub fn garman_kohlhagen(&self, strike: f64, sigma: f64, option_type: OptionType) -> Greeks {
        BsParams::new(
            self.spot,
            self.time_to_expiry,
            strike,
            self.rd,
            self.rf,
            sigma,
            option_type,
        )
        .greeks()
    }

    /// Delta of a strike under `method`.
    pub fn delta(&self, method: DeltaMethod, strike: f64, sigma: f64, option_type: OptionType) -> f64 {
        let t = self.time_to_expiry;
        let f = self.forward();
        let k = strike.max(EPSILON);
        let phi = option_type.phi();
        let (d1, d2) = d1_d2(f, k, t, sigma.max(EPSILON));
        let spot_scale = if method.is_spot() {
            self.foreign_df()
        } else {
            1.0
        };
        if method.is_premium_adjusted() {
            phi * spot_scale * (k / f) * norm_cdf(phi * d2)
        } else {
            phi * spot_scale * norm_cdf(phi * d1)
        }
    }

    /// Strike whose `method` delta equals `delta`.
    ///
    /// Spot and forward deltas invert in closed form. Premium-adjusted
    /// deltas are solved by Newton-secant from the unadjusted strike; for a
    /// call the solution is taken on the branch above the strike of maximum
    /// delta.
    ///
    /// # Example
    ///
    /// ```rust
    /// use strike_core::types::OptionType;
    /// use strike_options::fx::{DeltaMethod, FxInputs};
    ///
    /// let fx = FxInputs::new(1.10, 1.0, 0.03, 0.01).unwrap();
    /// let k = fx.strike_from_delta(DeltaMethod::SpotDeltaPremAdj, 0.25, 0.12, OptionType::Call).unwrap();
    /// let back = fx.delta(DeltaMethod::SpotDeltaPremAdj, k, 0.12, OptionType::Call);
    /// assert!((back - 0.25).abs() < 1e-10);
    /// ```
    pub fn strike_from_delta(
        &self,
        method: DeltaMethod,
        delta: f64,
        sigma: f64,
        option_type: OptionType,
    ) -> OptionsResult<f64> {
        require_positive("volatility", sigma)?;
        let phi = option_type.phi();
        if !delta.is_finite() || phi * delta <= 0.0 {
            return Err(OptionsError::invalid_input(format!(
                "{option_type} delta must have sign {phi}, got {delta}"
            )));
        }
        let t = self.time_to_expiry;
        let f = self.forward();
        let st = sigma * t.sqrt();
        let spot_scale = if method.is_spot() {
            self.foreign_df()
        } else {
            1.0
        };

        let unadjusted = |target: f64| -> Option<f64> {
            let p = phi * target / spot_scale;
            if p <= 0.0 || p >= 1.0 {
                return None;
            }
            let d1 = phi * norm_inv_cdf(p);
            Some(f * (-d1 * st + 0.5 * st * st).exp())
        };

        if !method.is_premium_adjusted() {
            return unadjusted(delta).ok_or_else(|| {
                OptionsError::invalid_input(format!(
                    "delta {delta} is outside the attainable range for {method}"
                ))
            });
        }

        let guess = unadjusted(delta).unwrap_or(f);
        let g = |k: f64| self.delta(method, k, sigma, option_type) - delta;
        let config = SolverConfig::new(1e-12, 50);
        let bounds = match option_type {
            OptionType::Call => {
                let k_peak = self.peak_premium_adjusted_call_strike(sigma)?;
                let max_delta = self.delta(method, k_peak, sigma, option_type);
                if delta > max_delta {
                    return Err(OptionsError::invalid_input(format!(
                        "premium-adjusted call delta {delta} exceeds its maximum {max_delta:.6}"
                    )));
                }
                (k_peak, guess.max(k_peak * (1.0 + 1e-12)))
            }
            OptionType::Put => (guess * 1e-3, guess),
        };
        let result = secant_with_fallback(g, guess, Some(bounds), &config)
            .map_err(|source| OptionsError::SolveFailed {
                what: "strike from delta",
                source,
            })?;
        Ok(result.root)
    }

    /// Strike at which the premium-adjusted call delta peaks:
    /// `σ√T N(d2) = n(d2)`.
    fn peak_premium_adjusted_call_strike(&self, sigma: f64) -> OptionsResult<f64> {
        let st = sigma * self.time_to_expiry.sqrt();
        let h = |d2: f64| st * norm_cdf(d2) - norm_pdf(d2);
        let d2 = bisection(h, -10.0, 10.0, &SolverConfig::new(1e-12, 200)).map_err(|source| {
            OptionsError::SolveFailed {
                what: "peak delta strike",
                source,
            }
        })?;
        Ok(self.forward() * (-d2.root * st - 0.5 * st * st).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> FxInputs {
        FxInputs::new(1.3465, 0.5, 0.0294, 0.0171).unwrap()
    }

    const METHODS: [DeltaMethod; 4] = [
        DeltaMethod::SpotDelta,
        DeltaMethod::ForwardDelta,
        DeltaMethod::SpotDeltaPremAdj,
        DeltaMethod::ForwardDeltaPremAdj,
    ];

    #[test]
    fn test_strike_round_trip_all_methods() {
        let fx = market();
        for method in METHODS {
            for (option_type, delta) in [(OptionType::Call, 0.25), (OptionType::Put, -0.25), (OptionType::Call, 0.10)] {
                let k = fx.strike_from_delta(method, delta, 0.11, option_type).unwrap();
                let back = fx.delta(method, k, 0.11, option_type);
                assert_relative_eq!(back, delta, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_spot_delta_matches_gk_delta() {
        let fx = market();
        let gk = fx.garman_kohlhagen(1.35, 0.11, OptionType::Call);
        assert_relative_eq!(fx.delta(DeltaMethod::SpotDelta, 1.35, 0.11, OptionType::Call), gk.delta, epsilon = 1e-14);
    }

    #[test]
    fn test_premium_adjustment_subtracts_premium() {
        let fx = market();
        let k = 1.36;
        let gk = fx.garman_kohlhagen(k, 0.11, OptionType::Call);
        let adjusted = fx.delta(DeltaMethod::SpotDeltaPremAdj, k, 0.11, OptionType::Call);
        assert_relative_eq!(adjusted, gk.delta - gk.value / fx.spot, epsilon = 1e-12);
    }

    #[test]
    fn test_premium_adjusted_call_takes_upper_branch() {
        let fx = market();
        let k = fx
            .strike_from_delta(DeltaMethod::ForwardDeltaPremAdj, 0.25, 0.11, OptionType::Call)
            .unwrap();
        assert!(k > fx.forward());
    }

    #[test]
    fn test_rejects_unattainable_delta() {
        let fx = market();
        assert!(fx.strike_from_delta(DeltaMethod::SpotDelta, 1.2, 0.1, OptionType::Call).is_err());
        assert!(fx.strike_from_delta(DeltaMethod::SpotDelta, 0.25, 0.1, OptionType::Put).is_err());
        assert!(fx
            .strike_from_delta(DeltaMethod::SpotDeltaPremAdj, 0.99, 0.1, OptionType::Call)
            .is_err());
    }

    #[test]
    fn test_inputs_validation() {
        assert!(FxInputs::new(-1.0, 1.0, 0.0, 0.0).is_err());
        assert!(matches!(
            FxInputs::new(1.0, 0.0, 0.0, 0.0).unwrap_err(),
            OptionsError::Expired { .. }
        ));
    }
}
