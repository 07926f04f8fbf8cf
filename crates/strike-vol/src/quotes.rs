//! FX volatility market quotes and ATM conventions.

use serde::{Deserialize, Serialize};
use std::fmt;

use strike_core::types::Tenor;

use crate::error::{VolError, VolResult};

/// Definition of the at-the-money strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AtmMethod {
    /// `K = S`.
    Spot,
    /// `K = F`.
    Fwd,
    /// Zero straddle delta: `K = F e^{σ²T/2}`.
    #[default]
    FwdDeltaNeutral,
    /// Zero premium-adjusted straddle delta: `K = F e^{−σ²T/2}`.
    FwdDeltaNeutralPremAdj,
}

impl AtmMethod {
    /// ATM strike for spot `s`, forward `f` and ATM vol `sigma` at `t`.
    pub fn strike(&self, s: f64, f: f64, sigma: f64, t: f64) -> f64 {
        match self {
            AtmMethod::Spot => s,
            AtmMethod::Fwd => f,
            AtmMethod::FwdDeltaNeutral => f * (0.5 * sigma * sigma * t).exp(),
            AtmMethod::FwdDeltaNeutralPremAdj => f * (-0.5 * sigma * sigma * t).exp(),
        }
    }
}

impl fmt::Display for AtmMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtmMethod::Spot => "SPOT",
            AtmMethod::Fwd => "FWD",
            AtmMethod::FwdDeltaNeutral => "FWD_DELTA_NEUTRAL",
            AtmMethod::FwdDeltaNeutralPremAdj => "FWD_DELTA_NEUTRAL_PREM_ADJ",
        };
        write!(f, "{name}")
    }
}

/// Market quotes for one FX option tenor.
///
/// Strangles are market (broker) strangles quoted as a vol spread over
/// ATM; risk reversals are call vol minus put vol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxVolQuote {
    /// Expiry tenor from the valuation date.
    pub tenor: Tenor,
    /// ATM volatility.
    pub atm_vol: f64,
    /// 25-delta market strangle.
    pub ms25: f64,
    /// 25-delta risk reversal.
    pub rr25: f64,
    /// 10-delta market strangle.
    #[serde(default)]
    pub ms10: Option<f64>,
    /// 10-delta risk reversal.
    #[serde(default)]
    pub rr10: Option<f64>,
}

impl FxVolQuote {
    /// Creates 25-delta quotes for a tenor string such as `"3M"`.
    pub fn new(tenor: &str, atm_vol: f64, ms25: f64, rr25: f64) -> VolResult<Self> {
        let quote = Self {
            tenor: tenor.parse()?,
            atm_vol,
            ms25,
            rr25,
            ms10: None,
            rr10: None,
        };
        quote.validate()?;
        Ok(quote)
    }

    /// Adds 10-delta strangle and risk reversal quotes.
    #[must_use]
    pub fn with_10d(mut self, ms10: f64, rr10: f64) -> Self {
        self.ms10 = Some(ms10);
        self.rr10 = Some(rr10);
        self
    }

    /// The 10-delta quotes, when both are present.
    pub fn quotes_10d(&self) -> Option<(f64, f64)> {
        self.ms10.zip(self.rr10)
    }

    /// Checks the quotes describe positive wing vols.
    pub fn validate(&self) -> VolResult<()> {
        if !(self.atm_vol.is_finite() && self.atm_vol > 0.0) {
            return Err(VolError::invalid_input(format!(
                "{}: ATM vol must be positive, got {}",
                self.tenor, self.atm_vol
            )));
        }
        let wings = [(self.ms25, self.rr25, "25D")]
            .into_iter()
            .chain(self.quotes_10d().map(|(ms, rr)| (ms, rr, "10D")));
        for (ms, rr, label) in wings {
            if !(ms.is_finite() && rr.is_finite()) {
                return Err(VolError::invalid_input(format!(
                    "{}: {label} quotes must be finite",
                    self.tenor
                )));
            }
            if self.atm_vol + ms - 0.5 * rr.abs() <= 0.0 {
                return Err(VolError::invalid_input(format!(
                    "{}: {label} strangle {ms} and risk reversal {rr} imply a non-positive wing vol",
                    self.tenor
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_atm_strikes() {
        let (s, f, v, t) = (1.30, 1.32, 0.1, 2.0);
        assert_eq!(AtmMethod::Spot.strike(s, f, v, t), s);
        assert_eq!(AtmMethod::Fwd.strike(s, f, v, t), f);
        let dn = AtmMethod::FwdDeltaNeutral.strike(s, f, v, t);
        let dn_pa = AtmMethod::FwdDeltaNeutralPremAdj.strike(s, f, v, t);
        assert_relative_eq!(dn * dn_pa, f * f, epsilon = 1e-14);
        assert!(dn > f && dn_pa < f);
    }

    #[test]
    fn test_quote_validation() {
        assert!(FxVolQuote::new("1Y", 0.1, 0.003, -0.01).is_ok());
        assert!(FxVolQuote::new("1Y", -0.1, 0.003, -0.01).is_err());
        assert!(FxVolQuote::new("1Y", 0.05, 0.0, 0.2).is_err());
        assert!(FxVolQuote::new("1X", 0.1, 0.003, -0.01).is_err());
        let quote = FxVolQuote::new("6M", 0.1, 0.003, -0.01).unwrap().with_10d(0.01, -0.02);
        assert_eq!(quote.quotes_10d(), Some((0.01, -0.02)));
    }

    #[test]
    fn test_quote_deserializes_without_10d() {
        let json = r#"{"tenor":"3M","atm_vol":0.1,"ms25":0.002,"rr25":0.001}"#;
        let quote: FxVolQuote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.quotes_10d(), None);
        assert_eq!(quote.tenor, Tenor::months(3));
    }
}
