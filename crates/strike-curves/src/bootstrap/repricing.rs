//! Post-build repricing checks.

use std::fmt;

use super::instruments::{CalibrationInstrument, InstrumentKind};
use crate::curves::DiscountCurve;
use crate::error::{CurveError, CurveResult};

/// Repricing tolerances per unit notional.
pub mod tolerances {
    /// Deposits, absolute PV.
    pub const DEPOSIT: f64 = 1e-8;
    /// FRAs, absolute PV.
    pub const FRA: f64 = 1e-8;
    /// Swaps, absolute PV.
    pub const SWAP: f64 = 1e-10;

    /// Tolerance for an instrument family.
    #[must_use]
    pub fn for_kind(kind: super::InstrumentKind) -> f64 {
        match kind {
            super::InstrumentKind::Deposit => DEPOSIT,
            super::InstrumentKind::Fra => FRA,
            super::InstrumentKind::Swap => SWAP,
        }
    }
}

/// Repricing outcome for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct RepricingCheck {
    /// Instrument description.
    pub instrument: String,
    /// Instrument family.
    pub kind: InstrumentKind,
    /// Model PV on the built curve.
    pub pv: f64,
    /// Allowed absolute PV.
    pub tolerance: f64,
}

impl RepricingCheck {
    /// Whether the instrument reprices within tolerance.
    pub fn passed(&self) -> bool {
        self.pv.abs() <= self.tolerance
    }
}

impl fmt::Display for RepricingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed() { "ok" } else { "FAIL" };
        write!(
            f,
            "{status:>4} {} | PV {:.2e} (tol {:.1e})",
            self.instrument, self.pv, self.tolerance
        )
    }
}

/// Repricing outcome for every calibration instrument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RepricingReport {
    checks: Vec<RepricingCheck>,
}

impl RepricingReport {
    /// Reprices `instruments` on `curve`.
    pub fn new(curve: &DiscountCurve, instruments: &[CalibrationInstrument]) -> Self {
        let checks = instruments
            .iter()
            .map(|inst| RepricingCheck {
                instrument: inst.description(),
                kind: inst.kind(),
                pv: inst.pv(curve),
                tolerance: tolerances::for_kind(inst.kind()),
            })
            .collect();
        Self { checks }
    }

    /// Individual checks, in calibration order.
    pub fn checks(&self) -> &[RepricingCheck] {
        &self.checks
    }

    /// True when every instrument reprices within tolerance.
    pub fn is_valid(&self) -> bool {
        self.checks.iter().all(RepricingCheck::passed)
    }

    /// Largest absolute PV.
    pub fn max_error(&self) -> f64 {
        self.checks.iter().map(|c| c.pv.abs()).fold(0.0, f64::max)
    }

    /// Fails with the first instrument outside tolerance.
    pub fn ensure_valid(&self) -> CurveResult<()> {
        match self.checks.iter().find(|c| !c.passed()) {
            Some(check) => Err(CurveError::RepricingFailed {
                instrument: check.instrument.clone(),
                error: check.pv.abs(),
                tolerance: check.tolerance,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for RepricingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.checks.iter().filter(|c| c.passed()).count();
        writeln!(
            f,
            "Repricing: {passed}/{} passed, max error {:.2e}",
            self.checks.len(),
            self.max_error()
        )?;
        for check in &self.checks {
            writeln!(f, "  {check}")?;
        }
        Ok(())
    }
}

/// A bootstrapped curve together with its repricing report.
#[derive(Debug, Clone)]
pub struct BootstrapResult {
    /// The calibrated curve.
    pub curve: DiscountCurve,
    /// Calibration instruments in knot order, including any synthetic
    /// deposit.
    pub instruments: Vec<CalibrationInstrument>,
    /// Repricing of every calibration instrument.
    pub report: RepricingReport,
}

impl BootstrapResult {
    /// Consumes the result, returning the curve.
    pub fn into_curve(self) -> DiscountCurve {
        self.curve
    }
}
